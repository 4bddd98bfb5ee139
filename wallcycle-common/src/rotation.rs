use std::thread;
use std::time::Duration;
use crate::error::ErrorReporting;
use crate::manager::SelectionManager;

/// How often the rotation loop wakes up to look at the stop flag.
pub const CHECK_INTERVAL: Duration = Duration::from_secs(5);

/// Unattended timer that picks a new wallpaper every `period`.
#[derive(Debug, Clone)]
pub struct RotationLoop {
    period: Duration,
    tick: Duration,
}

impl RotationLoop {
    pub fn new(period: Duration) -> Self {
        Self { period, tick: CHECK_INTERVAL }
    }

    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick.max(Duration::from_millis(1));
        self
    }

    /// Runs until the manager is stopped. Returns how many picks were made.
    pub fn run(&self, manager: &SelectionManager) -> usize {
        log::info!("Rotating every {}", humantime::format_duration(self.period));

        let mut picks = 0;
        while self.wait(manager) {
            match manager.pick(false) {
                Ok(chosen) => {
                    picks += 1;
                    log::debug!("Rotated to {:?}", chosen);
                }
                Err(e) => log::error!("Rotation skipped: {}", e.user_friendly_message()),
            }
        }

        log::info!("Rotation loop stopped after {} picks", picks);
        picks
    }

    /// Sleeps through one period in `tick` steps. Returns `false` as soon as
    /// a stop has been requested.
    fn wait(&self, manager: &SelectionManager) -> bool {
        let mut elapsed = Duration::ZERO;
        while elapsed < self.period {
            if manager.is_stopped() {
                return false;
            }
            let step = self.tick.min(self.period - elapsed);
            thread::sleep(step);
            elapsed += step;
        }
        !manager.is_stopped()
    }
}
