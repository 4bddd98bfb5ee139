use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use crate::background::Background;
use crate::error::{BackgroundError, WallcycleError};
use crate::Result;

/// Sets wallpapers by shelling out to the `swww` client.
pub struct SwwwIntegration {
    swww_path: PathBuf,
}

impl SwwwIntegration {
    pub fn new() -> Result<Self> {
        let swww_path = which::which("swww")
            .map_err(|_| WallcycleError::Background(BackgroundError::BinaryNotFound))?;
        log::debug!("Using swww at {:?}", swww_path);
        Ok(Self { swww_path })
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.swww_path);

        // Set environment variables from current session, with fallbacks
        if let Ok(display) = std::env::var("WAYLAND_DISPLAY") {
            cmd.env("WAYLAND_DISPLAY", display);
        } else {
            cmd.env("WAYLAND_DISPLAY", "wayland-0");
        }

        if let Ok(runtime_dir) = std::env::var("XDG_RUNTIME_DIR") {
            cmd.env("XDG_RUNTIME_DIR", runtime_dir);
        } else {
            let uid = rustix::process::getuid();
            cmd.env("XDG_RUNTIME_DIR", format!("/run/user/{}", uid.as_raw()));
        }

        if let Ok(desktop) = std::env::var("XDG_CURRENT_DESKTOP") {
            cmd.env("XDG_CURRENT_DESKTOP", desktop);
        }

        if let Ok(session_type) = std::env::var("XDG_SESSION_TYPE") {
            cmd.env("XDG_SESSION_TYPE", session_type);
        } else {
            cmd.env("XDG_SESSION_TYPE", "wayland");
        }

        cmd
    }

    fn run(&self, mut cmd: Command) -> Result<Output> {
        log::debug!("Executing swww command: {:?}", cmd);

        let output = cmd.output()
            .map_err(|e| WallcycleError::Background(BackgroundError::Execution {
                command: format!("{:?}", cmd),
                source: e,
            }))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            log::error!("swww command failed with exit code {}: {}",
                output.status.code().unwrap_or(-1), stderr);

            return Err(WallcycleError::Background(BackgroundError::NonZeroExit {
                code: output.status.code().unwrap_or(-1),
                stderr: stderr.to_string(),
            }));
        }

        Ok(output)
    }
}

impl Background for SwwwIntegration {
    fn current(&self) -> Result<PathBuf> {
        let mut cmd = self.command();
        cmd.arg("query");
        let output = self.run(cmd)?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_current_image(&stdout)
            .ok_or(WallcycleError::Background(BackgroundError::NoCurrentImage))
    }

    fn set(&self, image: &Path) -> Result<()> {
        let mut cmd = self.command();
        cmd.arg("img").arg(image);
        let output = self.run(cmd)?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.is_empty() {
            log::debug!("swww stdout: {}", stdout);
        }

        log::info!("Set wallpaper: {:?}", image);
        Ok(())
    }
}

/// Extracts the image path from `swww query` output, e.g.
/// `eDP-1: 1920x1080, scale: 1, currently displaying: image: /walls/a.jpg`.
/// The first output showing an image wins.
fn parse_current_image(query_output: &str) -> Option<PathBuf> {
    const MARKER: &str = "currently displaying: image: ";

    query_output.lines().find_map(|line| {
        let start = line.find(MARKER)? + MARKER.len();
        let path = line[start..].trim();
        (!path.is_empty()).then(|| PathBuf::from(path))
    })
}
