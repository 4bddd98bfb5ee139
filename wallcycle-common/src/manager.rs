use std::io::Write;
use std::mem;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use crate::background::Background;
use crate::error::{SelectionError, WallcycleError};
use crate::image_discovery::ImageDiscovery;
use crate::picker::Picker;
use crate::state::SnapshotStore;
use crate::Result;

/// Collections the manager starts from.
#[derive(Debug, Default, Clone)]
pub struct SelectionParts {
    pub candidates: Vec<PathBuf>,
    pub disliked: Vec<PathBuf>,
    pub favorites: Vec<PathBuf>,
}

#[derive(Default)]
pub struct ManagerOptions {
    pub picker: Picker,
    /// Receives one line per path that becomes (or stops being) the background.
    pub sink: Option<Box<dyn Write + Send>>,
}

/// Point-in-time copy of the manager state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionSnapshot {
    pub chosen: PathBuf,
    pub history: Vec<PathBuf>,
    pub candidates: Vec<PathBuf>,
    pub disliked: Vec<PathBuf>,
    pub favorites: Vec<PathBuf>,
    pub stopped: bool,
}

/// Displayed-image stack. The current entry always exists, so the stack
/// can never be empty and the chosen image is always its top.
#[derive(Debug, Clone)]
struct History {
    previous: Vec<PathBuf>,
    current: PathBuf,
}

impl History {
    fn new(seed: PathBuf) -> Self {
        Self { previous: Vec::new(), current: seed }
    }

    fn current(&self) -> &PathBuf {
        &self.current
    }

    fn len(&self) -> usize {
        self.previous.len() + 1
    }

    fn push(&mut self, path: PathBuf) {
        let previous = mem::replace(&mut self.current, path);
        self.previous.push(previous);
    }

    fn pop(&mut self) -> Option<&PathBuf> {
        let top = self.previous.pop()?;
        self.current = top;
        Some(&self.current)
    }

    /// Drops every entry equal to the current one and puts `path` on top.
    fn replace_current(&mut self, path: PathBuf) {
        let removed = mem::replace(&mut self.current, path);
        self.previous.retain(|p| *p != removed);
    }

    fn to_vec(&self) -> Vec<PathBuf> {
        let mut all = self.previous.clone();
        all.push(self.current.clone());
        all
    }
}

struct Selection {
    candidates: Vec<PathBuf>,
    disliked: Vec<PathBuf>,
    favorites: Vec<PathBuf>,
    history: History,
    stopped: bool,
    picker: Picker,
    store: SnapshotStore,
    background: Box<dyn Background>,
    sink: Option<Box<dyn Write + Send>>,
}

impl Selection {
    fn emit(&mut self, path: &Path) {
        if let Some(sink) = self.sink.as_mut() {
            if let Err(e) = writeln!(sink, "{}", path.display()).and_then(|_| sink.flush()) {
                log::warn!("Failed to echo {:?}: {}", path, e);
            }
        }
    }

    fn choose(&mut self, favorites_only: bool) -> Result<PathBuf> {
        let pool = if favorites_only && !self.favorites.is_empty() {
            &self.favorites
        } else {
            &self.candidates
        };

        self.picker
            .choose(pool)
            .ok_or(WallcycleError::Selection(SelectionError::EmptyPool))
    }

    /// Emits and applies the current history entry.
    fn show_current(&mut self) -> Result<PathBuf> {
        let chosen = self.history.current().clone();
        self.emit(&chosen);
        self.background.set(&chosen)?;
        Ok(chosen)
    }

    fn pick(&mut self, favorites_only: bool) -> Result<PathBuf> {
        let choice = self.choose(favorites_only)?;
        self.history.push(choice);
        self.show_current()
    }
}

/// Owns every piece of mutable rotation state behind a single lock.
///
/// Each public operation holds the lock for its whole duration, including
/// echoing to the sink, rewriting snapshots and calling the background
/// backend, so no caller can observe a half-applied update.
pub struct SelectionManager {
    selection: Mutex<Selection>,
}

impl SelectionManager {
    /// Indexes `root`, loads the snapshots from `store` and seeds the history
    /// with whatever the background backend currently shows.
    pub fn open(
        root: &Path,
        extensions: &[String],
        store: SnapshotStore,
        background: Box<dyn Background>,
        options: ManagerOptions,
    ) -> Result<Self> {
        let disliked = store.load_disliked()?;
        let favorites = store.load_favorites()?;
        let files = ImageDiscovery::index(root)?;
        let candidates = ImageDiscovery::candidates(files, extensions, &disliked);

        log::info!(
            "Loaded {} candidates ({} disliked, {} favorites)",
            candidates.len(),
            disliked.len(),
            favorites.len()
        );

        let seed = match background.current() {
            Ok(current) => Some(current),
            Err(e) => {
                log::warn!("Could not read the current background ({}), picking one instead", e);
                None
            }
        };

        let parts = SelectionParts { candidates, disliked, favorites };
        Self::from_parts(parts, store, background, options, seed)
    }

    /// Builds a manager from already-loaded collections. Without a `seed` an
    /// initial image is picked from the candidates and applied.
    pub fn from_parts(
        parts: SelectionParts,
        store: SnapshotStore,
        background: Box<dyn Background>,
        options: ManagerOptions,
        seed: Option<PathBuf>,
    ) -> Result<Self> {
        let SelectionParts { mut candidates, disliked, favorites } = parts;
        candidates.retain(|c| !disliked.contains(c));

        let ManagerOptions { mut picker, sink } = options;

        let (seed, apply_seed) = match seed {
            Some(seed) => (seed, false),
            None => {
                let first = picker
                    .choose(&candidates)
                    .ok_or(WallcycleError::Selection(SelectionError::EmptyPool))?;
                (first, true)
            }
        };

        let mut selection = Selection {
            candidates,
            disliked,
            favorites,
            history: History::new(seed),
            stopped: false,
            picker,
            store,
            background,
            sink,
        };

        if apply_seed {
            selection.show_current()?;
        }

        Ok(Self { selection: Mutex::new(selection) })
    }

    fn lock(&self) -> MutexGuard<'_, Selection> {
        self.selection.lock().unwrap_or_else(|poisoned| {
            log::warn!("Selection lock was poisoned, continuing with the inner state");
            poisoned.into_inner()
        })
    }

    /// Shows a random candidate, or a random favorite when `favorites_only`
    /// is set and there are favorites.
    pub fn pick(&self, favorites_only: bool) -> Result<PathBuf> {
        let mut selection = self.lock();
        let chosen = selection.pick(favorites_only)?;
        log::debug!("Picked {:?} (favorites only: {})", chosen, favorites_only);
        Ok(chosen)
    }

    /// Permanently rejects the current image and immediately shows another
    /// candidate. Refuses with `EmptyPool` when nothing else would be left.
    pub fn dislike(&self) -> Result<PathBuf> {
        let mut selection = self.lock();
        let disliked = selection.history.current().clone();

        if !selection.candidates.iter().any(|c| *c != disliked) {
            return Err(WallcycleError::Selection(SelectionError::EmptyPool));
        }

        selection.emit(&disliked);
        if !selection.disliked.contains(&disliked) {
            selection.disliked.push(disliked.clone());
        }
        selection.candidates.retain(|c| *c != disliked);
        selection.store.save_disliked(&selection.disliked)?;
        log::info!("Disliked {:?}", disliked);

        let replacement = selection.choose(false)?;
        selection.history.replace_current(replacement);
        selection.show_current()
    }

    /// Goes back to the previously shown image. Returns `None` when only the
    /// startup image is left.
    pub fn undo(&self) -> Result<Option<PathBuf>> {
        let mut selection = self.lock();

        if selection.history.pop().is_none() {
            log::debug!("Nothing to undo");
            return Ok(None);
        }

        selection.show_current().map(Some)
    }

    /// Appends the current image to the favorites and rewrites the snapshot.
    pub fn favorite(&self) -> Result<PathBuf> {
        let mut selection = self.lock();
        let chosen = selection.history.current().clone();

        selection.emit(&chosen);
        selection.favorites.push(chosen.clone());
        selection.store.save_favorites(&selection.favorites)?;
        log::info!("Added {:?} to favorites", chosen);
        Ok(chosen)
    }

    pub fn get_chosen(&self) -> PathBuf {
        self.lock().history.current().clone()
    }

    pub fn request_stop(&self) {
        let mut selection = self.lock();
        if !selection.stopped {
            log::info!("Stop requested");
            selection.stopped = true;
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.lock().stopped
    }

    pub fn history_len(&self) -> usize {
        self.lock().history.len()
    }

    pub fn snapshot(&self) -> SelectionSnapshot {
        let selection = self.lock();
        SelectionSnapshot {
            chosen: selection.history.current().clone(),
            history: selection.history.to_vec(),
            candidates: selection.candidates.clone(),
            disliked: selection.disliked.clone(),
            favorites: selection.favorites.clone(),
            stopped: selection.stopped,
        }
    }
}
