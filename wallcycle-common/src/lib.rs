pub mod error;
pub mod image_discovery;
pub mod picker;
pub mod state;
pub mod background;
pub mod swww;
pub mod manager;
pub mod command;
pub mod ipc;
pub mod input;
pub mod rotation;

pub use error::{WallcycleError, Result, ErrorReporting};
pub use image_discovery::ImageDiscovery;
pub use picker::Picker;
pub use state::SnapshotStore;
pub use background::Background;
pub use swww::SwwwIntegration;
pub use manager::{SelectionManager, SelectionParts, SelectionSnapshot, ManagerOptions};
pub use command::{Command, Mode};
pub use ipc::{IpcClient, IpcServer};
pub use input::{InputHost, CommandSource, Flow};
pub use rotation::RotationLoop;
