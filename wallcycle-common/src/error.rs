use std::path::PathBuf;
use thiserror::Error;

/// Main error type for wallcycle operations
#[derive(Error, Debug)]
pub enum WallcycleError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Image discovery error: {0}")]
    ImageDiscovery(#[from] ImageDiscoveryError),

    #[error("Selection error: {0}")]
    Selection(#[from] SelectionError),

    #[error("Background error: {0}")]
    Background(#[from] BackgroundError),

    #[error("IPC error: {0}")]
    Ipc(#[from] IpcError),

    #[error("Snapshot persistence error: {0}")]
    State(#[from] StateError),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file: {path:?}")]
    FileRead { path: PathBuf, source: std::io::Error },

    #[error("Failed to write configuration file: {path:?}")]
    FileWrite { path: PathBuf, source: std::io::Error },

    #[error("Failed to parse JSON configuration: {message}")]
    JsonParse { message: String },

    #[error("Invalid configuration value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Could not determine config directory")]
    NoConfigDir,
}

/// Image discovery errors
#[derive(Error, Debug)]
pub enum ImageDiscoveryError {
    #[error("Failed to read directory: {path:?}")]
    DirectoryRead { path: PathBuf, source: std::io::Error },
}

/// Errors raised by the selection manager
#[derive(Error, Debug)]
pub enum SelectionError {
    #[error("Candidate pool is empty")]
    EmptyPool,
}

/// Desktop background backend errors
#[derive(Error, Debug)]
pub enum BackgroundError {
    #[error("swww binary not found in PATH")]
    BinaryNotFound,

    #[error("Command execution failed: {command}")]
    Execution { command: String, source: std::io::Error },

    #[error("Command returned non-zero exit code: {code}")]
    NonZeroExit { code: i32, stderr: String },

    #[error("No image is currently displayed")]
    NoCurrentImage,
}

/// Remote command channel errors
#[derive(Error, Debug)]
pub enum IpcError {
    #[error("Failed to bind listener on {addr}")]
    Bind { addr: String, source: std::io::Error },

    #[error("Failed to connect to {addr}")]
    Connection { addr: String, source: std::io::Error },

    #[error("Failed to send command")]
    Send { source: std::io::Error },

    #[error("Failed to read console input")]
    Console { source: std::io::Error },
}

/// Snapshot persistence errors
#[derive(Error, Debug)]
pub enum StateError {
    #[error("Failed to read snapshot file: {path:?}")]
    FileRead { path: PathBuf, source: std::io::Error },

    #[error("Failed to write snapshot file: {path:?}")]
    FileWrite { path: PathBuf, source: std::io::Error },

    #[error("Snapshot file is corrupted: {path:?}: {message}")]
    Corrupted { path: PathBuf, message: String },

    #[error("Failed to serialize snapshot")]
    Serialization,
}

// Convenience type alias
pub type Result<T> = std::result::Result<T, WallcycleError>;

// Error reporting utilities
pub trait ErrorReporting {
    fn log_error(&self, context: &str);
    fn user_friendly_message(&self) -> String;
}

impl ErrorReporting for WallcycleError {
    fn log_error(&self, context: &str) {
        log::error!("{}: {:?}", context, self);
    }

    fn user_friendly_message(&self) -> String {
        match self {
            WallcycleError::Config(ConfigError::FileRead { path, .. }) => {
                format!("Configuration file not found: {:?}", path)
            }
            WallcycleError::Config(ConfigError::JsonParse { message }) => {
                format!("Invalid configuration format: {}", message)
            }
            WallcycleError::State(StateError::FileRead { path, .. }) => {
                format!("Failed to read snapshot file: {:?}", path)
            }
            WallcycleError::State(StateError::Corrupted { path, message }) => {
                format!("Snapshot file {:?} is not a JSON list of paths: {}", path, message)
            }
            WallcycleError::Selection(SelectionError::EmptyPool) => {
                "No wallpapers left to choose from. Check root_directory and legal_extensions.".to_string()
            }
            WallcycleError::Background(BackgroundError::BinaryNotFound) => {
                "swww is not installed. Please install swww and start swww-daemon first.".to_string()
            }
            WallcycleError::Ipc(IpcError::Connection { addr, .. }) => {
                format!("wallcycle daemon is not listening on {}. Start it with --server.", addr)
            }
            _ => self.to_string(),
        }
    }
}
