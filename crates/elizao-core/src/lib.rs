//! Elizao Core - shared configuration for all Elizao components.
//!
//! - **config**: state directory layout and path helpers
//! - **settings**: runtime settings read from the environment

pub mod config;
pub mod error;
pub mod settings;

pub use config::{
    data_dir, ensure_all_dirs, expand_path, logs_dir, memory_dir, state_dir, StatePaths,
    STATE_DIR_ENV,
};
pub use error::{ConfigError, Result};
pub use settings::{load_env_files, BackendSettings, ModelBackend, Settings};
