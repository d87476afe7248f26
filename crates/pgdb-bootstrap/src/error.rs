//! Bootstrap error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BootstrapError {
    #[error("Failed to execute ssh: {0}")]
    SshSpawn(std::io::Error),

    #[error("Remote bootstrap failed with exit code {0}")]
    RemoteExit(i32),

    #[error("Remote bootstrap was terminated by a signal")]
    RemoteKilled,

    #[error("Config error: {0}")]
    ConfigError(#[from] pgdb_config::ConfigError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BootstrapError>;
