use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine the user configuration directory")]
    ConfigDirNotFound,

    #[error("Server alias '{0}' is not configured. Run: pgdb config set server.default <url>")]
    UnknownAlias(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("URL must use http or https: {0}")]
    UnsupportedScheme(String),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
