use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Missing parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Unknown easing: {0}")]
    UnknownEasing(String),

    #[error("Invalid dimension: {0:?}")]
    InvalidDimension(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
