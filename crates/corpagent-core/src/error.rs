use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Fatal misconfiguration detected at construction time.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Embedding failed: {0}")]
    Embedding(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Operation failed: {0}")]
    Operation(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(value: figment::Error) -> Self {
        Self::Configuration(value.to_string())
    }
}
