use thiserror::Error;

#[derive(Error, Debug)]
pub enum SiftError {
    #[error("Invalid filter: {entity} has no field '{path}'")]
    InvalidFilter { entity: &'static str, path: String },
    #[error("Invalid order: {entity} has no field '{path}'")]
    InvalidOrder { entity: &'static str, path: String },
    #[error("Invalid value '{value}' for field '{path}': {reason}")]
    InvalidValue { path: String, value: String, reason: String },
    #[error("Invalid alias '{0}': expected a plain identifier")]
    InvalidAlias(String),
    #[error("Storage error: {0}")]
    Storage(#[source] Box<SiftError>),
    #[error("Persistence error: {0}")]
    Persistence(String),
    #[error("Config error: {0}")]
    Config(String),
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(&'static str),
    #[error("Internal invariant violated: {0}")]
    Invariant(String),
}

impl SiftError {
    /// Wraps a fault as a storage error, leaving already wrapped faults alone.
    pub fn into_storage(self) -> Self {
        match self {
            Self::Storage(_) => self,
            other => Self::Storage(Box::new(other)),
        }
    }

    /// The underlying fault of a storage error, or the error itself.
    pub fn cause(&self) -> &SiftError {
        match self {
            Self::Storage(inner) => inner.cause(),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, SiftError>;

// Helper conversions
impl From<rusqlite::Error> for SiftError {
    fn from(e: rusqlite::Error) -> Self { Self::Persistence(e.to_string()) }
}
impl From<config::ConfigError> for SiftError {
    fn from(e: config::ConfigError) -> Self { Self::Config(e.to_string()) }
}
