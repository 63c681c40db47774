use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Bad filter: {0}")]
    BadFilter(String),

    #[error("Bad argument: {0}")]
    BadArgument(String),

    #[error("Bad value: {0}")]
    BadValue(String),

    #[error("Property '{0}' is read-only on a projected entity")]
    ReadOnlyProperty(String),

    #[error("Property '{0}' not found on kind '{1}'")]
    UnknownProperty(String, String),

    #[error("Lock error: {0}")]
    LockError(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;


impl<T> From<std::sync::PoisonError<T>> for ModelError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::LockError(err.to_string())
    }
}
