use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid {field} filter: {value:?} is not a recognised date")]
    InvalidFilter { field: &'static str, value: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
