use thiserror::Error;

#[derive(Error, Debug)]
pub enum EnrollmentError {
    #[error("Invalid state: {0}")]
    InvalidState(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Payment gateway error: {0}")]
    Gateway(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Storage error: {0}")]
    Storage(Box<dyn std::error::Error + Send + Sync>),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for EnrollmentError {
    fn from(err: rocksdb::Error) -> Self {
        EnrollmentError::Storage(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, EnrollmentError>;
