use engagefee_core::errors::LookupError;
use thiserror::Error;

pub mod fee_data;
pub mod memory;

pub use fee_data::SqlFeeDataSource;
pub use memory::InMemoryFeeDataSource;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

impl From<RepositoryError> for LookupError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::Database(error) => LookupError::Unavailable(error.to_string()),
            RepositoryError::Decode(message) => LookupError::Decode(message),
        }
    }
}
