pub mod connection;
pub mod fixtures;
pub mod migrations;
pub mod repositories;

pub use connection::{connect, connect_with_settings, DbPool};
pub use fixtures::{FeeMasterSeed, SeedResult, SeededTable, VerificationCheck, VerificationResult};
pub use repositories::{InMemoryFeeDataSource, RepositoryError, SqlFeeDataSource};
