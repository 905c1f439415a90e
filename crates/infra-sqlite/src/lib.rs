// jobscout Infrastructure - SQLite Adapter
// Implements: ListingRepository, TransactionalListingRepository

mod connection;
mod error;
mod listing_repository;
mod migration;
mod transaction;

pub use connection::create_pool;
pub use listing_repository::SqliteListingRepository;
pub use migration::run_migrations;
pub use transaction::SqliteListingTransaction;

// Note: sqlx::Error conversion is handled by map_sqlx_error
// due to Rust's orphan rules (cannot implement From<sqlx::Error> for AppError here)
