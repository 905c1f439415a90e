// Port Layer - Interfaces for external dependencies

pub mod job_board;
pub mod listing_repository;
pub mod pacer; // Rate limiting & scroll pacing
pub mod time_provider;
pub mod transaction;

// Re-exports
pub use job_board::{ExtractError, FetchError, FetchedPage, JobBoard};
pub use listing_repository::ListingRepository;
pub use pacer::{DelayRange, Pacer};
pub use time_provider::TimeProvider;
pub use transaction::{ListingRepositoryTransaction, Transaction, TransactionalListingRepository};
