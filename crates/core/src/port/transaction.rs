// Transaction port for atomic per-record operations

use crate::domain::{ListingId, NewJobListing, SourceId};
use crate::error::Result;
use crate::port::ListingRepository;
use async_trait::async_trait;

/// Transaction trait for atomic multi-step operations
#[async_trait]
pub trait Transaction: Send {
    /// Commit the transaction
    async fn commit(self: Box<Self>) -> Result<()>;

    /// Rollback the transaction
    async fn rollback(self: Box<Self>) -> Result<()>;
}

/// Transactional ListingRepository operations
#[async_trait]
pub trait TransactionalListingRepository: ListingRepository {
    /// Begin a new transaction
    async fn begin_transaction(&self) -> Result<Box<dyn ListingRepositoryTransaction>>;
}

/// ListingRepository operations within a transaction
#[async_trait]
pub trait ListingRepositoryTransaction: Transaction {
    /// Look up an existing listing by its source-scoped identity (within transaction)
    async fn find_by_external_id(
        &mut self,
        source_id: SourceId,
        external_id: &str,
    ) -> Result<Option<ListingId>>;

    /// Insert listing (within transaction)
    async fn insert(&mut self, listing: &NewJobListing) -> Result<ListingId>;
}
