// Listing Repository Port (Interface)

use crate::domain::{Blacklist, JobListing, JobSource, ListingFields, ListingId, SourceId};
use crate::error::Result;
use async_trait::async_trait;

/// Repository interface for listing persistence
#[async_trait]
pub trait ListingRepository: Send + Sync {
    /// Find a source by name, creating it on first use
    async fn get_or_create_source(&self, name: &str) -> Result<JobSource>;

    /// Find listing by ID
    async fn find_by_id(&self, id: ListingId) -> Result<Option<JobListing>>;

    /// Listings of a source whose description is NULL or empty
    async fn find_missing_description(&self, source_id: SourceId) -> Result<Vec<JobListing>>;

    /// Listings of a source not yet flagged as expired
    async fn find_unexpired(&self, source_id: SourceId) -> Result<Vec<JobListing>>;

    /// All listings, every source
    async fn find_all(&self) -> Result<Vec<JobListing>>;

    /// Overwrite title/company/location/description of one listing
    async fn update_fields(&self, id: ListingId, fields: &ListingFields) -> Result<()>;

    /// Set the expiration flag of one listing
    async fn set_expired(&self, id: ListingId, is_expired: bool) -> Result<()>;

    /// Delete one listing
    async fn delete(&self, id: ListingId) -> Result<()>;

    /// Total listing count
    async fn count(&self) -> Result<i64>;

    /// Listing count of one source
    async fn count_by_source(&self, source_id: SourceId) -> Result<i64>;

    /// Stored listings whose title or company matches the blacklist
    ///
    /// Records missing either field are never matched. Patterns are regexes, which
    /// SQLite cannot evaluate, so the default filters in process.
    async fn find_by_blacklist_match(&self, blacklist: &Blacklist) -> Result<Vec<JobListing>> {
        let listings = self.find_all().await?;
        Ok(listings
            .into_iter()
            .filter(|listing| match (&listing.title, &listing.company) {
                (Some(title), Some(company)) => blacklist.is_blacklisted(title, company),
                _ => false,
            })
            .collect())
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::domain::NewJobListing;
    use crate::error::AppError;
    use crate::port::{ListingRepositoryTransaction, Transaction, TransactionalListingRepository};
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct State {
        sources: Vec<JobSource>,
        listings: Vec<JobListing>,
        fail_updates_for: Vec<ListingId>,
        last_id: ListingId,
    }

    impl State {
        fn check_unique(&self, listing: &NewJobListing) -> crate::error::Result<()> {
            let duplicate = self.listings.iter().any(|l| {
                l.url == listing.url
                    || (l.source_id == listing.source_id && l.external_id == listing.external_id)
            });
            if duplicate {
                return Err(AppError::Conflict(format!(
                    "listing {} already stored",
                    listing.url
                )));
            }
            Ok(())
        }
    }

    /// In-memory repository enforcing the same uniqueness rules as the SQL schema
    #[derive(Default, Clone)]
    pub struct InMemoryListingRepository {
        state: Arc<Mutex<State>>,
    }

    impl InMemoryListingRepository {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn listings(&self) -> Vec<JobListing> {
            self.state.lock().unwrap().listings.clone()
        }

        /// Make `update_fields` fail for one record
        pub fn fail_updates_for(&self, id: ListingId) {
            self.state.lock().unwrap().fail_updates_for.push(id);
        }

        /// Seed a stored listing directly
        pub fn seed(&self, listing: JobListing) {
            let mut state = self.state.lock().unwrap();
            state.last_id = state.last_id.max(listing.id);
            state.listings.push(listing);
        }
    }

    #[async_trait]
    impl ListingRepository for InMemoryListingRepository {
        async fn get_or_create_source(&self, name: &str) -> Result<JobSource> {
            let mut state = self.state.lock().unwrap();
            if let Some(source) = state.sources.iter().find(|s| s.name == name) {
                return Ok(source.clone());
            }
            let source = JobSource {
                id: state.sources.len() as i64 + 1,
                name: name.to_string(),
            };
            state.sources.push(source.clone());
            Ok(source)
        }

        async fn find_by_id(&self, id: ListingId) -> Result<Option<JobListing>> {
            let state = self.state.lock().unwrap();
            Ok(state.listings.iter().find(|l| l.id == id).cloned())
        }

        async fn find_missing_description(&self, source_id: SourceId) -> Result<Vec<JobListing>> {
            let state = self.state.lock().unwrap();
            Ok(state
                .listings
                .iter()
                .filter(|l| l.source_id == source_id && l.needs_description())
                .cloned()
                .collect())
        }

        async fn find_unexpired(&self, source_id: SourceId) -> Result<Vec<JobListing>> {
            let state = self.state.lock().unwrap();
            Ok(state
                .listings
                .iter()
                .filter(|l| l.source_id == source_id && !l.is_expired)
                .cloned()
                .collect())
        }

        async fn find_all(&self) -> Result<Vec<JobListing>> {
            Ok(self.listings())
        }

        async fn update_fields(&self, id: ListingId, fields: &ListingFields) -> Result<()> {
            let mut state = self.state.lock().unwrap();
            if state.fail_updates_for.contains(&id) {
                return Err(AppError::Database(format!("update of listing {} failed", id)));
            }
            let listing = state
                .listings
                .iter_mut()
                .find(|l| l.id == id)
                .ok_or_else(|| AppError::NotFound(format!("Listing {} not found", id)))?;
            listing.title = fields.title.clone();
            listing.company = fields.company.clone();
            listing.location = fields.location.clone();
            listing.description = fields.description.clone();
            Ok(())
        }

        async fn set_expired(&self, id: ListingId, is_expired: bool) -> Result<()> {
            let mut state = self.state.lock().unwrap();
            let listing = state
                .listings
                .iter_mut()
                .find(|l| l.id == id)
                .ok_or_else(|| AppError::NotFound(format!("Listing {} not found", id)))?;
            listing.is_expired = is_expired;
            Ok(())
        }

        async fn delete(&self, id: ListingId) -> Result<()> {
            self.state.lock().unwrap().listings.retain(|l| l.id != id);
            Ok(())
        }

        async fn count(&self) -> Result<i64> {
            Ok(self.state.lock().unwrap().listings.len() as i64)
        }

        async fn count_by_source(&self, source_id: SourceId) -> Result<i64> {
            let state = self.state.lock().unwrap();
            Ok(state
                .listings
                .iter()
                .filter(|l| l.source_id == source_id)
                .count() as i64)
        }
    }

    #[async_trait]
    impl TransactionalListingRepository for InMemoryListingRepository {
        async fn begin_transaction(&self) -> Result<Box<dyn ListingRepositoryTransaction>> {
            Ok(Box::new(InMemoryTransaction {
                state: Arc::clone(&self.state),
                pending: Vec::new(),
            }))
        }
    }

    /// Buffers inserts until commit
    pub struct InMemoryTransaction {
        state: Arc<Mutex<State>>,
        pending: Vec<JobListing>,
    }

    #[async_trait]
    impl Transaction for InMemoryTransaction {
        async fn commit(self: Box<Self>) -> Result<()> {
            let mut state = self.state.lock().unwrap();
            state.listings.extend(self.pending);
            Ok(())
        }

        async fn rollback(self: Box<Self>) -> Result<()> {
            Ok(())
        }
    }

    #[async_trait]
    impl ListingRepositoryTransaction for InMemoryTransaction {
        async fn find_by_external_id(
            &mut self,
            source_id: SourceId,
            external_id: &str,
        ) -> Result<Option<ListingId>> {
            let state = self.state.lock().unwrap();
            Ok(state
                .listings
                .iter()
                .chain(self.pending.iter())
                .find(|l| l.source_id == source_id && l.external_id == external_id)
                .map(|l| l.id))
        }

        async fn insert(&mut self, listing: &NewJobListing) -> Result<ListingId> {
            let mut state = self.state.lock().unwrap();
            state.check_unique(listing)?;
            state.last_id += 1;
            let id = state.last_id;
            drop(state);

            self.pending.push(JobListing {
                id,
                source_id: listing.source_id,
                external_id: listing.external_id.clone(),
                title: Some(listing.title.clone()),
                company: Some(listing.company.clone()),
                location: listing.location.clone(),
                description: Some(listing.description.clone()),
                salary: None,
                deadline: None,
                url: listing.url.clone(),
                crawled_at: Some(listing.crawled_at),
                is_expired: false,
                translated_description: None,
            });
            Ok(id)
        }
    }
}
