// Blacklist Cleanup - removes stored listings matching the configured blacklist

use crate::domain::Blacklist;
use crate::error::Result;
use crate::port::ListingRepository;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    pub before: i64,
    pub matched: usize,
    pub deleted: usize,
    pub after: i64,
}

pub struct BlacklistCleanup {
    repo: Arc<dyn ListingRepository>,
    blacklist: Blacklist,
}

impl BlacklistCleanup {
    pub fn new(repo: Arc<dyn ListingRepository>, blacklist: Blacklist) -> Self {
        Self { repo, blacklist }
    }

    /// Delete every match, one statement per record
    pub async fn run(&self) -> Result<CleanupReport> {
        let before = self.repo.count().await?;
        info!(listings = before, "Blacklist cleanup started");

        if self.blacklist.is_empty() {
            info!("Blacklist is empty, nothing to clean");
            return Ok(CleanupReport {
                before,
                after: before,
                ..CleanupReport::default()
            });
        }

        let matches = self.repo.find_by_blacklist_match(&self.blacklist).await?;
        let mut deleted = 0;
        for listing in &matches {
            let title = listing.title.as_deref().unwrap_or_default();
            let company = listing.company.as_deref().unwrap_or_default();
            match self.repo.delete(listing.id).await {
                Ok(()) => {
                    deleted += 1;
                    info!(
                        listing_id = listing.id,
                        title = %title,
                        company = %company,
                        term = self.blacklist.matching_term(title, company).unwrap_or("-"),
                        "Deleted blacklisted listing"
                    );
                }
                Err(e) => {
                    error!(listing_id = listing.id, error = %e, "Failed to delete listing");
                }
            }
        }

        let after = self.repo.count().await?;
        info!(before, deleted, after, "Blacklist cleanup finished");
        Ok(CleanupReport {
            before,
            matched: matches.len(),
            deleted,
            after,
        })
    }
}
