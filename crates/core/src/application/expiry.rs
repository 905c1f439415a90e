// Expiry Checker - flags stored listings whose posting has closed

use crate::error::Result;
use crate::port::{JobBoard, ListingRepository};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExpiryReport {
    pub source: String,
    pub checked: usize,
    pub expired: usize,
    pub failed: usize,
}

pub struct ExpiryChecker {
    repo: Arc<dyn ListingRepository>,
}

impl ExpiryChecker {
    pub fn new(repo: Arc<dyn ListingRepository>) -> Self {
        Self { repo }
    }

    /// Re-visit every unexpired listing of the board's source
    ///
    /// Expired when the detail page carries the board's closed marker or answers
    /// 404/410. Other fetch failures leave the record untouched.
    pub async fn check(&self, board: &dyn JobBoard) -> Result<ExpiryReport> {
        let source = self.repo.get_or_create_source(board.source_name()).await?;
        let listings = self.repo.find_unexpired(source.id).await?;

        let mut report = ExpiryReport {
            source: source.name.clone(),
            ..ExpiryReport::default()
        };
        info!(source = %source.name, listings = listings.len(), "Expiry check started");

        for listing in &listings {
            report.checked += 1;

            let expired = match board.fetch_detail(&listing.url).await {
                Ok(page) => board.is_expired(&page),
                Err(e) if e.is_gone() => true,
                Err(e) => {
                    report.failed += 1;
                    warn!(listing_id = listing.id, url = %listing.url, error = %e, "Expiry check failed");
                    continue;
                }
            };

            if !expired {
                continue;
            }
            match self.repo.set_expired(listing.id, true).await {
                Ok(()) => {
                    report.expired += 1;
                    info!(listing_id = listing.id, url = %listing.url, "Listing expired");
                }
                Err(e) => {
                    report.failed += 1;
                    error!(listing_id = listing.id, error = %e, "Failed to flag listing as expired");
                }
            }
        }

        info!(
            source = %report.source,
            checked = report.checked,
            expired = report.expired,
            failed = report.failed,
            "Expiry check finished"
        );
        Ok(report)
    }
}
