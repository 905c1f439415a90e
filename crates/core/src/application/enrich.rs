// Detail Enricher - backfills descriptions of stored listings from their detail pages

use crate::domain::{JobListing, ListingFields};
use crate::error::Result;
use crate::port::{JobBoard, ListingRepository};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnrichReport {
    pub source: String,
    /// Records whose description was NULL or empty
    pub selected: usize,
    pub updated: usize,
    /// Detail page parsed but carried no description
    pub empty: usize,
    pub failed: usize,
}

pub struct DetailEnricher {
    repo: Arc<dyn ListingRepository>,
}

impl DetailEnricher {
    pub fn new(repo: Arc<dyn ListingRepository>) -> Self {
        Self { repo }
    }

    /// Enrich every listing of the board's source that still lacks a description
    pub async fn enrich(&self, board: &dyn JobBoard) -> Result<EnrichReport> {
        let source = self.repo.get_or_create_source(board.source_name()).await?;
        let listings = self.repo.find_missing_description(source.id).await?;

        let mut report = EnrichReport {
            source: source.name.clone(),
            selected: listings.len(),
            ..EnrichReport::default()
        };
        info!(source = %source.name, selected = report.selected, "Enrichment started");

        for listing in &listings {
            match self.enrich_one(board, listing).await {
                Ok(true) => report.updated += 1,
                Ok(false) => {
                    report.empty += 1;
                    warn!(listing_id = listing.id, url = %listing.url, "Detail page has no description");
                }
                Err(e) => {
                    report.failed += 1;
                    error!(listing_id = listing.id, url = %listing.url, error = %e, "Enrichment failed");
                }
            }
        }

        info!(
            source = %report.source,
            updated = report.updated,
            empty = report.empty,
            failed = report.failed,
            "Enrichment finished"
        );
        Ok(report)
    }

    /// Returns whether a description was written
    async fn enrich_one(&self, board: &dyn JobBoard, listing: &JobListing) -> Result<bool> {
        let page = board.fetch_detail(&listing.url).await?;
        let detail = board.extract_detail(&page)?;
        let has_description = detail.has_description();

        let mut fields = ListingFields::from_listing(listing);
        fields.merge_detail(detail);
        self.repo.update_fields(listing.id, &fields).await?;

        Ok(has_description)
    }
}
