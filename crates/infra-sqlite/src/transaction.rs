// SQLite Transaction Implementation

use crate::error::map_sqlx_error;
use async_trait::async_trait;
use jobscout_core::domain::{ListingId, NewJobListing, SourceId};
use jobscout_core::error::Result;
use jobscout_core::port::{ListingRepositoryTransaction, Transaction};
use sqlx::{Sqlite, Transaction as SqlxTransaction};

pub struct SqliteListingTransaction<'a> {
    tx: SqlxTransaction<'a, Sqlite>,
}

impl<'a> SqliteListingTransaction<'a> {
    pub fn new(tx: SqlxTransaction<'a, Sqlite>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl Transaction for SqliteListingTransaction<'_> {
    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx.commit().await.map_err(map_sqlx_error)
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        self.tx.rollback().await.map_err(map_sqlx_error)
    }
}

#[async_trait]
impl ListingRepositoryTransaction for SqliteListingTransaction<'_> {
    async fn find_by_external_id(
        &mut self,
        source_id: SourceId,
        external_id: &str,
    ) -> Result<Option<ListingId>> {
        sqlx::query_scalar("SELECT id FROM job_listings WHERE source_id = ? AND external_id = ?")
            .bind(source_id)
            .bind(external_id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)
    }

    async fn insert(&mut self, listing: &NewJobListing) -> Result<ListingId> {
        // salary / deadline are not extracted by the crawler and stay NULL
        let result = sqlx::query(
            r#"
            INSERT INTO job_listings (
                source_id, external_id, title, company, location, description,
                salary, deadline, url, crawled_at, is_expired
            ) VALUES (?, ?, ?, ?, ?, ?, NULL, NULL, ?, ?, 0)
            "#,
        )
        .bind(listing.source_id)
        .bind(&listing.external_id)
        .bind(&listing.title)
        .bind(&listing.company)
        .bind(&listing.location)
        .bind(&listing.description)
        .bind(&listing.url)
        .bind(listing.crawled_at)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.last_insert_rowid())
    }
}
