// SQLite ListingRepository Implementation

use crate::error::map_sqlx_error;
use crate::SqliteListingTransaction;
use async_trait::async_trait;
use chrono::NaiveDate;
use jobscout_core::domain::{JobListing, JobSource, ListingFields, ListingId, SourceId};
use jobscout_core::error::{AppError, Result};
use jobscout_core::port::{
    ListingRepository, ListingRepositoryTransaction, TransactionalListingRepository,
};
use sqlx::SqlitePool;

const LISTING_COLUMNS: &str = "id, source_id, external_id, title, company, location, \
    description, salary, deadline, url, crawled_at, is_expired, translated_description";

pub struct SqliteListingRepository {
    pool: SqlitePool,
}

impl SqliteListingRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn fetch_listings(&self, filter: &str, source_id: Option<SourceId>) -> Result<Vec<JobListing>> {
        let sql = format!(
            "SELECT {} FROM job_listings {} ORDER BY id",
            LISTING_COLUMNS, filter
        );
        let mut query = sqlx::query_as::<_, ListingRow>(&sql);
        if let Some(source_id) = source_id {
            query = query.bind(source_id);
        }
        let rows = query.fetch_all(&self.pool).await.map_err(map_sqlx_error)?;
        Ok(rows.into_iter().map(ListingRow::into_listing).collect())
    }

    fn ensure_affected(rows_affected: u64, id: ListingId) -> Result<()> {
        if rows_affected == 0 {
            return Err(AppError::NotFound(format!("Listing {} not found", id)));
        }
        Ok(())
    }
}

#[async_trait]
impl ListingRepository for SqliteListingRepository {
    async fn get_or_create_source(&self, name: &str) -> Result<JobSource> {
        sqlx::query("INSERT INTO job_sources (name) VALUES (?) ON CONFLICT(name) DO NOTHING")
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        let (id, name): (i64, String) =
            sqlx::query_as("SELECT id, name FROM job_sources WHERE name = ?")
                .bind(name)
                .fetch_one(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        Ok(JobSource { id, name })
    }

    async fn find_by_id(&self, id: ListingId) -> Result<Option<JobListing>> {
        let sql = format!("SELECT {} FROM job_listings WHERE id = ?", LISTING_COLUMNS);
        let row = sqlx::query_as::<_, ListingRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(ListingRow::into_listing))
    }

    async fn find_missing_description(&self, source_id: SourceId) -> Result<Vec<JobListing>> {
        self.fetch_listings(
            "WHERE source_id = ? AND (description IS NULL OR TRIM(description) = '')",
            Some(source_id),
        )
        .await
    }

    async fn find_unexpired(&self, source_id: SourceId) -> Result<Vec<JobListing>> {
        self.fetch_listings("WHERE source_id = ? AND is_expired = 0", Some(source_id))
            .await
    }

    async fn find_all(&self) -> Result<Vec<JobListing>> {
        self.fetch_listings("", None).await
    }

    async fn update_fields(&self, id: ListingId, fields: &ListingFields) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE job_listings
            SET title = ?, company = ?, location = ?, description = ?
            WHERE id = ?
            "#,
        )
        .bind(&fields.title)
        .bind(&fields.company)
        .bind(&fields.location)
        .bind(&fields.description)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Self::ensure_affected(result.rows_affected(), id)
    }

    async fn set_expired(&self, id: ListingId, is_expired: bool) -> Result<()> {
        let result = sqlx::query("UPDATE job_listings SET is_expired = ? WHERE id = ?")
            .bind(is_expired)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Self::ensure_affected(result.rows_affected(), id)
    }

    async fn delete(&self, id: ListingId) -> Result<()> {
        sqlx::query("DELETE FROM job_listings WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn count(&self) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM job_listings")
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }

    async fn count_by_source(&self, source_id: SourceId) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM job_listings WHERE source_id = ?")
            .bind(source_id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }
}

#[async_trait]
impl TransactionalListingRepository for SqliteListingRepository {
    async fn begin_transaction(&self) -> Result<Box<dyn ListingRepositoryTransaction>> {
        let tx = self.pool.begin().await.map_err(map_sqlx_error)?;
        Ok(Box::new(SqliteListingTransaction::new(tx)))
    }
}

/// SQLite row representation
#[derive(Debug, sqlx::FromRow)]
struct ListingRow {
    id: i64,
    source_id: i64,
    external_id: String,
    title: Option<String>,
    company: Option<String>,
    location: Option<String>,
    description: Option<String>,
    salary: Option<String>,
    deadline: Option<String>,
    url: String,
    crawled_at: Option<NaiveDate>,
    is_expired: bool,
    translated_description: Option<String>,
}

impl ListingRow {
    fn into_listing(self) -> JobListing {
        JobListing {
            id: self.id,
            source_id: self.source_id,
            external_id: self.external_id,
            title: self.title,
            company: self.company,
            location: self.location,
            description: self.description,
            salary: self.salary,
            deadline: self.deadline,
            url: self.url,
            crawled_at: self.crawled_at,
            is_expired: self.is_expired,
            translated_description: self.translated_description,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create_pool, run_migrations};
    use jobscout_core::domain::{Blacklist, NewJobListing};
    use jobscout_core::port::Transaction;

    async fn setup_test_repo() -> SqliteListingRepository {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        SqliteListingRepository::new(pool)
    }

    fn new_listing(source_id: SourceId, external_id: &str, title: &str) -> NewJobListing {
        NewJobListing {
            source_id,
            external_id: external_id.to_string(),
            title: title.to_string(),
            company: "Acme".to_string(),
            location: Some("Hà Nội".to_string()),
            description: String::new(),
            url: format!("https://site/job/{}", external_id),
            crawled_at: NaiveDate::from_ymd_opt(2024, 11, 2).unwrap(),
        }
    }

    async fn insert(repo: &SqliteListingRepository, listing: &NewJobListing) -> Result<ListingId> {
        let mut tx = repo.begin_transaction().await?;
        match tx.insert(listing).await {
            Ok(id) => {
                tx.commit().await?;
                Ok(id)
            }
            Err(e) => {
                tx.rollback().await?;
                Err(e)
            }
        }
    }

    #[tokio::test]
    async fn test_get_or_create_source_is_stable() {
        let repo = setup_test_repo().await;

        let first = repo.get_or_create_source("TopCV").await.unwrap();
        let again = repo.get_or_create_source("TopCV").await.unwrap();
        let other = repo.get_or_create_source("ITViec").await.unwrap();

        assert_eq!(first, again);
        assert_ne!(first.id, other.id);
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let repo = setup_test_repo().await;
        let source = repo.get_or_create_source("TopCV").await.unwrap();

        let id = insert(&repo, &new_listing(source.id, "42", "Rust Developer"))
            .await
            .unwrap();

        let found = repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(found.external_id, "42");
        assert_eq!(found.title.as_deref(), Some("Rust Developer"));
        assert_eq!(found.salary, None);
        assert_eq!(found.deadline, None);
        assert_eq!(found.crawled_at, NaiveDate::from_ymd_opt(2024, 11, 2));
        assert!(!found.is_expired);

        let mut tx = repo.begin_transaction().await.unwrap();
        assert_eq!(tx.find_by_external_id(source.id, "42").await.unwrap(), Some(id));
        assert_eq!(tx.find_by_external_id(source.id, "43").await.unwrap(), None);
        tx.rollback().await.unwrap();
    }

    #[tokio::test]
    async fn test_duplicate_url_is_a_conflict() {
        let repo = setup_test_repo().await;
        let topcv = repo.get_or_create_source("TopCV").await.unwrap();
        let itviec = repo.get_or_create_source("ITViec").await.unwrap();

        insert(&repo, &new_listing(topcv.id, "42", "Rust Developer"))
            .await
            .unwrap();
        let err = insert(&repo, &new_listing(itviec.id, "42", "Rust Developer"))
            .await
            .unwrap_err();

        assert!(err.is_conflict());
        assert_eq!(repo.count().await.unwrap(), 1);
        assert_eq!(repo.count_by_source(itviec.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_missing_description_and_update() {
        let repo = setup_test_repo().await;
        let source = repo.get_or_create_source("TopCV").await.unwrap();
        let id = insert(&repo, &new_listing(source.id, "1", "Placeholder"))
            .await
            .unwrap();

        let missing = repo.find_missing_description(source.id).await.unwrap();
        assert_eq!(missing.len(), 1);

        let fields = ListingFields {
            title: Some("Rust Engineer".to_string()),
            company: Some("Acme".to_string()),
            location: Some("Hồ Chí Minh".to_string()),
            description: Some("Build crawlers".to_string()),
        };
        repo.update_fields(id, &fields).await.unwrap();

        assert!(repo.find_missing_description(source.id).await.unwrap().is_empty());
        let updated = repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(updated.description.as_deref(), Some("Build crawlers"));
        assert_eq!(updated.location.as_deref(), Some("Hồ Chí Minh"));

        let err = repo.update_fields(999, &fields).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_expiry_and_blacklist_cleanup_queries() {
        let repo = setup_test_repo().await;
        let source = repo.get_or_create_source("LinkedIn").await.unwrap();
        let ai = insert(&repo, &new_listing(source.id, "1", "AI Engineer"))
            .await
            .unwrap();
        let keep = insert(&repo, &new_listing(source.id, "2", "Maintainer"))
            .await
            .unwrap();

        repo.set_expired(keep, true).await.unwrap();
        let unexpired = repo.find_unexpired(source.id).await.unwrap();
        assert_eq!(unexpired.iter().map(|l| l.id).collect::<Vec<_>>(), vec![ai]);

        let blacklist = Blacklist::compile(&["AI".to_string()], &[]).unwrap();
        let matches = repo.find_by_blacklist_match(&blacklist).await.unwrap();
        assert_eq!(matches.len(), 1);

        repo.delete(matches[0].id).await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 1);
        assert!(repo.find_by_id(ai).await.unwrap().is_none());
    }
}
