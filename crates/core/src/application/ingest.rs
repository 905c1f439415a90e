// Ingest Use Case: idempotent upsert of one extracted candidate

use crate::domain::{Candidate, ListingId, NewJobListing, SourceId};
use crate::error::{AppError, Result};
use crate::port::{JobBoard, Transaction, TransactionalListingRepository};
use chrono::NaiveDate;
use tracing::{debug, warn};

/// Why a candidate was not stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    AlreadyStored,
    MissingLink,
    NoExternalId,
}

/// Result of one upsert attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted(ListingId),
    Skipped(SkipReason),
    /// A unique constraint fired (e.g. the same URL stored by another source)
    Conflict,
}

/// Insert the candidate unless `(source_id, external_id)` is already stored
///
/// The lookup and the insert share one transaction. A unique violation is rolled back and
/// reported as `Conflict`; any other error is rolled back and returned.
pub async fn upsert_if_absent(
    repo: &dyn TransactionalListingRepository,
    board: &dyn JobBoard,
    source_id: SourceId,
    candidate: &Candidate,
    crawled_at: NaiveDate,
) -> Result<UpsertOutcome> {
    let Some(url) = candidate.link.as_deref().filter(|l| !l.trim().is_empty()) else {
        warn!(title = %candidate.title, "Candidate has no link, skipping");
        return Ok(UpsertOutcome::Skipped(SkipReason::MissingLink));
    };

    let Some(external_id) = board.derive_external_id(url) else {
        warn!(url = %url, "Could not derive external id, skipping");
        return Ok(UpsertOutcome::Skipped(SkipReason::NoExternalId));
    };

    let mut tx = repo.begin_transaction().await?;

    let existing = match tx.find_by_external_id(source_id, &external_id).await {
        Ok(existing) => existing,
        Err(e) => {
            tx.rollback().await?;
            return Err(e);
        }
    };

    if let Some(id) = existing {
        tx.rollback().await?;
        debug!(listing_id = id, external_id = %external_id, "Listing already stored");
        return Ok(UpsertOutcome::Skipped(SkipReason::AlreadyStored));
    }

    let listing = NewJobListing::from_candidate(source_id, &external_id, url, candidate, crawled_at);
    match tx.insert(&listing).await {
        Ok(id) => {
            tx.commit().await?;
            debug!(listing_id = id, url = %url, "Listing inserted");
            Ok(UpsertOutcome::Inserted(id))
        }
        Err(AppError::Conflict(reason)) => {
            tx.rollback().await?;
            warn!(url = %url, reason = %reason, "Listing conflicts with a stored record, rolled back");
            Ok(UpsertOutcome::Conflict)
        }
        Err(e) => {
            tx.rollback().await?;
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DimensionKind;
    use crate::port::job_board::mocks::ScriptedBoard;
    use crate::port::listing_repository::mocks::InMemoryListingRepository;
    use crate::port::ListingRepository;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 11, 2).unwrap()
    }

    fn candidate(link: Option<&str>) -> Candidate {
        Candidate {
            title: "Rust Developer".to_string(),
            company: "Acme".to_string(),
            location: "Ho Chi Minh City".to_string(),
            description: String::new(),
            link: link.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_inserts_then_skips() {
        let repo = InMemoryListingRepository::new();
        let board = ScriptedBoard::new("TopCV", DimensionKind::PositionOnly);
        let source = repo.get_or_create_source("TopCV").await.unwrap();
        let c = candidate(Some("https://site/job/42"));

        let first = upsert_if_absent(&repo, &board, source.id, &c, today()).await.unwrap();
        let second = upsert_if_absent(&repo, &board, source.id, &c, today()).await.unwrap();

        assert!(matches!(first, UpsertOutcome::Inserted(_)));
        assert_eq!(second, UpsertOutcome::Skipped(SkipReason::AlreadyStored));

        let stored = repo.listings();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].external_id, "42");
        assert_eq!(stored[0].location.as_deref(), Some("Hồ Chí Minh"));
        assert_eq!(stored[0].crawled_at, Some(today()));
        assert!(!stored[0].is_expired);
    }

    #[tokio::test]
    async fn test_missing_link_is_skipped() {
        let repo = InMemoryListingRepository::new();
        let board = ScriptedBoard::new("TopCV", DimensionKind::PositionOnly);

        let outcome = upsert_if_absent(&repo, &board, 1, &candidate(None), today())
            .await
            .unwrap();

        assert_eq!(outcome, UpsertOutcome::Skipped(SkipReason::MissingLink));
        assert!(repo.listings().is_empty());
    }

    #[tokio::test]
    async fn test_same_url_from_another_source_conflicts() {
        let repo = InMemoryListingRepository::new();
        let board = ScriptedBoard::new("any", DimensionKind::PositionOnly);
        let c = candidate(Some("https://site/job/7"));

        let first = upsert_if_absent(&repo, &board, 1, &c, today()).await.unwrap();
        let second = upsert_if_absent(&repo, &board, 2, &c, today()).await.unwrap();

        assert!(matches!(first, UpsertOutcome::Inserted(_)));
        assert_eq!(second, UpsertOutcome::Conflict);
        assert_eq!(repo.count().await.unwrap(), 1);
    }
}
