// Crawl Orchestrator - drives every board through its search dimensions

mod report;
mod state;

pub use report::CrawlReport;
pub use state::{DimensionState, DoneReason};

use super::constants::DEFAULT_MAX_PAGES;
use super::ingest::upsert_if_absent;
use crate::domain::{Blacklist, Candidate, SearchDimension, SearchSettings, SourceId};
use crate::error::{AppError, Result};
use crate::port::{ExtractError, JobBoard, TimeProvider, TransactionalListingRepository};
use std::sync::Arc;
use tracing::{error, info, warn};

/// A dimension aborted by an error on `page`
struct DimensionFailure {
    page: u32,
    error: AppError,
}

/// Sequential crawl: one dimension at a time, one page at a time, one commit per record
///
/// A failing dimension is logged and skipped; only failures to resolve the source row
/// abort the run.
pub struct CrawlOrchestrator {
    repo: Arc<dyn TransactionalListingRepository>,
    time_provider: Arc<dyn TimeProvider>,
    settings: SearchSettings,
    blacklist: Blacklist,
    max_pages: u32,
}

impl CrawlOrchestrator {
    pub fn new(
        repo: Arc<dyn TransactionalListingRepository>,
        time_provider: Arc<dyn TimeProvider>,
        settings: SearchSettings,
        blacklist: Blacklist,
    ) -> Self {
        Self {
            repo,
            time_provider,
            settings,
            blacklist,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }

    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    /// Crawl every dimension of one board
    pub async fn crawl(&self, board: &dyn JobBoard) -> Result<CrawlReport> {
        let source = self.repo.get_or_create_source(board.source_name()).await?;
        let dimensions = self.settings.dimensions(board.dimension_kind());
        let mut report = CrawlReport::new(&source.name);

        info!(
            source = %source.name,
            dimensions = dimensions.len(),
            date_posted = %self.settings.date_posted,
            max_pages = self.max_pages,
            "Crawl started"
        );

        for dimension in &dimensions {
            report.dimensions_attempted += 1;
            match self
                .crawl_dimension(board, source.id, dimension, &mut report)
                .await
            {
                Ok(reason) => {
                    info!(
                        source = %source.name,
                        position = %dimension.position,
                        location = dimension.location.as_deref().unwrap_or("-"),
                        reason = ?reason,
                        "Dimension finished"
                    );
                }
                Err(failure) => {
                    report.dimensions_failed += 1;
                    error!(
                        source = %source.name,
                        position = %dimension.position,
                        location = dimension.location.as_deref().unwrap_or("-"),
                        page = failure.page,
                        error = %failure.error,
                        "Dimension failed, continuing with next"
                    );
                }
            }
        }

        info!(
            source = %report.source,
            pages = report.pages_fetched,
            seen = report.candidates_seen,
            inserted = report.inserted,
            skipped = report.skipped,
            blacklisted = report.blacklisted,
            conflicts = report.conflicts,
            failed = report.failed,
            dimensions_failed = report.dimensions_failed,
            "Crawl finished"
        );
        Ok(report)
    }

    async fn crawl_dimension(
        &self,
        board: &dyn JobBoard,
        source_id: SourceId,
        dimension: &SearchDimension,
        report: &mut CrawlReport,
    ) -> std::result::Result<DoneReason, DimensionFailure> {
        let mut state = DimensionState::start();
        loop {
            match state {
                DimensionState::Done(reason) => return Ok(reason),
                DimensionState::Paging { page } => {
                    state = self
                        .crawl_page(board, source_id, dimension, page, report)
                        .await
                        .map_err(|error| DimensionFailure { page, error })?;
                }
            }
        }
    }

    async fn crawl_page(
        &self,
        board: &dyn JobBoard,
        source_id: SourceId,
        dimension: &SearchDimension,
        page: u32,
        report: &mut CrawlReport,
    ) -> Result<DimensionState> {
        let fetched = board.fetch_page(dimension, page).await?;
        report.pages_fetched += 1;

        let candidates = match board.extract_candidates(&fetched) {
            Ok(candidates) => candidates,
            Err(ExtractError::NoItems { url }) => {
                info!(url = %url, page, "No items on page, pagination end");
                return Ok(DimensionState::Done(DoneReason::NoItems));
            }
            Err(e) => return Err(e.into()),
        };

        info!(
            position = %dimension.position,
            location = dimension.location.as_deref().unwrap_or("-"),
            page,
            candidates = candidates.len(),
            "Page extracted"
        );

        self.persist(board, source_id, &candidates, report).await;

        Ok(DimensionState::after_page(
            page,
            fetched.is_last_page,
            self.max_pages,
        ))
    }

    /// Filter and store one page of candidates; per-record failures never abort the page
    async fn persist(
        &self,
        board: &dyn JobBoard,
        source_id: SourceId,
        candidates: &[Candidate],
        report: &mut CrawlReport,
    ) {
        let today = self.time_provider.today();

        for candidate in candidates {
            report.candidates_seen += 1;

            if let Some(term) = self
                .blacklist
                .matching_term(&candidate.title, &candidate.company)
            {
                info!(
                    title = %candidate.title,
                    company = %candidate.company,
                    term = %term,
                    "Blacklisted candidate skipped"
                );
                report.blacklisted += 1;
                continue;
            }

            match upsert_if_absent(self.repo.as_ref(), board, source_id, candidate, today).await {
                Ok(outcome) => report.record(outcome),
                Err(e) => {
                    report.failed += 1;
                    warn!(
                        url = candidate.link.as_deref().unwrap_or("-"),
                        error = %e,
                        "Failed to store candidate"
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DatePosted, DimensionKind, JobListing};
    use crate::port::job_board::mocks::ScriptedBoard;
    use crate::port::listing_repository::mocks::InMemoryListingRepository;
    use crate::port::time_provider::mocks::FixedTimeProvider;
    use crate::port::FetchError;
    use chrono::NaiveDate;

    fn card(id: u32, title: &str, company: &str) -> Candidate {
        Candidate {
            title: title.to_string(),
            company: company.to_string(),
            location: "Hanoi".to_string(),
            description: String::new(),
            link: Some(format!("https://site/job/{}", id)),
        }
    }

    fn orchestrator(
        repo: &InMemoryListingRepository,
        positions: &[&str],
        locations: &[&str],
        blacklist: Blacklist,
    ) -> CrawlOrchestrator {
        let settings = SearchSettings::new(
            positions.iter().map(|s| s.to_string()).collect(),
            locations.iter().map(|s| s.to_string()).collect(),
            DatePosted::Week,
        )
        .unwrap();
        CrawlOrchestrator::new(
            Arc::new(repo.clone()),
            Arc::new(FixedTimeProvider::new(
                NaiveDate::from_ymd_opt(2024, 11, 2).unwrap(),
            )),
            settings,
            blacklist,
        )
    }

    #[tokio::test]
    async fn test_stops_on_last_page() {
        let repo = InMemoryListingRepository::new();
        let board = ScriptedBoard::new("TopCV", DimensionKind::PositionOnly)
            .with_page("Rust", 1, vec![card(1, "A", "X")], false)
            .with_page("Rust", 2, vec![card(2, "B", "X")], false)
            .with_page("Rust", 3, vec![card(3, "C", "X")], true)
            .with_page("Rust", 4, vec![card(4, "D", "X")], false);

        let report = orchestrator(&repo, &["Rust"], &[], Blacklist::default())
            .crawl(&board)
            .await
            .unwrap();

        assert_eq!(board.page_fetch_count("Rust"), 3);
        assert_eq!(report.pages_fetched, 3);
        assert_eq!(report.inserted, 3);
        assert_eq!(repo.listings().len(), 3);
    }

    #[tokio::test]
    async fn test_stops_when_page_has_no_items() {
        let repo = InMemoryListingRepository::new();
        let board = ScriptedBoard::new("ITViec", DimensionKind::PositionOnly)
            .with_page("Rust", 1, vec![card(1, "A", "X")], false);

        let report = orchestrator(&repo, &["Rust"], &[], Blacklist::default())
            .crawl(&board)
            .await
            .unwrap();

        assert_eq!(board.page_fetch_count("Rust"), 2);
        assert_eq!(report.inserted, 1);
        assert_eq!(report.dimensions_failed, 0);
    }

    #[tokio::test]
    async fn test_page_ceiling() {
        let repo = InMemoryListingRepository::new();
        let mut board = ScriptedBoard::new("TopCV", DimensionKind::PositionOnly);
        for page in 1..=5 {
            board = board.with_page("Rust", page, vec![card(page, "A", "X")], false);
        }

        orchestrator(&repo, &["Rust"], &[], Blacklist::default())
            .with_max_pages(2)
            .crawl(&board)
            .await
            .unwrap();

        assert_eq!(board.page_fetch_count("Rust"), 2);
    }

    #[tokio::test]
    async fn test_failing_dimension_does_not_stop_others() {
        let repo = InMemoryListingRepository::new();
        let board = ScriptedBoard::new("LinkedIn", DimensionKind::PositionAndLocation)
            .with_page_failure(
                "Rust @ Hanoi",
                1,
                FetchError::Timeout {
                    url: "https://site/search".to_string(),
                },
            )
            .with_page("Go @ Saigon", 1, vec![card(9, "Go Dev", "X")], true);

        let report = orchestrator(&repo, &["Rust", "Go"], &["Hanoi", "Saigon"], Blacklist::default())
            .crawl(&board)
            .await
            .unwrap();

        assert_eq!(report.dimensions_attempted, 4);
        assert_eq!(report.dimensions_failed, 1);
        assert_eq!(board.page_fetch_count("Go @ Saigon"), 1);
        assert_eq!(repo.listings().len(), 1);
    }

    #[tokio::test]
    async fn test_blacklisted_candidates_are_not_stored() {
        let repo = InMemoryListingRepository::new();
        let board = ScriptedBoard::new("TopCV", DimensionKind::PositionOnly).with_page(
            "Rust",
            1,
            vec![
                card(1, "AI Engineer", "Acme"),
                card(2, "Maintainer", "Acme"),
                card(3, "Rust Dev", "Evil Corp"),
            ],
            true,
        );
        let blacklist =
            Blacklist::compile(&["AI".to_string()], &["Evil Corp".to_string()]).unwrap();

        let report = orchestrator(&repo, &["Rust"], &[], blacklist)
            .crawl(&board)
            .await
            .unwrap();

        assert_eq!(report.blacklisted, 2);
        assert_eq!(report.inserted, 1);
        assert_eq!(repo.listings()[0].title.as_deref(), Some("Maintainer"));
    }

    #[tokio::test]
    async fn test_recrawl_is_idempotent() {
        let repo = InMemoryListingRepository::new();
        let board = ScriptedBoard::new("TopCV", DimensionKind::PositionOnly).with_page(
            "Rust",
            1,
            vec![card(1, "A", "X"), card(2, "B", "X")],
            true,
        );
        let orchestrator = orchestrator(&repo, &["Rust"], &[], Blacklist::default());

        orchestrator.crawl(&board).await.unwrap();
        let second = orchestrator.crawl(&board).await.unwrap();

        assert_eq!(second.inserted, 0);
        assert_eq!(second.skipped, 2);
        assert_eq!(repo.listings().len(), 2);
    }

    #[tokio::test]
    async fn test_conflicting_record_does_not_stop_the_page() {
        let repo = InMemoryListingRepository::new();
        // Another source already stored the second card's URL
        repo.seed(JobListing {
            id: 1,
            source_id: 99,
            external_id: "elsewhere".to_string(),
            title: Some("B".to_string()),
            company: Some("X".to_string()),
            location: None,
            description: None,
            salary: None,
            deadline: None,
            url: "https://site/job/2".to_string(),
            crawled_at: None,
            is_expired: false,
            translated_description: None,
        });
        let board = ScriptedBoard::new("TopCV", DimensionKind::PositionOnly).with_page(
            "Rust",
            1,
            vec![card(1, "A", "X"), card(2, "B", "X"), card(3, "C", "X")],
            true,
        );

        let report = orchestrator(&repo, &["Rust"], &[], Blacklist::default())
            .crawl(&board)
            .await
            .unwrap();

        assert_eq!(report.conflicts, 1);
        assert_eq!(report.inserted, 2);
        assert_eq!(report.dimensions_failed, 0);
        let urls: Vec<String> = repo
            .listings()
            .into_iter()
            .filter(|l| l.source_id != 99)
            .map(|l| l.url)
            .collect();
        assert_eq!(urls, vec!["https://site/job/1", "https://site/job/3"]);
    }
}
