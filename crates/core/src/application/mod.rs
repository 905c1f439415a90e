// Application Layer - Use Cases and Business Logic

pub mod cleanup;
pub mod constants;
pub mod crawl;
pub mod enrich;
pub mod expiry;
pub mod ingest;
pub mod retry;

// Re-exports
pub use cleanup::{BlacklistCleanup, CleanupReport};
pub use crawl::{CrawlOrchestrator, CrawlReport, DimensionState, DoneReason};
pub use enrich::{DetailEnricher, EnrichReport};
pub use expiry::{ExpiryChecker, ExpiryReport};
pub use ingest::{upsert_if_absent, SkipReason, UpsertOutcome};
pub use retry::{RetryDecision, RetryPolicy};
