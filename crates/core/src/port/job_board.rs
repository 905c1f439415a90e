// Job Board Port - per-source fetch/extract strategy
// Implementations: LinkedInBoard (browser), TopCvBoard / ItViecBoard (HTTP) in infra-web

use crate::domain::{Candidate, DetailFields, DimensionKind, SearchDimension};
use async_trait::async_trait;
use thiserror::Error;

/// Raw content of one fetched page plus the pagination terminal signal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub url: String,
    /// 1-based page number (detail pages use 1)
    pub page: u32,
    pub content: String,
    /// Derived "this is the last results page" signal
    pub is_last_page: bool,
}

impl FetchedPage {
    pub fn new(url: impl Into<String>, page: u32, content: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            page,
            content: content.into(),
            is_last_page: false,
        }
    }

    pub fn detail(url: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(url, 1, content)
    }

    pub fn last(mut self, is_last_page: bool) -> Self {
        self.is_last_page = is_last_page;
        self
    }
}

/// Fetch errors (transport, throttling, browser)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Rate limited (HTTP 429): {url}")]
    Throttled { url: String },

    #[error("HTTP {status}: {url}")]
    Status { url: String, status: u16 },

    #[error("Timed out: {url}")]
    Timeout { url: String },

    #[error("Transport error at {url}: {message}")]
    Transport { url: String, message: String },

    #[error("Browser error: {0}")]
    Browser(String),
}

impl FetchError {
    /// Throttling and timeouts are transient; everything else aborts the fetch
    pub fn is_retryable(&self) -> bool {
        matches!(self, FetchError::Throttled { .. } | FetchError::Timeout { .. })
    }

    /// The posting no longer exists
    pub fn is_gone(&self) -> bool {
        matches!(self, FetchError::Status { status: 404 | 410, .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Throttled { .. } => Some(429),
            FetchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Structural parse misses that are not per-field
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// No repeating item container on the page: pagination end
    #[error("No extractable items on {url}")]
    NoItems { url: String },

    #[error("Container '{selector}' not found on {url}")]
    MissingContainer { selector: String, url: String },

    #[error("Invalid selector '{0}'")]
    InvalidSelector(String),
}

/// Per-source strategy: the orchestrator, enricher and expiry checker are written once
/// against this capability set
#[async_trait]
pub trait JobBoard: Send + Sync {
    /// Unique source name, also the `job_sources.name` row
    fn source_name(&self) -> &str;

    /// How the search space is enumerated for this source
    fn dimension_kind(&self) -> DimensionKind;

    /// Retrieve one results page (1-based) for a dimension
    async fn fetch_page(&self, dimension: &SearchDimension, page: u32)
        -> Result<FetchedPage, FetchError>;

    /// Parse a results page into candidates, in page order
    fn extract_candidates(&self, page: &FetchedPage) -> Result<Vec<Candidate>, ExtractError>;

    /// Source-scoped identity parsed from a canonical posting URL
    fn derive_external_id(&self, url: &str) -> Option<String>;

    /// Retrieve a posting's detail page
    async fn fetch_detail(&self, url: &str) -> Result<FetchedPage, FetchError>;

    /// Parse a detail page
    fn extract_detail(&self, page: &FetchedPage) -> Result<DetailFields, ExtractError>;

    /// Closed-for-applications marker on a detail page
    fn is_expired(&self, _page: &FetchedPage) -> bool {
        false
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    enum ScriptedPage {
        Items {
            candidates: Vec<Candidate>,
            is_last: bool,
        },
        Failure(FetchError),
    }

    /// Board answering from a script, recording every fetch
    ///
    /// Pages are keyed by the dimension's display form (`"position"` or
    /// `"position @ location"`) and the page number. Unscripted pages have no items.
    pub struct ScriptedBoard {
        name: String,
        kind: DimensionKind,
        pages: HashMap<(String, u32), ScriptedPage>,
        details: HashMap<String, DetailFields>,
        detail_failures: HashMap<String, FetchError>,
        expired: HashSet<String>,
        page_fetches: Mutex<Vec<(String, u32)>>,
        detail_fetches: Mutex<Vec<String>>,
    }

    impl ScriptedBoard {
        pub fn new(name: impl Into<String>, kind: DimensionKind) -> Self {
            Self {
                name: name.into(),
                kind,
                pages: HashMap::new(),
                details: HashMap::new(),
                detail_failures: HashMap::new(),
                expired: HashSet::new(),
                page_fetches: Mutex::new(Vec::new()),
                detail_fetches: Mutex::new(Vec::new()),
            }
        }

        pub fn with_page(
            mut self,
            dimension: &str,
            page: u32,
            candidates: Vec<Candidate>,
            is_last: bool,
        ) -> Self {
            self.pages.insert(
                (dimension.to_string(), page),
                ScriptedPage::Items {
                    candidates,
                    is_last,
                },
            );
            self
        }

        pub fn with_page_failure(mut self, dimension: &str, page: u32, error: FetchError) -> Self {
            self.pages
                .insert((dimension.to_string(), page), ScriptedPage::Failure(error));
            self
        }

        pub fn with_detail(mut self, url: &str, detail: DetailFields) -> Self {
            self.details.insert(url.to_string(), detail);
            self
        }

        pub fn with_detail_failure(mut self, url: &str, error: FetchError) -> Self {
            self.detail_failures.insert(url.to_string(), error);
            self
        }

        pub fn with_expired(mut self, url: &str) -> Self {
            self.expired.insert(url.to_string());
            self
        }

        pub fn page_fetches(&self) -> Vec<(String, u32)> {
            self.page_fetches.lock().unwrap().clone()
        }

        pub fn page_fetch_count(&self, dimension: &str) -> usize {
            self.page_fetches
                .lock()
                .unwrap()
                .iter()
                .filter(|(d, _)| d == dimension)
                .count()
        }

        pub fn detail_fetches(&self) -> Vec<String> {
            self.detail_fetches.lock().unwrap().clone()
        }

        fn page_key(content: &str) -> Option<(String, u32)> {
            let (dimension, page) = content.rsplit_once('#')?;
            Some((dimension.to_string(), page.parse().ok()?))
        }
    }

    #[async_trait]
    impl JobBoard for ScriptedBoard {
        fn source_name(&self) -> &str {
            &self.name
        }

        fn dimension_kind(&self) -> DimensionKind {
            self.kind
        }

        async fn fetch_page(
            &self,
            dimension: &SearchDimension,
            page: u32,
        ) -> Result<FetchedPage, FetchError> {
            let key = (dimension.to_string(), page);
            self.page_fetches.lock().unwrap().push(key.clone());

            let content = format!("{}#{}", key.0, key.1);
            let url = format!("scripted://{}/{}", self.name, content);
            match self.pages.get(&key) {
                Some(ScriptedPage::Failure(error)) => Err(error.clone()),
                Some(ScriptedPage::Items { is_last, .. }) => {
                    Ok(FetchedPage::new(url, page, content).last(*is_last))
                }
                None => Ok(FetchedPage::new(url, page, content)),
            }
        }

        fn extract_candidates(&self, page: &FetchedPage) -> Result<Vec<Candidate>, ExtractError> {
            let no_items = || ExtractError::NoItems {
                url: page.url.clone(),
            };
            let key = Self::page_key(&page.content).ok_or_else(no_items)?;
            match self.pages.get(&key) {
                Some(ScriptedPage::Items { candidates, .. }) if !candidates.is_empty() => {
                    Ok(candidates.clone())
                }
                _ => Err(no_items()),
            }
        }

        fn derive_external_id(&self, url: &str) -> Option<String> {
            url.trim_end_matches('/')
                .rsplit('/')
                .next()
                .filter(|segment| !segment.is_empty())
                .map(str::to_string)
        }

        async fn fetch_detail(&self, url: &str) -> Result<FetchedPage, FetchError> {
            self.detail_fetches.lock().unwrap().push(url.to_string());
            match self.detail_failures.get(url) {
                Some(error) => Err(error.clone()),
                None => Ok(FetchedPage::detail(url, url)),
            }
        }

        fn extract_detail(&self, page: &FetchedPage) -> Result<DetailFields, ExtractError> {
            self.details
                .get(&page.url)
                .cloned()
                .ok_or_else(|| ExtractError::MissingContainer {
                    selector: "detail".to_string(),
                    url: page.url.clone(),
                })
        }

        fn is_expired(&self, page: &FetchedPage) -> bool {
            self.expired.contains(&page.url)
        }
    }
}
