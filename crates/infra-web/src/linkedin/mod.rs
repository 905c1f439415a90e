// LinkedIn Board - browser-driven search over a logged-in profile

pub mod extract;
pub mod scroll;

use crate::browser::BrowserSession;
use async_trait::async_trait;
use jobscout_core::application::constants::{
    AUTHENTICATION_TIMEOUT, EXPAND_DESCRIPTION_PAUSE, NAVIGATION_SETTLE, SCROLL_END_PAUSE,
    SCROLL_STEP_PAUSE,
};
use jobscout_core::application::RetryPolicy;
use jobscout_core::domain::{
    Candidate, DatePosted, DetailFields, DimensionKind, SearchDimension,
};
use jobscout_core::port::{DelayRange, ExtractError, FetchError, FetchedPage, JobBoard, Pacer};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use url::Url;

pub const SOURCE_NAME: &str = "LinkedIn";

/// Cards per results page (`start` offset step)
const PAGE_SIZE: u32 = 25;
const FEED_URL: &str = "https://www.linkedin.com/feed/";
const SEE_MORE_BUTTON: &str = r#"button[aria-label="Click to see more description"]"#;
const AUTH_POLL: DelayRange = DelayRange::fixed(Duration::from_secs(2));

/// Search URL for one dimension and 1-based page
pub fn search_url(
    dimension: &SearchDimension,
    page: u32,
    date_posted: DatePosted,
) -> Result<String, FetchError> {
    let mut url = Url::parse(extract::ORIGIN)
        .and_then(|origin| origin.join("/jobs/search/"))
        .map_err(|e| FetchError::Transport {
            url: extract::ORIGIN.to_string(),
            message: e.to_string(),
        })?;

    {
        let mut query = url.query_pairs_mut();
        query.append_pair("sortBy", "DD");
        if let Some(seconds) = date_posted.max_age_seconds() {
            query.append_pair("f_TPR", &format!("r{}", seconds));
        }
        query.append_pair("keywords", &dimension.position);
        if let Some(location) = &dimension.location {
            query.append_pair("location", location);
        }
        query.append_pair("start", &(page.saturating_sub(1) * PAGE_SIZE).to_string());
    }
    Ok(url.to_string())
}

pub struct LinkedInBoard {
    session: Arc<BrowserSession>,
    pacer: Arc<dyn Pacer>,
    retry: RetryPolicy,
    date_posted: DatePosted,
}

impl LinkedInBoard {
    pub fn new(
        session: Arc<BrowserSession>,
        pacer: Arc<dyn Pacer>,
        retry: RetryPolicy,
        date_posted: DatePosted,
    ) -> Self {
        Self {
            session,
            pacer,
            retry,
            date_posted,
        }
    }

    /// Wait until the browser profile lands on the feed (manual login allowed meanwhile)
    pub async fn await_authenticated(&self) -> Result<(), FetchError> {
        self.navigate(FEED_URL).await?;

        let started = Instant::now();
        loop {
            let url = self.session.current_url().await?.unwrap_or_default();
            if url.contains("/feed") {
                info!("LinkedIn session authenticated");
                return Ok(());
            }
            if started.elapsed() >= AUTHENTICATION_TIMEOUT {
                return Err(FetchError::Browser(format!(
                    "not authenticated after {}s (current page: {})",
                    AUTHENTICATION_TIMEOUT.as_secs(),
                    url
                )));
            }
            info!(current = %url, "Waiting for LinkedIn login");
            self.pacer.pause(AUTH_POLL).await;
        }
    }

    /// Navigate (timeouts retried), then let the page settle
    async fn navigate(&self, url: &str) -> Result<(), FetchError> {
        let session = self.session.as_ref();
        self.retry
            .run(self.pacer.as_ref(), FetchError::is_retryable, move |_| {
                session.navigate(url)
            })
            .await?;
        self.pacer.pause(NAVIGATION_SETTLE).await;
        Ok(())
    }

    /// Scroll the results list so every lazy card is rendered
    async fn scroll_results(&self) -> Result<(), FetchError> {
        let height: i64 = self.session.evaluate(scroll::MEASURE_SCRIPT).await?;
        if height <= 0 {
            warn!("Results list is not scrollable or not displayed, skipping scroll");
            return Ok(());
        }

        let height = u32::try_from(height).unwrap_or(u32::MAX);
        for position in scroll::scroll_positions(height) {
            if let Err(e) = self.session.run_script(&scroll::scroll_to_script(position)).await {
                warn!(position, error = %e, "Scroll step failed");
            }
            self.pacer.pause(SCROLL_STEP_PAUSE).await;
        }
        self.session
            .run_script(&scroll::scroll_to_script(scroll::scroll_end(height)))
            .await?;
        self.pacer.pause(SCROLL_END_PAUSE).await;
        Ok(())
    }
}

#[async_trait]
impl JobBoard for LinkedInBoard {
    fn source_name(&self) -> &str {
        SOURCE_NAME
    }

    fn dimension_kind(&self) -> DimensionKind {
        DimensionKind::PositionAndLocation
    }

    async fn fetch_page(
        &self,
        dimension: &SearchDimension,
        page: u32,
    ) -> Result<FetchedPage, FetchError> {
        let url = search_url(dimension, page, self.date_posted)?;
        info!(url = %url, page, "Current job page");
        self.navigate(&url).await?;

        let content = self.session.content().await?;
        if extract::has_no_results_banner(&content) {
            return Ok(FetchedPage::new(url, page, content).last(true));
        }

        self.scroll_results().await?;
        let content = self.session.content().await?;
        Ok(FetchedPage::new(url, page, content))
    }

    fn extract_candidates(&self, page: &FetchedPage) -> Result<Vec<Candidate>, ExtractError> {
        extract::candidates(page)
    }

    fn derive_external_id(&self, url: &str) -> Option<String> {
        extract::external_id(url)
    }

    async fn fetch_detail(&self, url: &str) -> Result<FetchedPage, FetchError> {
        self.navigate(url).await?;

        if self.session.click_if_present(SEE_MORE_BUTTON).await? {
            self.pacer.pause(EXPAND_DESCRIPTION_PAUSE).await;
        } else {
            warn!(url = %url, "See more button not found, skipping");
        }

        let content = self.session.content().await?;
        Ok(FetchedPage::detail(url, content))
    }

    fn extract_detail(&self, page: &FetchedPage) -> Result<DetailFields, ExtractError> {
        extract::detail(page)
    }

    fn is_expired(&self, page: &FetchedPage) -> bool {
        extract::is_closed(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_url() {
        let dimension = SearchDimension::new("Rust Developer", Some("Ho Chi Minh".to_string()));

        let first = search_url(&dimension, 1, DatePosted::Week).unwrap();
        let third = search_url(&dimension, 3, DatePosted::AllTime).unwrap();

        assert_eq!(
            first,
            "https://www.linkedin.com/jobs/search/?sortBy=DD&f_TPR=r604800&keywords=Rust+Developer&location=Ho+Chi+Minh&start=0"
        );
        assert!(third.ends_with("&start=50"));
        assert!(!third.contains("f_TPR"));
    }
}
