// ITViec Board - HTTP search by position, paginated until the "next" control disappears

pub mod extract;

use crate::http::HttpFetcher;
use async_trait::async_trait;
use jobscout_core::domain::{Candidate, DetailFields, DimensionKind, SearchDimension};
use jobscout_core::port::{ExtractError, FetchError, FetchedPage, JobBoard};
use url::Url;

pub const SOURCE_NAME: &str = "ITViec";

/// `https://itviec.com/it-jobs/<position-slug>?page=N`
pub fn search_url(position: &str, page: u32) -> Result<String, FetchError> {
    let slug = position.split_whitespace().collect::<Vec<_>>().join("-");
    let invalid = |message: String| FetchError::Transport {
        url: extract::ORIGIN.to_string(),
        message,
    };

    let mut url = Url::parse(extract::ORIGIN).map_err(|e| invalid(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| invalid("origin cannot carry a path".to_string()))?
        .clear()
        .push("it-jobs")
        .push(&slug);
    url.query_pairs_mut().append_pair("page", &page.to_string());
    Ok(url.to_string())
}

pub struct ItViecBoard {
    fetcher: HttpFetcher,
}

impl ItViecBoard {
    pub fn new(fetcher: HttpFetcher) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl JobBoard for ItViecBoard {
    fn source_name(&self) -> &str {
        SOURCE_NAME
    }

    fn dimension_kind(&self) -> DimensionKind {
        DimensionKind::PositionOnly
    }

    async fn fetch_page(
        &self,
        dimension: &SearchDimension,
        page: u32,
    ) -> Result<FetchedPage, FetchError> {
        let url = search_url(&dimension.position, page)?;
        let content = self.fetcher.fetch(&url).await?;
        let is_last = extract::is_last_page(&content);
        Ok(FetchedPage::new(url, page, content).last(is_last))
    }

    fn extract_candidates(&self, page: &FetchedPage) -> Result<Vec<Candidate>, ExtractError> {
        extract::candidates(page)
    }

    fn derive_external_id(&self, url: &str) -> Option<String> {
        extract::external_id(url)
    }

    async fn fetch_detail(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let content = self.fetcher.fetch(url).await?;
        Ok(FetchedPage::detail(url, content))
    }

    fn extract_detail(&self, page: &FetchedPage) -> Result<DetailFields, ExtractError> {
        extract::detail(page)
    }
}
