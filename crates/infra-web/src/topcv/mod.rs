// TopCV Board - HTTP search by position, paginated by the "X / Y" marker

pub mod extract;

use crate::http::HttpFetcher;
use async_trait::async_trait;
use jobscout_core::domain::{Candidate, DetailFields, DimensionKind, SearchDimension};
use jobscout_core::port::{ExtractError, FetchError, FetchedPage, JobBoard};
use tracing::debug;
use url::Url;

pub const SOURCE_NAME: &str = "TopCV";

/// `https://www.topcv.vn/tim-viec-lam-<position-slug>?page=N&sba=1`
pub fn search_url(position: &str, page: u32) -> Result<String, FetchError> {
    let slug = position.split_whitespace().collect::<Vec<_>>().join("-");
    let mut url = Url::parse(extract::ORIGIN).map_err(|e| FetchError::Transport {
        url: extract::ORIGIN.to_string(),
        message: e.to_string(),
    })?;

    url.path_segments_mut()
        .map_err(|_| FetchError::Transport {
            url: extract::ORIGIN.to_string(),
            message: "origin cannot carry a path".to_string(),
        })?
        .clear()
        .push(&format!("tim-viec-lam-{}", slug));
    url.query_pairs_mut()
        .append_pair("page", &page.to_string())
        .append_pair("sba", "1");
    Ok(url.to_string())
}

pub struct TopCvBoard {
    fetcher: HttpFetcher,
}

impl TopCvBoard {
    pub fn new(fetcher: HttpFetcher) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl JobBoard for TopCvBoard {
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

        let last_page = extract::last_page(&content);
        debug!(url = %url, page, last_page, "Paginate marker");
        Ok(FetchedPage::new(url, page, content).last(page >= last_page))
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_url() {
        assert_eq!(
            search_url("  Rust   Developer ", 3).unwrap(),
            "https://www.topcv.vn/tim-viec-lam-Rust-Developer?page=3&sba=1"
        );
        assert_eq!(
            search_url("Lập trình viên", 1).unwrap(),
            "https://www.topcv.vn/tim-viec-lam-L%E1%BA%ADp-tr%C3%ACnh-vi%C3%AAn?page=1&sba=1"
        );
    }
}
