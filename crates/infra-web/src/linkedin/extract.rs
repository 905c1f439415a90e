// LinkedIn Extractor - search result cards and job detail pages

use crate::html::{canonical_link, first_attr, first_text, optional_field, selector};
use jobscout_core::domain::{Candidate, DetailFields};
use jobscout_core::port::{ExtractError, FetchedPage};
use scraper::Html;
use tracing::{info, warn};
use url::Url;

pub(crate) const ORIGIN: &str = "https://www.linkedin.com";

const ITEM: &str = ".scaffold-layout__list li.scaffold-layout__list-item.ember-view";
const TITLE: &str = "div.artdeco-entity-lockup__title span strong";
const LINK: &str = "div.artdeco-entity-lockup__title a.job-card-list__title--link";
const COMPANY: &str = "div.artdeco-entity-lockup__subtitle span";
const LOCATION: &str = "div.artdeco-entity-lockup__caption span";
const NO_RESULTS_BANNER: &str = ".jobs-search-two-pane__no-results-banner--expand";
const NO_RESULTS_TEXT: &str = "No matching jobs found";
const DESCRIPTION: &str = ".jobs-description-content__text--stretch";
const DESCRIPTION_FALLBACK: &str = ".job-details-about-the-job-module__description";
const CLOSED_MARKER: &str = ".artdeco-inline-feedback__message";

/// "No matching jobs found" banner: the search is exhausted
pub fn has_no_results_banner(html: &str) -> bool {
    let Ok(banner) = selector(NO_RESULTS_BANNER) else {
        return false;
    };
    Html::parse_document(html)
        .select(&banner)
        .any(|element| element.text().collect::<String>().contains(NO_RESULTS_TEXT))
}

pub fn candidates(page: &FetchedPage) -> Result<Vec<Candidate>, ExtractError> {
    let document = Html::parse_document(&page.content);
    let item = selector(ITEM)?;
    let title = selector(TITLE)?;
    let link = selector(LINK)?;
    let company = selector(COMPANY)?;
    let location = selector(LOCATION)?;

    let cards: Vec<Candidate> = document
        .select(&item)
        .map(|card| {
            let href = first_attr(card, &link, "href");
            let link = href.as_deref().and_then(|href| canonical_link(ORIGIN, href));
            if link.is_none() {
                warn!(url = %page.url, "Job link is missing");
            }
            Candidate {
                title: optional_field(first_text(card, &title), "title", &page.url),
                company: optional_field(first_text(card, &company), "company", &page.url),
                location: optional_field(first_text(card, &location), "location", &page.url),
                description: String::new(),
                link,
            }
        })
        .collect();

    if cards.is_empty() {
        if page.is_last_page {
            return Ok(cards);
        }
        return Err(ExtractError::NoItems {
            url: page.url.clone(),
        });
    }

    info!(url = %page.url, jobs = cards.len(), "Cards on page");
    Ok(cards)
}

/// Description from the detail pane; LinkedIn detail pages carry nothing else we keep
pub fn detail(page: &FetchedPage) -> Result<DetailFields, ExtractError> {
    let document = Html::parse_document(&page.content);
    let root = document.root_element();

    let description = [DESCRIPTION, DESCRIPTION_FALLBACK]
        .into_iter()
        .map(selector)
        .collect::<Result<Vec<_>, _>>()?
        .iter()
        .find_map(|sel| {
            root.select(sel)
                .next()
                .map(|element| element.text().collect::<String>().trim().to_string())
                .filter(|text| !text.is_empty())
        });

    if description.is_none() {
        warn!(url = %page.url, "Job description is missing");
    }

    Ok(DetailFields {
        description,
        ..DetailFields::default()
    })
}

/// Closed-for-applications feedback message on a detail page
pub fn is_closed(page: &FetchedPage) -> bool {
    let Ok(marker) = selector(CLOSED_MARKER) else {
        return false;
    };
    Html::parse_document(&page.content)
        .select(&marker)
        .next()
        .is_some()
}

/// `/jobs/view/<id>/` -> `<id>`
pub fn external_id(url: &str) -> Option<String> {
    let url = Url::parse(url).ok()?;
    let segments: Vec<&str> = url.path_segments()?.collect();
    if !segments.contains(&"jobs") {
        return None;
    }
    let view = segments.iter().position(|segment| *segment == "view")?;
    segments
        .get(view + 1)
        .filter(|id| !id.is_empty())
        .map(|id| id.to_string())
}
