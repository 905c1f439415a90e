// ITViec Extractor - job cards, next-page control and detail pages

use crate::html::{canonical_link, first_attr, first_text, optional_field, selector};
use jobscout_core::domain::{Candidate, DetailFields};
use jobscout_core::port::{ExtractError, FetchedPage};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use tracing::{debug, warn};

pub(crate) const ORIGIN: &str = "https://itviec.com";

const CARD: &str = r#"div[class*="job-card"]"#;
const TITLE: &str = "h3.imt-3";
const COMPANY: &str = r#"a.text-rich-grey[target="_blank"]"#;
const INFO_ROW: &str = "div.d-flex.align-items-center.text-dark-grey.imt-1";
const MAP_PIN: &str = r#"use[href*="map-pin"]"#;
const SPAN: &str = "span";
const NEXT_PAGE: &str = r#"div[class*="pagination-search-jobs"] div.page.next"#;
const JOB_CONTENT: &str = r#"section[class*="job-content"]"#;

/// No "next" control in the pagination block: this is the last page
pub fn is_last_page(html: &str) -> bool {
    let Ok(next) = selector(NEXT_PAGE) else {
        return true;
    };
    Html::parse_document(html).select(&next).next().is_none()
}

pub fn candidates(page: &FetchedPage) -> Result<Vec<Candidate>, ExtractError> {
    let document = Html::parse_document(&page.content);
    let card = selector(CARD)?;
    let title = selector(TITLE)?;
    let company = selector(COMPANY)?;
    let info_row = selector(INFO_ROW)?;
    let map_pin = selector(MAP_PIN)?;
    let span = selector(SPAN)?;

    // Wrappers also match `*job-card*`; keep the first card per link
    let mut seen = HashSet::new();
    let mut cards = Vec::new();
    for element in document.select(&card) {
        let Some(link) = first_attr(element, &title, "data-url")
            .and_then(|href| canonical_link(ORIGIN, &href))
        else {
            debug!(url = %page.url, "Job card without a data-url, skipping");
            continue;
        };
        if !seen.insert(link.clone()) {
            continue;
        }

        cards.push(Candidate {
            title: optional_field(first_text(element, &title), "title", &page.url),
            company: optional_field(first_text(element, &company), "company", &page.url),
            location: optional_field(
                location(element, &info_row, &map_pin, &span),
                "location",
                &page.url,
            ),
            description: String::new(),
            link: Some(link),
        });
    }

    if cards.is_empty() {
        return Err(ExtractError::NoItems {
            url: page.url.clone(),
        });
    }
    Ok(cards)
}

/// Span text of the info row carrying the map-pin icon
fn location(
    card: ElementRef<'_>,
    info_row: &Selector,
    map_pin: &Selector,
    span: &Selector,
) -> Option<String> {
    card.select(info_row)
        .filter(|row| row.select(map_pin).next().is_some())
        .find_map(|row| first_text(row, span))
}

pub fn detail(page: &FetchedPage) -> Result<DetailFields, ExtractError> {
    let document = Html::parse_document(&page.content);
    let content = selector(JOB_CONTENT)?;

    let description = document
        .select(&content)
        .next()
        .map(|section| section.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty());
    if description.is_none() {
        warn!(url = %page.url, "Job description is missing");
    }

    Ok(DetailFields {
        description,
        ..DetailFields::default()
    })
}

/// Last non-empty path segment: the job slug ending in the job key
pub fn external_id(url: &str) -> Option<String> {
    crate::html::last_path_segment(url)
}
