// TopCV Extractor - search result items, paginate marker and detail pages

use crate::html::{canonical_link, element_text, first_attr, first_text, selector, strip_invisible};
use jobscout_core::domain::{Candidate, DetailFields};
use jobscout_core::port::{ExtractError, FetchedPage};
use scraper::{ElementRef, Html};
use tracing::warn;

pub(crate) const ORIGIN: &str = "https://www.topcv.vn";

const LIST: &str = "div.job-list-search-result";
const ITEM: &str = "div.job-item-search-result";
const TITLE_LINK: &str = "h3.title a";
const COMPANY: &str = ".company-name";
const PAGINATE_TEXT: &str = "span#job-listing-paginate-text";

const DETAIL_BODY: &str = "div.job-detail__body";
const DETAIL_TITLE: &str = "h1.job-detail__info--title";
const DETAIL_COMPANY: &str = "div.job-detail__company--information h2.company-name-label a";
const INFO_SECTION: &str = "div.job-detail__info--section-content";
const INFO_SECTION_TITLE: &str = "div.job-detail__info--section-content-title";
const INFO_SECTION_VALUE: &str = "div.job-detail__info--section-content-value";
const LOCATION_LABEL: &str = "địa điểm";
const DESCRIPTION_ITEM: &str = "div.job-description div.job-description__item";

/// Total page count from the `"X / Y"` marker; no marker means a single page
pub fn last_page(html: &str) -> u32 {
    let Ok(marker) = selector(PAGINATE_TEXT) else {
        return 1;
    };
    Html::parse_document(html)
        .select(&marker)
        .next()
        .and_then(|element| parse_paginate_text(&element_text(element)))
        .unwrap_or(1)
}

fn parse_paginate_text(text: &str) -> Option<u32> {
    text.split('/')
        .nth(1)?
        .split_whitespace()
        .next()?
        .parse()
        .ok()
}

pub fn candidates(page: &FetchedPage) -> Result<Vec<Candidate>, ExtractError> {
    let document = Html::parse_document(&page.content);
    let list = selector(LIST)?;
    let item = selector(ITEM)?;
    let title_link = selector(TITLE_LINK)?;
    let company = selector(COMPANY)?;

    let no_items = || ExtractError::NoItems {
        url: page.url.clone(),
    };
    let container = document.select(&list).next().ok_or_else(no_items)?;

    let cards: Vec<Candidate> = container
        .select(&item)
        .map(|card| {
            let link = first_attr(card, &title_link, "href")
                .and_then(|href| canonical_link(ORIGIN, &href));
            if link.is_none() {
                warn!(url = %page.url, "Job link is missing");
            }
            Candidate {
                title: first_text(card, &title_link).unwrap_or_default(),
                company: first_text(card, &company).unwrap_or_default(),
                location: String::new(),
                description: String::new(),
                link,
            }
        })
        .collect();

    if cards.is_empty() {
        return Err(no_items());
    }
    Ok(cards)
}

pub fn detail(page: &FetchedPage) -> Result<DetailFields, ExtractError> {
    let document = Html::parse_document(&page.content);
    let body = selector(DETAIL_BODY)?;
    let body = document
        .select(&body)
        .next()
        .ok_or_else(|| ExtractError::MissingContainer {
            selector: DETAIL_BODY.to_string(),
            url: page.url.clone(),
        })?;

    let title = first_text(body, &selector(DETAIL_TITLE)?);
    if title.is_none() {
        warn!(url = %page.url, "Job title is missing");
    }
    let company = first_text(body, &selector(DETAIL_COMPANY)?);
    if company.is_none() {
        warn!(url = %page.url, "Job company is missing");
    }
    let location = location(body)?;
    if location.is_none() {
        warn!(url = %page.url, "Job location is missing");
    }
    let description = description(body)?;
    if description.is_none() {
        warn!(url = %page.url, "Job description is missing");
    }

    Ok(DetailFields {
        title,
        company,
        location,
        description,
    })
}

/// Value of the info section titled "Địa điểm"
fn location(body: ElementRef<'_>) -> Result<Option<String>, ExtractError> {
    let section = selector(INFO_SECTION)?;
    let title = selector(INFO_SECTION_TITLE)?;
    let value = selector(INFO_SECTION_VALUE)?;

    Ok(body.select(&section).find_map(|section| {
        let title = first_text(section, &title)?;
        let value = first_text(section, &value)?;
        title
            .to_lowercase()
            .contains(LOCATION_LABEL)
            .then_some(value)
    }))
}

/// Items joined by a newline, paragraphs inside an item by a blank line
fn description(body: ElementRef<'_>) -> Result<Option<String>, ExtractError> {
    let item = selector(DESCRIPTION_ITEM)?;

    let items: Vec<String> = body
        .select(&item)
        .map(|item| {
            let text = item.text().collect::<String>();
            text.split("\n\n")
                .map(|paragraph| strip_invisible(paragraph.trim()))
                .collect::<Vec<_>>()
                .join("\n\n")
        })
        .collect();

    let description = items.join("\n");
    Ok((!description.trim().is_empty()).then_some(description))
}

/// Last path segment without `.html`
pub fn external_id(url: &str) -> Option<String> {
    crate::html::last_path_segment(url)
        .map(|segment| segment.trim_end_matches(".html").to_string())
        .filter(|id| !id.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEARCH_PAGE: &str = r#"
        <html><body>
        <div class="job-list-search-result">
          <div class="job-item-search-result">
            <h3 class="title"><a href="https://www.topcv.vn/viec-lam/rust-developer/1523456.html?ta_source=JobSearchList"><span>Rust Developer</span></a></h3>
            <a class="company-name">Công ty ABC</a>
          </div>
          <div class="job-item-search-result">
            <h3 class="title"><a href="/viec-lam/backend-engineer/1523457.html">Backend Engineer</a></h3>
          </div>
        </div>
        <span id="job-listing-paginate-text">2 / 7 trang</span>
        </body></html>
    "#;

    const DETAIL_PAGE: &str = "<html><body><div class=\"job-detail__body\">\
        <h1 class=\"job-detail__info--title\"> Senior Rust Developer </h1>\
        <div class=\"job-detail__info--section-content\">\
          <div class=\"job-detail__info--section-content-title\">Mức lương</div>\
          <div class=\"job-detail__info--section-content-value\">Thoả thuận</div>\
        </div>\
        <div class=\"job-detail__info--section-content\">\
          <div class=\"job-detail__info--section-content-title\">Địa điểm</div>\
          <div class=\"job-detail__info--section-content-value\">Hà Nội</div>\
        </div>\
        <div class=\"job-detail__company--information\"><h2 class=\"company-name-label\"><a>Công ty ABC</a></h2></div>\
        <div class=\"job-description\">\
          <div class=\"job-description__item\"><h3>Mô tả công việc</h3>\n\nBuild\u{a0} crawlers\u{200b}\n\n</div>\
          <div class=\"job-description__item\">Yêu cầu: Rust</div>\
        </div>\
        </div></body></html>";

    fn page(content: &str) -> FetchedPage {
        FetchedPage::new("https://www.topcv.vn/tim-viec-lam-rust?page=2&sba=1", 2, content)
    }

    #[test]
    fn test_cards() {
        let cards = candidates(&page(SEARCH_PAGE)).unwrap();

        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].title, "Rust Developer");
        assert_eq!(cards[0].company, "Công ty ABC");
        assert_eq!(
            cards[0].link.as_deref(),
            Some("https://www.topcv.vn/viec-lam/rust-developer/1523456.html")
        );
        assert_eq!(
            cards[1].link.as_deref(),
            Some("https://www.topcv.vn/viec-lam/backend-engineer/1523457.html")
        );
        assert_eq!(cards[1].company, "");
    }

    #[test]
    fn test_missing_list_is_no_items() {
        let result = candidates(&page("<html><body><p>Không tìm thấy</p></body></html>"));
        assert!(matches!(result, Err(ExtractError::NoItems { .. })));
    }

    #[test]
    fn test_last_page_marker() {
        assert_eq!(last_page(SEARCH_PAGE), 7);
        assert_eq!(last_page("<html></html>"), 1);
        assert_eq!(parse_paginate_text("1 / 20 trang"), Some(20));
        assert_eq!(parse_paginate_text("garbled"), None);
    }

    #[test]
    fn test_detail() {
        let detail = detail(&page(DETAIL_PAGE)).unwrap();

        assert_eq!(detail.title.as_deref(), Some("Senior Rust Developer"));
        assert_eq!(detail.company.as_deref(), Some("Công ty ABC"));
        assert_eq!(detail.location.as_deref(), Some("Hà Nội"));
        assert_eq!(
            detail.description.as_deref(),
            Some("Mô tả công việc\n\nBuild crawlers\n\n\nYêu cầu: Rust")
        );
    }

    #[test]
    fn test_detail_without_body() {
        let result = detail(&page("<html><body></body></html>"));
        assert!(matches!(result, Err(ExtractError::MissingContainer { .. })));
    }

    #[test]
    fn test_external_id() {
        assert_eq!(
            external_id("https://www.topcv.vn/viec-lam/rust-developer/1523456.html").as_deref(),
            Some("1523456")
        );
        assert_eq!(external_id("https://www.topcv.vn/"), None);
    }
}
