// Shared HTML helpers for the extractors

use jobscout_core::port::ExtractError;
use scraper::{ElementRef, Selector};
use tracing::warn;
use url::Url;

pub(crate) fn selector(css: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|_| ExtractError::InvalidSelector(css.to_string()))
}

/// Visible text with runs of whitespace collapsed to one space
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element.text().flat_map(str::split_whitespace).collect::<Vec<_>>().join(" ")
}

/// Collapsed text of the first match under `scope`, if non-empty
pub(crate) fn first_text(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    scope
        .select(selector)
        .next()
        .map(element_text)
        .filter(|text| !text.is_empty())
}

/// Attribute of the first match under `scope`, if non-empty
pub(crate) fn first_attr(scope: ElementRef<'_>, selector: &Selector, attr: &str) -> Option<String> {
    scope
        .select(selector)
        .next()
        .and_then(|element| element.value().attr(attr))
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Field that may be missing: logged and left blank
pub(crate) fn optional_field(value: Option<String>, field: &str, page_url: &str) -> String {
    value.unwrap_or_else(|| {
        warn!(field, url = %page_url, "Field missing on card");
        String::new()
    })
}

/// Absolute posting URL without query or fragment
pub(crate) fn canonical_link(base: &str, href: &str) -> Option<String> {
    let base = Url::parse(base).ok()?;
    let mut link = base.join(href.trim()).ok()?;
    link.set_query(None);
    link.set_fragment(None);
    Some(link.to_string())
}

/// Remove non-breaking and zero-width spaces
pub(crate) fn strip_invisible(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '\u{a0}' | '\u{200b}'))
        .collect()
}

/// Last non-empty path segment of a URL
pub(crate) fn last_path_segment(url: &str) -> Option<String> {
    let url = Url::parse(url).ok()?;
    url.path_segments()?
        .filter(|segment| !segment.is_empty())
        .last()
        .map(str::to_string)
}
