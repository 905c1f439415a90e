// Listing Domain Model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Row id of a job source
pub type SourceId = i64;

/// Row id of a job listing
pub type ListingId = i64;

/// A crawl origin (LinkedIn, TopCV, ITViec, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSource {
    pub id: SourceId,
    pub name: String,
}

/// A persisted, normalized job posting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobListing {
    pub id: ListingId,
    pub source_id: SourceId,
    pub external_id: String,
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub salary: Option<String>,
    pub deadline: Option<String>,
    pub url: String,
    pub crawled_at: Option<NaiveDate>,
    pub is_expired: bool,
    pub translated_description: Option<String>,
}

impl JobListing {
    /// True when the Detail Enricher still has to backfill this record
    pub fn needs_description(&self) -> bool {
        self.description
            .as_deref()
            .map_or(true, |d| d.trim().is_empty())
    }
}

/// Insert payload for a listing that was never seen before
#[derive(Debug, Clone, PartialEq)]
pub struct NewJobListing {
    pub source_id: SourceId,
    pub external_id: String,
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub description: String,
    pub url: String,
    pub crawled_at: NaiveDate,
}

impl NewJobListing {
    /// Build the insert payload from an extracted candidate
    ///
    /// Location is canonicalized here so every write path stores the same spelling.
    pub fn from_candidate(
        source_id: SourceId,
        external_id: impl Into<String>,
        url: impl Into<String>,
        candidate: &Candidate,
        crawled_at: NaiveDate,
    ) -> Self {
        Self {
            source_id,
            external_id: external_id.into(),
            title: candidate.title.clone(),
            company: candidate.company.clone(),
            location: super::standardize_location(Some(candidate.location.as_str())),
            description: candidate.description.clone(),
            url: url.into(),
            crawled_at,
        }
    }
}

/// Mutable field set written back by the Detail Enricher
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingFields {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
}

impl ListingFields {
    /// Start from what is stored, so unset detail fields keep their current value
    pub fn from_listing(listing: &JobListing) -> Self {
        Self {
            title: listing.title.clone(),
            company: listing.company.clone(),
            location: listing.location.clone(),
            description: listing.description.clone(),
        }
    }

    /// Overwrite placeholders with every non-empty value resolved from a detail page
    pub fn merge_detail(&mut self, detail: DetailFields) {
        if let Some(title) = non_empty(detail.title) {
            self.title = Some(title);
        }
        if let Some(company) = non_empty(detail.company) {
            self.company = Some(company);
        }
        if let Some(location) = non_empty(detail.location) {
            self.location = super::standardize_location(Some(location.as_str()));
        }
        if let Some(description) = non_empty(detail.description) {
            self.description = Some(description);
        }
    }
}

/// Fields an extractor managed to resolve from a detail page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailFields {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
}

impl DetailFields {
    pub fn has_description(&self) -> bool {
        self.description
            .as_deref()
            .is_some_and(|d| !d.trim().is_empty())
    }
}

/// Transient job summary parsed from a results page
///
/// Missing fields stay empty; a missing link disqualifies the candidate at persistence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Candidate {
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub link: Option<String>,
}

impl Candidate {
    pub fn with_link(link: impl Into<String>) -> Self {
        Self {
            link: Some(link.into()),
            ..Self::default()
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored(description: Option<&str>) -> JobListing {
        JobListing {
            id: 1,
            source_id: 1,
            external_id: "123".to_string(),
            title: Some("Placeholder".to_string()),
            company: None,
            location: Some("Hanoi".to_string()),
            description: description.map(str::to_string),
            salary: None,
            deadline: None,
            url: "https://site/job/123".to_string(),
            crawled_at: None,
            is_expired: false,
            translated_description: None,
        }
    }

    #[test]
    fn test_needs_description() {
        assert!(stored(None).needs_description());
        assert!(stored(Some("  ")).needs_description());
        assert!(!stored(Some("Responsibilities")).needs_description());
    }

    #[test]
    fn test_merge_detail_overwrites_only_resolved_fields() {
        let listing = stored(None);
        let mut fields = ListingFields::from_listing(&listing);

        fields.merge_detail(DetailFields {
            title: Some("  Rust Engineer ".to_string()),
            company: Some(String::new()),
            location: Some("Thu Đuc".to_string()),
            description: Some("Responsibilities: ...".to_string()),
        });

        assert_eq!(fields.title.as_deref(), Some("Rust Engineer"));
        assert_eq!(fields.company, None);
        assert_eq!(fields.location.as_deref(), Some("Hồ Chí Minh"));
        assert_eq!(fields.description.as_deref(), Some("Responsibilities: ..."));
    }

    #[test]
    fn test_new_listing_canonicalizes_location() {
        let candidate = Candidate {
            title: "Backend Developer".to_string(),
            company: "Acme".to_string(),
            location: "Ha Noi, Vietnam".to_string(),
            description: String::new(),
            link: Some("https://site/job/1".to_string()),
        };
        let date = NaiveDate::from_ymd_opt(2024, 11, 2).unwrap();

        let listing = NewJobListing::from_candidate(7, "1", "https://site/job/1", &candidate, date);

        assert_eq!(listing.location.as_deref(), Some("Hà Nội"));
        assert_eq!(listing.source_id, 7);
        assert_eq!(listing.crawled_at, date);
    }
}
