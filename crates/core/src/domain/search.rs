// Search space: what to crawl and how recent

use super::error::{DomainError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Recency filter applied to search result pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatePosted {
    #[default]
    AllTime,
    Month,
    Week,
    Day,
    SixHours,
    TwoHours,
    Hour,
}

impl DatePosted {
    /// Maximum posting age in seconds (`None` = no limit)
    pub fn max_age_seconds(&self) -> Option<u64> {
        match self {
            DatePosted::AllTime => None,
            DatePosted::Month => Some(2_592_000),
            DatePosted::Week => Some(604_800),
            DatePosted::Day => Some(86_400),
            DatePosted::SixHours => Some(21_600),
            DatePosted::TwoHours => Some(7_200),
            DatePosted::Hour => Some(3_600),
        }
    }
}

impl fmt::Display for DatePosted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatePosted::AllTime => write!(f, "all_time"),
            DatePosted::Month => write!(f, "month"),
            DatePosted::Week => write!(f, "week"),
            DatePosted::Day => write!(f, "24_hours"),
            DatePosted::SixHours => write!(f, "6_hours"),
            DatePosted::TwoHours => write!(f, "2_hours"),
            DatePosted::Hour => write!(f, "hour"),
        }
    }
}

/// How a source spreads its search space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimensionKind {
    /// Every position crossed with every location
    PositionAndLocation,
    /// Positions only; the board does not filter by location
    PositionOnly,
}

/// One unit of crawl work
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchDimension {
    pub position: String,
    pub location: Option<String>,
}

impl SearchDimension {
    pub fn new(position: impl Into<String>, location: Option<String>) -> Self {
        Self {
            position: position.into(),
            location,
        }
    }
}

impl fmt::Display for SearchDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{} @ {}", self.position, location),
            None => write!(f, "{}", self.position),
        }
    }
}

/// Search terms, locations and recency for one crawl run
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchSettings {
    pub positions: Vec<String>,
    pub locations: Vec<String>,
    pub date_posted: DatePosted,
}

impl SearchSettings {
    pub fn new(positions: Vec<String>, locations: Vec<String>, date_posted: DatePosted) -> Result<Self> {
        if positions.iter().all(|p| p.trim().is_empty()) {
            return Err(DomainError::InvalidSearch(
                "at least one position is required".to_string(),
            ));
        }
        Ok(Self {
            positions,
            locations,
            date_posted,
        })
    }

    /// Enumerate dimensions in configuration order (positions outer, locations inner)
    pub fn dimensions(&self, kind: DimensionKind) -> Vec<SearchDimension> {
        let positions = self
            .positions
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty());

        match kind {
            DimensionKind::PositionOnly => positions
                .map(|p| SearchDimension::new(p, None))
                .collect(),
            DimensionKind::PositionAndLocation => positions
                .flat_map(|p| {
                    self.locations
                        .iter()
                        .map(move |l| SearchDimension::new(p, Some(l.trim().to_string())))
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> SearchSettings {
        SearchSettings::new(
            vec!["Rust Developer".to_string(), "Backend".to_string()],
            vec!["Vietnam".to_string(), "Singapore".to_string()],
            DatePosted::Week,
        )
        .unwrap()
    }

    #[test]
    fn test_cartesian_dimensions() {
        let dims = settings().dimensions(DimensionKind::PositionAndLocation);

        assert_eq!(dims.len(), 4);
        assert_eq!(
            dims[0],
            SearchDimension::new("Rust Developer", Some("Vietnam".to_string()))
        );
        assert_eq!(
            dims[3],
            SearchDimension::new("Backend", Some("Singapore".to_string()))
        );
    }

    #[test]
    fn test_position_only_dimensions() {
        let dims = settings().dimensions(DimensionKind::PositionOnly);

        assert_eq!(dims.len(), 2);
        assert!(dims.iter().all(|d| d.location.is_none()));
    }

    #[test]
    fn test_requires_a_position() {
        let result = SearchSettings::new(vec!["  ".to_string()], vec![], DatePosted::AllTime);
        assert!(result.is_err());
    }

    #[test]
    fn test_max_age() {
        assert_eq!(DatePosted::AllTime.max_age_seconds(), None);
        assert_eq!(DatePosted::Day.max_age_seconds(), Some(86_400));
        assert_eq!(DatePosted::Month.max_age_seconds(), Some(2_592_000));
    }
}
