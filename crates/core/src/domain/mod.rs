// Domain Layer - Pure business logic and entities

pub mod blacklist;
pub mod error;
pub mod listing;
pub mod location;
pub mod search;

// Re-exports
pub use blacklist::{Blacklist, BlacklistPattern};
pub use error::DomainError;
pub use listing::{
    Candidate, DetailFields, JobListing, JobSource, ListingFields, ListingId, NewJobListing,
    SourceId,
};
pub use location::standardize_location;
pub use search::{DatePosted, DimensionKind, SearchDimension, SearchSettings};
