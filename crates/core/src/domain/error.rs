// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid blacklist term '{term}': {reason}")]
    InvalidBlacklistTerm { term: String, reason: String },

    #[error("Invalid search settings: {0}")]
    InvalidSearch(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
