// jobscout Core - Domain Logic, Ports & Use Cases
// NO infrastructure dependencies: adapters live in infra-sqlite / infra-web

pub mod application;
pub mod domain;
pub mod error;
pub mod port;

pub use error::{AppError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
