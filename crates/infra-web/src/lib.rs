// jobscout Infrastructure - Web Adapters
// Implements: JobBoard for LinkedIn (browser), TopCV and ITViec (HTTP)

mod browser;
mod html;
mod http;
pub mod itviec;
pub mod linkedin;
pub mod topcv;

pub use browser::{BrowserSession, BrowserSettings};
pub use http::{HttpFetcher, HttpSettings};
pub use itviec::ItViecBoard;
pub use linkedin::LinkedInBoard;
pub use topcv::TopCvBoard;
