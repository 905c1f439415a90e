// Crawl constants (no magic values)
use crate::port::DelayRange;
use std::time::Duration;

/// Page ceiling per dimension
pub const DEFAULT_MAX_PAGES: u32 = 50;

/// Retries after the first request (6 requests total)
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// Pacing before the first request for a URL (7-10s)
pub const REQUEST_DELAY: DelayRange = DelayRange::from_millis(7_000, 10_000);

/// Backoff before each retry of a throttled or timed out request (7-10s)
pub const RETRY_BACKOFF: DelayRange = DelayRange::from_millis(7_000, 10_000);

/// Settle time after a browser navigation (2-4s)
pub const NAVIGATION_SETTLE: DelayRange = DelayRange::from_millis(2_000, 4_000);

/// Pause between two scroll steps (0.2-0.5s)
pub const SCROLL_STEP_PAUSE: DelayRange = DelayRange::from_millis(200, 500);

/// Pause after the final scroll to the end of the list
pub const SCROLL_END_PAUSE: DelayRange = DelayRange::fixed(Duration::from_millis(500));

/// Wait after expanding a collapsed description
pub const EXPAND_DESCRIPTION_PAUSE: DelayRange = DelayRange::fixed(Duration::from_secs(2));

/// Bound for the manual login wait on the browser profile
pub const AUTHENTICATION_TIMEOUT: Duration = Duration::from_secs(300);
