// Pacer Port - every deliberate delay goes through here (rate limiting, scroll pacing)

use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;

/// Uniform delay distribution `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayRange {
    pub min: Duration,
    pub max: Duration,
}

impl DelayRange {
    pub const fn from_millis(min: u64, max: u64) -> Self {
        Self {
            min: Duration::from_millis(min),
            max: Duration::from_millis(max),
        }
    }

    pub const fn fixed(delay: Duration) -> Self {
        Self {
            min: delay,
            max: delay,
        }
    }

    /// Draw one delay from the range
    pub fn sample(&self) -> Duration {
        let min = self.min.as_millis() as u64;
        let max = self.max.as_millis() as u64;
        if max <= min {
            return self.min;
        }
        Duration::from_millis(rand::thread_rng().gen_range(min..=max))
    }
}

/// Pacer interface (allows instant pacing in tests)
#[async_trait]
pub trait Pacer: Send + Sync {
    /// Suspend for a delay drawn from `range`
    async fn pause(&self, range: DelayRange);
}

/// Jittered tokio sleep (production)
pub struct JitteredPacer;

#[async_trait]
impl Pacer for JitteredPacer {
    async fn pause(&self, range: DelayRange) {
        let delay = range.sample();
        tokio::time::sleep(delay).await;
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Records requested pauses without sleeping
    #[derive(Default, Clone)]
    pub struct RecordingPacer {
        pauses: Arc<Mutex<Vec<DelayRange>>>,
    }

    impl RecordingPacer {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn pauses(&self) -> Vec<DelayRange> {
            self.pauses.lock().unwrap().clone()
        }

        pub fn pause_count(&self) -> usize {
            self.pauses.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Pacer for RecordingPacer {
        async fn pause(&self, range: DelayRange) {
            self.pauses.lock().unwrap().push(range);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_stays_in_range() {
        let range = DelayRange::from_millis(200, 500);
        for _ in 0..100 {
            let delay = range.sample();
            assert!(delay >= range.min && delay <= range.max);
        }
    }

    #[test]
    fn test_fixed_range() {
        let range = DelayRange::fixed(Duration::from_millis(500));
        assert_eq!(range.sample(), Duration::from_millis(500));
    }
}
