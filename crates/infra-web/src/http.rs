// HTTP Page Fetcher - paced, throttle-aware GET for the HTTP boards

use jobscout_core::application::constants::REQUEST_DELAY;
use jobscout_core::application::RetryPolicy;
use jobscout_core::port::{DelayRange, FetchError, Pacer};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";
const DEFAULT_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";
const DEFAULT_ACCEPT_LANGUAGE: &str = "vi-VN,vi;q=0.9,en-US;q=0.8,en;q=0.7";

#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub user_agent: String,
    pub accept_language: String,
    pub timeout: Duration,
    /// Pause before the first request for a URL
    pub request_delay: DelayRange,
    pub retry: RetryPolicy,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
            timeout: Duration::from_secs(30),
            request_delay: REQUEST_DELAY,
            retry: RetryPolicy::default(),
        }
    }
}

/// Browser-looking reqwest client with a cookie store
///
/// Every request is preceded by a pause: `request_delay` before the first attempt,
/// the retry backoff before each retry. Only 429 and timeouts are retried.
pub struct HttpFetcher {
    client: reqwest::Client,
    pacer: Arc<dyn Pacer>,
    settings: HttpSettings,
}

impl HttpFetcher {
    pub fn new(settings: HttpSettings, pacer: Arc<dyn Pacer>) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(DEFAULT_ACCEPT));
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_str(&settings.accept_language)
                .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_ACCEPT_LANGUAGE)),
        );

        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.clone())
            .default_headers(headers)
            .cookie_store(true)
            .gzip(true)
            .timeout(settings.timeout)
            .build()
            .map_err(|e| FetchError::Transport {
                url: String::new(),
                message: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            pacer,
            settings,
        })
    }

    /// GET `url` and return the body of the first successful response
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        info!(url = %url, "Fetching");
        self.settings
            .retry
            .run(self.pacer.as_ref(), FetchError::is_retryable, move |attempt| async move {
                if attempt == 0 {
                    self.pacer.pause(self.settings.request_delay).await;
                }
                self.get_once(url).await
            })
            .await
    }

    async fn get_once(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error(url, e))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!(url = %url, status = status.as_u16(), "Throttled");
            return Err(FetchError::Throttled {
                url: url.to_string(),
            });
        }
        if !status.is_success() {
            warn!(url = %url, status = status.as_u16(), "Request failed");
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| transport_error(url, e))?;
        debug!(url = %url, bytes = body.len(), "Fetched");
        Ok(body)
    }
}

fn transport_error(url: &str, err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Transport {
            url: url.to_string(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobscout_core::application::constants::RETRY_BACKOFF;
    use jobscout_core::port::pacer::mocks::RecordingPacer;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve canned responses in order, repeating the last one
    async fn serve(responses: Vec<(u16, &'static str)>) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let index = counter.fetch_add(1, Ordering::SeqCst);
                let (status, body) = responses[index.min(responses.len() - 1)];

                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;

                let reason = match status {
                    200 => "OK",
                    404 => "Not Found",
                    429 => "Too Many Requests",
                    _ => "Internal Server Error",
                };
                let response = format!(
                    "HTTP/1.1 {} {}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    reason,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        (format!("http://{}/jobs", addr), hits)
    }

    fn fetcher(pacer: &RecordingPacer) -> HttpFetcher {
        HttpFetcher::new(HttpSettings::default(), Arc::new(pacer.clone())).unwrap()
    }

    #[tokio::test]
    async fn test_retries_throttled_requests() {
        let (url, hits) = serve(vec![(429, ""), (429, ""), (200, "<html>jobs</html>")]).await;
        let pacer = RecordingPacer::new();

        let body = fetcher(&pacer).fetch(&url).await.unwrap();

        assert_eq!(body, "<html>jobs</html>");
        assert_eq!(hits.load(Ordering::SeqCst), 3);
        assert_eq!(pacer.pauses(), vec![REQUEST_DELAY, RETRY_BACKOFF, RETRY_BACKOFF]);
    }

    #[tokio::test]
    async fn test_server_error_is_not_retried() {
        let (url, hits) = serve(vec![(500, "boom")]).await;
        let pacer = RecordingPacer::new();

        let err = fetcher(&pacer).fetch(&url).await.unwrap_err();

        assert!(matches!(err, FetchError::Status { status: 500, .. }));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(pacer.pause_count(), 1);
    }

    #[tokio::test]
    async fn test_throttle_budget_exhausted() {
        let (url, hits) = serve(vec![(429, "")]).await;
        let pacer = RecordingPacer::new();

        let err = fetcher(&pacer).fetch(&url).await.unwrap_err();

        assert!(matches!(err, FetchError::Throttled { .. }));
        assert_eq!(hits.load(Ordering::SeqCst), 6);
    }

    #[tokio::test]
    async fn test_missing_page_is_gone() {
        let (url, _hits) = serve(vec![(404, "")]).await;
        let pacer = RecordingPacer::new();

        let err = fetcher(&pacer).fetch(&url).await.unwrap_err();

        assert!(err.is_gone());
    }
}
