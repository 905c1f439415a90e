// Browser Session - one exclusive Chrome page shared by the LinkedIn board

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use jobscout_core::port::FetchError;
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct BrowserSettings {
    /// Chrome profile that is already logged in
    pub user_data_dir: Option<PathBuf>,
    pub executable: Option<PathBuf>,
    pub headless: bool,
    pub navigation_timeout: Duration,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            user_data_dir: None,
            executable: None,
            headless: false,
            navigation_timeout: Duration::from_secs(60),
        }
    }
}

/// Launched browser plus its single working page
///
/// chromiumoxide pages have no Drop cleanup; callers must `close()` the session on every
/// exit path.
pub struct BrowserSession {
    browser: Mutex<Browser>,
    page: Page,
    handler: JoinHandle<()>,
    navigation_timeout: Duration,
}

impl BrowserSession {
    pub async fn launch(settings: &BrowserSettings) -> Result<Self, FetchError> {
        let mut builder = BrowserConfig::builder()
            .window_size(1920, 1080)
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--no-first-run");
        if !settings.headless {
            builder = builder.with_head();
        }
        if let Some(dir) = &settings.user_data_dir {
            builder = builder.user_data_dir(dir);
        }
        if let Some(executable) = &settings.executable {
            builder = builder.chrome_executable(executable);
        }
        let config = builder.build().map_err(FetchError::Browser)?;

        let (browser, mut handler) = Browser::launch(config).await.map_err(browser_error)?;
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!(error = %e, "Browser handler event error");
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                handler.abort();
                return Err(browser_error(e));
            }
        };

        info!(headless = settings.headless, "Browser session started");
        Ok(Self {
            browser: Mutex::new(browser),
            page,
            handler,
            navigation_timeout: settings.navigation_timeout,
        })
    }

    /// Navigate and wait for the load, bounded by the navigation timeout
    pub async fn navigate(&self, url: &str) -> Result<(), FetchError> {
        debug!(url = %url, "Navigating");
        match tokio::time::timeout(self.navigation_timeout, self.page.goto(url)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(browser_error(e)),
            Err(_) => Err(FetchError::Timeout {
                url: url.to_string(),
            }),
        }
    }

    /// Serialized DOM of the current page
    pub async fn content(&self) -> Result<String, FetchError> {
        self.page.content().await.map_err(browser_error)
    }

    pub async fn current_url(&self) -> Result<Option<String>, FetchError> {
        self.page.url().await.map_err(browser_error)
    }

    /// Evaluate a script and deserialize its result
    pub async fn evaluate<T: DeserializeOwned>(&self, script: &str) -> Result<T, FetchError> {
        self.page
            .evaluate(script)
            .await
            .map_err(browser_error)?
            .into_value()
            .map_err(|e| FetchError::Browser(format!("unexpected script result: {}", e)))
    }

    /// Evaluate a script for its side effect only
    pub async fn run_script(&self, script: &str) -> Result<(), FetchError> {
        self.page.evaluate(script).await.map_err(browser_error)?;
        Ok(())
    }

    /// Click the first element matching `selector`; false when there is none
    pub async fn click_if_present(&self, selector: &str) -> Result<bool, FetchError> {
        let Ok(element) = self.page.find_element(selector).await else {
            return Ok(false);
        };
        element.click().await.map_err(browser_error)?;
        Ok(true)
    }

    /// Close the page and the browser process
    pub async fn close(&self) -> Result<(), FetchError> {
        if let Err(e) = self.page.clone().close().await {
            warn!(error = %e, "Failed to close page (non-fatal)");
        }

        let mut browser = self.browser.lock().await;
        let closed = browser.close().await.map_err(browser_error);
        if closed.is_ok() {
            if let Err(e) = browser.wait().await {
                warn!(error = %e, "Browser process did not exit cleanly");
            }
        }
        self.handler.abort();

        info!("Browser session closed");
        closed.map(|_| ())
    }
}

fn browser_error(err: chromiumoxide::error::CdpError) -> FetchError {
    FetchError::Browser(err.to_string())
}
