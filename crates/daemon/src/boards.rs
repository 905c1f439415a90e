// Board wiring - builds the selected JobBoard adapters and owns the browser session

use anyhow::{Context, Result};
use jobscout_core::port::pacer::JitteredPacer;
use jobscout_core::port::{JobBoard, Pacer};
use jobscout_infra_web::{
    BrowserSession, HttpFetcher, ItViecBoard, LinkedInBoard, TopCvBoard,
};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::{Settings, SourceKind};

pub struct Boards {
    boards: Vec<Box<dyn JobBoard>>,
    session: Option<Arc<BrowserSession>>,
}

impl Boards {
    /// Build boards in the given order
    ///
    /// The browser is only launched when LinkedIn is selected, and the run waits for its
    /// profile to be authenticated. If anything fails here the browser is closed again.
    pub async fn build(settings: &Settings, sources: &[SourceKind]) -> Result<Self> {
        let mut boards = Self {
            boards: Vec::new(),
            session: None,
        };

        match boards.add_all(settings, sources).await {
            Ok(()) => Ok(boards),
            Err(e) => {
                boards.close().await;
                Err(e)
            }
        }
    }

    async fn add_all(&mut self, settings: &Settings, sources: &[SourceKind]) -> Result<()> {
        let pacer: Arc<dyn Pacer> = Arc::new(JitteredPacer);

        for source in sources {
            if self.boards.iter().any(|b| b.source_name() == board_name(*source)) {
                continue;
            }

            let board: Box<dyn JobBoard> = match source {
                SourceKind::LinkedIn => {
                    let session = Arc::new(
                        BrowserSession::launch(&settings.browser())
                            .await
                            .context("Failed to launch browser")?,
                    );
                    self.session = Some(Arc::clone(&session));

                    let board = LinkedInBoard::new(
                        session,
                        Arc::clone(&pacer),
                        settings.retry(),
                        settings.date.date_posted(),
                    );
                    board
                        .await_authenticated()
                        .await
                        .context("LinkedIn login required in the browser profile")?;
                    Box::new(board)
                }
                SourceKind::TopCv => Box::new(TopCvBoard::new(http_fetcher(settings, &pacer)?)),
                SourceKind::ItViec => Box::new(ItViecBoard::new(http_fetcher(settings, &pacer)?)),
            };

            info!(source = board.source_name(), "Board ready");
            self.boards.push(board);
        }
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn JobBoard> {
        self.boards.iter().map(|board| board.as_ref())
    }

    pub async fn close(&self) {
        if let Some(session) = &self.session {
            if let Err(e) = session.close().await {
                warn!(error = %e, "Failed to close browser session");
            }
        }
    }
}

fn http_fetcher(settings: &Settings, pacer: &Arc<dyn Pacer>) -> Result<HttpFetcher> {
    HttpFetcher::new(settings.http(), Arc::clone(pacer)).context("Failed to build HTTP client")
}

fn board_name(source: SourceKind) -> &'static str {
    match source {
        SourceKind::LinkedIn => jobscout_infra_web::linkedin::SOURCE_NAME,
        SourceKind::TopCv => jobscout_infra_web::topcv::SOURCE_NAME,
        SourceKind::ItViec => jobscout_infra_web::itviec::SOURCE_NAME,
    }
}
