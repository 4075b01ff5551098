use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use scout_core::{PageTarget, SessionId, SurfaceSlot};
use scout_logging::{scout_debug, scout_error, scout_info};
use tokio_util::sync::CancellationToken;

use crate::channel::ChannelSink;
use crate::download::{DownloadError, DownloadSettings, Downloader, HttpDownloader};
use crate::fetch::FetchSettings;
use crate::poll::PollSettings;
use crate::runner::PageRunner;
use crate::surface::{BrowserSurface, HttpSurface};
use crate::{EngineEvent, LoadError};

enum EngineCommand {
    Navigate(PageTarget),
    Close(SurfaceSlot),
    Download {
        session: SessionId,
        url: String,
        file_name: String,
    },
    Shutdown,
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("could not set up the browser surface: {0}")]
    Surface(#[from] LoadError),
    #[error("could not set up the downloader: {0}")]
    Downloader(#[from] DownloadError),
}

/// The engine thread is gone; no further events will arrive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("engine stopped")]
pub struct EngineStopped;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub fetch: FetchSettings,
    pub poll: PollSettings,
    pub download: DownloadSettings,
}

impl EngineConfig {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            fetch: FetchSettings::default(),
            poll: PollSettings::default(),
            download: DownloadSettings::new(output_dir),
        }
    }
}

/// Owns the surfaces and the download collaborator on a background runtime.
/// Each slot hosts at most one page; navigating a slot abandons whatever it
/// was showing.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let surface = Arc::new(HttpSurface::new(config.fetch)?);
        let downloader = Arc::new(HttpDownloader::new(config.download)?);
        Ok(Self::with_parts(surface, downloader, config.poll))
    }

    pub fn with_parts(
        surface: Arc<dyn BrowserSurface>,
        downloader: Arc<dyn Downloader>,
        poll: PollSettings,
    ) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    scout_error!("Could not start engine runtime: {}", err);
                    return;
                }
            };
            let runner = PageRunner::new(surface, poll);
            let mut pages: HashMap<SurfaceSlot, CancellationToken> = HashMap::new();

            while let Ok(command) = cmd_rx.recv() {
                match command {
                    EngineCommand::Navigate(target) => {
                        let token = CancellationToken::new();
                        if let Some(previous) = pages.insert(target.slot, token.clone()) {
                            previous.cancel();
                        }
                        scout_info!("{:?} surface -> {} ({})", target.slot, target.url, target.session);
                        let runner = runner.clone();
                        let sink = ChannelSink::new(event_tx.clone());
                        runtime.spawn(async move {
                            runner.run(target, &sink, token).await;
                        });
                    }
                    EngineCommand::Close(slot) => {
                        if let Some(token) = pages.remove(&slot) {
                            scout_debug!("Closing {:?} surface", slot);
                            token.cancel();
                        }
                    }
                    EngineCommand::Download {
                        session,
                        url,
                        file_name,
                    } => {
                        let downloader = downloader.clone();
                        let event_tx = event_tx.clone();
                        runtime.spawn(async move {
                            let result = downloader.download(&url, &file_name).await;
                            let _ = event_tx.send(EngineEvent::DownloadFinished {
                                session,
                                file_name,
                                result,
                            });
                        });
                    }
                    EngineCommand::Shutdown => {
                        scout_debug!("Engine shutting down");
                        break;
                    }
                }
            }

            for token in pages.values() {
                token.cancel();
            }
        });

        Self { cmd_tx, event_rx }
    }

    pub fn navigate(&self, target: PageTarget) {
        let _ = self.cmd_tx.send(EngineCommand::Navigate(target));
    }

    pub fn close(&self, slot: SurfaceSlot) {
        let _ = self.cmd_tx.send(EngineCommand::Close(slot));
    }

    pub fn download(&self, session: SessionId, url: impl Into<String>, file_name: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::Download {
            session,
            url: url.into(),
            file_name: file_name.into(),
        });
    }

    /// Stops the engine thread, cancelling every open page. Events already
    /// queued can still be received; after that receiving reports
    /// [`EngineStopped`].
    pub fn shutdown(&self) {
        let _ = self.cmd_tx.send(EngineCommand::Shutdown);
    }

    pub fn try_recv(&self) -> Result<Option<EngineEvent>, EngineStopped> {
        match self.event_rx.try_recv() {
            Ok(event) => Ok(Some(event)),
            Err(mpsc::TryRecvError::Empty) => Ok(None),
            Err(mpsc::TryRecvError::Disconnected) => Err(EngineStopped),
        }
    }

    /// Waits at most `timeout` for the next event; `Ok(None)` when nothing
    /// arrived in time.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<EngineEvent>, EngineStopped> {
        match self.event_rx.recv_timeout(timeout) {
            Ok(event) => Ok(Some(event)),
            Err(mpsc::RecvTimeoutError::Timeout) => Ok(None),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(EngineStopped),
        }
    }
}
