use std::sync::Arc;

use scout_core::{PageMessage, PageTarget, Script, SessionId};
use scout_logging::{scout_debug, scout_info};
use tokio_util::sync::CancellationToken;

use crate::channel::MessageSink;
use crate::extract::{
    discover_download_link, extract_initial_results, extract_slow_link, find_countdown,
};
use crate::poll::{poll_until, PollOutcome, PollSettings};
use crate::surface::{BrowserSurface, LivePage};
use crate::SurfaceEvent;

/// Loads one target on a surface and runs its script natively, posting the
/// script's messages to `sink`. Returns once the script is finished or the
/// page's `cancel` token fires.
#[derive(Clone)]
pub struct PageRunner {
    surface: Arc<dyn BrowserSurface>,
    poll: PollSettings,
}

impl PageRunner {
    pub fn new(surface: Arc<dyn BrowserSurface>, poll: PollSettings) -> Self {
        Self { surface, poll }
    }

    pub async fn run(&self, target: PageTarget, sink: &dyn MessageSink, cancel: CancellationToken) {
        let session = target.session;
        let loaded = tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            loaded = self.surface.load(&target.url) => loaded,
        };
        let page = match loaded {
            Ok(page) => page,
            Err(err) => {
                sink.emit(SurfaceEvent::LoadFailed {
                    session,
                    reason: err.to_string(),
                });
                return;
            }
        };
        sink.emit(SurfaceEvent::PageFinished {
            session,
            url: page.url.clone(),
        });

        match target.script {
            Script::InitialResults => {
                let payload = extract_initial_results(&page.html, &page.url);
                sink.post(session, &PageMessage::InitialResults { payload });
            }
            Script::SlowLink { index } => {
                let payload = extract_slow_link(&page.html, &page.url);
                sink.post(session, &PageMessage::SlowLink { index, payload });
            }
            Script::DownloadDiscovery => {
                let live = LivePage::new(self.surface.clone(), page);
                self.discover(session, &live, sink, &cancel).await;
            }
        }
    }

    async fn discover(
        &self,
        session: SessionId,
        live: &LivePage,
        sink: &dyn MessageSink,
        cancel: &CancellationToken,
    ) {
        // The countdown is only interesting until the link shows up.
        let countdown_cancel = cancel.child_token();

        let discovery = async {
            let outcome = poll_until(self.poll, cancel, |attempt| async move {
                let page = live.at_attempt(attempt).await;
                page.and_then(|page| discover_download_link(&page.html, &page.url))
            })
            .await;
            countdown_cancel.cancel();
            match outcome {
                PollOutcome::Found { value, attempts } => {
                    scout_info!(
                        "Download link for {} found via {:?} after {} attempts",
                        session,
                        value.rule,
                        attempts
                    );
                    sink.post(session, &PageMessage::DownloadLink { payload: value.url });
                }
                PollOutcome::Exhausted { attempts } => {
                    sink.post(session, &PageMessage::DiscoveryTimeout { attempts });
                }
                PollOutcome::Cancelled => scout_debug!("Discovery for {} cancelled", session),
            }
        };

        let countdown = async {
            let outcome = poll_until(self.poll, &countdown_cancel, |attempt| async move {
                let page = live.at_attempt(attempt).await;
                page.and_then(|page| find_countdown(&page.html))
            })
            .await;
            if let PollOutcome::Found { value, .. } = outcome {
                sink.post(session, &PageMessage::Timer { payload: value });
            }
        };

        tokio::join!(discovery, countdown);
    }
}
