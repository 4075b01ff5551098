use std::time::Duration;

use chrono::Local;
use scout_core::{decode_message, DownloadOutcome, Effect, Msg};
use scout_engine::{EngineEvent, EngineHandle, EngineStopped, SurfaceEvent};
use scout_logging::{scout_debug, scout_info, scout_warn};

use crate::render::notice_line;

/// Executes effects against the engine and turns engine events back into `Msg`s.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle) -> Self {
        Self { engine }
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::LoadPage(target) => {
                    scout_debug!("LoadPage {:?} {} url={}", target.script, target.session, target.url);
                    self.engine.navigate(target);
                }
                Effect::CloseSurface { slot } => self.engine.close(slot),
                Effect::StartDownload {
                    session,
                    url,
                    file_name,
                } => {
                    scout_info!("StartDownload {} file={} url={}", session, file_name, url);
                    self.engine.download(session, url, file_name);
                }
                Effect::Notify(notice) => eprintln!("{}", notice_line(&notice, Local::now())),
            }
        }
    }

    /// Next message from the engine, waiting at most `timeout`.
    pub fn next_msg(&self, timeout: Duration) -> Result<Option<Msg>, EngineStopped> {
        Ok(self.engine.recv_timeout(timeout)?.and_then(map_event))
    }
}

pub(crate) fn map_event(event: EngineEvent) -> Option<Msg> {
    match event {
        EngineEvent::Surface(SurfaceEvent::PageFinished { session, url }) => {
            scout_debug!("Page finished for {}: {}", session, url);
            None
        }
        EngineEvent::Surface(SurfaceEvent::Message { session, raw }) => Some(Msg::Page {
            session,
            message: decode_message(&raw),
        }),
        EngineEvent::Surface(SurfaceEvent::LoadFailed { session, reason }) => {
            scout_warn!("Page load for {} failed: {}", session, reason);
            Some(Msg::LoadFailed { session, reason })
        }
        EngineEvent::DownloadFinished {
            session,
            file_name,
            result,
        } => {
            let outcome = match result {
                Ok(path) => DownloadOutcome::Saved {
                    path: path.display().to_string(),
                },
                Err(err) => {
                    scout_warn!("Download of {} failed: {}", file_name, err);
                    DownloadOutcome::Failed {
                        reason: err.to_string(),
                    }
                }
            };
            Some(Msg::DownloadFinished {
                session,
                file_name,
                outcome,
            })
        }
    }
}
