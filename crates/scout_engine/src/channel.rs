use std::sync::mpsc;

use scout_core::{PageMessage, SessionId};
use scout_logging::scout_error;

use crate::{EngineEvent, SurfaceEvent};

/// Receiving end of the page-to-orchestrator transport. Posting never blocks
/// and nothing is acknowledged.
pub trait MessageSink: Send + Sync {
    fn emit(&self, event: SurfaceEvent);

    /// Serialises `message` the way a page script would and posts it.
    fn post(&self, session: SessionId, message: &PageMessage) {
        match message.to_json() {
            Ok(raw) => self.emit(SurfaceEvent::Message { session, raw }),
            Err(err) => scout_error!("Could not encode {} message: {}", message.kind(), err),
        }
    }
}

pub struct ChannelSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl MessageSink for ChannelSink {
    fn emit(&self, event: SurfaceEvent) {
        let _ = self.tx.send(EngineEvent::Surface(event));
    }
}
