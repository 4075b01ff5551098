use crate::{Inbound, SessionId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User submitted a search query.
    SearchSubmitted(String),
    /// A page script posted a message from a surface showing `session`'s target.
    Page { session: SessionId, message: Inbound },
    /// The surface could not load the page selected for `session`.
    LoadFailed { session: SessionId, reason: String },
    /// User picked the slow link of result `index` for download.
    DownloadSelected { index: usize },
    /// User closed the floating download surface.
    DownloadSurfaceClosed,
    /// Download collaborator finished the transfer started for `session`.
    DownloadFinished {
        session: SessionId,
        file_name: String,
        outcome: DownloadOutcome,
    },
    /// UI/render tick to coalesce rendering.
    Tick,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    Saved { path: String },
    Failed { reason: String },
}
