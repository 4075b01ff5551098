use crate::{DownloadStatus, Phase, SessionId};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub session: SessionId,
    pub phase: Phase,
    pub query: String,
    pub rows: Vec<ResultRowView>,
    pub current_index: Option<usize>,
    pub download: Option<DownloadView>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRowView {
    pub index: usize,
    pub title: String,
    pub url: String,
    pub image: Option<String>,
    pub status: LinkStatus,
    /// The user already opened this result's download page.
    pub visited: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkStatus {
    Pending,
    Resolving,
    Resolved(String),
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadView {
    pub source_url: String,
    pub resolved_url: Option<String>,
    pub countdown: Option<String>,
    pub status: DownloadStatus,
}
