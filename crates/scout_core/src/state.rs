use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::effect::{PageTarget, Script, SurfaceSlot};
use crate::site::{self, DEFAULT_BASE_URL, NOT_FOUND};
use crate::view_model::{AppViewModel, DownloadView, LinkStatus, ResultRowView};

/// Identity of a scrape session or download candidate. Strictly increasing
/// within one `AppState`; events tagged with anything but the live id are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    SearchLoading,
    ResolvingSlowLinks,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub slow_link: Option<String>,
}

impl SearchResult {
    /// True once resolution produced a usable link (not the not-found marker).
    pub fn has_slow_link(&self) -> bool {
        matches!(self.slow_link.as_deref(), Some(link) if link != NOT_FOUND)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScrapeSession {
    pub(crate) id: SessionId,
    pub(crate) query: String,
    pub(crate) results: Vec<SearchResult>,
    pub(crate) current_index: usize,
    pub(crate) phase: Phase,
    /// Results whose slow download page was opened this session.
    pub(crate) visited: BTreeSet<usize>,
}

impl ScrapeSession {
    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_visited(&self, index: usize) -> bool {
        self.visited.contains(&index)
    }

    /// Index being resolved; `None` outside `ResolvingSlowLinks`.
    pub fn current_index(&self) -> Option<usize> {
        (self.phase == Phase::ResolvingSlowLinks).then_some(self.current_index)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadStatus {
    Discovering,
    Downloading { file_name: String },
    Saved { file_name: String, path: String },
    Failed { file_name: String, reason: String },
    LinkNotFound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadCandidate {
    pub(crate) id: SessionId,
    pub(crate) source_url: String,
    pub(crate) resolved_download_url: Option<String>,
    pub(crate) countdown: Option<String>,
    pub(crate) status: DownloadStatus,
}

impl DownloadCandidate {
    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn resolved_download_url(&self) -> Option<&str> {
        self.resolved_download_url.as_deref()
    }

    pub fn countdown(&self) -> Option<&str> {
        self.countdown.as_deref()
    }

    pub fn status(&self) -> &DownloadStatus {
        &self.status
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    base_url: String,
    last_issued: u64,
    session: ScrapeSession,
    candidate: Option<DownloadCandidate>,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            last_issued: 0,
            session: ScrapeSession::default(),
            candidate: None,
            dirty: false,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &ScrapeSession {
        &self.session
    }

    pub fn candidate(&self) -> Option<&DownloadCandidate> {
        self.candidate.as_ref()
    }

    /// The page the scrape surface should currently be showing, if any.
    pub fn current_target(&self) -> Option<PageTarget> {
        let session = &self.session;
        match session.phase {
            Phase::SearchLoading => Some(PageTarget {
                session: session.id,
                slot: SurfaceSlot::Scrape,
                url: site::search_url(&self.base_url, &session.query),
                script: Script::InitialResults,
            }),
            Phase::ResolvingSlowLinks => {
                session.results.get(session.current_index).map(|result| PageTarget {
                    session: session.id,
                    slot: SurfaceSlot::Scrape,
                    url: result.url.clone(),
                    script: Script::SlowLink {
                        index: session.current_index,
                    },
                })
            }
            Phase::Idle | Phase::Done => None,
        }
    }

    pub fn view(&self) -> AppViewModel {
        let current = self.session.current_index();
        let rows = self
            .session
            .results
            .iter()
            .enumerate()
            .map(|(index, result)| ResultRowView {
                index,
                title: result.title.clone(),
                url: result.url.clone(),
                image: result.image.clone(),
                status: match result.slow_link.as_deref() {
                    Some(NOT_FOUND) => LinkStatus::NotFound,
                    Some(link) => LinkStatus::Resolved(link.to_string()),
                    None if current == Some(index) => LinkStatus::Resolving,
                    None => LinkStatus::Pending,
                },
                visited: self.session.is_visited(index),
            })
            .collect();

        AppViewModel {
            session: self.session.id,
            phase: self.session.phase,
            query: self.session.query.clone(),
            rows,
            current_index: current,
            download: self.candidate.as_ref().map(|candidate| DownloadView {
                source_url: candidate.source_url.clone(),
                resolved_url: candidate.resolved_download_url.clone(),
                countdown: candidate.countdown.clone(),
                status: candidate.status.clone(),
            }),
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    fn issue_id(&mut self) -> SessionId {
        self.last_issued += 1;
        SessionId(self.last_issued)
    }

    /// Discards the live session unconditionally and opens a new one.
    pub(crate) fn begin_search(&mut self, query: &str) -> SessionId {
        let id = self.issue_id();
        self.session = ScrapeSession {
            id,
            query: query.to_string(),
            results: Vec::new(),
            current_index: 0,
            phase: Phase::SearchLoading,
            visited: BTreeSet::new(),
        };
        self.mark_dirty();
        id
    }

    pub(crate) fn session_mut(&mut self) -> &mut ScrapeSession {
        &mut self.session
    }

    /// Replaces any existing candidate with a fresh one for `source_url`.
    pub(crate) fn begin_candidate(&mut self, source_url: &str) -> SessionId {
        let id = self.issue_id();
        self.candidate = Some(DownloadCandidate {
            id,
            source_url: source_url.to_string(),
            resolved_download_url: None,
            countdown: None,
            status: DownloadStatus::Discovering,
        });
        self.mark_dirty();
        id
    }

    pub(crate) fn candidate_mut(&mut self, id: SessionId) -> Option<&mut DownloadCandidate> {
        self.candidate.as_mut().filter(|candidate| candidate.id == id)
    }

    pub(crate) fn drop_candidate(&mut self) -> Option<DownloadCandidate> {
        let dropped = self.candidate.take();
        if dropped.is_some() {
            self.mark_dirty();
        }
        dropped
    }
}
