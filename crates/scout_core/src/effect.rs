use std::fmt;

use crate::SessionId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Navigate a surface slot to `target.url` and inject `target.script`.
    LoadPage(PageTarget),
    /// Tear down whatever page the slot is hosting.
    CloseSurface { slot: SurfaceSlot },
    /// Hand a resolved URL to the download collaborator.
    StartDownload {
        session: SessionId,
        url: String,
        file_name: String,
    },
    Notify(Notice),
}

/// The two independently navigated browser surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceSlot {
    /// Hidden surface walking the search and detail pages.
    Scrape,
    /// Floating surface hosting the gated download page.
    Download,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTarget {
    pub session: SessionId,
    pub slot: SurfaceSlot,
    pub url: String,
    pub script: Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Script {
    InitialResults,
    SlowLink { index: usize },
    /// Download discovery together with the countdown watcher.
    DownloadDiscovery,
}

/// Short, fire-and-forget status for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    SearchFailed { reason: String },
    ReadyIn { seconds: String },
    DownloadStarted { file_name: String },
    DownloadSucceeded { file_name: String, path: String },
    DownloadFailed { file_name: String, reason: String },
    DownloadLinkNotFound,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::SearchFailed { reason } => write!(f, "Search failed: {reason}"),
            Notice::ReadyIn { seconds } => {
                write!(f, "Download will be ready in {seconds} seconds")
            }
            Notice::DownloadStarted { file_name } => write!(f, "Downloading {file_name}"),
            Notice::DownloadSucceeded { file_name, path } => {
                write!(f, "Downloaded {file_name} to {path}")
            }
            Notice::DownloadFailed { file_name, reason } => {
                write!(f, "Download of {file_name} failed: {reason}")
            }
            Notice::DownloadLinkNotFound => write!(f, "Download link not found"),
        }
    }
}
