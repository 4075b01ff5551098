//! Scout core: pure scrape orchestrator, wire protocol and view-model helpers.
mod effect;
mod filename;
mod message;
mod msg;
pub mod site;
mod state;
mod update;
mod view_model;

pub use effect::{Effect, Notice, PageTarget, Script, SurfaceSlot};
pub use filename::{download_file_name, FALLBACK_FILE_NAME};
pub use message::{decode_message, Inbound, PageMessage};
pub use msg::{DownloadOutcome, Msg};
pub use state::{
    AppState, DownloadCandidate, DownloadStatus, Phase, ScrapeSession, SearchResult, SessionId,
};
pub use update::update;
pub use view_model::{AppViewModel, DownloadView, LinkStatus, ResultRowView};
