//! Scout engine: browser surfaces, page scripts and download execution.
mod channel;
mod decode;
mod download;
mod engine;
mod extract;
mod fetch;
mod persist;
mod poll;
mod runner;
pub mod scripts;
mod surface;
mod types;

pub use channel::{ChannelSink, MessageSink};
pub use decode::{decode_html, DecodedHtml};
pub use download::{DownloadError, DownloadSettings, Downloader, HttpDownloader};
pub use engine::{EngineConfig, EngineError, EngineHandle, EngineStopped};
pub use extract::{
    discover_download_link, extract_initial_results, extract_slow_link, find_countdown,
    page_identifier, Discovery, DiscoveryRule,
};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher, DEFAULT_USER_AGENT};
pub use persist::{ensure_output_dir, PersistError, StagedFile};
pub use poll::{poll_until, PollOutcome, PollSettings};
pub use runner::PageRunner;
pub use surface::{BrowserSurface, HttpSurface};
pub use types::{
    EngineEvent, FailureKind, FetchMetadata, FetchOutput, LoadError, PageSnapshot, SurfaceEvent,
};
