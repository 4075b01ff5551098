use std::path::{Path, PathBuf};
use std::time::Duration;

use futures_util::StreamExt;
use scout_logging::{scout_debug, scout_info};

use crate::fetch::{map_reqwest_error, DEFAULT_USER_AGENT};
use crate::persist::{PersistError, StagedFile};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DownloadError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("http status {0}")]
    HttpStatus(u16),
    #[error("transfer failed: {0}")]
    Transfer(String),
    #[error("could not write file: {0}")]
    Write(String),
}

impl From<PersistError> for DownloadError {
    fn from(err: PersistError) -> Self {
        DownloadError::Write(err.to_string())
    }
}

/// The collaborator that moves bytes to disk for a resolved download URL.
#[async_trait::async_trait]
pub trait Downloader: Send + Sync {
    async fn download(&self, url: &str, file_name: &str) -> Result<PathBuf, DownloadError>;
}

#[derive(Debug, Clone)]
pub struct DownloadSettings {
    pub output_dir: PathBuf,
    pub connect_timeout: Duration,
    pub user_agent: String,
}

impl DownloadSettings {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            connect_timeout: Duration::from_secs(10),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Streams response bodies into the output directory over one shared
/// client. Bodies can be large, so only the connect phase is timed out.
#[derive(Debug, Clone)]
pub struct HttpDownloader {
    client: reqwest::Client,
    output_dir: PathBuf,
}

impl HttpDownloader {
    pub fn new(settings: DownloadSettings) -> Result<Self, DownloadError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .user_agent(settings.user_agent)
            .build()
            .map_err(|err| DownloadError::Transfer(err.to_string()))?;
        Ok(Self {
            client,
            output_dir: settings.output_dir,
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

fn transfer_error(err: reqwest::Error) -> DownloadError {
    DownloadError::Transfer(map_reqwest_error(err).to_string())
}

#[async_trait::async_trait]
impl Downloader for HttpDownloader {
    async fn download(&self, url: &str, file_name: &str) -> Result<PathBuf, DownloadError> {
        let parsed =
            reqwest::Url::parse(url).map_err(|err| DownloadError::InvalidUrl(err.to_string()))?;

        let response = self.client.get(parsed).send().await.map_err(transfer_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::HttpStatus(status.as_u16()));
        }

        let total = response.content_length();
        scout_info!("Downloading {} ({:?} bytes) from {}", file_name, total, url);

        let mut staged = StagedFile::create_in(&self.output_dir)?;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            staged.append(&chunk.map_err(transfer_error)?)?;
        }
        scout_debug!("Received {} bytes for {}", staged.written(), file_name);

        Ok(staged.commit(file_name)?)
    }
}
