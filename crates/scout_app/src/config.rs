use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use scout_core::site::DEFAULT_BASE_URL;
use scout_engine::{DownloadSettings, EngineConfig, FetchSettings, PollSettings, DEFAULT_USER_AGENT};
use scout_logging::{scout_info, LogDestination};
use serde::Deserialize;

pub const CONFIG_FILENAME: &str = "scout.ron";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("could not parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
}

/// Settings read from `scout.ron`. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ScoutConfig {
    pub base_url: String,
    pub output_dir: PathBuf,
    pub poll_interval_ms: u64,
    pub max_poll_attempts: u32,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub max_page_bytes: u64,
    pub user_agent: String,
    pub log_destination: LogDestination,
}

impl Default for ScoutConfig {
    fn default() -> Self {
        let poll = PollSettings::default();
        let fetch = FetchSettings::default();
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            output_dir: PathBuf::from("downloads"),
            poll_interval_ms: poll.interval.as_millis() as u64,
            max_poll_attempts: poll.max_attempts,
            request_timeout_secs: fetch.request_timeout.as_secs(),
            connect_timeout_secs: fetch.connect_timeout.as_secs(),
            max_page_bytes: fetch.max_bytes,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            log_destination: LogDestination::Terminal,
        }
    }
}

impl ScoutConfig {
    /// Reads `path`. A missing file means defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let config = ron::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        scout_info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    pub fn engine_config(&self) -> EngineConfig {
        let fetch = FetchSettings {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            max_bytes: self.max_page_bytes,
            user_agent: self.user_agent.clone(),
            ..FetchSettings::default()
        };
        let poll = PollSettings {
            interval: Duration::from_millis(self.poll_interval_ms),
            max_attempts: self.max_poll_attempts,
        };
        let download = DownloadSettings {
            connect_timeout: fetch.connect_timeout,
            user_agent: self.user_agent.clone(),
            ..DownloadSettings::new(&self.output_dir)
        };
        EngineConfig {
            fetch,
            poll,
            download,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;
    use std::time::Duration;

    use pretty_assertions::assert_eq;
    use scout_logging::LogDestination;
    use tempfile::TempDir;

    use super::{ConfigError, ScoutConfig, CONFIG_FILENAME};

    #[test]
    fn missing_file_yields_defaults() {
        let temp = TempDir::new().unwrap();
        let config = ScoutConfig::load(&temp.path().join(CONFIG_FILENAME)).unwrap();
        assert_eq!(config, ScoutConfig::default());
    }

    #[test]
    fn partial_file_overrides_only_named_fields() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILENAME);
        fs::write(
            &path,
            r#"(
                base_url: "https://mirror.test",
                output_dir: "books",
                max_poll_attempts: 30,
                log_destination: Both,
            )"#,
        )
        .unwrap();

        let config = ScoutConfig::load(&path).unwrap();
        assert_eq!(config.base_url, "https://mirror.test");
        assert_eq!(config.output_dir, PathBuf::from("books"));
        assert_eq!(config.max_poll_attempts, 30);
        assert_eq!(config.log_destination, LogDestination::Both);
        assert_eq!(config.poll_interval_ms, ScoutConfig::default().poll_interval_ms);
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILENAME);
        fs::write(&path, "(base_url: ").unwrap();

        assert!(matches!(
            ScoutConfig::load(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn engine_config_carries_timeouts_and_polling() {
        let config = ScoutConfig {
            poll_interval_ms: 250,
            max_poll_attempts: 8,
            request_timeout_secs: 5,
            output_dir: PathBuf::from("out"),
            ..ScoutConfig::default()
        };

        let engine = config.engine_config();
        assert_eq!(engine.poll.interval, Duration::from_millis(250));
        assert_eq!(engine.poll.max_attempts, 8);
        assert_eq!(engine.fetch.request_timeout, Duration::from_secs(5));
        assert_eq!(engine.download.output_dir, PathBuf::from("out"));
    }
}
