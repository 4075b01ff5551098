//! Wire protocol between page scripts and the orchestrator.
//!
//! Scripts post JSON objects tagged by `type`. Anything that does not parse
//! into [`PageMessage`] becomes [`Inbound::Malformed`] instead of an error, so
//! the dispatch loop never has to unwind on bad input.

use serde::{Deserialize, Serialize};

use crate::SearchResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum PageMessage {
    InitialResults { payload: Vec<SearchResult> },
    SlowLink { index: usize, payload: String },
    DownloadLink { payload: String },
    Timer { payload: String },
    DiscoveryTimeout { attempts: u32 },
}

impl PageMessage {
    /// Wire name of the variant, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            PageMessage::InitialResults { .. } => "initial-results",
            PageMessage::SlowLink { .. } => "slow-link",
            PageMessage::DownloadLink { .. } => "download-link",
            PageMessage::Timer { .. } => "timer",
            PageMessage::DiscoveryTimeout { .. } => "discovery-timeout",
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Message(PageMessage),
    Malformed { raw: String, reason: String },
}

pub fn decode_message(raw: &str) -> Inbound {
    match serde_json::from_str::<PageMessage>(raw) {
        Ok(message) => Inbound::Message(message),
        Err(err) => Inbound::Malformed {
            raw: raw.to_string(),
            reason: err.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::{decode_message, Inbound, PageMessage};

    #[test]
    fn slow_link_decodes_with_index() {
        let inbound =
            decode_message(r#"{"type":"slow-link","payload":"https://x/slow_download/1","index":3}"#);
        assert_eq!(
            inbound,
            Inbound::Message(PageMessage::SlowLink {
                index: 3,
                payload: "https://x/slow_download/1".to_string(),
            })
        );
    }

    #[test]
    fn initial_results_accept_missing_optional_fields() {
        let inbound = decode_message(
            r#"{"type":"initial-results","payload":[{"title":"A","url":"https://x/md5/a","image":null}]}"#,
        );
        let Inbound::Message(PageMessage::InitialResults { payload }) = inbound else {
            panic!("expected initial results, got {inbound:?}");
        };
        assert_eq!(payload.len(), 1);
        assert_eq!(payload[0].image, None);
        assert_eq!(payload[0].slow_link, None);
    }

    #[test]
    fn unknown_type_is_malformed() {
        let inbound = decode_message(r#"{"type":"popup","payload":"x"}"#);
        assert!(matches!(inbound, Inbound::Malformed { .. }));
    }

    #[test]
    fn negative_index_is_malformed() {
        let inbound = decode_message(r#"{"type":"slow-link","payload":"x","index":-1}"#);
        assert!(matches!(inbound, Inbound::Malformed { .. }));
    }

    #[test]
    fn garbage_is_malformed_and_keeps_raw_text() {
        match decode_message("not json") {
            Inbound::Malformed { raw, reason } => {
                assert_eq!(raw, "not json");
                assert!(!reason.is_empty());
            }
            other => panic!("expected malformed, got {other:?}"),
        }
    }

    #[test]
    fn encoded_timer_uses_kebab_tag() {
        let json = PageMessage::Timer {
            payload: "30".to_string(),
        }
        .to_json()
        .unwrap();
        assert_eq!(json, r#"{"type":"timer","payload":"30"}"#);
    }
}
