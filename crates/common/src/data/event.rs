use faststr::FastStr;
use serde::Deserialize;

/// Anthropic streaming event, as carried in one Bedrock chunk.
///
/// Only `content_block_delta` carries anything the relay forwards; every
/// other kind is recognised so it can be dropped without being treated as
/// malformed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BackendEvent {
    MessageStart,
    ContentBlockStart,
    ContentBlockDelta { delta: Delta },
    ContentBlockStop,
    MessageDelta,
    MessageStop,
    Ping,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Delta {
    TextDelta {
        #[serde(default)]
        text: Option<FastStr>,
    },
    #[serde(other)]
    Other,
}

impl BackendEvent {
    /// Decodes a raw chunk. Anything that is not UTF-8 JSON with a `type`
    /// field yields `None`.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        let text = std::str::from_utf8(bytes).ok()?;
        serde_json::from_str(text).ok()
    }

    /// The fragment to forward: a non-empty `text_delta` inside a
    /// `content_block_delta`.
    pub fn into_text(self) -> Option<FastStr> {
        match self {
            Self::ContentBlockDelta {
                delta: Delta::TextDelta { text: Some(text) },
            } if !text.is_empty() => Some(text),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(raw: &str) -> Option<FastStr> {
        BackendEvent::decode(raw.as_bytes()).and_then(BackendEvent::into_text)
    }

    #[test]
    fn test_text_delta() {
        let raw = r#"{"type":"content_block_delta","index":0,"delta":{"type":"text_delta","text":"Hello"}}"#;
        assert_eq!(text_of(raw).as_deref(), Some("Hello"));
    }

    #[test]
    fn test_metadata_events_are_recognised() {
        let start = r#"{"type":"message_start","message":{"id":"msg_1","role":"assistant","content":[],"usage":{"input_tokens":10}}}"#;
        assert_eq!(
            BackendEvent::decode(start.as_bytes()),
            Some(BackendEvent::MessageStart)
        );

        let stop = r#"{"type":"message_stop","amazon-bedrock-invocationMetrics":{"inputTokenCount":10,"outputTokenCount":3}}"#;
        assert_eq!(
            BackendEvent::decode(stop.as_bytes()),
            Some(BackendEvent::MessageStop)
        );
        assert_eq!(text_of(stop), None);

        let unknown = r#"{"type":"something_new","x":1}"#;
        assert_eq!(
            BackendEvent::decode(unknown.as_bytes()),
            Some(BackendEvent::Unknown)
        );
    }

    #[test]
    fn test_filter_is_exact() {
        // empty text
        assert_eq!(
            text_of(r#"{"type":"content_block_delta","delta":{"type":"text_delta","text":""}}"#),
            None
        );
        // missing and null text
        assert_eq!(
            text_of(r#"{"type":"content_block_delta","delta":{"type":"text_delta"}}"#),
            None
        );
        assert_eq!(
            text_of(r#"{"type":"content_block_delta","delta":{"type":"text_delta","text":null}}"#),
            None
        );
        // tool input deltas are not text
        assert_eq!(
            text_of(
                r#"{"type":"content_block_delta","delta":{"type":"input_json_delta","partial_json":"{\"a\""}}"#
            ),
            None
        );
        // text outside a content_block_delta
        assert_eq!(
            text_of(r#"{"type":"content_block_start","delta":{"type":"text_delta","text":"x"}}"#),
            None
        );
    }

    #[test]
    fn test_malformed_chunks_are_skipped() {
        assert_eq!(BackendEvent::decode(b""), None);
        assert_eq!(BackendEvent::decode(b"not json"), None);
        assert_eq!(BackendEvent::decode(&[0xff, 0xfe, 0x00]), None);
        assert_eq!(BackendEvent::decode(br#"{"no_type":true}"#), None);
    }
}
