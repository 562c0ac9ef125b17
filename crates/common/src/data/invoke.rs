use crate::error::Result;
use crate::messages::Message;
use bytes::Bytes;
use faststr::FastStr;
use serde::{Deserialize, Serialize};

/// Claude 3.7 Sonnet through the US cross-region inference profile.
pub const MODEL_ID: &str = "us.anthropic.claude-3-7-sonnet-20250219-v1:0";
pub const ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";
pub const MAX_TOKENS: u32 = 1000;
pub const APPLICATION_JSON: &str = "application/json";

/// Anthropic messages payload carried in the invoke body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagesBody {
    pub anthropic_version: FastStr,
    pub max_tokens:        u32,
    pub messages:          Vec<Message>,
}

impl MessagesBody {
    pub fn from_prompt(prompt: FastStr) -> Self {
        Self {
            anthropic_version: ANTHROPIC_VERSION.into(),
            max_tokens:        MAX_TOKENS,
            messages:          vec![Message::user(prompt)],
        }
    }
}

/// Input of one `InvokeModelWithResponseStream` call.
#[derive(Debug, Clone)]
pub struct InvokeModelRequest {
    pub model_id:     FastStr,
    pub content_type: FastStr,
    pub accept:       FastStr,
    pub body:         Bytes,
}

impl InvokeModelRequest {
    pub fn from_prompt(prompt: FastStr) -> Result<Self> {
        let body = serde_json::to_vec(&MessagesBody::from_prompt(prompt))?;
        Ok(Self {
            model_id:     MODEL_ID.into(),
            content_type: APPLICATION_JSON.into(),
            accept:       APPLICATION_JSON.into(),
            body:         body.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    #[test]
    fn test_invoke_body() {
        let request = InvokeModelRequest::from_prompt("2+2?".into()).unwrap();
        assert_eq!(request.model_id, MODEL_ID);
        assert_eq!(request.content_type, "application/json");
        assert_eq!(request.accept, "application/json");

        let body: Value = serde_json::from_slice(&request.body).unwrap();
        assert_eq!(
            body,
            json!({
                "anthropic_version": "bedrock-2023-05-31",
                "max_tokens": 1000,
                "messages": [{ "role": "user", "content": "2+2?" }],
            })
        );
    }

    #[test]
    fn test_prompt_is_not_altered() {
        let prompt = "  \"quoted\"\n\ttabs and ünïcødé  ";
        let request = InvokeModelRequest::from_prompt(prompt.into()).unwrap();
        let body = serde_json::from_slice::<MessagesBody>(&request.body).unwrap();
        assert_eq!(body.messages.len(), 1);
        assert_eq!(body.messages[0].content, prompt);
    }
}
