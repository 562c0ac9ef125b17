use crate::error::Result;
use faststr::FastStr;
use serde_json::Value;

pub const DEFAULT_PROMPT: &str = "Hello, Claude!";

#[derive(Default, Debug, Clone)]
pub struct PromptRequest {
    pub prompt: Option<FastStr>,
}

impl PromptRequest {
    /// A missing body is the same as an empty request. A present body must
    /// be valid JSON; only a string `prompt` member is picked up from it.
    pub fn parse(body: Option<&[u8]>) -> Result<Self> {
        let Some(body) = body else {
            return Ok(Self::default());
        };
        let value: Value = serde_json::from_slice(body)?;
        let prompt = value
            .get("prompt")
            .and_then(Value::as_str)
            .map(|prompt| FastStr::new(prompt));
        Ok(Self { prompt })
    }

    /// The prompt verbatim, or [`DEFAULT_PROMPT`] when it is absent or empty.
    pub fn into_prompt(self) -> FastStr {
        self.prompt
            .filter(|prompt| !prompt.is_empty())
            .unwrap_or_else(|| DEFAULT_PROMPT.into())
    }
}
