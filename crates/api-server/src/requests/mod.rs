mod prompt;

pub use prompt::{DEFAULT_PROMPT, PromptRequest};
