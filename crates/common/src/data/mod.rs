mod event;
mod invoke;
mod request;

pub use event::{BackendEvent, Delta};
pub use invoke::{
    ANTHROPIC_VERSION, APPLICATION_JSON, InvokeModelRequest, MAX_TOKENS, MODEL_ID, MessagesBody,
};
pub use request::RequestData;
