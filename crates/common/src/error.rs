use faststr::FastStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    MsgError(FastStr),
    #[error("Reqwest error: {0}")]
    ReqwestError(#[from] reqwest::Error),
    #[error("Invalid response data: {0} status: {1}")]
    InvalidResponseData(FastStr, u16),
    #[error("Invalid response event-stream: {0}")]
    InvalidEventStream(FastStr),
    #[error("{kind}: {message}")]
    Exception { kind: FastStr, message: FastStr },
    #[error("serde error: {0}")]
    SerdeError(#[from] serde_json::Error),
    #[error("base64 error: {0}")]
    Base64Error(#[from] base64::DecodeError),
    #[error("missing environment variable: {0}")]
    MissingEnv(&'static str),
    #[error("invalid environment variable {0}: {1}")]
    InvalidEnv(&'static str, FastStr),
    #[error("failed to sign request: {0}")]
    Signing(FastStr),
}

pub type Result<T> = std::result::Result<T, Error>;
