use faststr::FastStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid Request Body: {0}")]
    InvalidRequestBody(#[from] serde_json::Error),

    #[error("{0}")]
    Backend(#[from] common::error::Error),

    #[error("response stream closed")]
    StreamClosed,

    #[error("server error: {0}")]
    Server(FastStr),
}

pub type Result<T> = std::result::Result<T, Error>;
