use crate::data::InvokeModelRequest;
use crate::error::Result;
use bytes::Bytes;
use futures_util::Stream;

/// One raw chunk of a streaming invocation, before any JSON decoding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PayloadPart {
    pub bytes: Option<Bytes>,
}

impl PayloadPart {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: Some(bytes.into()),
        }
    }
}

/// A hosted model that answers one request with a stream of raw chunks.
///
/// Implementations are long-lived and shared between concurrent
/// invocations; each call is independent.
pub trait InferenceBackend: Send + Sync {
    fn invoke_with_response_stream(
        &self,
        request: InvokeModelRequest,
    ) -> impl Future<Output = Result<impl Stream<Item = Result<PayloadPart>> + Send + 'static>> + Send;
}
