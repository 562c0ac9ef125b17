use crate::error::{Error, Result};
use bytes::Bytes;
use faststr::FastStr;
use http::{StatusCode, header};
use http_body::Frame;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::sync::oneshot;
use tokio_stream::{StreamExt, wrappers::UnboundedReceiverStream};
use tracing::{debug, error, warn};
use volo_http::{
    body::Body,
    response::Response,
    server::IntoResponse,
};

pub const TEXT_PLAIN: &str = "text/plain";

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Write side of one streamed response.
///
/// `set_content_type` only stages a value; the staged value is committed
/// together with the first written byte, or at `end` if nothing was written.
/// After that the head is on the wire and can no longer change.
#[derive(Debug)]
pub struct ResponseStream {
    content_type: FastStr,
    head:         Option<oneshot::Sender<FastStr>>,
    body:         Option<UnboundedSender<Bytes>>,
}

/// Read side handed to the HTTP layer.
#[derive(Debug)]
pub struct ResponseHead {
    pub(crate) content_type: oneshot::Receiver<FastStr>,
    pub(crate) body:         UnboundedReceiver<Bytes>,
}

impl ResponseStream {
    pub fn channel() -> (Self, ResponseHead) {
        let (head_tx, head_rx) = oneshot::channel();
        let (body_tx, body_rx) = unbounded_channel();
        let stream = Self {
            content_type: TEXT_PLAIN.into(),
            head:         Some(head_tx),
            body:         Some(body_tx),
        };
        let head = ResponseHead {
            content_type: head_rx,
            body:         body_rx,
        };
        (stream, head)
    }

    pub fn set_content_type(&mut self, content_type: &str) {
        if self.head.is_some() {
            self.content_type = content_type.to_owned().into();
        } else {
            warn!(
                committed = %self.content_type,
                requested = content_type,
                "content type already sent, keeping the committed one"
            );
        }
    }

    #[cfg(test)]
    pub(crate) fn content_type(&self) -> &str {
        &self.content_type
    }

    #[cfg(test)]
    pub(crate) fn is_committed(&self) -> bool {
        self.head.is_none()
    }

    #[cfg(test)]
    pub(crate) fn is_ended(&self) -> bool {
        self.body.is_none()
    }

    /// Appends `chunk` to the body and flushes it to the caller.
    pub fn write<T: AsRef<[u8]>>(&mut self, chunk: T) -> Result<()> {
        if self.body.is_none() {
            return Err(Error::StreamClosed);
        }
        self.commit();
        let chunk = Bytes::copy_from_slice(chunk.as_ref());
        match &self.body {
            Some(body) => body.send(chunk).map_err(|_| Error::StreamClosed),
            None => Err(Error::StreamClosed),
        }
    }

    /// Closes the body. Further writes fail.
    pub fn end(&mut self) {
        self.commit();
        if self.body.take().is_none() {
            warn!("response stream already ended");
        }
    }

    fn commit(&mut self) {
        if let Some(head) = self.head.take() {
            debug!(content_type = %self.content_type, "commit response head");
            if head.send(self.content_type.clone()).is_err() {
                debug!("response head receiver dropped");
            }
        }
    }
}

impl ResponseHead {
    /// Waits for the head to be committed, then streams the body as it is
    /// written.
    pub async fn into_response(self) -> Response {
        let Self { content_type, body } = self;
        let content_type = content_type.await.unwrap_or_else(|_| TEXT_PLAIN.into());
        let body = UnboundedReceiverStream::new(body).map(|bytes| Ok::<_, BoxError>(Frame::data(bytes)));

        let response = http::Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, content_type.as_str())
            .header(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")
            .body(Body::from_stream(body));
        match response {
            Ok(response) => response,
            Err(e) => {
                error!("failed to build response: {e}");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}
