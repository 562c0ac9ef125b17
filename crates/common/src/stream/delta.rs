use crate::data::{BackendEvent, InvokeModelRequest};
use crate::error::Result;
use crate::proxy::{InferenceBackend, PayloadPart};
use async_stream::try_stream;
use faststr::FastStr;
use futures_util::{Stream, StreamExt, pin_mut};
use tracing::debug;

/// Opens one streaming invocation for `prompt` and yields the text of every
/// text delta in arrival order.
///
/// Errors opening the call are returned directly; transport errors while
/// reading end the stream with that error. Chunks that carry no payload or
/// don't decode are skipped.
pub async fn text_deltas<B>(
    backend: &B,
    prompt: FastStr,
) -> Result<impl Stream<Item = Result<FastStr>> + Send + 'static>
where
    B: InferenceBackend,
{
    let request = InvokeModelRequest::from_prompt(prompt)?;
    debug!(model_id = %request.model_id, "invoke model with response stream");
    let parts = backend.invoke_with_response_stream(request).await?;
    Ok(deltas_of(parts))
}

fn deltas_of<S>(parts: S) -> impl Stream<Item = Result<FastStr>> + Send + 'static
where
    S: Stream<Item = Result<PayloadPart>> + Send + 'static,
{
    try_stream! {
        pin_mut!(parts);
        while let Some(part) = parts.next().await {
            let Some(bytes) = part?.bytes else {
                continue;
            };
            match BackendEvent::decode(&bytes) {
                Some(event) => {
                    if let Some(text) = event.into_text() {
                        yield text;
                    }
                }
                None => debug!(len = bytes.len(), "skip undecodable chunk"),
            }
        }
    }
}
