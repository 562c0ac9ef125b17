use crate::error::Result;
use crate::requests::PromptRequest;
use crate::response_stream::{ResponseStream, TEXT_PLAIN};
use crate::tools::create_error_frame;
use bytes::Bytes;
use common::data::APPLICATION_JSON;
use common::{InferenceBackend, text_deltas};
use futures_util::{StreamExt, pin_mut};
use http::{HeaderValue, StatusCode, header};
use tracing::{debug, error, info, warn};
use volo_http::{
    body::Body,
    response::Response,
    server::{
        IntoResponse,
        route::{MethodRouter, Router, any},
    },
    utils::Extension,
};

/// Runs one invocation to completion. `stream` is always ended on return.
///
/// A failure after text was already sent cannot change the committed
/// `text/plain` head; the error object is then appended to the partial text.
pub async fn handle_invocation<B>(backend: &B, body: Option<&[u8]>, stream: &mut ResponseStream)
where
    B: InferenceBackend,
{
    if let Err(err) = relay(backend, body, stream).await {
        error!(error = %err, "Error");
        stream.set_content_type(APPLICATION_JSON);
        if let Err(e) = stream.write(create_error_frame(&err)) {
            warn!("failed to write error response: {e}");
        }
        stream.end();
    }
}

async fn relay<B>(backend: &B, body: Option<&[u8]>, stream: &mut ResponseStream) -> Result<()>
where
    B: InferenceBackend,
{
    let prompt = PromptRequest::parse(body)?.into_prompt();
    stream.set_content_type(TEXT_PLAIN);

    let deltas = text_deltas(backend, prompt).await?;
    pin_mut!(deltas);
    let mut written = 0usize;
    while let Some(text) = deltas.next().await {
        let text = text?;
        stream.write(text.as_bytes())?;
        written += text.len();
    }
    debug!(bytes = written, "stream exhausted");
    stream.end();
    Ok(())
}

async fn invoke_handler<B>(Extension(backend): Extension<B>, body: Bytes) -> Response
where
    B: InferenceBackend + Clone + 'static,
{
    info!(len = body.len(), "recv invocation");
    let (mut stream, head) = ResponseStream::channel();
    tokio::spawn(async move {
        let body = (!body.is_empty()).then_some(&body[..]);
        handle_invocation(&backend, body, &mut stream).await;
    });
    head.into_response().await
}

async fn preflight_handler() -> Response {
    let response = http::Response::builder()
        .status(StatusCode::OK)
        .header(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")
        .header(header::ACCESS_CONTROL_ALLOW_METHODS, "*")
        .header(header::ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("Content-Type"))
        .header(header::ACCESS_CONTROL_MAX_AGE, "86400")
        .body(Body::empty());
    match response {
        Ok(response) => response,
        Err(e) => {
            error!("failed to build preflight response: {e}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// `OPTIONS` answers the CORS preflight; every other method relays.
fn relay_methods<B>() -> MethodRouter
where
    B: InferenceBackend + Clone + 'static,
{
    any(invoke_handler::<B>).options(preflight_handler)
}

/// Relays on every path, not only `/`.
pub fn invoke_router<B>() -> Router
where
    B: InferenceBackend + Clone + 'static,
{
    Router::new()
        .route("/", relay_methods::<B>())
        .fallback_service(relay_methods::<B>())
}
