use crate::eventstream::{Message, MessageDecoder};
use crate::sigv4::{SigningParams, sign, uri_encode};
use async_stream::try_stream;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use chrono::Utc;
use common::config::BackendConfig;
use common::data::{InvokeModelRequest, RequestData};
use common::error::{Error, Result};
use common::proxy::{InferenceBackend, PayloadPart};
use faststr::FastStr;
use futures_util::{Stream, StreamExt, pin_mut};
use reqwest::{Client as ReqwestClient, RequestBuilder};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

const SERVICE: &str = "bedrock";

#[inline]
pub fn build_http_client() -> Result<ReqwestClient> {
    let timeout = 10;
    let client = ReqwestClient::builder()
        .connect_timeout(Duration::from_secs(timeout))
        .build()?;
    Ok(client)
}

/// Bedrock runtime client. Cheap to clone; one instance serves every
/// invocation for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct BedrockClient {
    http:     ReqwestClient,
    endpoint: FastStr,
    config:   Arc<BackendConfig>,
}

impl BedrockClient {
    pub fn new(config: BackendConfig) -> Result<Self> {
        Ok(Self {
            http:     build_http_client()?,
            endpoint: config.endpoint(),
            config:   Arc::new(config),
        })
    }

    fn prepare(&self, request: InvokeModelRequest) -> Result<RequestData> {
        let path = format!(
            "/model/{}/invoke-with-response-stream",
            uri_encode(&request.model_id)
        );
        let mut data = RequestData::new(self.endpoint.clone(), path, request.body);
        data.header("content-type", request.content_type);
        data.header("x-amzn-bedrock-accept", request.accept);

        let params = SigningParams {
            credentials: &self.config.credentials,
            region:      &self.config.region,
            service:     SERVICE,
            time:        Utc::now(),
        };
        sign(&mut data, "POST", &params)?;
        Ok(data)
    }
}

impl InferenceBackend for BedrockClient {
    async fn invoke_with_response_stream(
        &self,
        request: InvokeModelRequest,
    ) -> Result<impl Stream<Item = Result<PayloadPart>> + Send + 'static> {
        let data = self.prepare(request)?;
        debug!(url = %data.url(), "invoke-with-response-stream");

        let response = request_builder(data, &self.http).send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await?;
            warn!(status = status.as_u16(), body = %text, "bedrock rejected the request");
            return Err(Error::InvalidResponseData(text.into(), status.as_u16()));
        }
        Ok(chunk_stream(response))
    }
}

fn request_builder(data: RequestData, client: &ReqwestClient) -> RequestBuilder {
    let url = data.url();
    let RequestData { headers, body, .. } = data;
    let mut builder = client.post(url);
    for (k, v) in headers {
        builder = builder.header(k.as_str(), v.as_str());
    }
    builder.body(body)
}

fn chunk_stream(response: reqwest::Response) -> impl Stream<Item = Result<PayloadPart>> + Send + 'static {
    try_stream! {
        let body = response.bytes_stream();
        pin_mut!(body);
        let mut decoder = MessageDecoder::default();
        while let Some(bytes) = body.next().await {
            decoder.extend(&bytes?);
            while let Some(message) = decoder.decode()? {
                if let Some(part) = payload_part(message)? {
                    yield part;
                }
            }
        }
        decoder.finish()?;
    }
}

#[derive(Debug, Deserialize)]
struct ChunkPayload {
    bytes: Option<FastStr>,
}

#[derive(Debug, Deserialize)]
struct ExceptionPayload {
    message: Option<FastStr>,
}

/// Maps one frame to a chunk, nothing, or the error the backend reported.
fn payload_part(message: Message) -> Result<Option<PayloadPart>> {
    match message.header_str(":message-type") {
        Some("event") => match message.header_str(":event-type") {
            Some("chunk") => {
                let chunk: ChunkPayload = serde_json::from_slice(&message.payload)?;
                let bytes = match chunk.bytes {
                    Some(encoded) => Some(Bytes::from(STANDARD.decode(encoded.as_bytes())?)),
                    None => None,
                };
                Ok(Some(PayloadPart { bytes }))
            }
            other => {
                debug!(event_type = ?other, "ignore event");
                Ok(None)
            }
        },
        Some("exception") => {
            let kind = message
                .header_str(":exception-type")
                .unwrap_or("exception")
                .to_owned();
            let text = serde_json::from_slice::<ExceptionPayload>(&message.payload)
                .ok()
                .and_then(|p| p.message)
                .unwrap_or_else(|| String::from_utf8_lossy(&message.payload).into_owned().into());
            Err(Error::Exception {
                kind:    kind.into(),
                message: text,
            })
        }
        Some("error") => Err(Error::Exception {
            kind:    message
                .header_str(":error-code")
                .unwrap_or("error")
                .to_owned()
                .into(),
            message: message
                .header_str(":error-message")
                .unwrap_or_default()
                .to_owned()
                .into(),
        }),
        other => Err(Error::InvalidEventStream(
            format!("unexpected message type: {other:?}").into(),
        )),
    }
}
