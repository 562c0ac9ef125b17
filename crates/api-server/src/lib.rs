use crate::error::{Error, Result};
use bedrock::BedrockClient;
pub use common::logging_stdout;
use std::net::SocketAddr;
use tracing::info;
use volo_http::Address;
use volo_http::server::{Router, Server};
use volo_http::utils::Extension;

pub mod error;
pub mod handlers;
pub mod requests;
pub mod response_stream;
pub mod tools;

pub async fn run_api_server(addr: SocketAddr, client: BedrockClient) -> Result<()> {
    let app = Router::new()
        .merge(handlers::invoke_router::<BedrockClient>())
        .layer(Extension(client));
    info!("relay listening on {addr}");
    let addr = Address::from(addr);
    Server::new(app)
        .run(addr)
        .await
        .map_err(|e| Error::Server(e.to_string().into()))
}
