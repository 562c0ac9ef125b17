use anyhow::Result;
use bedrock::BedrockClient;
use common::config::RelayConfig;
use dotenvy::dotenv;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let _guard = api_server::logging_stdout();
    dotenv().ok();

    let config = RelayConfig::from_env()?;
    info!(region = %config.backend.region, endpoint = %config.backend.endpoint(), "bedrock backend");

    let client = BedrockClient::new(config.backend)?;
    api_server::run_api_server(config.listen_addr, client).await?;

    Ok(())
}
