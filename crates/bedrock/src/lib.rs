mod client;
pub mod eventstream;
mod sigv4;

pub use client::{BedrockClient, build_http_client};
