use crate::error::{Error, Result};
use faststr::FastStr;
use std::fmt;
use std::net::SocketAddr;

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";

#[derive(Clone)]
pub struct AwsCredentials {
    pub access_key_id:     FastStr,
    pub secret_access_key: FastStr,
    pub session_token:     Option<FastStr>,
}

impl fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwsCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"[REDACTED]")
            .field("session_token", &self.session_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Where and as whom Bedrock is called.
///
/// Credentials are static: they are read once from the environment at
/// startup and never refreshed. A temporary `AWS_SESSION_TOKEN` therefore
/// stops working when it expires and the process has to be restarted with
/// fresh values. There is no instance-profile or SSO credential chain.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub region:      FastStr,
    /// Overrides `https://bedrock-runtime.{region}.amazonaws.com`.
    pub endpoint:    Option<FastStr>,
    pub credentials: AwsCredentials,
}

impl BackendConfig {
    pub fn endpoint(&self) -> FastStr {
        match &self.endpoint {
            Some(endpoint) => endpoint.clone(),
            None => format!("https://bedrock-runtime.{}.amazonaws.com", self.region).into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub listen_addr: SocketAddr,
    pub backend:     BackendConfig,
}

impl RelayConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let required = |key: &'static str| var(key).ok_or(Error::MissingEnv(key));

        let listen_addr = var("LISTEN_ADDR").unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_owned());
        let listen_addr = listen_addr
            .parse()
            .map_err(|_| Error::InvalidEnv("LISTEN_ADDR", listen_addr.into()))?;

        let region = var("AWS_REGION")
            .or_else(|| var("AWS_DEFAULT_REGION"))
            .ok_or(Error::MissingEnv("AWS_REGION"))?;

        let credentials = AwsCredentials {
            access_key_id:     required("AWS_ACCESS_KEY_ID")?.into(),
            secret_access_key: required("AWS_SECRET_ACCESS_KEY")?.into(),
            session_token:     var("AWS_SESSION_TOKEN").map(Into::into),
        };

        Ok(Self {
            listen_addr,
            backend: BackendConfig {
                region: region.into(),
                endpoint: var("BEDROCK_ENDPOINT")
                    .map(|e| e.trim_end_matches('/').to_owned().into()),
                credentials,
            },
        })
    }
}
