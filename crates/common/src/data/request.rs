use bytes::Bytes;
use faststr::FastStr;
use std::collections::BTreeMap;

/// A fully described outbound POST: what gets signed is exactly what gets sent.
#[derive(Debug, Clone)]
pub struct RequestData {
    /// `scheme://host[:port]` without a trailing slash.
    pub endpoint: FastStr,
    /// Percent-encoded absolute path.
    pub path:     FastStr,
    /// Lowercase header names, kept sorted for canonicalization.
    pub headers:  BTreeMap<FastStr, FastStr>,
    pub body:     Bytes,
}

impl RequestData {
    pub fn new<E, P>(endpoint: E, path: P, body: Bytes) -> Self
    where
        E: Into<FastStr>,
        P: Into<FastStr>,
    {
        Self {
            endpoint: endpoint.into(),
            path: path.into(),
            headers: Default::default(),
            body,
        }
    }

    pub fn header<K, V>(&mut self, name: K, value: V)
    where
        K: AsRef<str>,
        V: Into<FastStr>,
    {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase().into(), value.into());
    }

    pub fn url(&self) -> String {
        format!("{}{}", self.endpoint, self.path)
    }

    /// The authority as the HTTP client sends it in `Host`, so without the
    /// scheme's default port.
    pub fn host(&self) -> &str {
        let (scheme, rest) = self
            .endpoint
            .split_once("://")
            .unwrap_or(("", self.endpoint.as_str()));
        let authority = rest.split('/').next().unwrap_or(rest);
        let default_port = match scheme.to_ascii_lowercase().as_str() {
            "https" => ":443",
            "http" => ":80",
            _ => return authority,
        };
        authority.strip_suffix(default_port).unwrap_or(authority)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_and_url() {
        let mut data = RequestData::new(
            "https://bedrock-runtime.us-east-1.amazonaws.com",
            "/model/a%3A0/invoke",
            Bytes::new(),
        );
        data.header("Content-Type", "application/json");
        assert_eq!(data.host(), "bedrock-runtime.us-east-1.amazonaws.com");
        assert_eq!(
            data.url(),
            "https://bedrock-runtime.us-east-1.amazonaws.com/model/a%3A0/invoke"
        );
        assert!(data.headers.contains_key("content-type"));
    }

    #[test]
    fn test_host_keeps_port() {
        let data = RequestData::new("http://127.0.0.1:4566", "/", Bytes::new());
        assert_eq!(data.host(), "127.0.0.1:4566");
    }

    #[test]
    fn test_host_drops_default_port() {
        let host = |endpoint: &'static str| {
            RequestData::new(endpoint, "/", Bytes::new())
                .host()
                .to_owned()
        };
        assert_eq!(
            host("https://bedrock-runtime.us-east-1.amazonaws.com:443"),
            "bedrock-runtime.us-east-1.amazonaws.com"
        );
        assert_eq!(host("http://localhost:80"), "localhost");
        assert_eq!(host("https://[::1]:443"), "[::1]");
        assert_eq!(host("https://localhost:8443"), "localhost:8443");
        assert_eq!(host("http://localhost:443"), "localhost:443");
    }
}
