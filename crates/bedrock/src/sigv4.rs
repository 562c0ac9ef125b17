//! AWS Signature Version 4 for single-shot requests with an in-memory body.

use chrono::{DateTime, Utc};
use common::config::AwsCredentials;
use common::data::RequestData;
use common::error::{Error, Result};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";

pub struct SigningParams<'a> {
    pub credentials: &'a AwsCredentials,
    pub region:      &'a str,
    pub service:     &'a str,
    pub time:        DateTime<Utc>,
}

/// Adds `x-amz-date`, `x-amz-security-token` (when present) and
/// `authorization` to `request`. `host` is signed but left to the HTTP client.
pub fn sign(request: &mut RequestData, method: &str, params: &SigningParams<'_>) -> Result<()> {
    let amz_date = params.time.format("%Y%m%dT%H%M%SZ").to_string();
    let date = params.time.format("%Y%m%d").to_string();

    request.header("x-amz-date", amz_date.clone());
    if let Some(token) = &params.credentials.session_token {
        request.header("x-amz-security-token", token.clone());
    }

    let (canonical, signed_headers) = canonical_request(method, request);
    let scope = format!("{date}/{}/{}/aws4_request", params.region, params.service);
    let string_to_sign = format!(
        "{ALGORITHM}\n{amz_date}\n{scope}\n{:x}",
        Sha256::digest(canonical.as_bytes())
    );

    let key = signing_key(
        &params.credentials.secret_access_key,
        &date,
        params.region,
        params.service,
    )?;
    let signature = hex(&hmac(&key, string_to_sign.as_bytes())?);

    request.header(
        "authorization",
        format!(
            "{ALGORITHM} Credential={}/{scope}, SignedHeaders={signed_headers}, Signature={signature}",
            params.credentials.access_key_id
        ),
    );
    Ok(())
}

/// Returns the canonical request and its signed-header list.
fn canonical_request(method: &str, request: &RequestData) -> (String, String) {
    let mut headers: BTreeMap<&str, &str> = request
        .headers
        .iter()
        .filter(|(name, _)| name.as_str() != "authorization")
        .map(|(name, value)| (name.as_str(), value.as_str()))
        .collect();
    headers.insert("host", request.host());

    let canonical_headers: String = headers
        .iter()
        .map(|(name, value)| {
            let value = value.split_whitespace().collect::<Vec<_>>().join(" ");
            format!("{name}:{value}\n")
        })
        .collect();
    let signed_headers = headers.keys().copied().collect::<Vec<_>>().join(";");

    let canonical = format!(
        "{method}\n{}\n\n{canonical_headers}\n{signed_headers}\n{:x}",
        canonical_uri(&request.path),
        Sha256::digest(&request.body)
    );
    (canonical, signed_headers)
}

/// Every segment of the already encoded path is encoded again, which is what
/// all services except S3 expect.
fn canonical_uri(path: &str) -> String {
    if path.is_empty() {
        return "/".to_owned();
    }
    path.split('/').map(uri_encode).collect::<Vec<_>>().join("/")
}

/// RFC 3986 encoding of everything outside the unreserved set.
pub(crate) fn uri_encode(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

fn signing_key(secret: &str, date: &str, region: &str, service: &str) -> Result<Vec<u8>> {
    let k_date = hmac(format!("AWS4{secret}").as_bytes(), date.as_bytes())?;
    let k_region = hmac(&k_date, region.as_bytes())?;
    let k_service = hmac(&k_region, service.as_bytes())?;
    hmac(&k_service, b"aws4_request")
}

fn hmac(key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    let mut mac =
        HmacSha256::new_from_slice(key).map_err(|e| Error::Signing(e.to_string().into()))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use chrono::TimeZone;

    const SECRET: &str = "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY";

    fn credentials(session_token: Option<&'static str>) -> AwsCredentials {
        AwsCredentials {
            access_key_id:     "AKIDEXAMPLE".into(),
            secret_access_key: SECRET.into(),
            session_token:     session_token.map(Into::into),
        }
    }

    #[test]
    fn test_signing_key() {
        let key = signing_key(SECRET, "20120215", "us-east-1", "iam").unwrap();
        assert_eq!(
            hex(&key),
            "f4780e2d9f65fa895f9c67b32ce1baf0b0d8a43505a000a1a9e090d414db404d"
        );
    }

    #[test]
    fn test_get_vanilla() {
        let credentials = credentials(None);
        let params = SigningParams {
            credentials: &credentials,
            region:      "us-east-1",
            service:     "service",
            time:        Utc.with_ymd_and_hms(2015, 8, 30, 12, 36, 0).unwrap(),
        };
        let mut request = RequestData::new("https://example.amazonaws.com", "/", Bytes::new());
        sign(&mut request, "GET", &params).unwrap();

        assert_eq!(request.headers["x-amz-date"], "20150830T123600Z");
        assert_eq!(
            request.headers["authorization"],
            "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20150830/us-east-1/service/aws4_request, \
             SignedHeaders=host;x-amz-date, \
             Signature=5fa00fa31553b73ebf1942676e86291e8372ff2a2260956d9b8aae1d763fbf31"
        );
    }

    #[test]
    fn test_session_token_is_signed() {
        let credentials = credentials(Some("token/with+chars"));
        let params = SigningParams {
            credentials: &credentials,
            region:      "us-west-2",
            service:     "bedrock",
            time:        Utc.with_ymd_and_hms(2025, 2, 19, 0, 0, 0).unwrap(),
        };
        let mut request = RequestData::new(
            "https://bedrock-runtime.us-west-2.amazonaws.com",
            "/model/a%3A0/invoke-with-response-stream",
            Bytes::from_static(b"{}"),
        );
        request.header("content-type", "application/json");
        sign(&mut request, "POST", &params).unwrap();

        assert_eq!(request.headers["x-amz-security-token"], "token/with+chars");
        let authorization = request.headers["authorization"].as_str();
        assert!(authorization.contains("/20250219/us-west-2/bedrock/aws4_request"));
        assert!(authorization.contains(
            "SignedHeaders=content-type;host;x-amz-date;x-amz-security-token,"
        ));
    }

    #[test]
    fn test_canonical_uri_double_encodes() {
        assert_eq!(canonical_uri("/"), "/");
        assert_eq!(
            canonical_uri("/model/us.anthropic.claude-3-7-sonnet-20250219-v1%3A0/invoke"),
            "/model/us.anthropic.claude-3-7-sonnet-20250219-v1%253A0/invoke"
        );
        assert_eq!(uri_encode("a:b c"), "a%3Ab%20c");
    }

    #[test]
    fn test_canonical_headers_collapse_whitespace() {
        let mut request = RequestData::new("https://example.amazonaws.com", "/", Bytes::new());
        request.header("My-Header", "  a   b  ");
        let (canonical, signed) = canonical_request("GET", &request);
        assert!(canonical.contains("my-header:a b\n"));
        assert_eq!(signed, "host;my-header");
    }
}
