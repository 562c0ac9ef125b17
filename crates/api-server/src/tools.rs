use faststr::FastStr;
use serde_json::json;
use std::fmt::Display;

pub const ERROR_MESSAGE: &str = "An error occurred while processing your request";

/// The single JSON body written on the failure path.
#[inline]
pub fn create_error_frame(details: impl Display) -> FastStr {
    json!({
        "error": ERROR_MESSAGE,
        "details": details.to_string(),
    })
    .to_string()
    .into()
}
