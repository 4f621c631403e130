use crate::{ClientError, ClientErrorResult};

use reqwest::Response;
use serde::de::DeserializeOwned;
use serde_json::Value;

const CODE_FIELDS: &[&str] = &["error_code", "code", "error"];
const MESSAGE_FIELDS: &[&str] = &["error_description", "message", "msg", "detail"];

/// Pass successful responses through, turn everything else into
/// [`ClientError::Status`] with whatever code and message the body carries.
pub(crate) async fn ensure_success(response: Response) -> ClientErrorResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(error_from_body(status.as_u16(), &body))
}

/// Read and decode a JSON body after the status check.
pub(crate) async fn json_body<T: DeserializeOwned>(response: Response) -> ClientErrorResult<T> {
    let response = ensure_success(response).await?;
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Both the auth service and the row store answer with flat JSON error
/// objects, but they disagree on field names.
pub(crate) fn error_from_body(status: u16, body: &str) -> ClientError {
    let parsed = serde_json::from_str::<Value>(body).ok();
    let field = |names: &[&str]| {
        parsed
            .as_ref()
            .and_then(|value| names.iter().find_map(|name| value.get(*name)))
            .map(value_as_text)
    };

    let code = field(CODE_FIELDS).unwrap_or_else(|| "UNKNOWN".to_string());
    let message = field(MESSAGE_FIELDS).unwrap_or_else(|| {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            format!("HTTP {status}")
        } else {
            trimmed.to_string()
        }
    });

    ClientError::status(status, code, message)
}

fn value_as_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Total from a `Content-Range` header such as `0-24/3573` or `*/0`.
pub(crate) fn total_from_content_range(header: Option<&str>) -> Option<u64> {
    header?.rsplit_once('/')?.1.trim().parse().ok()
}
