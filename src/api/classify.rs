//! Classification of raw HTTP outcomes
//!
//! | Condition | Outcome |
//! |-----------|---------|
//! | HTTP 401 | SessionExpired |
//! | HTTP 400 with challenge/checkpoint marker | SessionExpired |
//! | HTTP 400 with login-required marker | SessionExpired |
//! | HTTP 400 otherwise | ApiError |
//! | HTTP 429 | RateLimited |
//! | HTTP 404 | NotFound |
//! | Other non-200 | ApiError |
//! | HTTP 200, body not JSON | ApiError |
//! | HTTP 200, JSON body | decoded payload |

use crate::api::ApiFailure;
use serde_json::Value;

/// Maximum number of characters kept in failure details
pub const DETAIL_LIMIT: usize = 200;

const CHALLENGE_MARKERS: &[&str] = &["challenge_required", "checkpoint_required"];
const LOGIN_MARKER: &str = "login_required";

/// Classifies a response by status and body
///
/// Pure: no I/O, so every row of the table above is testable directly.
///
/// # Arguments
///
/// * `status` - HTTP status code
/// * `body` - Raw response body
/// * `path` - API path that was requested, reported for 404s
pub fn classify_response(status: u16, body: &str, path: &str) -> Result<Value, ApiFailure> {
    match status {
        200 => serde_json::from_str(body).map_err(|_| {
            tracing::debug!(len = body.len(), preview = %truncate_detail(body), "Non-JSON body");
            ApiFailure::ApiError {
                status,
                detail: "non-JSON response".to_string(),
            }
        }),
        400 => Err(classify_bad_request(body)),
        401 => Err(ApiFailure::SessionExpired(
            "Session expired (401)".to_string(),
        )),
        404 => Err(ApiFailure::NotFound {
            path: path.to_string(),
        }),
        429 => Err(ApiFailure::RateLimited),
        _ => Err(ApiFailure::ApiError {
            status,
            detail: truncate_detail(body),
        }),
    }
}

/// The platform reports auth walls as 400s with a marker in `message`
fn classify_bad_request(body: &str) -> ApiFailure {
    let message = match serde_json::from_str::<Value>(body) {
        Ok(json) => json
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        Err(_) => {
            return ApiFailure::ApiError {
                status: 400,
                detail: truncate_detail(body),
            }
        }
    };

    if CHALLENGE_MARKERS.iter().any(|m| message.contains(m)) {
        return ApiFailure::SessionExpired(format!(
            "Challenge required: {}",
            truncate_detail(&message)
        ));
    }

    if message.contains(LOGIN_MARKER) {
        return ApiFailure::SessionExpired(format!(
            "Login required: {}",
            truncate_detail(&message)
        ));
    }

    let detail = if message.is_empty() { body } else { message.as_str() };
    ApiFailure::ApiError {
        status: 400,
        detail: truncate_detail(detail),
    }
}

/// Truncates `text` to [`DETAIL_LIMIT`] characters
pub fn truncate_detail(text: &str) -> String {
    text.chars().take(DETAIL_LIMIT).collect()
}
