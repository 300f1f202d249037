//! Shared request/response plumbing for the resource clients.

use crate::error::{AvalonClientError, Result};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::warn;

/// Header carrying the instance API key on every request.
pub(crate) const API_KEY_HEADER: &str = "Avalon-Api-Key";

/// Seconds to wait when a 429 carries no usable `Retry-After`.
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Send a request, classifying transport failures.
pub(crate) async fn send(request: RequestBuilder) -> Result<Response> {
    request.send().await.map_err(AvalonClientError::from_send)
}

/// Map non-success statuses onto client errors.
///
/// `resource` names what was requested and ends up in `NotFound`.
pub(crate) async fn check_status(response: Response, resource: &str) -> Result<Response> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, resource = %resource, "API key rejected");
            Err(AvalonClientError::AuthFailed(format!(
                "API key rejected with status {}",
                status.as_u16()
            )))
        }
        StatusCode::NOT_FOUND => Err(AvalonClientError::NotFound {
            resource: resource.to_string(),
        }),
        StatusCode::TOO_MANY_REQUESTS => {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);

            Err(AvalonClientError::RateLimited {
                retry_after_secs: retry_after,
            })
        }
        _ => {
            let error_text = response.text().await.unwrap_or_default();
            Err(AvalonClientError::ServerError {
                status: status.as_u16(),
                message: error_text,
            })
        }
    }
}

/// Check the status and decode a JSON body.
pub(crate) async fn json<T: DeserializeOwned>(response: Response, resource: &str) -> Result<T> {
    let response = check_status(response, resource).await?;
    response
        .json()
        .await
        .map_err(|e| AvalonClientError::ParseError(format!("Failed to parse {}: {}", resource, e)))
}

/// Reject ids that would change the shape of the request path.
pub(crate) fn require_id<'a>(id: &'a str, what: &str) -> Result<&'a str> {
    let id = id.trim();
    if id.is_empty() {
        return Err(AvalonClientError::InvalidArgument(format!(
            "{} id cannot be empty",
            what
        )));
    }
    if id.contains(['/', '?', '#']) {
        return Err(AvalonClientError::InvalidArgument(format!(
            "{} id contains reserved characters: {}",
            what, id
        )));
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_id() {
        assert_eq!(require_id(" v118rd76r ", "master file").unwrap(), "v118rd76r");
        assert!(matches!(
            require_id("", "collection"),
            Err(AvalonClientError::InvalidArgument(_))
        ));
        assert!(require_id("abc/def", "collection").is_err());
        assert!(require_id("abc?page=2", "collection").is_err());
    }
}
