//! Mapping of critic errors onto HTTP responses.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, warn};

/// Handler error, always rendered as a `{error, detail}` JSON body.
#[derive(Debug)]
pub enum ApiError {
    /// A failure reported by the review pipeline.
    Critic(critic_core::Error),
    /// The request body was missing, not JSON, or the wrong shape.
    Body(JsonRejection),
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    detail: String,
}

impl From<critic_core::Error> for ApiError {
    fn from(err: critic_core::Error) -> Self {
        ApiError::Critic(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Body(rejection)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Critic(err) => {
                let status =
                    StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::BAD_GATEWAY);
                if status.is_server_error() {
                    error!(kind = err.kind(), "{}", err);
                } else {
                    warn!(kind = err.kind(), "{}", err);
                }
                let body = ErrorBody {
                    error: err.kind(),
                    detail: err.to_string(),
                };
                (status, body)
            }
            ApiError::Body(rejection) => {
                warn!(status = rejection.status().as_u16(), "Rejected request body");
                let body = ErrorBody {
                    error: "invalid_request_body",
                    detail: rejection.body_text(),
                };
                (rejection.status(), body)
            }
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use critic_core::Error;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (Error::InvalidRepositoryUrl("bad".into()), StatusCode::BAD_REQUEST),
            (
                Error::RepositoryNotFound {
                    owner: "o".into(),
                    name: "r".into(),
                },
                StatusCode::NOT_FOUND,
            ),
            (
                Error::upstream("github", 403, "rate limit"),
                StatusCode::FORBIDDEN,
            ),
            (
                Error::MalformedCompletion("no text".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), expected);
        }
    }
}
