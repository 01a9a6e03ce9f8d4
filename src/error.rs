use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::validate::Violation;

/// Everything a handler can fail with. Business outcomes (wrong password on
/// change/delete) are not errors and never appear here.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("validation failed")]
    Validation(Vec<Violation>),
    #[error("no credentials were provided")]
    Unauthenticated,
    #[error("token is malformed or its signature does not verify")]
    InvalidToken,
    #[error("token has expired")]
    ExpiredToken,
    #[error("login failed")]
    LoginFailed,
    #[error("email already registered")]
    EmailTaken,
    #[error("target account is not the authenticated account")]
    Forbidden,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error(transparent)]
    Store(#[from] sqlx::Error),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    title: &'static str,
    errors: Vec<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Validation(violations) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    title: "Validation failed",
                    errors: violations.into_iter().map(|v| v.message.to_string()).collect(),
                },
            ),
            ApiError::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    title: "Unauthorized",
                    errors: vec!["Authentication is required.".into()],
                },
            ),
            // Bad signature and expired token must read the same from
            // outside; the distinction stays in the logs.
            ApiError::InvalidToken | ApiError::ExpiredToken => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    title: "Unauthorized",
                    errors: vec!["Valid credentials are required.".into()],
                },
            ),
            // Unknown email and wrong password share this one body.
            ApiError::LoginFailed => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    title: "Login failed",
                    errors: vec!["The provided credentials were invalid.".into()],
                },
            ),
            ApiError::EmailTaken => (
                StatusCode::CONFLICT,
                ErrorBody {
                    title: "Email already registered",
                    errors: vec!["An account with that email already exists.".into()],
                },
            ),
            ApiError::Forbidden => (
                StatusCode::FORBIDDEN,
                ErrorBody {
                    title: "Forbidden",
                    errors: vec!["You may only manage your own account.".into()],
                },
            ),
            ApiError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    title: "Not found",
                    errors: vec![format!("The requested {what} could not be found.")],
                },
            ),
            ApiError::Store(e) => {
                error!(error = %e, "store error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        title: "Server error",
                        errors: vec!["Something went wrong.".into()],
                    },
                )
            }
            ApiError::Internal(e) => {
                error!(error = %e, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        title: "Server error",
                        errors: vec!["Something went wrong.".into()],
                    },
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_bytes(res: Response) -> axum::body::Bytes {
        axum::body::to_bytes(res.into_body(), 4096)
            .await
            .expect("read body")
    }

    #[tokio::test]
    async fn invalid_and_expired_tokens_are_indistinguishable() {
        let a = ApiError::InvalidToken.into_response();
        let b = ApiError::ExpiredToken.into_response();
        assert_eq!(a.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(a.status(), b.status());
        assert_eq!(body_bytes(a).await, body_bytes(b).await);
    }

    #[tokio::test]
    async fn login_failure_has_one_fixed_message() {
        let res = ApiError::LoginFailed.into_response();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body = String::from_utf8(body_bytes(res).await.to_vec()).unwrap();
        assert!(body.contains("The provided credentials were invalid."));
    }

    #[tokio::test]
    async fn store_errors_do_not_leak_details() {
        let res = ApiError::Store(sqlx::Error::PoolTimedOut).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = String::from_utf8(body_bytes(res).await.to_vec()).unwrap();
        assert!(!body.contains("pool"));
    }
}
