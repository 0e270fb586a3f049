// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.
//!
//! Three layers, from the inside out:
//!
//! - [`FetchError`]: the key set could not be retrieved.
//! - [`VerifyError`]: why a token was refused. Only logs and tests see it.
//! - [`Rejected`] / [`AuthError`]: what callers and HTTP clients see. They
//!   carry no detail about the failure.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Failure to retrieve or parse the JWKS document.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("JWKS request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP {0} from JWKS endpoint")]
    Status(reqwest::StatusCode),

    #[error("JWKS response was invalid: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Classified reason a token failed verification.
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("token is malformed")]
    MalformedToken,

    #[error("signing keys unavailable: {0}")]
    KeySetUnavailable(#[source] FetchError),

    #[error("no signing key with kid {kid:?}")]
    UnknownKey { kid: String },

    #[error("token signature is invalid")]
    SignatureInvalid,

    #[error("token audience is invalid")]
    AudienceMismatch,

    #[error("token issuer is invalid")]
    IssuerMismatch,

    #[error("token has expired")]
    Expired,

    #[error("token is not yet valid")]
    NotYetValid,
}

impl VerifyError {
    /// Stable code for log fields.
    pub fn error_code(&self) -> &'static str {
        match self {
            VerifyError::MalformedToken => "malformed_token",
            VerifyError::KeySetUnavailable(_) => "key_set_unavailable",
            VerifyError::UnknownKey { .. } => "unknown_key",
            VerifyError::SignatureInvalid => "invalid_signature",
            VerifyError::AudienceMismatch => "invalid_audience",
            VerifyError::IssuerMismatch => "invalid_issuer",
            VerifyError::Expired => "token_expired",
            VerifyError::NotYetValid => "token_not_yet_valid",
        }
    }
}

/// Uniform outcome of a failed [`verify`](super::TokenVerifier::verify).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("access token rejected")]
pub struct Rejected;

/// Rejection returned by the auth extractors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// Neither the session cookie nor a bearer header carried a token
    MissingToken,
    /// A token was presented but did not verify
    InvalidToken,
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: &'static str,
    error_code: &'static str,
}

impl AuthError {
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "not_authenticated",
            AuthError::InvalidToken => "invalid_token",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "Not authenticated",
            AuthError::InvalidToken => "Invalid or expired token.",
        }
    }
}

impl From<Rejected> for AuthError {
    fn from(_: Rejected) -> Self {
        AuthError::InvalidToken
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = Json(AuthErrorBody {
            error: self.message(),
            error_code: self.error_code(),
        });
        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn missing_token_returns_401() {
        let response = AuthError::MissingToken.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(body["error_code"], "not_authenticated");
        assert_eq!(body["error"], "Not authenticated");
    }

    #[tokio::test]
    async fn rejected_token_returns_401_without_detail() {
        let response = AuthError::from(Rejected).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "error": "Invalid or expired token.",
                "error_code": "invalid_token",
            })
        );
    }

    #[test]
    fn key_set_unavailable_keeps_fetch_error_as_source() {
        use std::error::Error;

        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = VerifyError::KeySetUnavailable(FetchError::Parse(parse));
        assert_eq!(err.error_code(), "key_set_unavailable");
        assert!(err.source().is_some());
    }
}
