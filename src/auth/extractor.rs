// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for authenticated callers.
//!
//! Use the `Auth` extractor in handlers to require authentication:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(user): Auth) -> impl IntoResponse {
//!     // user is AuthenticatedUser
//! }
//! ```
//!
//! The token is taken from the `cognito_token` cookie set at login, or from
//! an `Authorization: Bearer <token>` header when no cookie is present.

use axum::{
    extract::FromRequestParts,
    http::{
        header::{AUTHORIZATION, COOKIE},
        request::Parts,
        HeaderMap,
    },
};
use tracing::warn;

use super::{AuthError, AuthenticatedUser, Claims};
use crate::state::AppState;

/// Cookie holding the access token issued at login.
pub const TOKEN_COOKIE: &str = "cognito_token";

/// Verified claims of the caller.
///
/// Verification runs at most once per request: the claims are stored in the
/// request extensions and reused by later extractors.
pub struct AuthClaims(pub Claims);

impl FromRequestParts<AppState> for AuthClaims {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(claims) = parts.extensions.get::<Claims>().cloned() {
            return Ok(AuthClaims(claims));
        }

        let token = request_token(&parts.headers).ok_or(AuthError::MissingToken)?;
        let claims = state.verifier.verify(token).await?;

        parts.extensions.insert(claims.clone());
        Ok(AuthClaims(claims))
    }
}

/// Extractor for authenticated users.
///
/// # Example
///
/// ```rust,ignore
/// async fn get_current_user(Auth(user): Auth) -> Json<UserMeResponse> {
///     // user.user_id contains the caller's `sub`
/// }
/// ```
pub struct Auth(pub AuthenticatedUser);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let AuthClaims(claims) = AuthClaims::from_request_parts(parts, state).await?;
        let user = AuthenticatedUser::from_claims(&claims).ok_or_else(|| {
            warn!("Verified token names no user");
            AuthError::InvalidToken
        })?;
        Ok(Auth(user))
    }
}

/// Optional authentication extractor.
///
/// Returns `None` if no valid authentication is present, instead of rejecting.
pub struct OptionalAuth(pub Option<AuthenticatedUser>);

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match Auth::from_request_parts(parts, state).await {
            Ok(Auth(user)) => Ok(OptionalAuth(Some(user))),
            Err(_) => Ok(OptionalAuth(None)),
        }
    }
}

/// Token presented by the request: cookie first, then bearer header.
fn request_token(headers: &HeaderMap) -> Option<&str> {
    cookie_value(headers, TOKEN_COOKIE).or_else(|| bearer_token(headers))
}

fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"'))
        .filter(|value| !value.is_empty())
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
