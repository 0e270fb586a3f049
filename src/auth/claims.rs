// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWT claims and authenticated user representation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

/// Decoded claims of a verified token.
///
/// Holds the payload exactly as signed. Cognito access tokens carry
/// `sub`, `iss`, `exp`, `iat`, `client_id`, `token_use`, `username` and
/// optionally `cognito:groups`; ID tokens use `aud` and `cognito:username`.
/// See: https://docs.aws.amazon.com/cognito/latest/developerguide/amazon-cognito-user-pools-using-the-access-token.html
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims(Map<String, Value>);

impl Claims {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    fn get_str(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    /// Subject - the canonical user pool user id
    pub fn subject(&self) -> Option<&str> {
        self.get_str("sub")
    }

    pub fn issuer(&self) -> Option<&str> {
        self.get_str("iss")
    }

    /// Audience, when it is a single string.
    pub fn audience(&self) -> Option<&str> {
        self.get_str("aud")
    }

    pub fn client_id(&self) -> Option<&str> {
        self.get_str("client_id")
    }

    /// `access` or `id`
    pub fn token_use(&self) -> Option<&str> {
        self.get_str("token_use")
    }

    /// Sign-in name: `username` on access tokens, `cognito:username` on ID tokens.
    pub fn username(&self) -> Option<&str> {
        self.get_str("username")
            .or_else(|| self.get_str("cognito:username"))
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.0
            .get("exp")
            .and_then(Value::as_i64)
            .and_then(|exp| DateTime::from_timestamp(exp, 0))
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Claims {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Authenticated user information extracted from verified claims.
///
/// This is the type handlers receive from the [`Auth`](super::Auth) extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    /// Canonical user id (`sub` claim)
    pub user_id: String,

    /// Sign-in name, if the token carries one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Token expiration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl AuthenticatedUser {
    /// Create from verified claims.
    ///
    /// The id is `sub`, or the username for tokens without one. Returns `None`
    /// when the claims name no user at all.
    pub fn from_claims(claims: &Claims) -> Option<Self> {
        let username = claims
            .username()
            .filter(|name| !name.is_empty())
            .map(str::to_owned);
        let user_id = claims
            .subject()
            .filter(|sub| !sub.is_empty())
            .map(str::to_owned)
            .or_else(|| username.clone())?;

        Some(Self {
            user_id,
            username,
            expires_at: claims.expires_at(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn claims(value: Value) -> Claims {
        serde_json::from_value(value).unwrap()
    }

    fn sample_access_claims() -> Claims {
        claims(json!({
            "sub": "8f1c2f3a-user",
            "iss": "https://cognito-idp.il-central-1.amazonaws.com/il-central-1_pool",
            "client_id": "client1",
            "token_use": "access",
            "username": "alice",
            "exp": 1_700_003_600,
            "iat": 1_700_000_000,
        }))
    }

    #[test]
    fn accessors_read_standard_claims() {
        let c = sample_access_claims();
        assert_eq!(c.subject(), Some("8f1c2f3a-user"));
        assert_eq!(c.client_id(), Some("client1"));
        assert_eq!(c.token_use(), Some("access"));
        assert_eq!(c.audience(), None);
        assert_eq!(
            c.expires_at(),
            DateTime::from_timestamp(1_700_003_600, 0)
        );
    }

    #[test]
    fn username_falls_back_to_cognito_username() {
        let c = claims(json!({ "sub": "u1", "cognito:username": "bob" }));
        assert_eq!(c.username(), Some("bob"));
    }

    #[test]
    fn from_claims_extracts_user_id() {
        let user = AuthenticatedUser::from_claims(&sample_access_claims()).unwrap();
        assert_eq!(user.user_id, "8f1c2f3a-user");
        assert_eq!(user.username.as_deref(), Some("alice"));
        assert!(user.expires_at.is_some());
    }

    #[test]
    fn from_claims_without_sub_uses_username() {
        let user = AuthenticatedUser::from_claims(&claims(json!({ "username": "carol" }))).unwrap();
        assert_eq!(user.user_id, "carol");
        assert_eq!(user.expires_at, None);
    }

    #[test]
    fn from_claims_without_any_user_is_none() {
        assert_eq!(AuthenticatedUser::from_claims(&claims(json!({ "exp": 1 }))), None);
        assert_eq!(
            AuthenticatedUser::from_claims(&claims(json!({ "sub": "", "username": "" }))),
            None
        );
    }

    #[test]
    fn claims_serialize_as_plain_object() {
        let c = claims(json!({ "sub": "u1", "exp": 1 }));
        assert_eq!(serde_json::to_value(&c).unwrap(), json!({ "sub": "u1", "exp": 1 }));
    }
}
