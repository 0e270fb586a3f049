// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Cognito app client helpers.
//!
//! Sign-up, sign-in and confirmation requests to the user pool must carry a
//! `SECRET_HASH` when the app client has a secret, and provider failures are
//! shown to users as short messages rather than raw error codes.

use base64ct::{Base64, Encoding};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// App client id plus its optional secret.
#[derive(Clone)]
pub struct ClientCredentials {
    client_id: String,
    client_secret: Option<String>,
}

impl ClientCredentials {
    pub fn new(client_id: impl Into<String>, client_secret: Option<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret,
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn has_secret(&self) -> bool {
        self.client_secret.is_some()
    }

    /// `SECRET_HASH` for `username`: base64(HMAC-SHA256(secret, username + client_id)).
    ///
    /// `None` when the client has no secret; the parameter is then omitted
    /// from the request.
    pub fn secret_hash(&self, username: &str) -> Option<String> {
        let secret = self.client_secret.as_ref()?;
        // HMAC accepts keys of any length.
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
        mac.update(username.as_bytes());
        mac.update(self.client_id.as_bytes());
        Some(Base64::encode_string(&mac.finalize().into_bytes()))
    }
}

impl std::fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field(
                "client_secret",
                &self.client_secret.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// User-facing message for a user pool error code.
///
/// Unknown codes fall back to `Error: <detail>`.
pub fn provider_error_message(code: &str, detail: &str) -> String {
    let message = match code {
        "NotAuthorizedException" => "Incorrect username or password!",
        "UserNotFoundException" => "User does not exist!",
        "UserNotConfirmedException" => {
            "User not confirmed. Please check your email or phone for the confirmation code."
        }
        "UsernameExistsException" => "A user with this username already exists!",
        "ExpiredCodeException" => "Confirmation code expired. Please request a new one.",
        "CodeMismatchException" => "Invalid confirmation code.",
        _ => return format!("Error: {detail}"),
    };
    message.to_string()
}
