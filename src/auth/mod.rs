// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! This module verifies Cognito access tokens for the DevOps360 API.
//!
//! ## Auth Flow
//!
//! 1. The user signs in against the Cognito user pool and receives an access token
//! 2. The client sends it back in the `cognito_token` cookie or as
//!    `Authorization: Bearer <token>`
//! 3. The server:
//!    - Reads the `kid` from the unverified token header
//!    - Fetches the user pool JWKS (once per process)
//!    - Verifies the RS256 signature, expiry, not-before and issuer
//!    - Checks the audience: `aud`, or `client_id` on access tokens
//!    - Hands the decoded claims to the handler
//!
//! ## Security
//!
//! - Every verification failure reaches the client as the same 401
//! - The reason is logged server-side only
//! - No clock skew tolerance unless `JWT_LEEWAY_SECS` sets one

pub mod claims;
pub mod error;
pub mod extractor;
pub mod jwks;
pub mod verifier;

#[cfg(test)]
pub(crate) mod test_support;

pub use claims::{AuthenticatedUser, Claims};
pub use error::{AuthError, FetchError, Rejected, VerifyError};
pub use extractor::{Auth, AuthClaims, OptionalAuth};
pub use jwks::{CachedKeySet, JwksClient, JwksEndpoint, KeySet, KeySetSource};
pub use verifier::TokenVerifier;
