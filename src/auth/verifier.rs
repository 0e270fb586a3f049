// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Access token verification against the trust domain's key set.
//!
//! A token moves through `header parsed → key selected → verified`; a failure
//! at any step ends in rejection. [`TokenVerifier::verify_classified`] reports
//! which step failed, [`TokenVerifier::verify`] collapses every failure into
//! [`Rejected`] after logging the reason.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::jwk::{AlgorithmParameters, Jwk};
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde_json::{Map, Value};
use tracing::warn;

use super::claims::Claims;
use super::error::{Rejected, VerifyError};
use super::jwks::{JwksClient, KeySetSource};
use crate::config::TrustDomain;

/// Default clock skew tolerance: none. `exp` and `nbf` are compared exactly.
pub const DEFAULT_LEEWAY_SECS: u64 = 0;

/// The only accepted signing algorithm.
const ALGORITHM: Algorithm = Algorithm::RS256;

/// Verifies bearer tokens issued by one trust domain.
pub struct TokenVerifier<S = JwksClient> {
    domain: TrustDomain,
    keys: S,
    validation: Validation,
}

impl<S: KeySetSource> TokenVerifier<S> {
    pub fn new(domain: TrustDomain, keys: S) -> Self {
        let validation = build_validation(&domain, DEFAULT_LEEWAY_SECS);
        Self {
            domain,
            keys,
            validation,
        }
    }

    /// Override the clock skew tolerance applied to `exp` and `nbf`.
    pub fn with_leeway(mut self, secs: u64) -> Self {
        self.validation.leeway = secs;
        self
    }

    pub fn trust_domain(&self) -> &TrustDomain {
        &self.domain
    }

    pub fn key_source(&self) -> &S {
        &self.keys
    }

    /// Verify `token`, returning its claims or a uniform rejection.
    pub async fn verify(&self, token: &str) -> Result<Claims, Rejected> {
        self.verify_classified(token).await.map_err(|e| {
            warn!(reason = e.error_code(), error = %e, "Access token rejected");
            Rejected
        })
    }

    /// Verify `token`, reporting why it failed.
    pub async fn verify_classified(&self, token: &str) -> Result<Claims, VerifyError> {
        let header = decode_header(token).map_err(|_| VerifyError::MalformedToken)?;
        let kid = header.kid.ok_or(VerifyError::MalformedToken)?;

        let keys = self
            .keys
            .get_keys()
            .await
            .map_err(VerifyError::KeySetUnavailable)?;

        let jwk = keys
            .find(&kid)
            .ok_or_else(|| VerifyError::UnknownKey { kid: kid.clone() })?;
        let decoding_key = rsa_decoding_key(jwk)?;

        let data = decode::<Map<String, Value>>(token, &decoding_key, &self.validation)
            .map_err(|e| classify(e.kind()))?;

        let claims = Claims::from(data.claims);
        check_audience(&claims, self.domain.audience())?;
        Ok(claims)
    }
}

fn build_validation(domain: &TrustDomain, leeway: u64) -> Validation {
    let mut validation = Validation::new(ALGORITHM);
    validation.leeway = leeway;
    validation.validate_nbf = true;
    // Cognito access tokens carry no `aud`; see `check_audience`.
    validation.validate_aud = false;
    validation.set_issuer(&[domain.issuer()]);
    validation.set_required_spec_claims(&["exp", "iss"]);
    validation
}

/// ID tokens name the app client in `aud`, access tokens in `client_id`.
/// A token carrying neither is not addressed to this client.
fn check_audience(claims: &Claims, expected: &str) -> Result<(), VerifyError> {
    let addressed = match claims.get("aud") {
        Some(Value::String(aud)) => aud == expected,
        Some(Value::Array(auds)) => auds.iter().any(|aud| aud.as_str() == Some(expected)),
        Some(_) => false,
        None => claims.token_use() == Some("access") && claims.client_id() == Some(expected),
    };

    if addressed {
        Ok(())
    } else {
        Err(VerifyError::AudienceMismatch)
    }
}

/// Key material for RS256. Any other key type cannot verify the signature.
fn rsa_decoding_key(jwk: &Jwk) -> Result<DecodingKey, VerifyError> {
    match &jwk.algorithm {
        AlgorithmParameters::RSA(rsa) => DecodingKey::from_rsa_components(&rsa.n, &rsa.e)
            .map_err(|_| VerifyError::SignatureInvalid),
        _ => Err(VerifyError::SignatureInvalid),
    }
}

fn classify(kind: &ErrorKind) -> VerifyError {
    match kind {
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => VerifyError::SignatureInvalid,
        ErrorKind::ExpiredSignature => VerifyError::Expired,
        ErrorKind::ImmatureSignature => VerifyError::NotYetValid,
        ErrorKind::InvalidAudience => VerifyError::AudienceMismatch,
        ErrorKind::InvalidIssuer => VerifyError::IssuerMismatch,
        ErrorKind::MissingRequiredClaim(claim) => match claim.as_str() {
            "iss" => VerifyError::IssuerMismatch,
            "exp" => VerifyError::Expired,
            _ => VerifyError::MalformedToken,
        },
        _ => VerifyError::MalformedToken,
    }
}
