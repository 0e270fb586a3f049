// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Fixtures shared by the auth and API tests: RSA test keys, token signing,
//! in-memory key sources and a local JWKS server.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{http::StatusCode, routing::get, Router};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};

use super::error::FetchError;
use super::jwks::{JwksClient, KeySet, KeySetSource};
use super::verifier::TokenVerifier;
use crate::config::TrustDomain;
use crate::state::AppState;

pub const TRUSTED_KID: &str = "abc123";
pub const AUDIENCE: &str = "client1";
pub const ISSUER: &str = "https://issuer.example/pool1";

/// Private half of the `abc123` key in `jwks.json`.
pub const TRUSTED_PEM: &str = include_str!("testdata/trusted_rsa.pem");
/// A key that appears in no key set.
pub const FOREIGN_PEM: &str = include_str!("testdata/foreign_rsa.pem");
pub const JWKS_JSON: &str = include_str!("testdata/jwks.json");

pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Trust domain whose JWKS URL is never contacted.
pub fn trust_domain() -> TrustDomain {
    trust_domain_with_jwks("https://issuer.example/pool1/.well-known/jwks.json")
}

pub fn trust_domain_with_jwks(jwks_url: &str) -> TrustDomain {
    TrustDomain::new(ISSUER, AUDIENCE, jwks_url).unwrap()
}

pub fn key_set() -> KeySet {
    serde_json::from_str(JWKS_JSON).unwrap()
}

pub fn valid_claims() -> Value {
    json!({
        "sub": "8f1c2f3a-user",
        "username": "alice",
        "aud": AUDIENCE,
        "iss": ISSUER,
        "token_use": "access",
        "iat": now(),
        "exp": now() + 3600,
    })
}

/// RS256-sign `claims` with `pem`, declaring `kid` in the header.
pub fn sign(kid: &str, claims: &Value, pem: &str) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(kid.to_string());
    let key = EncodingKey::from_rsa_pem(pem.as_bytes()).unwrap();
    encode(&header, claims, &key).unwrap()
}

/// Always returns the fixture key set.
pub struct StaticKeys(Arc<KeySet>);

impl StaticKeys {
    pub fn trusted() -> Self {
        Self(Arc::new(key_set()))
    }
}

impl KeySetSource for StaticKeys {
    async fn get_keys(&self) -> Result<Arc<KeySet>, FetchError> {
        Ok(Arc::clone(&self.0))
    }
}

/// Simulates an unreachable JWKS endpoint.
pub struct FailingKeys;

impl KeySetSource for FailingKeys {
    async fn get_keys(&self) -> Result<Arc<KeySet>, FetchError> {
        Err(FetchError::Status(reqwest::StatusCode::SERVICE_UNAVAILABLE))
    }
}

/// Counts fetches; optionally slow, optionally failing for the first N calls.
pub struct CountingKeys {
    pub fetches: AtomicUsize,
    delay: Duration,
    fail_first: usize,
}

impl CountingKeys {
    pub fn new() -> Self {
        Self {
            fetches: AtomicUsize::new(0),
            delay: Duration::ZERO,
            fail_first: 0,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn failing_first(mut self, n: usize) -> Self {
        self.fail_first = n;
        self
    }
}

impl KeySetSource for CountingKeys {
    async fn get_keys(&self) -> Result<Arc<KeySet>, FetchError> {
        let call = self.fetches.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if call < self.fail_first {
            return Err(FetchError::Status(reqwest::StatusCode::BAD_GATEWAY));
        }
        Ok(Arc::new(key_set()))
    }
}

/// Serve the fixture JWKS on an ephemeral local port. Returns the base URL.
///
/// Routes: `/.well-known/jwks.json` (fixture), `/broken` (500), `/garbage` (not JSON).
pub async fn serve_jwks() -> String {
    let app = Router::new()
        .route(
            "/.well-known/jwks.json",
            get(|| async { ([("content-type", "application/json")], JWKS_JSON) }),
        )
        .route("/broken", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
        .route("/garbage", get(|| async { "<html>not a key set</html>" }));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// Application state whose JWKS URL is `path` on a fresh local JWKS server.
pub async fn app_state(path: &str) -> AppState {
    let base = serve_jwks().await;
    let domain = trust_domain_with_jwks(&format!("{base}{path}"));
    let keys = JwksClient::from_url(domain.jwks_url()).unwrap();
    AppState::new(TokenVerifier::new(domain, keys))
}
