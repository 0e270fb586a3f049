// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWKS (JSON Web Key Set) fetching and caching.
//!
//! ## Caching
//!
//! - The key set is fetched on first use and kept for the life of the process
//! - It is never refreshed or invalidated once populated
//! - Concurrent first callers share a single in-flight fetch
//! - A failed fetch is not remembered; the next call fetches again
//!
//! ## Usage
//!
//! Build a [`JwksClient`] from the trust domain's JWKS URL in main.rs and hand
//! it to the [`TokenVerifier`](super::TokenVerifier).

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::jwk::{Jwk, JwkSet};
use serde::Deserialize;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use super::error::FetchError;

/// HTTP timeout for the JWKS request.
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Production key source: the JWKS endpoint behind a fetch-once cache.
pub type JwksClient = CachedKeySet<JwksEndpoint>;

/// The verification keys of one trust domain.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct KeySet(JwkSet);

impl KeySet {
    /// Look up the key whose `kid` equals `kid`.
    pub fn find(&self, kid: &str) -> Option<&Jwk> {
        self.0
            .keys
            .iter()
            .find(|k| k.common.key_id.as_deref() == Some(kid))
    }

    pub fn len(&self) -> usize {
        self.0.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.keys.is_empty()
    }
}

impl From<JwkSet> for KeySet {
    fn from(set: JwkSet) -> Self {
        Self(set)
    }
}

/// Anything that can hand out the current key set.
pub trait KeySetSource: Send + Sync {
    fn get_keys(&self) -> impl Future<Output = Result<Arc<KeySet>, FetchError>> + Send;
}

/// Uncached JWKS endpoint. Every call is a network round trip.
#[derive(Debug, Clone)]
pub struct JwksEndpoint {
    url: String,
    client: reqwest::Client,
}

impl JwksEndpoint {
    /// Create a source for the given JWKS URL
    /// (e.g. `https://cognito-idp.<region>.amazonaws.com/<pool>/.well-known/jwks.json`).
    pub fn new(url: impl Into<String>) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(FETCH_TIMEOUT).build()?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl KeySetSource for JwksEndpoint {
    async fn get_keys(&self) -> Result<Arc<KeySet>, FetchError> {
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let body = response.bytes().await?;
        let keys: KeySet = serde_json::from_slice(&body)?;

        info!(url = %self.url, keys = keys.len(), "Fetched JWKS");
        Ok(Arc::new(keys))
    }
}

/// Fetch-once cache in front of another [`KeySetSource`].
pub struct CachedKeySet<S> {
    inner: S,
    cell: OnceCell<Arc<KeySet>>,
}

impl<S: KeySetSource> CachedKeySet<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            cell: OnceCell::new(),
        }
    }

    /// Whether the key set has been fetched.
    pub fn is_cached(&self) -> bool {
        self.cell.initialized()
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl CachedKeySet<JwksEndpoint> {
    /// Cached client for a JWKS URL.
    pub fn from_url(url: impl Into<String>) -> Result<Self, FetchError> {
        Ok(Self::new(JwksEndpoint::new(url)?))
    }
}

impl<S: KeySetSource> KeySetSource for CachedKeySet<S> {
    async fn get_keys(&self) -> Result<Arc<KeySet>, FetchError> {
        let keys = self
            .cell
            .get_or_try_init(|| self.inner.get_keys())
            .await
            .inspect_err(|e| warn!(error = %e, "JWKS fetch failed"))?;
        Ok(Arc::clone(keys))
    }
}
