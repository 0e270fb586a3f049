// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names, default values and the
//! configuration values built from them. Configuration is loaded from the
//! environment once at startup and passed down explicitly.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `AWS_REGION` | Region of the Cognito user pool | `il-central-1` |
//! | `COGNITO_USER_POOL_ID` | User pool id (issuer path) | Required |
//! | `COGNITO_USER_POOL_CLIENT_ID` | App client id (expected `aud` or `client_id`) | Required |
//! | `COGNITO_APP_CLIENT_SECRET` | App client secret for `SECRET_HASH` | Optional |
//! | `JWT_LEEWAY_SECS` | Clock skew tolerance for `exp` and `nbf` | `0` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::SocketAddr;

use url::Url;

use crate::auth::verifier::DEFAULT_LEEWAY_SECS;
use crate::identity::ClientCredentials;

pub const AWS_REGION_ENV: &str = "AWS_REGION";
pub const USER_POOL_ID_ENV: &str = "COGNITO_USER_POOL_ID";
pub const CLIENT_ID_ENV: &str = "COGNITO_USER_POOL_CLIENT_ID";
pub const CLIENT_SECRET_ENV: &str = "COGNITO_APP_CLIENT_SECRET";
pub const LEEWAY_ENV: &str = "JWT_LEEWAY_SECS";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_REGION: &str = "il-central-1";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Who issues the tokens we accept, and for whom.
///
/// Immutable once built; handed to the verifier and key source at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustDomain {
    issuer: String,
    audience: String,
    jwks_url: String,
}

impl TrustDomain {
    pub fn new(
        issuer: impl Into<String>,
        audience: impl Into<String>,
        jwks_url: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let issuer = issuer.into();
        let audience = audience.into();
        let jwks_url = jwks_url.into();

        check_http_url("issuer", &issuer)?;
        check_http_url("jwks_url", &jwks_url)?;
        if audience.trim().is_empty() {
            return Err(ConfigError::Invalid {
                name: "audience",
                reason: "must not be empty".to_string(),
            });
        }

        Ok(Self {
            issuer,
            audience,
            jwks_url,
        })
    }

    /// Trust domain of a Cognito user pool.
    ///
    /// Issuer is `https://cognito-idp.<region>.amazonaws.com/<pool_id>` and the
    /// keys live under its `/.well-known/jwks.json`.
    pub fn cognito(region: &str, pool_id: &str, client_id: &str) -> Result<Self, ConfigError> {
        let issuer = format!("https://cognito-idp.{region}.amazonaws.com/{pool_id}");
        let jwks_url = format!("{issuer}/.well-known/jwks.json");
        Self::new(issuer, client_id, jwks_url)
    }

    /// Expected `iss` claim
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Expected `aud` claim (the app client id)
    pub fn audience(&self) -> &str {
        &self.audience
    }

    pub fn jwks_url(&self) -> &str {
        &self.jwks_url
    }
}

fn check_http_url(name: &'static str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value).map_err(|e| ConfigError::Invalid {
        name,
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "https" | "http" if url.host().is_some() => Ok(()),
        _ => Err(ConfigError::Invalid {
            name,
            reason: format!("{value} is not an http(s) URL"),
        }),
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

/// Everything `main` needs to start the server.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub trust_domain: TrustDomain,
    pub credentials: ClientCredentials,
    pub leeway_secs: u64,
    pub host: String,
    pub port: u16,
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load using `lookup` to resolve variable names. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let require = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        let region = get(AWS_REGION_ENV).unwrap_or_else(|| DEFAULT_REGION.to_string());
        let pool_id = require(USER_POOL_ID_ENV)?;
        let client_id = require(CLIENT_ID_ENV)?;
        let trust_domain = TrustDomain::cognito(&region, &pool_id, &client_id)?;

        let credentials = ClientCredentials::new(client_id, get(CLIENT_SECRET_ENV));

        let leeway_secs = match get(LEEWAY_ENV) {
            Some(v) => v.parse().map_err(|_| ConfigError::Invalid {
                name: LEEWAY_ENV,
                reason: format!("{v:?} is not a number of seconds"),
            })?,
            None => DEFAULT_LEEWAY_SECS,
        };

        let host = get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match get(PORT_ENV) {
            Some(v) => v.parse().map_err(|_| ConfigError::Invalid {
                name: PORT_ENV,
                reason: format!("{v:?} is not a port number"),
            })?,
            None => DEFAULT_PORT,
        };

        let log_format = match get(LOG_FORMAT_ENV).as_deref() {
            Some("json") => LogFormat::Json,
            Some("pretty") | None => LogFormat::Pretty,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: LOG_FORMAT_ENV,
                    reason: format!("{other:?} is not json or pretty"),
                })
            }
        };

        Ok(Self {
            trust_domain,
            credentials,
            leeway_secs,
            host,
            port,
            log_format,
        })
    }

    /// Socket address to bind.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ConfigError::Invalid {
                name: HOST_ENV,
                reason: format!("{}:{} is not a socket address", self.host, self.port),
            })
    }
}
