// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Errors that stop the server from starting or keep it from serving.

use crate::auth::FetchError;
use crate::config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to build JWKS client: {0}")]
    JwksClient(#[from] FetchError),

    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}
