// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! DevOps360 Server - Cognito access token gate
//!
//! This crate verifies access tokens issued by a Cognito user pool against
//! the pool's published signing keys and exposes the verified identity to
//! HTTP handlers.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Token verification, JWKS cache and auth extractors
//! - `config` - Trust domain and runtime configuration
//! - `identity` - App client helpers (`SECRET_HASH`, provider error messages)

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod identity;
pub mod state;
