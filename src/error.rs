// SPDX-License-Identifier: EUPL-1.2-or-later
// Copyright © 2026-present Arbor Contributors

//! Error types for arbor
//!
//! Protocol handlers themselves never fail: malformed-but-structurally-valid
//! input is treated as a silent no-op. Errors exist only at the process
//! boundary, where configuration, sockets, and wire decoding live.

use thiserror::Error;

/// Top-level error type for arbor operations.
#[derive(Error, Debug)]
pub enum ArborError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Wire encoding error: {0}")]
    Wire(#[from] postcard::Error),
}

/// Configuration loading and validation errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Transport layer errors.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Failed to bind socket: {0}")]
    BindFailed(String),

    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("Receive failed: {0}")]
    ReceiveFailed(String),

    #[error("Invalid destination address: {0}")]
    InvalidAddress(String),

    #[error("Socket not bound")]
    NotBound,

    #[error("Message encoding failed: {0}")]
    Encode(#[from] postcard::Error),
}
