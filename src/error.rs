//! Error types for Fari
//!
//! This module defines all custom error types used throughout the application.

use std::io;
use thiserror::Error;

/// Main error type for Fari operations
#[derive(Error, Debug)]
pub enum FariError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Protocol error
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// SOCKS5 protocol error
    #[error("SOCKS5 error: {0}")]
    Socks5(#[from] Socks5Error),

    /// The peer sent fewer bytes than the IV preamble needs
    #[error("Handshake underrun: expected {expected} IV bytes, got {got}")]
    HandshakeUnderrun {
        /// IV length required by the cipher
        expected: usize,
        /// Bytes received before end of stream
        got: usize,
    },

    /// The peer closed the connection
    #[error("Connection closed by peer")]
    Closed,

    /// A direction keystream was activated twice
    #[error("Keystream already active")]
    KeystreamAlreadyActive,

    /// Timeout error
    #[error("Timeout: {0}")]
    Timeout(String),

    /// A relay task panicked or was aborted
    #[error("Relay task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl FariError {
    /// Whether this error is a plain end of stream rather than a failure
    pub fn is_closed(&self) -> bool {
        matches!(self, FariError::Closed)
    }
}

/// SOCKS5 specific errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum Socks5Error {
    /// Unsupported SOCKS version
    #[error("Unsupported SOCKS version: {0}")]
    UnsupportedVersion(u8),

    /// Command not supported
    #[error("Command not supported: {0}")]
    CommandNotSupported(u8),

    /// Address type not supported
    #[error("Address type not supported: {0}")]
    AddressTypeNotSupported(u8),

    /// Message too short for the fields it declares
    #[error("Truncated message: {0} bytes")]
    Truncated(usize),

    /// Invalid domain name
    #[error("Invalid domain name")]
    InvalidDomain,

    /// Operation attempted in the wrong handshake state
    #[error("Unexpected handshake state: {0}")]
    UnexpectedState(&'static str),
}

/// Result alias used by the tunnel internals
pub type Result<T, E = FariError> = std::result::Result<T, E>;
