//! Error types for certificate probing.
//!
//! This module defines the per-host failure taxonomy. Every variant is
//! local to a single host and is rendered into that host's report row;
//! none of them aborts a batch.

use std::fmt;
use std::io;

/// Error type for a failed certificate probe.
///
/// Variants before `HandshakeFailed` occur before any TLS bytes are
/// exchanged; the rest happen after the TCP connection is established.
#[derive(Debug)]
pub enum ProbeError {
    /// DNS resolution failed for the given hostname
    DnsResolution {
        /// The hostname that failed to resolve
        hostname: String,
        /// The underlying I/O error
        source: io::Error,
    },

    /// TCP connection failed to the target address
    ConnectionFailed {
        /// The address (host:port) that connection failed to
        address: String,
        /// The underlying I/O error
        source: io::Error,
    },

    /// TLS handshake failed
    HandshakeFailed {
        /// Details about why the handshake failed
        details: String,
    },

    /// Network operation timeout
    Timeout {
        /// Description of which operation timed out
        operation: String,
    },

    /// OpenSSL error occurred
    Tls {
        /// The underlying OpenSSL error
        details: String,
    },
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DnsResolution { hostname, .. } => {
                write!(f, "Failed to resolve hostname: {}", hostname)
            }
            Self::ConnectionFailed { address, .. } => {
                write!(f, "Connection failed to: {}", address)
            }
            Self::HandshakeFailed { details } => {
                write!(f, "TLS handshake failed: {}", details)
            }
            Self::Timeout { operation } => {
                write!(f, "Operation timed out: {}", operation)
            }
            Self::Tls { details } => {
                write!(f, "OpenSSL error: {}", details)
            }
        }
    }
}

impl std::error::Error for ProbeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::DnsResolution { source, .. } => Some(source),
            Self::ConnectionFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<openssl::error::ErrorStack> for ProbeError {
    fn from(e: openssl::error::ErrorStack) -> Self {
        Self::Tls {
            details: e.to_string(),
        }
    }
}
