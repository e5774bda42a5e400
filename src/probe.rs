//! TLS handshake client.
//!
//! Connects to a single host, drives a TLS handshake without validating
//! trust (the purpose is inspection, not trust establishment), and returns
//! the certificate chain exactly as the peer presented it.

use chrono::{DateTime, Utc};
use openssl::asn1::{Asn1Time, Asn1TimeRef};
use openssl::ssl::{HandshakeError, Ssl, SslContext, SslMethod, SslStream, SslVerifyMode};
use openssl::x509::X509Ref;
use std::net::{TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

use crate::error::ProbeError;

/// Default TLS port.
pub const DEFAULT_PORT: u16 = 443;

/// Default per-host timeout in seconds, applied to both the TCP connect
/// and the handshake deadline.
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Connection settings for a probe.
#[derive(Debug, Clone)]
pub struct ProbeOptions {
    /// Port to connect to (normally 443)
    pub port: u16,
    /// Bound on the TCP connect and on the overall handshake
    pub timeout: Duration,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        ProbeOptions {
            port: DEFAULT_PORT,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// One record of a presented chain, reduced to the fields the analyzer
/// needs downstream.
///
/// `not_after` is `None` when the record's validity field could not be
/// interpreted; such a record is not usable as a certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertRecord {
    /// Expiration timestamp (UTC) of the record
    pub not_after: Option<DateTime<Utc>>,
}

impl CertRecord {
    fn from_x509(cert: &X509Ref) -> Self {
        CertRecord {
            not_after: asn1_to_utc(cert.not_after()),
        }
    }
}

/// Certificate chain as presented by the peer, leaf first.
///
/// An empty chain is a valid outcome of a successful handshake and is
/// distinct from any network failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CertChain {
    records: Vec<CertRecord>,
}

impl CertChain {
    pub fn new(records: Vec<CertRecord>) -> Self {
        CertChain { records }
    }

    /// First certificate of the chain, identifying the server itself.
    pub fn leaf(&self) -> Option<&CertRecord> {
        self.records.first()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}

/// Terminal outcome of one probe: the presented chain, or why there is none.
pub type FetchResult = Result<CertChain, ProbeError>;

/// Fetches the certificate chain presented by `host`.
///
/// Opens a TCP connection under the configured timeout, performs a TLS
/// handshake with SNI set to `host` and certificate verification disabled,
/// and returns the peer chain. Invoked once per host; a failed attempt is
/// final, there are no retries.
///
/// A host given as `name:port` keeps its own port; the configured port
/// applies to bare names.
pub fn fetch(host: &str, options: &ProbeOptions) -> FetchResult {
    let (name, port) = split_host_port(host, options.port);
    let address = format!("{}:{}", name, port);
    let socket_addr = address
        .to_socket_addrs()
        .map_err(|e| ProbeError::DnsResolution {
            hostname: name.to_string(),
            source: e,
        })?
        .next()
        .ok_or_else(|| ProbeError::DnsResolution {
            hostname: name.to_string(),
            source: std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "hostname resolved to no addresses",
            ),
        })?;

    let stream = TcpStream::connect_timeout(&socket_addr, options.timeout).map_err(|e| {
        ProbeError::ConnectionFailed {
            address: address.clone(),
            source: e,
        }
    })?;
    stream
        .set_read_timeout(Some(options.timeout))
        .and_then(|_| stream.set_write_timeout(Some(options.timeout)))
        .map_err(|e| ProbeError::ConnectionFailed {
            address: address.clone(),
            source: e,
        })?;

    let tls = handshake(name, stream, options.timeout)?;

    let records = match tls.ssl().peer_cert_chain() {
        Some(chain) => chain.iter().map(CertRecord::from_x509).collect(),
        None => Vec::new(),
    };
    // Dropping `tls` here closes the session and the socket on every path.
    Ok(CertChain::new(records))
}

/// Drives the handshake to completion with a readiness-wait loop.
///
/// The TLS layer reports `WouldBlock` whenever it needs more socket data;
/// each retry blocks in the stream's timeout-bounded read, and the loop as
/// a whole is bounded by the per-host deadline.
fn handshake(
    host: &str,
    stream: TcpStream,
    timeout: Duration,
) -> Result<SslStream<TcpStream>, ProbeError> {
    let mut context = SslContext::builder(SslMethod::tls())?;
    context.set_verify(SslVerifyMode::NONE);
    let context = context.build();

    let mut ssl = Ssl::new(&context)?;
    ssl.set_hostname(host)?;

    let deadline = Instant::now() + timeout;
    let mut attempt = ssl.connect(stream);
    loop {
        match attempt {
            Ok(tls) => return Ok(tls),
            Err(HandshakeError::WouldBlock(mid)) => {
                if Instant::now() >= deadline {
                    return Err(ProbeError::Timeout {
                        operation: format!("TLS handshake with {}", host),
                    });
                }
                attempt = mid.handshake();
            }
            Err(HandshakeError::Failure(mid)) => {
                return Err(ProbeError::HandshakeFailed {
                    details: mid.error().to_string(),
                });
            }
            Err(HandshakeError::SetupFailure(stack)) => {
                return Err(ProbeError::Tls {
                    details: stack.to_string(),
                });
            }
        }
    }
}

/// Splits an explicit `name:port` host apart; bare names get the fallback
/// port. SNI and DNS use the bare name only.
fn split_host_port(host: &str, fallback_port: u16) -> (&str, u16) {
    match host.rsplit_once(':') {
        // The guard keeps IPv6 literals intact.
        Some((name, port)) if !name.contains(':') => match port.parse::<u16>() {
            Ok(port) => (name, port),
            Err(_) => (host, fallback_port),
        },
        _ => (host, fallback_port),
    }
}

/// Converts an ASN.1 time to UTC by diffing it against the Unix epoch.
fn asn1_to_utc(time: &Asn1TimeRef) -> Option<DateTime<Utc>> {
    let epoch = Asn1Time::from_unix(0).ok()?;
    let diff = epoch.diff(time).ok()?;
    let secs = i64::from(diff.days) * 86_400 + i64::from(diff.secs);
    DateTime::from_timestamp(secs, 0)
}
