//! Fleet-wide TLS certificate expiry checking.
//!
//! certsweep probes every host in a list concurrently, extracts the leaf
//! certificate each host presents during a no-validation TLS handshake, and
//! reports the time remaining before it expires. Trust is deliberately not
//! established: chains are not validated, revocation is not checked, and
//! hostname binding is not verified. The output is one status per input
//! host, in input order, suitable for alerting.
//!
//! The building blocks compose top-down:
//!
//! - [`probe`] opens one TLS connection and returns the presented chain
//! - [`expiry`] turns a probe outcome into a per-host status
//! - [`runner`] fans probes out over a bounded worker pool
//! - [`input`] and [`report`] handle the host-list and report files

pub mod config;
pub mod error;
pub mod expiry;
pub mod input;
pub mod metrics;
pub mod probe;
pub mod report;
pub mod runner;

pub use error::ProbeError;
pub use expiry::{analyze, analyze_at, ExpiryStatus};
pub use probe::{fetch, CertChain, CertRecord, FetchResult, ProbeOptions};
pub use runner::{HostReport, Runner};
