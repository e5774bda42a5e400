//! Expiration analysis.
//!
//! Pure mapping from a probe outcome to a per-host status. No I/O happens
//! here; the clock is an explicit input so results are reproducible.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use crate::probe::FetchResult;

/// Per-host outcome of the expiry assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExpiryStatus {
    /// Whole minutes until the leaf certificate's not-after timestamp,
    /// floored. Negative once the certificate has expired.
    Expires { minutes: i64 },
    /// The handshake succeeded but no usable certificate was presented
    NoCertificate { host: String },
    /// The probe itself failed; carries the probe error's message
    Unreachable { reason: String },
}

impl ExpiryStatus {
    /// True when the host needs attention: unreachable, certificate
    /// missing, or already expired.
    pub fn is_alarming(&self) -> bool {
        match self {
            ExpiryStatus::Expires { minutes } => *minutes < 0,
            _ => true,
        }
    }
}

impl fmt::Display for ExpiryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpiryStatus::Expires { minutes } => {
                write!(
                    f,
                    "The certificate will expire in {}",
                    format_remaining(*minutes)
                )
            }
            ExpiryStatus::NoCertificate { host } => {
                write!(f, "Couldn't find certificate for {}", host)
            }
            ExpiryStatus::Unreachable { reason } => write!(f, "{}", reason),
        }
    }
}

/// Assesses one probe outcome against the current UTC clock.
pub fn analyze(host: &str, result: &FetchResult) -> ExpiryStatus {
    analyze_at(host, result, Utc::now())
}

/// Assesses one probe outcome against an explicit clock.
///
/// Only the leaf record of the chain is ever inspected; intermediates are
/// ignored even when the leaf is unusable.
pub fn analyze_at(host: &str, result: &FetchResult, now: DateTime<Utc>) -> ExpiryStatus {
    let chain = match result {
        Ok(chain) => chain,
        Err(e) => {
            return ExpiryStatus::Unreachable {
                reason: e.to_string(),
            }
        }
    };

    match chain.leaf().and_then(|leaf| leaf.not_after) {
        Some(not_after) => {
            // Floor on seconds, so 90 minutes 10 seconds reports as 90.
            let remaining_secs = not_after.timestamp() - now.timestamp();
            ExpiryStatus::Expires {
                minutes: remaining_secs.div_euclid(60),
            }
        }
        None => ExpiryStatus::NoCertificate {
            host: host.to_string(),
        },
    }
}

/// Renders a whole-minute duration the way the report format expects:
/// `0:59:00`, `16 days, 22:33:00`, `-1 day, 23:59:00`.
fn format_remaining(minutes: i64) -> String {
    let total_secs = minutes * 60;
    let days = total_secs.div_euclid(86_400);
    let rem = total_secs.rem_euclid(86_400);
    let hours = rem / 3_600;
    let mins = rem % 3_600 / 60;

    if days == 0 {
        format!("{}:{:02}:00", hours, mins)
    } else if days == 1 || days == -1 {
        format!("{} day, {}:{:02}:00", days, hours, mins)
    } else {
        format!("{} days, {}:{:02}:00", days, hours, mins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProbeError;
    use crate::probe::{CertChain, CertRecord};
    use chrono::{Duration as ChronoDuration, TimeZone};

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn chain_expiring_at(not_after: DateTime<Utc>) -> FetchResult {
        Ok(CertChain::new(vec![CertRecord {
            not_after: Some(not_after),
        }]))
    }

    #[test]
    fn test_remaining_minutes_are_floored_not_rounded() {
        let now = fixed_now();
        let result =
            chain_expiring_at(now + ChronoDuration::minutes(90) + ChronoDuration::seconds(10));

        assert_eq!(
            analyze_at("example.com", &result, now),
            ExpiryStatus::Expires { minutes: 90 }
        );
    }

    #[test]
    fn test_empty_chain_reports_no_certificate() {
        let result: FetchResult = Ok(CertChain::default());
        let status = analyze_at("example.com", &result, fixed_now());

        assert_eq!(
            status,
            ExpiryStatus::NoCertificate {
                host: "example.com".to_string()
            }
        );
        assert_eq!(
            status.to_string(),
            "Couldn't find certificate for example.com"
        );
    }

    #[test]
    fn test_unparseable_leaf_reports_no_certificate() {
        let result: FetchResult = Ok(CertChain::new(vec![CertRecord { not_after: None }]));

        assert_eq!(
            analyze_at("example.com", &result, fixed_now()),
            ExpiryStatus::NoCertificate {
                host: "example.com".to_string()
            }
        );
    }

    #[test]
    fn test_only_the_leaf_is_inspected() {
        let now = fixed_now();
        // Unusable leaf followed by a perfectly good intermediate.
        let result: FetchResult = Ok(CertChain::new(vec![
            CertRecord { not_after: None },
            CertRecord {
                not_after: Some(now + ChronoDuration::days(365)),
            },
        ]));

        assert_eq!(
            analyze_at("example.com", &result, now),
            ExpiryStatus::NoCertificate {
                host: "example.com".to_string()
            }
        );
    }

    #[test]
    fn test_probe_failure_propagates_as_diagnostic() {
        let result: FetchResult = Err(ProbeError::Timeout {
            operation: "TLS handshake with example.com".to_string(),
        });
        let status = analyze_at("example.com", &result, fixed_now());

        assert_eq!(
            status,
            ExpiryStatus::Unreachable {
                reason: "Operation timed out: TLS handshake with example.com".to_string()
            }
        );
    }

    #[test]
    fn test_expired_certificate_stays_numeric() {
        let now = fixed_now();
        let result = chain_expiring_at(now - ChronoDuration::minutes(1));
        let status = analyze_at("example.com", &result, now);

        assert_eq!(status, ExpiryStatus::Expires { minutes: -1 });
        assert!(status.is_alarming());
    }

    #[test]
    fn test_expired_remainder_floors_toward_minus_infinity() {
        let now = fixed_now();
        // 30 seconds past expiry: floor lands on -1 minute, not 0.
        let result = chain_expiring_at(now - ChronoDuration::seconds(30));

        assert_eq!(
            analyze_at("example.com", &result, now),
            ExpiryStatus::Expires { minutes: -1 }
        );
    }

    #[test]
    fn test_analysis_is_idempotent_under_a_fixed_clock() {
        let now = fixed_now();
        let result = chain_expiring_at(now + ChronoDuration::days(30));

        let first = analyze_at("example.com", &result, now);
        let second = analyze_at("example.com", &result, now);
        assert_eq!(first, second);
    }

    #[test]
    fn test_duration_rendering() {
        assert_eq!(
            ExpiryStatus::Expires { minutes: 59 }.to_string(),
            "The certificate will expire in 0:59:00"
        );
        assert_eq!(
            ExpiryStatus::Expires { minutes: 90 }.to_string(),
            "The certificate will expire in 1:30:00"
        );
        assert_eq!(
            ExpiryStatus::Expires {
                minutes: 16 * 1_440 + 22 * 60 + 33
            }
            .to_string(),
            "The certificate will expire in 16 days, 22:33:00"
        );
        assert_eq!(
            ExpiryStatus::Expires { minutes: 1_440 }.to_string(),
            "The certificate will expire in 1 day, 0:00:00"
        );
        assert_eq!(
            ExpiryStatus::Expires { minutes: -1 }.to_string(),
            "The certificate will expire in -1 day, 23:59:00"
        );
    }

    #[test]
    fn test_healthy_status_is_not_alarming() {
        assert!(!ExpiryStatus::Expires { minutes: 90 }.is_alarming());
        assert!(ExpiryStatus::NoCertificate {
            host: "example.com".to_string()
        }
        .is_alarming());
        assert!(ExpiryStatus::Unreachable {
            reason: "down".to_string()
        }
        .is_alarming());
    }
}
