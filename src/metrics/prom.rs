use lazy_static::lazy_static;
use prometheus::{labels, register_gauge, Gauge};

use crate::expiry::ExpiryStatus;
use crate::runner::HostReport;

lazy_static! {
    static ref CERTSWEEP_MINUTES_BEFORE_EXPIRED: Gauge = register_gauge!(
        "certsweep_minutes_before_expired",
        "minutes before expiration"
    )
    .unwrap();
    static ref CERTSWEEP_HOURS_BEFORE_EXPIRED: Gauge =
        register_gauge!("certsweep_hours_before_expired", "hours before expiration").unwrap();
}

/// Function to push metrics to prometheus
/// # Arguments
/// * `reports` - Slice of per-host reports
/// * `prometheus_address` - Prometheus push gateway address
pub fn prometheus_metrics(reports: &[HostReport], prometheus_address: &str) {
    for report in reports.iter() {
        // Only hosts with a measured expiry carry a gauge value; failed
        // probes still push their status label.
        if let ExpiryStatus::Expires { minutes } = report.status {
            CERTSWEEP_MINUTES_BEFORE_EXPIRED.set(minutes as f64);
            CERTSWEEP_HOURS_BEFORE_EXPIRED.set(minutes as f64 / 60.0);
        }

        let status = match report.status {
            ExpiryStatus::Expires { .. } => "expires",
            ExpiryStatus::NoCertificate { .. } => "no_certificate",
            ExpiryStatus::Unreachable { .. } => "unreachable",
        };

        let metric_families = prometheus::gather();
        let prometheus_client = prometheus::push_metrics(
            "certsweep",
            labels! {
                "instance".to_owned() => "certsweep".to_owned(),
                "job".to_owned() => "certsweep".to_owned(),
                "host".to_owned() => report.host.to_owned(),
                "status".to_owned() => status.to_owned(),
                "alarming".to_owned() => report.status.is_alarming().to_string(),
            },
            &format!("{}/metrics/job", prometheus_address),
            metric_families,
            None,
        );

        match prometheus_client {
            Ok(_) => {}
            Err(e) => println!("\nFailed to push metrics to prometheus: {}", e),
        }
    }
}
