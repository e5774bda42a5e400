//! Report output.
//!
//! Writes the positional report file consumed by downstream alerting:
//! `;`-delimited, every field quoted, one `\n`-terminated row per host in
//! input order, after a `Host;SSL_validityExpires` header.

use csv::{QuoteStyle, Terminator, WriterBuilder};
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::runner::HostReport;

/// Writes the report to a file at `path`, creating or truncating it.
pub fn write_report<P: AsRef<Path>>(path: P, reports: &[HostReport]) -> csv::Result<()> {
    let file = File::create(path)?;
    write_report_to(file, reports)
}

/// Writes the report rows to any writer. The status column carries the
/// rendered status text, e.g. "The certificate will expire in 0:59:00".
pub fn write_report_to<W: Write>(writer: W, reports: &[HostReport]) -> csv::Result<()> {
    let mut csv_writer = WriterBuilder::new()
        .delimiter(b';')
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(writer);

    csv_writer.write_record(["Host", "SSL_validityExpires"])?;
    for report in reports {
        let status = report.status.to_string();
        csv_writer.write_record([report.host.as_str(), status.as_str()])?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expiry::ExpiryStatus;

    fn render(reports: &[HostReport]) -> String {
        let mut buffer = Vec::new();
        write_report_to(&mut buffer, reports).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_header_only_for_empty_report() {
        assert_eq!(render(&[]), "\"Host\";\"SSL_validityExpires\"\n");
    }

    #[test]
    fn test_rows_are_quoted_and_newline_terminated() {
        let reports = vec![
            HostReport {
                host: "example.com".to_string(),
                status: ExpiryStatus::Expires { minutes: 59 },
            },
            HostReport {
                host: "bare.example".to_string(),
                status: ExpiryStatus::NoCertificate {
                    host: "bare.example".to_string(),
                },
            },
        ];

        let rendered = render(&reports);
        assert_eq!(
            rendered,
            "\"Host\";\"SSL_validityExpires\"\n\
             \"example.com\";\"The certificate will expire in 0:59:00\"\n\
             \"bare.example\";\"Couldn't find certificate for bare.example\"\n"
        );
    }

    #[test]
    fn test_rows_follow_input_order() {
        let reports: Vec<HostReport> = ["c.example", "a.example", "b.example"]
            .iter()
            .map(|host| HostReport {
                host: host.to_string(),
                status: ExpiryStatus::Expires { minutes: 1 },
            })
            .collect();

        let rendered = render(&reports);
        let hosts: Vec<&str> = rendered
            .lines()
            .skip(1)
            .map(|line| line.split(';').next().unwrap())
            .collect();
        assert_eq!(hosts, vec!["\"c.example\"", "\"a.example\"", "\"b.example\""]);
    }

    #[test]
    fn test_write_report_creates_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output.csv");

        let reports = vec![HostReport {
            host: "example.com".to_string(),
            status: ExpiryStatus::Unreachable {
                reason: "Connection failed to: example.com:443".to_string(),
            },
        }];
        write_report(&path, &reports).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("\"Host\";\"SSL_validityExpires\"\n"));
        assert!(content.contains("\"Connection failed to: example.com:443\""));
    }
}
