//! Host-list input.
//!
//! Parses the fleet file: one logical host per non-empty line. Lines that
//! carry a full `https:` URL are reduced to their authority, and trailing
//! slashes are dropped, so the file can mix bare hostnames with URLs
//! pasted out of browsers or load-balancer configs.

use std::fs;
use std::io;
use std::path::Path;
use url::Url;

/// Reads and normalizes the host list from `path`, preserving line order.
pub fn read_hosts<P: AsRef<Path>>(path: P) -> io::Result<Vec<String>> {
    let content = fs::read_to_string(path)?;
    Ok(parse_hosts(&content))
}

/// Normalizes host-list content: trims each line, skips blank lines,
/// reduces `https:` URLs to host (plus explicit port), strips trailing
/// slashes.
pub fn parse_hosts(content: &str) -> Vec<String> {
    content.lines().filter_map(normalize_line).collect()
}

fn normalize_line(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let host = if line.starts_with("https:") {
        authority(line).unwrap_or_else(|| line.to_string())
    } else {
        line.to_string()
    };

    Some(host.trim_end_matches('/').to_string())
}

/// Authority component of a URL: host, plus the port when one is spelled
/// out.
fn authority(line: &str) -> Option<String> {
    let url = Url::parse(line).ok()?;
    let host = url.host_str()?;
    match url.port() {
        Some(port) => Some(format!("{}:{}", host, port)),
        None => Some(host.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_plain_hosts_pass_through() {
        assert_eq!(
            parse_hosts("example.com\njpbd.dev\n"),
            vec!["example.com", "jpbd.dev"]
        );
    }

    #[test]
    fn test_blank_lines_and_whitespace_are_skipped() {
        let content = "\n  example.com  \n\n\t\nother.example\n\n";
        assert_eq!(parse_hosts(content), vec!["example.com", "other.example"]);
    }

    #[test]
    fn test_https_url_reduces_to_authority() {
        assert_eq!(
            parse_hosts("https://example.com/some/path\n"),
            vec!["example.com"]
        );
        assert_eq!(
            parse_hosts("https://example.com:8443/health\n"),
            vec!["example.com:8443"]
        );
    }

    #[test]
    fn test_trailing_slash_is_stripped() {
        assert_eq!(parse_hosts("example.com/\n"), vec!["example.com"]);
        assert_eq!(parse_hosts("https://example.com/\n"), vec!["example.com"]);
    }

    #[test]
    fn test_order_is_preserved() {
        let content = "c.example\na.example\nb.example\n";
        assert_eq!(
            parse_hosts(content),
            vec!["c.example", "a.example", "b.example"]
        );
    }

    #[test]
    fn test_read_hosts_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"example.com\n\nhttps://other.example/x\n")
            .unwrap();

        let hosts = read_hosts(temp_file.path()).unwrap();
        assert_eq!(hosts, vec!["example.com", "other.example"]);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(read_hosts("/nonexistent/certsweep-hosts.txt").is_err());
    }
}
