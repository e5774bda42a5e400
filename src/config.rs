//! Configuration file management for certsweep.
//!
//! This module handles loading, parsing, and merging configuration from TOML
//! files and command-line arguments. Settings can be specified in multiple
//! places with clear precedence rules.
//!
//! # Configuration Precedence
//!
//! 1. Default values (lowest priority)
//! 2. Configuration file (certsweep.toml or specified with --config)
//! 3. Command-line arguments (highest priority)
//!
//! # Example Configuration File
//!
//! ```toml
//! hosts_file = "hosts.txt"
//! output = "summary"
//! output_file = "output.csv"
//! concurrency = 256
//! timeout_secs = 5
//! exit_code = 1
//!
//! [prometheus]
//! enabled = true
//! address = "http://localhost:9091"
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main configuration structure for certsweep.
///
/// All fields are optional to support partial configuration and merging.
/// Missing values will be filled in by defaults or overridden by CLI
/// arguments.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    /// Path to the host-list file
    pub hosts_file: Option<String>,
    /// Hosts to check, given inline instead of through a file
    pub hosts: Option<Vec<String>>,
    /// Output format: summary, json, quiet
    pub output: Option<String>,
    /// Path the report file is written to
    pub output_file: Option<String>,
    /// Cap on concurrent probes
    pub concurrency: Option<usize>,
    /// Per-host timeout in seconds (TCP connect and handshake deadline)
    pub timeout_secs: Option<u64>,
    /// TLS port to probe
    pub port: Option<u16>,
    /// Exit code to use when any certificate is expired or unreachable
    pub exit_code: Option<i32>,
    /// Prometheus configuration
    pub prometheus: Option<PrometheusConfig>,
}

/// Prometheus integration configuration.
///
/// Controls whether metrics are pushed to a Prometheus Push Gateway
/// and specifies the gateway address.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PrometheusConfig {
    /// Enable prometheus metrics pushing
    pub enabled: Option<bool>,
    /// Prometheus push gateway address (e.g., "http://localhost:9091")
    pub address: Option<String>,
}

impl Config {
    /// Loads configuration from a TOML file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the TOML configuration file
    ///
    /// # Returns
    ///
    /// * `Ok(Config)` - Successfully parsed configuration
    /// * `Err(ConfigError::Io)` - File could not be read
    /// * `Err(ConfigError::Parse)` - File contains invalid TOML
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io(e.to_string()))?;

        let config: Config =
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        Ok(config)
    }

    /// Creates a default configuration with sensible defaults.
    ///
    /// # Default Values
    ///
    /// - `hosts_file` / `hosts`: None (must be provided)
    /// - `output`: "summary"
    /// - `output_file`: "output.csv"
    /// - `concurrency`: 256
    /// - `timeout_secs`: 5
    /// - `port`: 443
    /// - `exit_code`: 0 (don't fail on expired certificates)
    /// - `prometheus.enabled`: false
    /// - `prometheus.address`: "http://localhost:9091"
    pub fn default() -> Self {
        Config {
            hosts_file: None,
            hosts: None,
            output: Some("summary".to_string()),
            output_file: Some("output.csv".to_string()),
            concurrency: Some(crate::runner::DEFAULT_CONCURRENCY),
            timeout_secs: Some(crate::probe::DEFAULT_TIMEOUT_SECS),
            port: Some(crate::probe::DEFAULT_PORT),
            exit_code: Some(0),
            prometheus: Some(PrometheusConfig {
                enabled: Some(false),
                address: Some("http://localhost:9091".to_string()),
            }),
        }
    }

    /// Merges this configuration with another, prioritizing the other's
    /// values.
    ///
    /// For each field, if the `other` config has a value (Some), it
    /// overrides this config's value. If the `other` value is None, keeps
    /// the current value.
    pub fn merge_with(mut self, other: Config) -> Self {
        if other.hosts_file.is_some() {
            self.hosts_file = other.hosts_file;
        }
        if other.hosts.is_some() {
            self.hosts = other.hosts;
        }
        if other.output.is_some() {
            self.output = other.output;
        }
        if other.output_file.is_some() {
            self.output_file = other.output_file;
        }
        if other.concurrency.is_some() {
            self.concurrency = other.concurrency;
        }
        if other.timeout_secs.is_some() {
            self.timeout_secs = other.timeout_secs;
        }
        if other.port.is_some() {
            self.port = other.port;
        }
        if other.exit_code.is_some() {
            self.exit_code = other.exit_code;
        }
        if let Some(other_prom) = other.prometheus {
            if let Some(ref mut self_prom) = self.prometheus {
                if other_prom.enabled.is_some() {
                    self_prom.enabled = other_prom.enabled;
                }
                if other_prom.address.is_some() {
                    self_prom.address = other_prom.address;
                }
            } else {
                self.prometheus = Some(other_prom);
            }
        }
        self
    }

    /// Creates a Config from command-line arguments for merging.
    ///
    /// Converts CLI arguments into a Config structure that can be merged
    /// with file-based and default configurations. Only provided arguments
    /// (Some values) will override other configurations.
    #[allow(clippy::too_many_arguments)]
    pub fn from_cli_args(
        hosts_file: Option<String>,
        output: Option<String>,
        output_file: Option<String>,
        concurrency: Option<usize>,
        timeout_secs: Option<u64>,
        port: Option<u16>,
        exit_code: Option<i32>,
        prometheus: Option<bool>,
        prometheus_address: Option<String>,
    ) -> Self {
        Config {
            hosts_file,
            hosts: None,
            output,
            output_file,
            concurrency,
            timeout_secs,
            port,
            exit_code,
            prometheus: Some(PrometheusConfig {
                enabled: prometheus,
                address: prometheus_address,
            }),
        }
    }

    /// Generates an example configuration file in TOML format.
    ///
    /// Creates a sample configuration with all available options set to
    /// example values. Useful for bootstrapping a new configuration file.
    pub fn example_toml() -> String {
        let example = Config {
            hosts_file: Some("hosts.txt".to_string()),
            hosts: Some(vec![
                "example.com".to_string(),
                "https://secure.example.com:9443".to_string(),
                "expired.badssl.com".to_string(),
            ]),
            output: Some("summary".to_string()),
            output_file: Some("output.csv".to_string()),
            concurrency: Some(256),
            timeout_secs: Some(5),
            port: Some(443),
            exit_code: Some(1),
            prometheus: Some(PrometheusConfig {
                enabled: Some(true),
                address: Some("http://localhost:9091".to_string()),
            }),
        };

        toml::to_string_pretty(&example)
            .unwrap_or_else(|_| "# Error generating example".to_string())
    }
}

/// Errors that can occur during configuration loading and parsing.
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error (file not found, permission denied, etc.)
    Io(String),
    /// TOML parsing error (invalid syntax, type mismatch, etc.)
    Parse(String),
    /// Validation error (missing required fields, invalid values, etc.)
    Validation(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "IO Error: {}", msg),
            ConfigError::Parse(msg) => write!(f, "Parse Error: {}", msg),
            ConfigError::Validation(msg) => write!(f, "Validation Error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
