use std::process::exit;
use std::str::FromStr;
use std::time::Duration;

use clap::Parser;
use comfy_table::Table;
use strum_macros::{Display, EnumString};

use certsweep::config::Config;
use certsweep::input;
use certsweep::metrics::prom::prometheus_metrics;
use certsweep::report;
use certsweep::runner::Runner;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
enum OutputFormat {
    Summary,
    Json,
    Quiet,
}

/// Fleet-wide TLS certificate expiry checker
#[derive(Parser, Debug)]
#[command(name = "certsweep", version, about, long_about = None)]
struct Cli {
    /// Path to the host-list file (one host per line)
    file: Option<String>,

    /// Path to a TOML configuration file
    #[arg(long)]
    config: Option<String>,

    /// Output format: summary, json, quiet
    #[arg(short, long)]
    output: Option<String>,

    /// Where the report file is written
    #[arg(long)]
    output_file: Option<String>,

    /// Cap on concurrent probes
    #[arg(long)]
    concurrency: Option<usize>,

    /// Per-host timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// TLS port to probe
    #[arg(long)]
    port: Option<u16>,

    /// Exit code to use when any certificate is expired or unreachable
    #[arg(long)]
    exit_code: Option<i32>,

    /// Push metrics to a Prometheus push gateway
    #[arg(long)]
    prometheus: bool,

    /// Prometheus push gateway address
    #[arg(long)]
    prometheus_address: Option<String>,

    /// Print an example configuration file and exit
    #[arg(long)]
    print_config: bool,
}

fn main() {
    let cli = Cli::parse();

    if cli.print_config {
        println!("{}", Config::example_toml());
        exit(0);
    }

    let mut config = Config::default();
    if let Some(path) = &cli.config {
        match Config::from_file(path) {
            Ok(file_config) => config = config.merge_with(file_config),
            Err(e) => {
                eprintln!("Failed to load configuration {}: {}", path, e);
                exit(1);
            }
        }
    }
    config = config.merge_with(Config::from_cli_args(
        cli.file,
        cli.output,
        cli.output_file,
        cli.concurrency,
        cli.timeout,
        cli.port,
        cli.exit_code,
        cli.prometheus.then_some(true),
        cli.prometheus_address,
    ));

    let format = match config.output.as_deref() {
        Some(name) => match OutputFormat::from_str(name) {
            Ok(format) => format,
            Err(_) => {
                eprintln!(
                    "Unknown output format: {} (expected summary, json, or quiet)",
                    name
                );
                exit(1);
            }
        },
        None => OutputFormat::Summary,
    };

    // The host-list file (CLI positional or config) takes precedence over
    // hosts listed inline in the configuration.
    let hosts: Vec<String> = match (&config.hosts_file, &config.hosts) {
        (Some(path), _) => match input::read_hosts(path) {
            Ok(hosts) => hosts,
            Err(e) => {
                eprintln!("Failed to read host list {}: {}", path, e);
                exit(1);
            }
        },
        (None, Some(hosts)) => input::parse_hosts(&hosts.join("\n")),
        (None, None) => {
            eprintln!("No hosts to check: pass a host-list file or set `hosts` in the configuration");
            exit(1);
        }
    };

    let mut runner = Runner::new();
    if let Some(concurrency) = config.concurrency {
        runner = runner.with_concurrency(concurrency);
    }
    if let Some(timeout_secs) = config.timeout_secs {
        runner = runner.with_timeout(Duration::from_secs(timeout_secs));
    }
    if let Some(port) = config.port {
        runner = runner.with_port(port);
    }

    let reports = runner.run(&hosts);

    let output_file = config
        .output_file
        .unwrap_or_else(|| "output.csv".to_string());
    if let Err(e) = report::write_report(&output_file, &reports) {
        eprintln!("Failed to write report {}: {}", output_file, e);
        exit(1);
    }

    match format {
        OutputFormat::Summary => {
            let mut table = Table::new();
            table.set_header(vec!["Host", "SSL_validityExpires"]);
            for report in &reports {
                table.add_row(vec![report.host.clone(), report.status.to_string()]);
            }
            println!("{table}");

            let alarming = reports.iter().filter(|r| r.status.is_alarming()).count();
            println!(
                "\n{} hosts checked, {} need attention. Report written to {}",
                reports.len(),
                alarming,
                output_file
            );
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&reports).unwrap());
        }
        OutputFormat::Quiet => {}
    }

    if let Some(prometheus) = &config.prometheus {
        if prometheus.enabled == Some(true) {
            match &prometheus.address {
                Some(address) => prometheus_metrics(&reports, address),
                None => eprintln!("Prometheus push enabled but no gateway address configured"),
            }
        }
    }

    let exit_code = config.exit_code.unwrap_or(0);
    if exit_code != 0 && reports.iter().any(|r| r.status.is_alarming()) {
        exit(exit_code);
    }
    exit(0);
}
