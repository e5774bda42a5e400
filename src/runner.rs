//! Batch orchestration.
//!
//! Fans one probe per host out onto a bounded pool of worker threads,
//! waits for all of them, and returns one report per host in input order.
//! A host's failure never cancels or delays the rest of the batch.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use serde::Serialize;

use crate::expiry::{self, ExpiryStatus};
use crate::probe::{self, FetchResult, ProbeOptions};

/// Default cap on concurrent probes, sized to give a large batch real
/// parallelism without exhausting file descriptors.
pub const DEFAULT_CONCURRENCY: usize = 256;

/// One row of the final report.
#[derive(Debug, Clone, Serialize)]
pub struct HostReport {
    /// The host exactly as it appeared in the input list
    pub host: String,
    /// Outcome of the expiry assessment for this host
    #[serde(flatten)]
    pub status: ExpiryStatus,
}

/// Orchestrates a batch of certificate probes.
#[derive(Debug, Clone)]
pub struct Runner {
    concurrency: usize,
    options: ProbeOptions,
}

impl Default for Runner {
    fn default() -> Self {
        Self::new()
    }
}

impl Runner {
    pub fn new() -> Self {
        Runner {
            concurrency: DEFAULT_CONCURRENCY,
            options: ProbeOptions::default(),
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = timeout;
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.options.port = port;
        self
    }

    /// Probes every host and returns one report per host, preserving the
    /// input order regardless of completion order.
    ///
    /// Duplicate hostnames occupy distinct slots and are probed
    /// independently.
    pub fn run(&self, hosts: &[String]) -> Vec<HostReport> {
        let options = self.options.clone();
        self.run_with(hosts, move |host| probe::fetch(host, &options))
    }

    fn run_with<F>(&self, hosts: &[String], fetch: F) -> Vec<HostReport>
    where
        F: Fn(&str) -> FetchResult + Send + Sync,
    {
        // Pre-allocated positional slots; each worker writes its outcome
        // into the slot for the index it claimed.
        let mut reports: Vec<HostReport> = hosts
            .iter()
            .map(|host| HostReport {
                host: host.clone(),
                status: ExpiryStatus::Unreachable {
                    reason: "no result recorded".to_string(),
                },
            })
            .collect();

        let cursor = AtomicUsize::new(0);
        let workers = self.concurrency.min(hosts.len());
        let (tx, rx) = mpsc::channel();

        thread::scope(|scope| {
            for _ in 0..workers {
                let tx = tx.clone();
                let cursor = &cursor;
                let fetch = &fetch;
                scope.spawn(move || loop {
                    let index = cursor.fetch_add(1, Ordering::Relaxed);
                    if index >= hosts.len() {
                        break;
                    }
                    let result = fetch(&hosts[index]);
                    if tx.send((index, result)).is_err() {
                        break;
                    }
                });
            }
            drop(tx);

            // Join barrier: the channel stays open until every worker has
            // exited, so this drains exactly one result per host.
            for (index, result) in rx {
                reports[index].status = expiry::analyze(&hosts[index], &result);
            }
        });

        reports
    }
}
