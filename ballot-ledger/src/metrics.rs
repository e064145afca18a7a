//! Metrics collection for observability
//!
//! # Metrics
//!
//! - `ledger_entries_appended_total` - Entries appended in-memory
//! - `ledger_votes_rejected_total` - Duplicate votes turned away
//! - `ledger_validation_failures_total` - Validations that found a broken chain
//! - `ledger_reloads_total` - Chain reloads from the store
//! - `ledger_append_duration_seconds` - Append latency histogram
//! - `ledger_chain_length` - Current entry count

use prometheus::{Histogram, HistogramOpts, IntCounter, IntGauge, Registry};
use std::sync::Arc;

/// Metrics collector
///
/// Collectors are registered on an owned registry rather than the process
/// default, so independent ledger instances never collide.
#[derive(Clone)]
pub struct Metrics {
    /// Entries appended
    pub entries_appended: IntCounter,

    /// Duplicate votes rejected
    pub votes_rejected: IntCounter,

    /// Validations that returned a broken status
    pub validation_failures: IntCounter,

    /// Chain reloads from the store
    pub reloads: IntCounter,

    /// Append latency histogram
    pub append_duration: Histogram,

    /// Current chain length
    pub chain_length: IntGauge,

    /// Prometheus registry
    pub registry: Arc<Registry>,
}

impl Metrics {
    /// Create new metrics collector
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let entries_appended = IntCounter::new(
            "ledger_entries_appended_total",
            "Entries appended in-memory",
        )?;
        registry.register(Box::new(entries_appended.clone()))?;

        let votes_rejected = IntCounter::new(
            "ledger_votes_rejected_total",
            "Duplicate votes turned away",
        )?;
        registry.register(Box::new(votes_rejected.clone()))?;

        let validation_failures = IntCounter::new(
            "ledger_validation_failures_total",
            "Validations that found a broken chain",
        )?;
        registry.register(Box::new(validation_failures.clone()))?;

        let reloads = IntCounter::new("ledger_reloads_total", "Chain reloads from the store")?;
        registry.register(Box::new(reloads.clone()))?;

        let append_duration = Histogram::with_opts(
            HistogramOpts::new(
                "ledger_append_duration_seconds",
                "Histogram of append latencies",
            )
            .buckets(vec![0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250]),
        )?;
        registry.register(Box::new(append_duration.clone()))?;

        let chain_length = IntGauge::new("ledger_chain_length", "Current entry count")?;
        registry.register(Box::new(chain_length.clone()))?;

        Ok(Self {
            entries_appended,
            votes_rejected,
            validation_failures,
            reloads,
            append_duration,
            chain_length,
            registry,
        })
    }
}
