//! Prometheus metrics collection for Roster
//!
//! This module provides metrics instrumentation for tracking:
//! - Page views and tracked clicks
//! - Records created and removed
//! - Validation rejections and storage write failures
//! - Size of the stored snapshot and process uptime
//!
//! Metrics are exposed via the `/metrics` endpoint in Prometheus text format.
//! Every counter is declared up front in [`Counter`]; handlers can't mint
//! new series at request time.

use prometheus::{Encoder, Gauge, IntCounter, IntGauge, Opts, Registry, TextEncoder};
use std::sync::Arc;
use std::time::Instant;

/// Pre-declared counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Counter {
    /// GET / served
    PageViews = 0,
    /// Click reported by the entry page
    Clicks,
    /// Record stored successfully
    RecordsCreated,
    /// Record removed (only when something was actually deleted)
    RecordsRemoved,
    /// Save rejected by validation
    ValidationFailures,
    /// Append/remove failed while writing the snapshot
    StoreWriteFailures,
}

impl Counter {
    pub const ALL: [Counter; 6] = [
        Counter::PageViews,
        Counter::Clicks,
        Counter::RecordsCreated,
        Counter::RecordsRemoved,
        Counter::ValidationFailures,
        Counter::StoreWriteFailures,
    ];

    /// Exposed metric name
    pub fn name(&self) -> &'static str {
        match self {
            Counter::PageViews => "roster_page_views_total",
            Counter::Clicks => "roster_clicks_total",
            Counter::RecordsCreated => "roster_records_created_total",
            Counter::RecordsRemoved => "roster_records_removed_total",
            Counter::ValidationFailures => "roster_validation_failures_total",
            Counter::StoreWriteFailures => "roster_store_write_failures_total",
        }
    }

    fn help(&self) -> &'static str {
        match self {
            Counter::PageViews => "Total number of entry page requests",
            Counter::Clicks => "Total number of clicks tracked on the entry page",
            Counter::RecordsCreated => "Total number of records stored",
            Counter::RecordsRemoved => "Total number of records removed",
            Counter::ValidationFailures => "Total number of save requests rejected by validation",
            Counter::StoreWriteFailures => {
                "Total number of record mutations that failed to persist. \
                Alert on ANY increment - a submitted change was not saved."
            }
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

/// Metrics collector for Roster
///
/// Owns its own registry; clone it (cheap) to share between handlers.
#[derive(Clone)]
pub struct Metrics {
    registry: Arc<Registry>,
    counters: Vec<IntCounter>,
    stored_records: IntGauge,
    uptime_seconds: Gauge,
    started: Instant,
}

impl Metrics {
    /// Create a new Metrics instance
    ///
    /// Registers all counters and gauges with a fresh Prometheus registry,
    /// plus the process collector on Linux.
    ///
    /// # Errors
    ///
    /// Returns an error if metric registration fails (e.g., duplicate names).
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        // One IntCounter per declared Counter, stored in declaration order
        let mut counters = Vec::with_capacity(Counter::ALL.len());
        for counter in Counter::ALL {
            let metric = IntCounter::with_opts(Opts::new(counter.name(), counter.help()))?;
            registry.register(Box::new(metric.clone()))?;
            counters.push(metric);
        }

        // Gauge: number of records in the last snapshot a handler observed
        let stored_records = IntGauge::with_opts(Opts::new(
            "roster_stored_records",
            "Number of records in the most recently observed snapshot",
        ))?;
        registry.register(Box::new(stored_records.clone()))?;

        // Gauge: refreshed on every scrape
        let uptime_seconds = Gauge::with_opts(Opts::new(
            "roster_uptime_seconds",
            "Seconds since the metrics registry was created",
        ))?;
        registry.register(Box::new(uptime_seconds.clone()))?;

        #[cfg(target_os = "linux")]
        registry.register(Box::new(
            prometheus::process_collector::ProcessCollector::for_self(),
        ))?;

        Ok(Self {
            registry: Arc::new(registry),
            counters,
            stored_records,
            uptime_seconds,
            started: Instant::now(),
        })
    }

    /// Increment a counter by one (atomic)
    pub fn increment(&self, counter: Counter) {
        self.counters[counter.index()].inc();
    }

    /// Current value of a counter
    pub fn counter_value(&self, counter: Counter) -> u64 {
        self.counters[counter.index()].get()
    }

    /// Record the size of a snapshot a handler just read or wrote
    pub fn set_stored_records(&self, count: usize) {
        self.stored_records
            .set(i64::try_from(count).unwrap_or(i64::MAX));
    }

    pub fn stored_records(&self) -> i64 {
        self.stored_records.get()
    }

    /// Render every registered metric in the Prometheus text format
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails or produces invalid UTF-8.
    pub fn gather(&self) -> Result<String, prometheus::Error> {
        self.uptime_seconds
            .set(self.started.elapsed().as_secs_f64());

        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| {
            prometheus::Error::Msg(format!("Metrics output is not valid UTF-8: {}", e))
        })
    }

    /// Content type of [`gather`](Self::gather) output
    pub fn content_type(&self) -> &'static str {
        prometheus::TEXT_FORMAT
    }
}
