//! Metrics collection and export module

use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, IntGauge, Opts, Registry, TextEncoder};

/// Global metrics registry
pub struct Metrics {
    registry: Registry,

    // Counters
    pub ticks_total: IntCounter,
    pub fetch_errors: IntCounter,
    pub signatures_processed: IntCounter,
    pub signatures_failed: IntCounter,
    pub transactions_filtered: IntCounter,
    pub non_marketplace_transactions: IntCounter,
    pub sales_detected: IntCounter,
    pub metadata_unavailable: IntCounter,
    pub notifications_delivered: IntCounter,
    pub notification_failures: IntCounter,

    // Gauges
    pub last_batch_size: IntGauge,

    // Histograms
    pub rpc_latency: Histogram,
    pub tick_duration: Histogram,
}

impl Metrics {
    /// Create new metrics instance
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let ticks_total = IntCounter::with_opts(Opts::new("ticks_total", "Number of polling ticks"))?;

        let fetch_errors = IntCounter::with_opts(Opts::new(
            "fetch_errors_total",
            "Signature fetches that failed and were retried",
        ))?;

        let signatures_processed = IntCounter::with_opts(Opts::new(
            "signatures_processed_total",
            "Signatures taken through the pipeline",
        ))?;

        let signatures_failed = IntCounter::with_opts(Opts::new(
            "signatures_failed_total",
            "Signatures skipped after a processing error",
        ))?;

        let transactions_filtered = IntCounter::with_opts(Opts::new(
            "transactions_filtered_total",
            "Transactions dropped as failed or predating startup",
        ))?;

        let non_marketplace_transactions = IntCounter::with_opts(Opts::new(
            "non_marketplace_transactions_total",
            "Transactions whose program is not a known marketplace",
        ))?;

        let sales_detected =
            IntCounter::with_opts(Opts::new("sales_detected_total", "Marketplace sales classified"))?;

        let metadata_unavailable = IntCounter::with_opts(Opts::new(
            "metadata_unavailable_total",
            "Sales whose metadata could not be resolved",
        ))?;

        let notifications_delivered = IntCounter::with_opts(Opts::new(
            "notifications_delivered_total",
            "Sale notifications accepted by a sink",
        ))?;

        let notification_failures = IntCounter::with_opts(Opts::new(
            "notification_failures_total",
            "Sale notifications a sink failed to deliver",
        ))?;

        let last_batch_size = IntGauge::with_opts(Opts::new(
            "last_batch_size",
            "Signatures returned by the latest fetch",
        ))?;

        let rpc_latency = Histogram::with_opts(
            HistogramOpts::new("rpc_latency_seconds", "RPC call latency")
                .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
        )?;

        let tick_duration = Histogram::with_opts(
            HistogramOpts::new("tick_duration_seconds", "Duration of a polling tick")
                .buckets(vec![0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0]),
        )?;

        // Register all metrics
        registry.register(Box::new(ticks_total.clone()))?;
        registry.register(Box::new(fetch_errors.clone()))?;
        registry.register(Box::new(signatures_processed.clone()))?;
        registry.register(Box::new(signatures_failed.clone()))?;
        registry.register(Box::new(transactions_filtered.clone()))?;
        registry.register(Box::new(non_marketplace_transactions.clone()))?;
        registry.register(Box::new(sales_detected.clone()))?;
        registry.register(Box::new(metadata_unavailable.clone()))?;
        registry.register(Box::new(notifications_delivered.clone()))?;
        registry.register(Box::new(notification_failures.clone()))?;
        registry.register(Box::new(last_batch_size.clone()))?;
        registry.register(Box::new(rpc_latency.clone()))?;
        registry.register(Box::new(tick_duration.clone()))?;

        Ok(Self {
            registry,
            ticks_total,
            fetch_errors,
            signatures_processed,
            signatures_failed,
            transactions_filtered,
            non_marketplace_transactions,
            sales_detected,
            metadata_unavailable,
            notifications_delivered,
            notification_failures,
            last_batch_size,
            rpc_latency,
            tick_duration,
        })
    }

    /// Render all metrics in the Prometheus text format
    pub fn render(&self) -> anyhow::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

/// Global metrics instance
pub fn metrics() -> &'static Metrics {
    static METRICS: once_cell::sync::Lazy<Metrics> =
        once_cell::sync::Lazy::new(|| Metrics::new().expect("Failed to initialize metrics"));
    &METRICS
}
