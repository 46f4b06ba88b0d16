//! # Telemetry
//!
//! Console logging is always on through `tracing_subscriber::fmt`, filtered
//! by `RUST_LOG` (defaults to `info`).
//!
//! ## Feature matrix
//!
//! - `tracing`: Log events from the pipeline and the binary.
//! - `metrics`: OpenTelemetry counters and histograms for generation runs.
//! - `stdout`: Export metrics to stdout every few seconds.
//!
//! ```bash
//! cargo run -p coupongen-cli --features metrics,stdout -- --count 5
//! ```

// Disallow using `stdout` without `metrics`
#[cfg(all(feature = "stdout", not(feature = "metrics")))]
compile_error!("The 'stdout' feature requires 'metrics' to be enabled.");

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[cfg(feature = "metrics")]
use opentelemetry::{
    InstrumentationScope, KeyValue,
    metrics::{Counter, Histogram, Meter},
};
#[cfg(feature = "metrics")]
use opentelemetry_sdk::{Resource, metrics as sdkmetrics};
#[cfg(feature = "metrics")]
use opentelemetry_semantic_conventions as semvcns;
#[cfg(feature = "metrics")]
use std::sync::OnceLock;

pub struct TelemetryProviders {
    #[cfg(feature = "metrics")]
    pub meter_provider: sdkmetrics::SdkMeterProvider,
}

impl TelemetryProviders {
    /// Flushes pending metrics and shuts the exporters down.
    pub fn shutdown(self) {
        #[cfg(feature = "metrics")]
        {
            if let Err(err) = self.meter_provider.force_flush() {
                eprintln!("Error flushing metrics: {:#?}", err);
            }
            if let Err(err) = self.meter_provider.shutdown() {
                eprintln!("Error shutting down meter: {:#?}", err);
            }
        }
    }
}

pub fn init_telemetry() -> anyhow::Result<TelemetryProviders> {
    #[cfg(feature = "metrics")]
    let meter_provider = init_metrics();

    // Logs go to stderr so stdout only carries the generated coupons.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339()),
        )
        .try_init()?;

    #[cfg(feature = "metrics")]
    {
        let scope = InstrumentationScope::builder("coupongen")
            .with_version(env!("CARGO_PKG_VERSION"))
            .with_schema_url(semvcns::SCHEMA_URL)
            .build();
        opentelemetry::global::set_meter_provider(meter_provider.clone());
        init_metric_handles(opentelemetry::global::meter_with_scope(scope));
    }

    Ok(TelemetryProviders {
        #[cfg(feature = "metrics")]
        meter_provider,
    })
}

#[cfg(feature = "metrics")]
fn resource() -> Resource {
    Resource::builder()
        .with_service_name("coupongen")
        .with_schema_url(
            [KeyValue::new(
                semvcns::resource::SERVICE_VERSION,
                env!("CARGO_PKG_VERSION"),
            )],
            semvcns::SCHEMA_URL,
        )
        .build()
}

#[cfg(feature = "metrics")]
fn init_metrics() -> sdkmetrics::SdkMeterProvider {
    let builder = sdkmetrics::SdkMeterProvider::builder().with_resource(resource());

    #[cfg(feature = "stdout")]
    let builder = {
        use opentelemetry_stdout::MetricExporter;
        let exporter = MetricExporter::default();
        let reader = sdkmetrics::PeriodicReader::builder(exporter)
            .with_interval(std::time::Duration::from_secs(5))
            .build();

        builder.with_reader(reader)
    };

    builder.build()
}

// Metric handles - only compiled when metrics feature is enabled
#[cfg(feature = "metrics")]
static RUNS: OnceLock<Counter<u64>> = OnceLock::new();
#[cfg(feature = "metrics")]
static TIMEOUTS: OnceLock<Counter<u64>> = OnceLock::new();
#[cfg(feature = "metrics")]
static COUPONS_GENERATED: OnceLock<Counter<u64>> = OnceLock::new();
#[cfg(feature = "metrics")]
static RUN_DURATION_MS: OnceLock<Histogram<f64>> = OnceLock::new();

#[cfg(feature = "metrics")]
fn init_metric_handles(meter: Meter) {
    let _ = RUNS.set(
        meter
            .u64_counter("runs")
            .with_description("Generation runs started")
            .build(),
    );

    let _ = TIMEOUTS.set(
        meter
            .u64_counter("timeouts")
            .with_description("Runs that gave up waiting for model data")
            .build(),
    );

    let _ = COUPONS_GENERATED.set(
        meter
            .u64_counter("coupons_generated")
            .with_description("Coupons accepted across all runs")
            .build(),
    );

    let _ = RUN_DURATION_MS.set(
        meter
            .f64_histogram("run_duration")
            .with_unit("ms")
            .with_description("Time from start to a terminal run state")
            .build(),
    );
}

// Convenience functions that compile to no-ops when metrics are disabled
#[cfg(feature = "metrics")]
pub fn increment_runs() {
    if let Some(counter) = RUNS.get() {
        counter.add(1, &[]);
    }
}

#[cfg(not(feature = "metrics"))]
pub fn increment_runs() {}

#[cfg(feature = "metrics")]
pub fn increment_timeouts() {
    if let Some(counter) = TIMEOUTS.get() {
        counter.add(1, &[]);
    }
}

#[cfg(not(feature = "metrics"))]
pub fn increment_timeouts() {}

#[cfg(feature = "metrics")]
pub fn record_coupons_generated(count: u64) {
    if let Some(counter) = COUPONS_GENERATED.get() {
        counter.add(count, &[]);
    }
}

#[cfg(not(feature = "metrics"))]
pub fn record_coupons_generated(_count: u64) {}

#[cfg(feature = "metrics")]
pub fn record_run_duration(duration_ms: f64) {
    if let Some(histogram) = RUN_DURATION_MS.get() {
        histogram.record(duration_ms, &[]);
    }
}

#[cfg(not(feature = "metrics"))]
pub fn record_run_duration(_duration_ms: f64) {}
