//! `coupongen` binary: runs one generation batch and prints the coupons.

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

mod config;
mod model_file;
mod telemetry;

use crate::{
    config::{AppConfig, CliArgs},
    model_file::build_model,
    telemetry::init_telemetry,
};
use anyhow::bail;
use clap::Parser;
use coupongen::{Coupon, CouponController, DrawType, RunState};
use futures::StreamExt;
use serde::Serialize;
use std::{sync::Arc, time::Instant};
use tokio::signal;
use tokio_stream::wrappers::WatchStream;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let args = CliArgs::parse();
    let config = AppConfig::try_from(args)?;
    let providers = init_telemetry()?;

    let result = run(config).await;

    providers.shutdown();
    result
}

/// Final outcome of a batch, as printed with `--json`.
#[derive(Debug, Serialize)]
struct Report {
    draw_type: DrawType,
    state: RunState,
    progress: String,
    coupons: Vec<Coupon>,
}

async fn run(config: AppConfig) -> anyhow::Result<()> {
    let model = build_model(
        config.draw_type,
        config.model_file.as_deref(),
        &config.exclude,
    )?;
    let controller = CouponController::for_draw_type(Arc::new(model), config.draw_type)
        .with_config(config.generator);

    log_startup_info(&config);

    let started = Instant::now();
    let Some(mut handle) = controller.start(config.request)? else {
        bail!("Model data for {} is not ready", config.draw_type);
    };
    telemetry::increment_runs();

    let mut progress = WatchStream::from_changes(controller.progress());
    let mut shutdown = std::pin::pin!(shutdown_signal());

    let interrupted = loop {
        tokio::select! {
            biased;
            () = &mut shutdown => break true,
            _ = handle.finished() => break false,
            Some(_value) = progress.next() => {
                #[cfg(feature = "tracing")]
                tracing::info!("Progress {:.0}%", _value * 100.0);
            }
        }
    };

    // Cancelling discards partial results, so snapshot them first.
    let coupons = controller.coupons();
    let progress = controller.progress_status().to_string();
    if interrupted {
        handle.cancel();
    }
    let state = handle.state();

    telemetry::record_run_duration(started.elapsed().as_secs_f64() * 1000.0);
    telemetry::record_coupons_generated(coupons.len() as u64);
    if state == RunState::TimedOut {
        telemetry::increment_timeouts();
    }

    let report = Report {
        draw_type: config.draw_type,
        state,
        progress,
        coupons,
    };
    print_report(&report, config.json)?;

    if state == RunState::TimedOut {
        bail!(
            "Model data did not arrive within {:?}",
            config.request.timeout
        );
    }
    Ok(())
}

fn print_report(report: &Report, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    for coupon in &report.coupons {
        println!("{coupon}");
    }
    #[cfg(feature = "tracing")]
    tracing::info!(
        "Run {} with {} coupon(s) ({})",
        report.state,
        report.coupons.len(),
        report.progress
    );
    Ok(())
}

fn log_startup_info(_config: &AppConfig) {
    if cfg!(debug_assertions) {
        #[cfg(feature = "tracing")]
        tracing::info!(
            "Generating {} coupons with full config: {:#?}",
            _config.draw_type,
            _config
        );
    } else {
        #[cfg(feature = "tracing")]
        tracing::info!(
            "Generating {} {} coupons at distance {}",
            _config.request.target_count,
            _config.draw_type,
            _config.request.distance
        );
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(_e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!("Failed to install SIGTERM handler: {:?}", _e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let ctrl_c = async {
        if let Err(_e) = signal::ctrl_c().await {
            #[cfg(feature = "tracing")]
            tracing::warn!("Failed to install Ctrl+C handler: {:?}", _e);
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        () = ctrl_c => {
            #[cfg(feature = "tracing")]
            tracing::info!("Received Ctrl+C signal, cancelling run");
        },
        () = terminate => {
            #[cfg(feature = "tracing")]
            tracing::info!("Received SIGTERM signal, cancelling run");
        },
    }
}
