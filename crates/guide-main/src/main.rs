// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of GUIDE.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz


mod config;
mod report;
mod sources;

use anyhow::{Context, Result};
use chrono_tz::Tz;
use clap::Parser;
use guide_core::{
    Advisor, HistoricalHourlyProfile, aggregate_mix, load_intensity_csv, load_weather_csv,
};
use guide_types::{Appliance, LoadRequest};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::FmtSubscriber;

use crate::config::{AppConfig, HistoryConfig};
use crate::sources::Sources;

#[derive(Parser)]
#[command(name = "guide")]
#[command(version, about = "Low-carbon timing advice for household appliances", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file (default: ./config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run a single poll and exit
    #[arg(long)]
    once: bool,

    /// Appliance to advise on, e.g. dishwasher or ev-charger
    #[arg(short, long)]
    appliance: Option<Appliance>,

    /// Run duration in hours
    #[arg(short, long)]
    duration: Option<f64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respects RUST_LOG
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install tracing subscriber")?;

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(appliance) = cli.appliance {
        config.load.appliance = appliance;
    }
    if let Some(duration) = cli.duration {
        config.load.duration_hours = duration;
    }
    let load = config.load_request()?;
    let timezone = config.location.tz()?;

    info!("🚀 Starting GUIDE");
    info!("📋 Configuration Summary:");
    info!(
        "   Location: {}, {} ({})",
        config.location.latitude, config.location.longitude, timezone
    );
    info!(
        "   Load: {} for {} h ({:.1} kWh)",
        load.appliance,
        load.duration_hours,
        load.energy_kwh()
    );
    info!(
        "   Policy: green <= {}, amber <= {}, relative factor {}",
        config.policy.green_max, config.policy.amber_max, config.policy.relative_factor
    );
    info!("   Poll interval: {}s", config.system.poll_interval_secs);

    let profile = build_profile(&config.history, timezone)?;
    let advisor = Advisor::new(Arc::new(profile), config.policy, config.savings);
    let sources = Sources::from_config(&config, timezone)?;

    if cli.once {
        run_tick(&advisor, &sources, &load).await;
        return Ok(());
    }

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("⚠️ Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };
    poll_until(
        &advisor,
        &sources,
        &load,
        config.system.poll_interval(),
        shutdown,
    )
    .await;

    Ok(())
}

/// Poll on a fixed interval until `shutdown` resolves. A tick in flight is
/// abandoned on shutdown. Returns the number of completed ticks.
async fn poll_until<F>(
    advisor: &Advisor,
    sources: &Sources,
    load: &LoadRequest,
    period: Duration,
    shutdown: F,
) -> usize
where
    F: Future<Output = ()>,
{
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    let mut completed = 0;
    loop {
        tokio::select! {
            () = &mut shutdown => {
                info!("👋 Shutting down");
                break;
            }
            () = async {
                ticker.tick().await;
                run_tick(advisor, sources, load).await;
            } => completed += 1,
        }
    }
    completed
}

fn build_profile(history: &HistoryConfig, timezone: Tz) -> Result<HistoricalHourlyProfile> {
    let weather = load_weather_csv(&history.weather_csv).with_context(|| {
        format!(
            "Failed to load weather history from {}",
            history.weather_csv.display()
        )
    })?;
    let intensity = load_intensity_csv(&history.intensity_csv).with_context(|| {
        format!(
            "Failed to load intensity history from {}",
            history.intensity_csv.display()
        )
    })?;

    let profile = HistoricalHourlyProfile::build(&weather, &intensity, timezone);
    if profile.is_empty() {
        warn!("⚠️ Historical profile is empty, shift recommendations will report no data");
    } else {
        info!(
            "📊 Historical profile: {} cells from {} joined hours",
            profile.len(),
            profile.joined_rows()
        );
    }
    Ok(profile)
}

/// One poll: fetch all sources concurrently, advise, report
async fn run_tick(advisor: &Advisor, sources: &Sources, load: &LoadRequest) {
    let (intensity, weather, mix) = tokio::join!(
        sources.intensity.latest_intensity(),
        sources.weather.current_weather(),
        async {
            match &sources.mix {
                Some(mix) => Some(mix.latest_mix().await),
                None => None,
            }
        }
    );

    let advice = advisor.advise(intensity, weather, load);

    let grid_mix = mix.map(|result| match result {
        Ok(snapshot) => aggregate_mix(snapshot.as_ref()),
        Err(e) => {
            warn!("⚠️ Generation mix unavailable: {}", e);
            aggregate_mix(None)
        }
    });

    for line in report::render(&advice, grid_mix.as_ref()) {
        info!("{}", line);
    }
}
