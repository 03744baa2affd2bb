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


//! Wiring of the live sources from configuration.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono_tz::Tz;
use guide_adapters::{
    CsiroIntensityClient, FallbackMixSource, OpenElectricityMixClient, OpenMeteoWeatherClient,
};
use guide_core::{
    GenerationMixSource, GuideError, GuideResult, IntensitySource, WeatherSource,
};
use guide_types::{GenerationSnapshot, IntensityReading};
use std::sync::Arc;
use tracing::info;

use crate::config::AppConfig;

/// Stands in for a source whose credentials are missing; every call fails
/// as unavailable so the report says why
struct Unconfigured(&'static str);

#[async_trait]
impl IntensitySource for Unconfigured {
    fn name(&self) -> &str {
        self.0
    }

    async fn latest_intensity(&self) -> GuideResult<Option<IntensityReading>> {
        Err(GuideError::upstream(self.0, "credentials not configured"))
    }
}

#[async_trait]
impl GenerationMixSource for Unconfigured {
    fn name(&self) -> &str {
        self.0
    }

    async fn latest_mix(&self) -> GuideResult<Option<GenerationSnapshot>> {
        Err(GuideError::upstream(self.0, "API token not configured"))
    }
}

pub struct Sources {
    pub intensity: Arc<dyn IntensitySource>,
    pub weather: Arc<dyn WeatherSource>,
    /// `None` when the mix display is disabled
    pub mix: Option<Arc<dyn GenerationMixSource>>,
}

impl Sources {
    pub fn from_config(config: &AppConfig, timezone: Tz) -> Result<Self> {
        let system = &config.system;
        let timeout = system.request_timeout();

        let intensity: Arc<dyn IntensitySource> = match config.sources.intensity.credentials() {
            Some(credentials) => {
                let cfg = &config.sources.intensity;
                Arc::new(
                    CsiroIntensityClient::new(credentials, timezone, timeout)
                        .context("Failed to create CSIRO client")?
                        .with_endpoints(cfg.token_base_url.clone(), cfg.observations_url.clone())
                        .with_stream(cfg.stream_id.clone())
                        .with_retry_config(system.max_retries, system.retry_delay()),
                )
            }
            None => Arc::new(Unconfigured("csiro")),
        };
        info!("🔌 Intensity source: {}", intensity.name());

        let weather: Arc<dyn WeatherSource> = Arc::new(
            OpenMeteoWeatherClient::new(
                config.location.latitude,
                config.location.longitude,
                config.location.timezone.clone(),
                timeout,
            )
            .context("Failed to create Open-Meteo client")?
            .with_base_url(config.sources.weather.base_url.clone())
            .with_retry_config(system.max_retries, system.retry_delay()),
        );
        info!("🔌 Weather source: {}", weather.name());

        let mix_cfg = &config.sources.mix;
        let mix: Option<Arc<dyn GenerationMixSource>> = if !mix_cfg.enabled {
            None
        } else if let Some(token) = mix_cfg.token() {
            let client = OpenElectricityMixClient::new(token, timeout)
                .context("Failed to create OpenElectricity client")?
                .with_base_url(mix_cfg.base_url.clone())
                .with_network(mix_cfg.network.clone())
                .with_retry_config(system.max_retries, system.retry_delay());
            Some(Arc::new(FallbackMixSource::new(client, timezone)))
        } else {
            Some(Arc::new(FallbackMixSource::new(
                Unconfigured("openelectricity"),
                timezone,
            )))
        };
        if let Some(mix) = &mix {
            info!("🔌 Generation mix source: {}", mix.name());
        }

        Ok(Self {
            intensity,
            weather,
            mix,
        })
    }
}
