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

use guide_types::{IntensityBand, IntensityReading, LoadRequest, WeatherCategory, WeatherObservation};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::classifier::classify_with_policy;
use crate::errors::GuideResult;
use crate::profile::HistoricalHourlyProfile;
use crate::recommendation::{
    RecommendationEngine, RecommendationOutcome, RecommendationPolicy,
};
use crate::savings::{SavingsEstimate, SavingsFactors};

pub const INTENSITY_SOURCE: &str = "intensity";

/// Everything computed for one poll tick
#[derive(Debug, Clone)]
pub struct Advice {
    pub load: LoadRequest,
    pub reading: Option<IntensityReading>,
    pub band: Option<IntensityBand>,
    pub category: WeatherCategory,
    /// True when live weather failed and the default category was used
    pub weather_fallback: bool,
    pub outcome: RecommendationOutcome,
    pub savings: Option<SavingsEstimate>,
    /// Historical curve for the current category
    pub trend: Vec<(u8, f64)>,
}

/// Runs the full classify / categorize / evaluate / estimate chain against
/// one shared, read-only profile
#[derive(Debug, Clone)]
pub struct Advisor {
    profile: Arc<HistoricalHourlyProfile>,
    engine: RecommendationEngine,
    factors: SavingsFactors,
}

impl Advisor {
    pub fn new(
        profile: Arc<HistoricalHourlyProfile>,
        policy: RecommendationPolicy,
        factors: SavingsFactors,
    ) -> Self {
        Self {
            profile,
            engine: RecommendationEngine::new(policy),
            factors,
        }
    }

    pub fn profile(&self) -> &HistoricalHourlyProfile {
        &self.profile
    }

    pub fn policy(&self) -> &RecommendationPolicy {
        self.engine.policy()
    }

    pub fn advise(
        &self,
        intensity: GuideResult<Option<IntensityReading>>,
        weather: GuideResult<WeatherObservation>,
        load: &LoadRequest,
    ) -> Advice {
        let weather_fallback = weather.is_err();
        let category = self.profile.categorize_or_default(weather);
        let trend = self.profile.hourly_curve(category);

        let reading = match intensity {
            Ok(Some(reading)) => reading,
            Ok(None) => {
                warn!("Intensity source returned no recent observation");
                return self.unavailable(load, category, weather_fallback, trend, "no recent observation");
            }
            Err(e) => {
                warn!("Intensity source failed: {}", e);
                return self.unavailable(load, category, weather_fallback, trend, &e.to_string());
            }
        };

        let (band, label) = classify_with_policy(reading.value, self.engine.policy());
        let hour = reading.local_hour();
        let recommendation = self
            .engine
            .evaluate(reading.value, hour, category, &self.profile);

        info!(
            "{:.1} gCO2/kWh ({}) at {:02}:00, weather {} -> {}",
            reading.value, label, hour, category, recommendation
        );

        let savings = match SavingsEstimate::for_recommendation(
            reading.value,
            &recommendation,
            load,
            &self.factors,
        ) {
            Some(Ok(estimate)) => Some(estimate),
            Some(Err(e)) => {
                error!("Savings estimate rejected: {}", e);
                None
            }
            None => None,
        };

        Advice {
            load: *load,
            reading: Some(reading),
            band: Some(band),
            category,
            weather_fallback,
            outcome: RecommendationOutcome::Computed(recommendation),
            savings,
            trend,
        }
    }

    fn unavailable(
        &self,
        load: &LoadRequest,
        category: WeatherCategory,
        weather_fallback: bool,
        trend: Vec<(u8, f64)>,
        reason: &str,
    ) -> Advice {
        Advice {
            load: *load,
            reading: None,
            band: None,
            category,
            weather_fallback,
            outcome: RecommendationOutcome::unavailable(INTENSITY_SOURCE, reason),
            savings: None,
            trend,
        }
    }
}
