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

use async_trait::async_trait;
use guide_types::{GenerationSnapshot, IntensityReading, WeatherObservation};

use crate::errors::GuideResult;

// ============= Live Data Source Traits =============

/// Live grid carbon intensity
#[async_trait]
pub trait IntensitySource: Send + Sync {
    fn name(&self) -> &str;

    /// Most recent observation, or `None` if the source has nothing recent.
    /// Transport and API failures are `GuideError::UpstreamUnavailable`.
    async fn latest_intensity(&self) -> GuideResult<Option<IntensityReading>>;
}

/// Live weather at the configured location
#[async_trait]
pub trait WeatherSource: Send + Sync {
    fn name(&self) -> &str;

    async fn current_weather(&self) -> GuideResult<WeatherObservation>;
}

/// Live generation by fuel tech
#[async_trait]
pub trait GenerationMixSource: Send + Sync {
    fn name(&self) -> &str;

    async fn latest_mix(&self) -> GuideResult<Option<GenerationSnapshot>>;
}
