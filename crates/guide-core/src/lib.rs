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


pub mod advisor;
pub mod classifier;
pub mod errors;
pub mod grid_mix;
pub mod history;
pub mod profile;
pub mod recommendation;
pub mod savings;
pub mod traits;

pub use advisor::{Advice, Advisor};
pub use classifier::{classify_intensity, classify_with_policy};
pub use errors::{GuideError, GuideResult};
pub use grid_mix::{FuelShare, GridMix, GridMixSummary, aggregate_mix};
pub use history::{
    IntensityRecord, WeatherRecord, load_intensity_csv, load_weather_csv, read_intensity,
    read_weather,
};
pub use profile::{CategoryCuts, HistoricalHourlyProfile, ProfileCell, TertileCuts};
pub use recommendation::{
    Recommendation, RecommendationEngine, RecommendationOutcome, RecommendationPolicy,
    RecommendationResult,
};
pub use savings::{SavingsEstimate, SavingsFactors, estimate_savings};
pub use traits::{GenerationMixSource, IntensitySource, WeatherSource};
