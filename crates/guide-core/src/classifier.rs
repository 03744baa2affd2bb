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

use guide_types::IntensityBand;

use crate::recommendation::RecommendationPolicy;

/// Classify a live intensity reading (gCO2/kWh) with the default thresholds.
///
/// The caller is responsible for passing a finite, non-negative value.
pub fn classify_intensity(value: f64) -> (IntensityBand, &'static str) {
    let band = IntensityBand::from_value(value);
    (band, band.label())
}

/// Classify against the thresholds of a configured policy
pub fn classify_with_policy(value: f64, policy: &RecommendationPolicy) -> (IntensityBand, &'static str) {
    let band = IntensityBand::from_value_with(value, policy.green_max, policy.amber_max);
    (band, band.label())
}
