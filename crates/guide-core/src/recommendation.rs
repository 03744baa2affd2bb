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

use guide_types::{AMBER_MAX, GREEN_MAX, WeatherCategory};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::errors::{GuideError, GuideResult};
use crate::profile::HistoricalHourlyProfile;

/// Thresholds driving the run-now / shift decision
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecommendationPolicy {
    /// Intensity at or below which the grid counts as clean (gCO2/kWh)
    #[serde(default = "default_green_max")]
    pub green_max: f64,

    /// Upper bound of the amber band (gCO2/kWh)
    #[serde(default = "default_amber_max")]
    pub amber_max: f64,

    /// A future hour also qualifies when its mean is at most this fraction
    /// of the current intensity
    #[serde(default = "default_relative_factor")]
    pub relative_factor: f64,
}

fn default_green_max() -> f64 {
    GREEN_MAX
}

fn default_amber_max() -> f64 {
    AMBER_MAX
}

fn default_relative_factor() -> f64 {
    0.7
}

impl Default for RecommendationPolicy {
    fn default() -> Self {
        Self {
            green_max: default_green_max(),
            amber_max: default_amber_max(),
            relative_factor: default_relative_factor(),
        }
    }
}

impl RecommendationPolicy {
    pub fn validate(&self) -> GuideResult<()> {
        if !(self.green_max > 0.0 && self.green_max < self.amber_max) {
            return Err(GuideError::InvalidInput(format!(
                "policy thresholds must satisfy 0 < green_max < amber_max, got {} / {}",
                self.green_max, self.amber_max
            )));
        }
        if !(self.relative_factor > 0.0 && self.relative_factor <= 1.0) {
            return Err(GuideError::InvalidInput(format!(
                "policy relative_factor must be in (0, 1], got {}",
                self.relative_factor
            )));
        }
        Ok(())
    }

    fn qualifies(&self, mean: f64, current_intensity: f64) -> bool {
        mean <= self.green_max || mean <= self.relative_factor * current_intensity
    }
}

/// Outcome of one evaluation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Recommendation {
    /// Grid is already clean, run now
    RunNow,
    /// A cleaner hour later today is expected
    Shift {
        hour: u8,
        /// Historical mean at `hour`, the value savings must be computed from
        expected_intensity: f64,
    },
    /// Dirty now and no qualifying hour for the rest of the day
    NoShiftAvailable,
    /// History has no rows for this category after the current hour
    NoData,
}

impl Recommendation {
    pub fn to_result(&self) -> RecommendationResult {
        match *self {
            Self::RunNow | Self::NoShiftAvailable => RecommendationResult {
                shift_needed: Some(false),
                recommended_hour: None,
            },
            Self::Shift { hour, .. } => RecommendationResult {
                shift_needed: Some(true),
                recommended_hour: Some(hour),
            },
            Self::NoData => RecommendationResult {
                shift_needed: None,
                recommended_hour: None,
            },
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::RunNow => "No shift needed, the grid is clean right now".to_owned(),
            Self::Shift { hour, .. } => format!("Shift the load to {hour:02}:00 for a cleaner grid"),
            Self::NoShiftAvailable => "No improvement expected later today".to_owned(),
            Self::NoData => "Insufficient forecast data for current conditions".to_owned(),
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

/// Flat result shape consumed by the report.
///
/// `shift_needed == None` means the history could not answer, which is not
/// the same as `Some(false)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationResult {
    pub shift_needed: Option<bool>,
    pub recommended_hour: Option<u8>,
}

/// Recommendation, or the reason it could not be computed at all
#[derive(Debug, Clone, PartialEq)]
pub enum RecommendationOutcome {
    Computed(Recommendation),
    /// A live input was missing; nothing was evaluated
    Unavailable { source: String, reason: String },
}

impl RecommendationOutcome {
    pub fn unavailable(source: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            source: source.into(),
            reason: reason.into(),
        }
    }

    /// `None` when no evaluation took place
    pub fn to_result(&self) -> Option<RecommendationResult> {
        match self {
            Self::Computed(rec) => Some(rec.to_result()),
            Self::Unavailable { .. } => None,
        }
    }

    pub fn recommendation(&self) -> Option<&Recommendation> {
        match self {
            Self::Computed(rec) => Some(rec),
            Self::Unavailable { .. } => None,
        }
    }
}

/// Stateless decision engine
#[derive(Debug, Clone, Copy, Default)]
pub struct RecommendationEngine {
    policy: RecommendationPolicy,
}

impl RecommendationEngine {
    pub fn new(policy: RecommendationPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &RecommendationPolicy {
        &self.policy
    }

    /// Decide whether to run now or shift to a later hour today.
    ///
    /// Only hours strictly after `current_hour` on the same calendar day are
    /// searched. Among qualifying hours the earliest wins, not the cleanest.
    pub fn evaluate(
        &self,
        current_intensity: f64,
        current_hour: u8,
        category: WeatherCategory,
        profile: &HistoricalHourlyProfile,
    ) -> Recommendation {
        if current_intensity <= self.policy.green_max {
            debug!(
                "Intensity {:.1} within green band (<= {}), run now",
                current_intensity, self.policy.green_max
            );
            return Recommendation::RunNow;
        }

        let mut future = profile.future_hours(category, current_hour).peekable();
        if future.peek().is_none() {
            debug!(
                "No history for {} after {:02}:00, cannot recommend",
                category, current_hour
            );
            return Recommendation::NoData;
        }

        let chosen = future.find(|&(_, mean)| self.policy.qualifies(mean, current_intensity));

        match chosen {
            Some((hour, expected_intensity)) => {
                debug!(
                    "Shift to {:02}:00 (historical mean {:.1} vs current {:.1})",
                    hour, expected_intensity, current_intensity
                );
                Recommendation::Shift {
                    hour,
                    expected_intensity,
                }
            }
            None => Recommendation::NoShiftAvailable,
        }
    }
}
