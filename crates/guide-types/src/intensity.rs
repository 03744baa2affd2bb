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

use chrono::{DateTime, FixedOffset, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Upper bound (inclusive) of the green band, gCO2/kWh
pub const GREEN_MAX: f64 = 618.1;

/// Upper bound (inclusive) of the amber band, gCO2/kWh
pub const AMBER_MAX: f64 = 752.6;

/// A single live carbon intensity observation for the grid region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntensityReading {
    /// Observation time, local to the grid region
    pub timestamp: DateTime<FixedOffset>,

    /// Carbon intensity (gCO2/kWh)
    pub value: f64,
}

impl IntensityReading {
    pub fn new(timestamp: DateTime<FixedOffset>, value: f64) -> Self {
        Self { timestamp, value }
    }

    /// Local hour of day (0-23) of this reading
    pub fn local_hour(&self) -> u8 {
        // hour() is always < 24
        u8::try_from(self.timestamp.hour()).unwrap_or(23)
    }
}

/// Three-level RAG classification of carbon intensity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntensityBand {
    /// Clean grid (green)
    Low,
    /// Amber
    Medium,
    /// Dirty grid (red)
    High,
}

impl IntensityBand {
    /// Classify using the default thresholds
    pub fn from_value(value: f64) -> Self {
        Self::from_value_with(value, GREEN_MAX, AMBER_MAX)
    }

    /// Classify using custom thresholds. Boundaries belong to the lower band.
    pub fn from_value_with(value: f64, green_max: f64, amber_max: f64) -> Self {
        if value <= green_max {
            Self::Low
        } else if value <= amber_max {
            Self::Medium
        } else {
            Self::High
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low (clean grid)",
            Self::Medium => "Medium",
            Self::High => "High (dirty grid)",
        }
    }

    /// RAG colour name
    pub fn color(&self) -> &'static str {
        match self {
            Self::Low => "green",
            Self::Medium => "amber",
            Self::High => "red",
        }
    }
}

impl fmt::Display for IntensityBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_band_boundaries_belong_to_lower_band() {
        assert_eq!(IntensityBand::from_value(0.0), IntensityBand::Low);
        assert_eq!(IntensityBand::from_value(618.1), IntensityBand::Low);
        assert_eq!(IntensityBand::from_value(618.2), IntensityBand::Medium);
        assert_eq!(IntensityBand::from_value(752.6), IntensityBand::Medium);
        assert_eq!(IntensityBand::from_value(752.7), IntensityBand::High);
        assert_eq!(IntensityBand::from_value(5000.0), IntensityBand::High);
    }

    #[test]
    fn test_labels_and_colors() {
        assert_eq!(IntensityBand::Low.label(), "Low (clean grid)");
        assert_eq!(IntensityBand::Medium.label(), "Medium");
        assert_eq!(IntensityBand::High.label(), "High (dirty grid)");
        assert_eq!(IntensityBand::Medium.color(), "amber");
    }

    #[test]
    fn test_local_hour() {
        let offset = FixedOffset::east_opt(11 * 3600).unwrap();
        let ts = offset.with_ymd_and_hms(2025, 1, 15, 17, 20, 0).unwrap();
        let reading = IntensityReading::new(ts, 700.0);
        assert_eq!(reading.local_hour(), 17);
    }
}
