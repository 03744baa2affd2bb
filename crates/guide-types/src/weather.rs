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

use serde::{Deserialize, Serialize};
use std::fmt;

const KMH_PER_MS: f64 = 3.6;

/// Wind speed tagged with its unit.
///
/// The historical record is in km/h while live sources may report m/s,
/// so every consumer goes through [`WindSpeed::as_kmh`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "unit", content = "value", rename_all = "snake_case")]
pub enum WindSpeed {
    KilometresPerHour(f64),
    MetresPerSecond(f64),
}

impl WindSpeed {
    pub fn as_kmh(&self) -> f64 {
        match *self {
            Self::KilometresPerHour(v) => v,
            Self::MetresPerSecond(v) => v * KMH_PER_MS,
        }
    }
}

/// Live (or historical) weather conditions at the fixed location
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherObservation {
    /// Air temperature at 2 m (°C)
    pub temperature_c: f64,

    /// Wind speed at 10 m
    pub wind_speed: WindSpeed,

    /// Total cloud cover (0-100%)
    pub cloud_cover_pct: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemperatureBand {
    Cold,
    Mild,
    Hot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindBand {
    Calm,
    Breezy,
    Windy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloudBand {
    Clear,
    PartlyCloudy,
    Overcast,
}

impl TemperatureBand {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Cold => "cold",
            Self::Mild => "mild",
            Self::Hot => "hot",
        }
    }
}

impl WindBand {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Calm => "calm",
            Self::Breezy => "breezy",
            Self::Windy => "windy",
        }
    }
}

impl CloudBand {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Clear => "clear",
            Self::PartlyCloudy => "partly cloudy",
            Self::Overcast => "overcast",
        }
    }
}

/// Combined weather category, used as the profile lookup key
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WeatherCategory {
    pub temperature: TemperatureBand,
    pub wind: WindBand,
    pub cloud: CloudBand,
}

impl WeatherCategory {
    pub fn new(temperature: TemperatureBand, wind: WindBand, cloud: CloudBand) -> Self {
        Self {
            temperature,
            wind,
            cloud,
        }
    }
}

/// Neutral category used when live weather is unavailable
impl Default for WeatherCategory {
    fn default() -> Self {
        Self::new(TemperatureBand::Mild, WindBand::Breezy, CloudBand::PartlyCloudy)
    }
}

impl fmt::Display for WeatherCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} / {} / {}",
            self.temperature.label(),
            self.wind.label(),
            self.cloud.label()
        )
    }
}
