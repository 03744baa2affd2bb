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

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Prefix the generation API puts on every fuel-tech series name
const POWER_PREFIX: &str = "power_";

/// Fuel techs tracked by the grid mix summary, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fuel {
    Solar,
    Wind,
    Hydro,
    Coal,
    Gas,
}

impl Fuel {
    /// Renewables first, then fossil
    pub fn display_order() -> &'static [Fuel] {
        &[Self::Solar, Self::Wind, Self::Hydro, Self::Coal, Self::Gas]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Solar => "solar",
            Self::Wind => "wind",
            Self::Hydro => "hydro",
            Self::Coal => "coal",
            Self::Gas => "gas",
        }
    }

    pub fn is_renewable(&self) -> bool {
        matches!(self, Self::Solar | Self::Wind | Self::Hydro)
    }

    /// Match a series name such as `power_coal` or `coal`.
    /// Returns `None` for fuel techs outside the tracked set.
    pub fn from_series_name(name: &str) -> Option<Self> {
        let bare = name.strip_prefix(POWER_PREFIX).unwrap_or(name);
        Self::display_order()
            .iter()
            .copied()
            .find(|fuel| fuel.name() == bare)
    }
}

impl fmt::Display for Fuel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Latest data point of one fuel-tech series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationPoint {
    pub timestamp: Option<DateTime<FixedOffset>>,
    pub value_mw: Option<f64>,
}

/// Latest generation by fuel-tech series name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationSnapshot {
    series: BTreeMap<String, GenerationPoint>,
}

impl GenerationSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, point: GenerationPoint) {
        self.series.insert(name.into(), point);
    }

    pub fn get(&self, name: &str) -> Option<&GenerationPoint> {
        self.series.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &GenerationPoint)> {
        self.series.iter().map(|(name, point)| (name.as_str(), point))
    }

    /// Most recent timestamp across all series
    pub fn latest_timestamp(&self) -> Option<DateTime<FixedOffset>> {
        self.series.values().filter_map(|p| p.timestamp).max()
    }
}

impl FromIterator<(String, GenerationPoint)> for GenerationSnapshot {
    fn from_iter<I: IntoIterator<Item = (String, GenerationPoint)>>(iter: I) -> Self {
        Self {
            series: iter.into_iter().collect(),
        }
    }
}
