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

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Household appliances a recommendation can be computed for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Appliance {
    Dishwasher,
    WashingMachine,
    ClothesDryer,
    ElectricOven,
    PoolPump,
    EvCharger,
}

impl Appliance {
    /// Typical power draw while running (kW)
    pub fn representative_kw(&self) -> f64 {
        match self {
            Self::Dishwasher => 1.2,
            Self::WashingMachine => 0.8,
            Self::ClothesDryer => 2.5,
            Self::ElectricOven => 2.4,
            Self::PoolPump => 1.1,
            Self::EvCharger => 7.0,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Dishwasher => "Dishwasher",
            Self::WashingMachine => "Washing machine",
            Self::ClothesDryer => "Clothes dryer",
            Self::ElectricOven => "Electric oven",
            Self::PoolPump => "Pool pump",
            Self::EvCharger => "EV charger",
        }
    }

    /// Config string value (kebab-case)
    pub fn to_config_value(&self) -> &'static str {
        match self {
            Self::Dishwasher => "dishwasher",
            Self::WashingMachine => "washing-machine",
            Self::ClothesDryer => "clothes-dryer",
            Self::ElectricOven => "electric-oven",
            Self::PoolPump => "pool-pump",
            Self::EvCharger => "ev-charger",
        }
    }

    pub fn all() -> &'static [Appliance] {
        &[
            Self::Dishwasher,
            Self::WashingMachine,
            Self::ClothesDryer,
            Self::ElectricOven,
            Self::PoolPump,
            Self::EvCharger,
        ]
    }
}

impl fmt::Display for Appliance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for Appliance {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase().replace('_', "-");
        Self::all()
            .iter()
            .copied()
            .find(|a| a.to_config_value() == wanted)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Unknown appliance: '{}'. Supported appliances: {}",
                    s,
                    Self::all()
                        .iter()
                        .map(|a| a.to_config_value())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            })
    }
}

/// A single appliance run the user wants to place
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoadRequest {
    pub appliance: Appliance,
    pub duration_hours: f64,
}

impl LoadRequest {
    pub fn new(appliance: Appliance, duration_hours: f64) -> Result<Self> {
        if !duration_hours.is_finite() || duration_hours <= 0.0 {
            anyhow::bail!("Load duration must be a positive number of hours, got {duration_hours}");
        }
        Ok(Self {
            appliance,
            duration_hours,
        })
    }

    pub fn kw(&self) -> f64 {
        self.appliance.representative_kw()
    }

    /// Energy drawn over the whole run (kWh)
    pub fn energy_kwh(&self) -> f64 {
        self.kw() * self.duration_hours
    }
}
