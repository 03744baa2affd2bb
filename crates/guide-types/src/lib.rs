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

pub mod generation;
pub mod intensity;
pub mod load;
pub mod weather;

pub use generation::{Fuel, GenerationPoint, GenerationSnapshot};
pub use intensity::{AMBER_MAX, GREEN_MAX, IntensityBand, IntensityReading};
pub use load::{Appliance, LoadRequest};
pub use weather::{CloudBand, TemperatureBand, WeatherCategory, WeatherObservation, WindBand, WindSpeed};
