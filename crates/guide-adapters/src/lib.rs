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


pub mod csiro;
pub mod errors;
pub mod fallback;
pub mod http;
pub mod open_electricity;
pub mod open_meteo;

pub use csiro::{CsiroCredentials, CsiroIntensityClient};
pub use errors::{SourceError, SourceResult};
pub use fallback::{FallbackMixSource, canned_snapshot};
pub use http::ApiClient;
pub use open_electricity::OpenElectricityMixClient;
pub use open_meteo::OpenMeteoWeatherClient;
