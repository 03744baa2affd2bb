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

use guide_types::LoadRequest;
use serde::{Deserialize, Serialize};

use crate::errors::{GuideError, GuideResult};
use crate::recommendation::Recommendation;

/// Everyday equivalents used to express avoided emissions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SavingsFactors {
    /// gCO2 per full smartphone charge
    #[serde(default = "default_grams_per_phone_charge")]
    pub grams_per_phone_charge: f64,

    /// gCO2 per km driven in an average passenger car
    #[serde(default = "default_grams_per_car_km")]
    pub grams_per_car_km: f64,
}

fn default_grams_per_phone_charge() -> f64 {
    3.25
}

fn default_grams_per_car_km() -> f64 {
    193.7
}

impl Default for SavingsFactors {
    fn default() -> Self {
        Self {
            grams_per_phone_charge: default_grams_per_phone_charge(),
            grams_per_car_km: default_grams_per_car_km(),
        }
    }
}

impl SavingsFactors {
    pub fn validate(&self) -> GuideResult<()> {
        if self.grams_per_phone_charge <= 0.0 || self.grams_per_car_km <= 0.0 {
            return Err(GuideError::InvalidInput(
                "savings factors must be positive".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Emissions avoided by running a load at the recommended hour
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SavingsEstimate {
    /// Current minus recommended intensity (gCO2/kWh)
    pub intensity_delta: f64,
    pub energy_kwh: f64,
    pub grams_co2: f64,
    pub phone_charges: f64,
    pub car_km: f64,
}

#[expect(clippy::cast_possible_truncation)]
fn rounded(value: f64) -> i64 {
    value.round() as i64
}

impl SavingsEstimate {
    pub fn phone_charges_rounded(&self) -> i64 {
        rounded(self.phone_charges)
    }

    pub fn car_km_rounded(&self) -> i64 {
        rounded(self.car_km)
    }

    /// Estimate savings for a shift recommendation, using the historical
    /// mean the engine selected the hour with. Other outcomes have no savings.
    pub fn for_recommendation(
        current_intensity: f64,
        recommendation: &Recommendation,
        load: &LoadRequest,
        factors: &SavingsFactors,
    ) -> Option<GuideResult<Self>> {
        match *recommendation {
            Recommendation::Shift {
                expected_intensity, ..
            } => Some(estimate_savings(
                current_intensity,
                expected_intensity,
                load,
                factors,
            )),
            Recommendation::RunNow | Recommendation::NoShiftAvailable | Recommendation::NoData => {
                None
            }
        }
    }
}

/// Convert an intensity delta and a load into avoided emissions.
///
/// A recommended intensity above the current one cannot come out of the
/// decision engine and is reported as an invariant violation rather than
/// as negative savings.
pub fn estimate_savings(
    current_intensity: f64,
    recommended_intensity: f64,
    load: &LoadRequest,
    factors: &SavingsFactors,
) -> GuideResult<SavingsEstimate> {
    let intensity_delta = current_intensity - recommended_intensity;
    if intensity_delta < 0.0 {
        return Err(GuideError::InvariantViolation(format!(
            "recommended intensity {recommended_intensity:.1} exceeds current {current_intensity:.1}"
        )));
    }

    let energy_kwh = load.energy_kwh();
    let grams_co2 = intensity_delta * energy_kwh;

    Ok(SavingsEstimate {
        intensity_delta,
        energy_kwh,
        grams_co2,
        phone_charges: grams_co2 / factors.grams_per_phone_charge,
        car_km: grams_co2 / factors.grams_per_car_km,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{CategoryCuts, HistoricalHourlyProfile};
    use crate::recommendation::RecommendationEngine;
    use guide_types::{Appliance, WeatherCategory};

    fn ev_for(hours: f64) -> LoadRequest {
        LoadRequest::new(Appliance::EvCharger, hours).unwrap()
    }

    #[test]
    fn test_reference_values() {
        let estimate = estimate_savings(900.0, 600.0, &ev_for(1.0), &SavingsFactors::default())
            .unwrap();

        assert!((estimate.grams_co2 - 2100.0).abs() < 1e-9);
        assert_eq!(estimate.phone_charges_rounded(), 646);
        assert!((estimate.car_km - 10.84).abs() < 0.01);
        assert_eq!(estimate.car_km_rounded(), 11);
    }

    #[test]
    fn test_duration_scales_linearly() {
        let factors = SavingsFactors::default();
        let one = estimate_savings(800.0, 500.0, &ev_for(1.0), &factors).unwrap();
        let three = estimate_savings(800.0, 500.0, &ev_for(3.0), &factors).unwrap();
        assert!((three.grams_co2 - 3.0 * one.grams_co2).abs() < 1e-9);
    }

    #[test]
    fn test_negative_delta_is_invariant_violation() {
        let result = estimate_savings(600.0, 650.0, &ev_for(1.0), &SavingsFactors::default());
        assert!(matches!(result, Err(GuideError::InvariantViolation(_))));
    }

    #[test]
    fn test_only_shift_has_savings() {
        let factors = SavingsFactors::default();
        let load = ev_for(1.0);
        for rec in [
            Recommendation::RunNow,
            Recommendation::NoShiftAvailable,
            Recommendation::NoData,
        ] {
            assert!(SavingsEstimate::for_recommendation(900.0, &rec, &load, &factors).is_none());
        }
    }

    #[test]
    fn test_savings_use_the_selected_hour_mean() {
        let category = WeatherCategory::default();
        let profile = HistoricalHourlyProfile::from_means(
            CategoryCuts::default(),
            [
                ((category, 12), 750.0),
                ((category, 14), 600.0),
                ((category, 19), 420.0),
            ],
        );
        let rec = RecommendationEngine::default().evaluate(1000.0, 10, category, &profile);
        let Recommendation::Shift { hour, .. } = rec else {
            panic!("expected a shift, got {rec:?}");
        };

        let load = ev_for(2.0);
        let estimate = SavingsEstimate::for_recommendation(1000.0, &rec, &load, &SavingsFactors::default())
            .unwrap()
            .unwrap();

        // must match the mean at the recommended hour, not the cleanest hour
        let expected_mean = profile.mean_at(category, hour).unwrap();
        assert!((estimate.intensity_delta - (1000.0 - expected_mean)).abs() < 1e-9);
        assert!((estimate.intensity_delta - 400.0).abs() < 1e-9);
    }

    #[test]
    fn test_factor_validation() {
        assert!(SavingsFactors::default().validate().is_ok());
        let bad = SavingsFactors {
            grams_per_car_km: 0.0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }
}
