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


//! End-to-end pipeline: history CSVs on disk -> profile -> advice

use chrono_tz::Australia::Sydney;
use guide_core::{
    Advisor, GuideError, HistoricalHourlyProfile, Recommendation, RecommendationOutcome,
    RecommendationPolicy, SavingsFactors, load_intensity_csv, load_weather_csv,
};
use guide_types::{
    Appliance, CloudBand, IntensityBand, IntensityReading, LoadRequest, TemperatureBand,
    WeatherCategory, WeatherObservation, WindBand, WindSpeed,
};
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;

// (day of June 2024, temperature, wind km/h, cloud %)
const DAYS: [(u32, f64, f64, f64); 3] = [(3, 10.0, 5.0, 10.0), (4, 20.0, 15.0, 50.0), (5, 30.0, 25.0, 90.0)];

fn intensity_for(hour: u32) -> f64 {
    if hour < 12 { 800.0 } else { 550.0 }
}

fn write_history() -> (NamedTempFile, NamedTempFile) {
    let mut weather = NamedTempFile::new().unwrap();
    writeln!(
        weather,
        "datetime_local,temperature_2m_C,wind_speed_10m_kmh,cloud_cover_pct"
    )
    .unwrap();

    let mut intensity = NamedTempFile::new().unwrap();
    writeln!(intensity, "datetime,intensity_gCO2_per_kWh").unwrap();

    for (day, temp, wind, cloud) in DAYS {
        for hour in 0..24 {
            writeln!(weather, "2024-06-{day:02} {hour:02}:00:00,{temp},{wind},{cloud}").unwrap();
            // Sydney is UTC+10 in June
            writeln!(
                intensity,
                "2024-06-{day:02} {hour:02}:00:00+10:00,{}",
                intensity_for(hour)
            )
            .unwrap();
        }
    }
    // a row with a missing reading must be skipped, not fail the load
    writeln!(weather, "2024-06-06 00:00:00,,12.0,40.0").unwrap();

    (weather, intensity)
}

fn build_profile() -> HistoricalHourlyProfile {
    let (weather_file, intensity_file) = write_history();
    let weather = load_weather_csv(weather_file.path()).unwrap();
    let intensity = load_intensity_csv(intensity_file.path()).unwrap();
    assert_eq!(weather.len(), 72);
    assert_eq!(intensity.len(), 72);

    HistoricalHourlyProfile::build(&weather, &intensity, Sydney)
}

fn sydney_reading(hour: u32, value: f64) -> IntensityReading {
    use chrono::TimeZone;
    let ts = Sydney
        .with_ymd_and_hms(2025, 6, 10, hour, 15, 0)
        .unwrap()
        .fixed_offset();
    IntensityReading::new(ts, value)
}

#[test]
fn test_profile_from_csv_history() {
    let profile = build_profile();

    assert_eq!(profile.joined_rows(), 72);
    // three weather regimes, 24 hours each
    assert_eq!(profile.len(), 72);

    let hot = WeatherCategory::new(TemperatureBand::Hot, WindBand::Windy, CloudBand::Overcast);
    assert_eq!(profile.mean_at(hot, 9), Some(800.0));
    assert_eq!(profile.mean_at(hot, 12), Some(550.0));
    assert_eq!(profile.hourly_curve(hot).len(), 24);
}

#[test]
fn test_advice_from_csv_history() {
    let advisor = Advisor::new(
        Arc::new(build_profile()),
        RecommendationPolicy::default(),
        SavingsFactors::default(),
    );
    let load = LoadRequest::new(Appliance::Dishwasher, 2.0).unwrap();
    let weather = WeatherObservation {
        temperature_c: 35.0,
        wind_speed: WindSpeed::KilometresPerHour(30.0),
        cloud_cover_pct: 95.0,
    };

    let advice = advisor.advise(Ok(Some(sydney_reading(9, 900.0))), Ok(weather), &load);

    assert_eq!(advice.band, Some(IntensityBand::High));
    assert_eq!(
        advice.outcome,
        RecommendationOutcome::Computed(Recommendation::Shift {
            hour: 12,
            expected_intensity: 550.0
        })
    );

    let savings = advice.savings.unwrap();
    // (900 - 550) * 1.2 kW * 2 h
    assert!((savings.grams_co2 - 840.0).abs() < 1e-9);
}

#[test]
fn test_late_evening_has_no_data() {
    let advisor = Advisor::new(
        Arc::new(build_profile()),
        RecommendationPolicy::default(),
        SavingsFactors::default(),
    );
    let load = LoadRequest::new(Appliance::WashingMachine, 1.0).unwrap();

    let advice = advisor.advise(
        Ok(Some(sydney_reading(23, 900.0))),
        Err(GuideError::upstream("weather", "timeout")),
        &load,
    );

    assert!(advice.weather_fallback);
    assert_eq!(
        advice.outcome.recommendation(),
        Some(&Recommendation::NoData)
    );
}
