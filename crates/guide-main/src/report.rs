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


//! Plain-text report for one poll tick.

use guide_core::{Advice, GridMix, RecommendationOutcome};
use std::fmt::Write;

/// Render one tick as report lines. `mix` is `None` when the mix display
/// is disabled.
pub fn render(advice: &Advice, mix: Option<&GridMix>) -> Vec<String> {
    let mut lines = Vec::new();

    match (&advice.reading, advice.band) {
        (Some(reading), Some(band)) => lines.push(format!(
            "Grid intensity: {:.1} gCO2/kWh, {} [{}] at {}",
            reading.value,
            band.label(),
            band.color(),
            reading.timestamp.format("%H:%M")
        )),
        _ => lines.push("Grid intensity: unavailable".to_owned()),
    }

    let mut weather = format!("Weather: {}", advice.category);
    if advice.weather_fallback {
        weather.push_str(" (live weather unavailable, using default)");
    }
    lines.push(weather);

    let load = &advice.load;
    lines.push(format!(
        "Load: {} for {} h ({:.1} kWh)",
        load.appliance,
        load.duration_hours,
        load.energy_kwh()
    ));

    match &advice.outcome {
        RecommendationOutcome::Computed(rec) => {
            lines.push(format!("Recommendation: {}", rec.message()));
        }
        RecommendationOutcome::Unavailable { source, reason } => {
            lines.push(format!(
                "Recommendation: unavailable ({source} source: {reason})"
            ));
        }
    }

    if let Some(savings) = &advice.savings {
        lines.push(format!(
            "Savings: {:.0} g CO2, about {} phone charges or {} km by car",
            savings.grams_co2,
            savings.phone_charges_rounded(),
            savings.car_km_rounded()
        ));
    }

    if !advice.trend.is_empty() {
        let mut trend = String::from("Typical intensity today:");
        for (hour, mean) in &advice.trend {
            let _ = write!(trend, " {hour:02}h={mean:.0}");
        }
        lines.push(trend);
    }

    match mix {
        Some(GridMix::Available(summary)) => {
            let shares: Vec<String> = summary
                .shares
                .iter()
                .map(|s| format!("{} {:.1}%", s.fuel, s.share_of_tracked_pct))
                .collect();
            let mut line = format!(
                "Grid mix (tracked fuels): {}; renewables {:.1}%",
                shares.join(", "),
                summary.renewable_share_of_tracked_pct
            );
            if let Some(ts) = summary.latest_timestamp {
                let _ = write!(line, " as of {}", ts.format("%H:%M"));
            }
            lines.push(line);
        }
        Some(GridMix::NoData) => lines.push("Grid mix: no data".to_owned()),
        None => {}
    }

    lines
}
