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
use guide_types::{Fuel, GenerationSnapshot};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// One tracked fuel tech and its share of the tracked subset.
///
/// The share is relative to the five tracked fuel techs only, not to total
/// grid generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FuelShare {
    pub fuel: Fuel,
    pub value_mw: f64,
    pub share_of_tracked_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridMixSummary {
    /// Present fuels in display order (renewables first)
    pub shares: Vec<FuelShare>,
    pub tracked_total_mw: f64,
    /// Solar + wind + hydro as a share of the tracked subset
    pub renewable_share_of_tracked_pct: f64,
    pub latest_timestamp: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "summary", rename_all = "snake_case")]
pub enum GridMix {
    NoData,
    Available(GridMixSummary),
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Reduce a generation snapshot to the tracked renewable/fossil subset
pub fn aggregate_mix(snapshot: Option<&GenerationSnapshot>) -> GridMix {
    let Some(snapshot) = snapshot.filter(|s| !s.is_empty()) else {
        return GridMix::NoData;
    };

    let mut tracked: BTreeMap<Fuel, f64> = BTreeMap::new();
    for (name, point) in snapshot.iter() {
        match (Fuel::from_series_name(name), point.value_mw) {
            (Some(fuel), Some(value)) if value.is_finite() => {
                *tracked.entry(fuel).or_insert(0.0) += value;
            }
            _ => debug!("Ignoring series '{}' in grid mix", name),
        }
    }

    let total: f64 = tracked.values().sum();
    if tracked.is_empty() || total <= 0.0 {
        debug!("No tracked generation in snapshot (total {:.1} MW)", total);
        return GridMix::NoData;
    }

    let shares: Vec<FuelShare> = Fuel::display_order()
        .iter()
        .filter_map(|fuel| {
            tracked.get(fuel).map(|&value_mw| FuelShare {
                fuel: *fuel,
                value_mw,
                share_of_tracked_pct: round1(value_mw / total * 100.0),
            })
        })
        .collect();

    let renewable: f64 = tracked
        .iter()
        .filter(|(fuel, _)| fuel.is_renewable())
        .map(|(_, value)| value)
        .sum();

    GridMix::Available(GridMixSummary {
        shares,
        tracked_total_mw: total,
        renewable_share_of_tracked_pct: round1(renewable / total * 100.0),
        latest_timestamp: snapshot.latest_timestamp(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use guide_types::GenerationPoint;

    fn point(value: Option<f64>) -> GenerationPoint {
        GenerationPoint {
            timestamp: DateTime::parse_from_rfc3339("2025-10-16T17:20:00+10:00").ok(),
            value_mw: value,
        }
    }

    fn sample() -> GenerationSnapshot {
        [
            ("power_battery_charging", Some(78.2)),
            ("power_bioenergy", Some(80.2)),
            ("power_coal", Some(13650.0)),
            ("power_gas", Some(546.1)),
            ("power_hydro", Some(2294.1)),
            ("power_solar", Some(2315.2)),
            ("power_wind", Some(6504.6)),
        ]
        .into_iter()
        .map(|(name, value)| (name.to_owned(), point(value)))
        .collect()
    }

    #[test]
    fn test_empty_or_missing_snapshot_is_no_data() {
        assert_eq!(aggregate_mix(None), GridMix::NoData);
        assert_eq!(aggregate_mix(Some(&GenerationSnapshot::new())), GridMix::NoData);
    }

    #[test]
    fn test_untracked_only_is_no_data() {
        let snapshot: GenerationSnapshot = [("power_pumps".to_owned(), point(Some(12.0)))]
            .into_iter()
            .collect();
        assert_eq!(aggregate_mix(Some(&snapshot)), GridMix::NoData);
    }

    #[test]
    fn test_shares_of_tracked_subset() {
        let GridMix::Available(summary) = aggregate_mix(Some(&sample())) else {
            panic!("expected data");
        };

        let order: Vec<Fuel> = summary.shares.iter().map(|s| s.fuel).collect();
        assert_eq!(
            order,
            vec![Fuel::Solar, Fuel::Wind, Fuel::Hydro, Fuel::Coal, Fuel::Gas]
        );

        let total = 13650.0 + 546.1 + 2294.1 + 2315.2 + 6504.6;
        assert!((summary.tracked_total_mw - total).abs() < 1e-6);

        let coal = summary.shares.iter().find(|s| s.fuel == Fuel::Coal).unwrap();
        assert_eq!(coal.share_of_tracked_pct, round1(13650.0 / total * 100.0));

        let pct_sum: f64 = summary.shares.iter().map(|s| s.share_of_tracked_pct).sum();
        assert!((pct_sum - 100.0).abs() < 0.5);
        assert!(summary.latest_timestamp.is_some());
    }

    #[test]
    fn test_null_values_are_dropped_not_zero_filled() {
        let mut snapshot = sample();
        snapshot.insert("power_gas", point(None));

        let GridMix::Available(summary) = aggregate_mix(Some(&snapshot)) else {
            panic!("expected data");
        };
        assert_eq!(summary.shares.len(), 4);
        assert!(summary.shares.iter().all(|s| s.fuel != Fuel::Gas));
    }

    #[test]
    fn test_renewable_share() {
        let snapshot: GenerationSnapshot = [
            ("wind".to_owned(), point(Some(300.0))),
            ("coal".to_owned(), point(Some(700.0))),
        ]
        .into_iter()
        .collect();

        let GridMix::Available(summary) = aggregate_mix(Some(&snapshot)) else {
            panic!("expected data");
        };
        assert_eq!(summary.renewable_share_of_tracked_pct, 30.0);
    }
}
