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


//! Canned generation mix used when the live mix source has nothing.

use async_trait::async_trait;
use chrono::{DateTime, Timelike, Utc};
use chrono_tz::Tz;
use guide_core::{GenerationMixSource, GuideResult};
use guide_types::{GenerationPoint, GenerationSnapshot};
use tracing::warn;

// Representative NEM output (MW) for a sunny afternoon and for a night
const DAY_MIX: [(&str, f64); 7] = [
    ("power_coal", 13_650.0),
    ("power_gas", 546.1),
    ("power_hydro", 2_294.1),
    ("power_solar", 2_315.2),
    ("power_wind", 6_504.6),
    ("power_bioenergy", 80.2),
    ("power_battery_discharging", 308.2),
];

const NIGHT_MIX: [(&str, f64); 7] = [
    ("power_coal", 15_820.0),
    ("power_gas", 1_140.5),
    ("power_hydro", 1_760.3),
    ("power_solar", 0.0),
    ("power_wind", 4_210.8),
    ("power_bioenergy", 75.4),
    ("power_battery_discharging", 212.6),
];

/// Local hours treated as daytime for the canned snapshot
pub fn is_daytime(hour: u32) -> bool {
    (6..18).contains(&hour)
}

/// Canned snapshot for the given local time, stamped with that time
pub fn canned_snapshot(at: DateTime<Tz>) -> GenerationSnapshot {
    let table = if is_daytime(at.hour()) {
        &DAY_MIX
    } else {
        &NIGHT_MIX
    };
    let timestamp = Some(at.fixed_offset());

    table
        .iter()
        .map(|&(name, value)| {
            (
                name.to_owned(),
                GenerationPoint {
                    timestamp,
                    value_mw: Some(value),
                },
            )
        })
        .collect()
}

/// Wraps a live mix source and substitutes the canned day or night snapshot
/// when it fails or returns nothing
#[derive(Debug)]
pub struct FallbackMixSource<S> {
    inner: S,
    timezone: Tz,
}

impl<S: GenerationMixSource> FallbackMixSource<S> {
    pub fn new(inner: S, timezone: Tz) -> Self {
        Self { inner, timezone }
    }

    fn canned_now(&self) -> GenerationSnapshot {
        canned_snapshot(Utc::now().with_timezone(&self.timezone))
    }
}

#[async_trait]
impl<S: GenerationMixSource> GenerationMixSource for FallbackMixSource<S> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn latest_mix(&self) -> GuideResult<Option<GenerationSnapshot>> {
        match self.inner.latest_mix().await {
            Ok(Some(snapshot)) if !snapshot.is_empty() => Ok(Some(snapshot)),
            Ok(_) => {
                warn!("⚠️ [MIX] {} returned no data, using canned snapshot", self.inner.name());
                Ok(Some(self.canned_now()))
            }
            Err(e) => {
                warn!("⚠️ [MIX] {}, using canned snapshot", e);
                Ok(Some(self.canned_now()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Australia::Sydney;
    use guide_core::{GridMix, GuideError, aggregate_mix};
    use guide_types::Fuel;

    enum Stub {
        Fails,
        Empty,
        Live(GenerationSnapshot),
    }

    #[async_trait]
    impl GenerationMixSource for Stub {
        fn name(&self) -> &str {
            "stub"
        }

        async fn latest_mix(&self) -> GuideResult<Option<GenerationSnapshot>> {
            match self {
                Stub::Fails => Err(GuideError::upstream("stub", "connection refused")),
                Stub::Empty => Ok(None),
                Stub::Live(snapshot) => Ok(Some(snapshot.clone())),
            }
        }
    }

    fn solar_mw(snapshot: &GenerationSnapshot) -> f64 {
        snapshot.get("power_solar").and_then(|p| p.value_mw).unwrap()
    }

    #[test]
    fn test_day_and_night_tables() {
        let noon = Sydney.with_ymd_and_hms(2025, 6, 2, 12, 0, 0).unwrap();
        let late = Sydney.with_ymd_and_hms(2025, 6, 2, 18, 0, 0).unwrap();
        let early = Sydney.with_ymd_and_hms(2025, 6, 2, 5, 59, 0).unwrap();

        assert!(solar_mw(&canned_snapshot(noon)) > 0.0);
        assert_eq!(solar_mw(&canned_snapshot(late)), 0.0);
        assert_eq!(solar_mw(&canned_snapshot(early)), 0.0);
    }

    #[test]
    fn test_canned_snapshot_aggregates() {
        let noon = Sydney.with_ymd_and_hms(2025, 6, 2, 12, 0, 0).unwrap();
        let GridMix::Available(summary) = aggregate_mix(Some(&canned_snapshot(noon))) else {
            panic!("canned snapshot must aggregate");
        };
        assert_eq!(summary.shares.len(), Fuel::display_order().len());
        assert_eq!(summary.latest_timestamp, Some(noon.fixed_offset()));
    }

    #[tokio::test]
    async fn test_failure_and_empty_use_canned() {
        for stub in [Stub::Fails, Stub::Empty] {
            let source = FallbackMixSource::new(stub, Sydney);
            let snapshot = source.latest_mix().await.unwrap().unwrap();
            assert!(!snapshot.is_empty());
        }
    }

    #[tokio::test]
    async fn test_live_data_passes_through() {
        let live: GenerationSnapshot = [(
            "power_wind".to_owned(),
            GenerationPoint {
                timestamp: None,
                value_mw: Some(42.0),
            },
        )]
        .into_iter()
        .collect();

        let source = FallbackMixSource::new(Stub::Live(live.clone()), Sydney);
        assert_eq!(source.latest_mix().await.unwrap(), Some(live));
        assert_eq!(source.name(), "stub");
    }
}
