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

//! Historical hourly carbon intensity profile keyed by weather category.
//!
//! The profile is built once at startup from the joined weather and
//! intensity history and is read-only afterwards. The tertile cut points
//! learned while building it are stored alongside the table and are the
//! only cut points used to categorize live weather, so live lookup keys
//! always line up with the keys the table was built with.

use chrono::{NaiveDateTime, Timelike};
use chrono_tz::Tz;
use guide_types::{CloudBand, TemperatureBand, WeatherCategory, WeatherObservation, WindBand};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;
use tracing::{debug, info, warn};

use crate::history::{IntensityRecord, WeatherRecord};

/// Position of a value within a tertile split
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tertile {
    Lower,
    Middle,
    Upper,
}

impl From<Tertile> for TemperatureBand {
    fn from(t: Tertile) -> Self {
        match t {
            Tertile::Lower => Self::Cold,
            Tertile::Middle => Self::Mild,
            Tertile::Upper => Self::Hot,
        }
    }
}

impl From<Tertile> for WindBand {
    fn from(t: Tertile) -> Self {
        match t {
            Tertile::Lower => Self::Calm,
            Tertile::Middle => Self::Breezy,
            Tertile::Upper => Self::Windy,
        }
    }
}

impl From<Tertile> for CloudBand {
    fn from(t: Tertile) -> Self {
        match t {
            Tertile::Lower => Self::Clear,
            Tertile::Middle => Self::PartlyCloudy,
            Tertile::Upper => Self::Overcast,
        }
    }
}

/// The 1/3 and 2/3 quantiles of one weather variable
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TertileCuts {
    pub lower: f64,
    pub upper: f64,
}

impl TertileCuts {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    /// Compute cut points from a sample, using linear interpolation
    /// between closest ranks.
    pub fn from_values(values: &[f64]) -> Self {
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        Self {
            lower: quantile(&sorted, 1.0 / 3.0),
            upper: quantile(&sorted, 2.0 / 3.0),
        }
    }

    /// Values equal to a cut point fall into the lower bucket
    pub fn bucket(&self, value: f64) -> Tertile {
        if value <= self.lower {
            Tertile::Lower
        } else if value <= self.upper {
            Tertile::Middle
        } else {
            Tertile::Upper
        }
    }
}

#[expect(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn quantile(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let pos = q * (n - 1) as f64;
            let lo = pos.floor() as usize;
            let hi = pos.ceil() as usize;
            let frac = pos - lo as f64;
            sorted[lo] + (sorted[hi] - sorted[lo]) * frac
        }
    }
}

/// Cut points for all three weather axes
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryCuts {
    pub temperature: TertileCuts,
    pub wind: TertileCuts,
    pub cloud: TertileCuts,
}

impl CategoryCuts {
    /// Wind speed must already be in km/h
    pub fn categorize(&self, temperature_c: f64, wind_kmh: f64, cloud_pct: f64) -> WeatherCategory {
        WeatherCategory::new(
            self.temperature.bucket(temperature_c).into(),
            self.wind.bucket(wind_kmh).into(),
            self.cloud.bucket(cloud_pct).into(),
        )
    }
}

/// Mean historical intensity for one (category, hour) key
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfileCell {
    pub mean_intensity: f64,
    pub samples: usize,
}

struct JoinedRow {
    hour: u8,
    temperature_c: f64,
    wind_speed_kmh: f64,
    cloud_cover_pct: f64,
    intensity: f64,
}

fn hour_of(ts: &NaiveDateTime) -> u8 {
    u8::try_from(ts.hour()).unwrap_or_default()
}

/// Mean carbon intensity per weather category and local hour of day
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoricalHourlyProfile {
    cuts: CategoryCuts,
    cells: BTreeMap<(WeatherCategory, u8), ProfileCell>,
    joined_rows: usize,
}

impl HistoricalHourlyProfile {
    /// Join weather and intensity history on local time and average
    /// intensity per (category, hour).
    ///
    /// Intensity timestamps are shifted into `timezone` and matched exactly
    /// against the weather table's local timestamps. Rows without a partner
    /// are dropped.
    pub fn build(weather: &[WeatherRecord], intensity: &[IntensityRecord], timezone: Tz) -> Self {
        let mut intensity_by_local: HashMap<NaiveDateTime, Vec<f64>> = HashMap::new();
        for record in intensity {
            let local = record.timestamp.with_timezone(&timezone).naive_local();
            intensity_by_local
                .entry(local)
                .or_default()
                .push(record.intensity);
        }

        let mut joined = Vec::new();
        for w in weather {
            if let Some(values) = intensity_by_local.get(&w.local_time) {
                for &intensity in values {
                    joined.push(JoinedRow {
                        hour: hour_of(&w.local_time),
                        temperature_c: w.temperature_c,
                        wind_speed_kmh: w.wind_speed_kmh,
                        cloud_cover_pct: w.cloud_cover_pct,
                        intensity,
                    });
                }
            }
        }

        if joined.is_empty() {
            warn!(
                "No common timestamps between weather ({} rows) and intensity ({} rows) history, profile is empty",
                weather.len(),
                intensity.len()
            );
            return Self::default();
        }

        let temperatures: Vec<f64> = joined.iter().map(|r| r.temperature_c).collect();
        let winds: Vec<f64> = joined.iter().map(|r| r.wind_speed_kmh).collect();
        let clouds: Vec<f64> = joined.iter().map(|r| r.cloud_cover_pct).collect();

        let cuts = CategoryCuts {
            temperature: TertileCuts::from_values(&temperatures),
            wind: TertileCuts::from_values(&winds),
            cloud: TertileCuts::from_values(&clouds),
        };
        debug!("Tertile cut points: {:?}", cuts);

        let mut sums: BTreeMap<(WeatherCategory, u8), (f64, usize)> = BTreeMap::new();
        for row in &joined {
            let category = cuts.categorize(row.temperature_c, row.wind_speed_kmh, row.cloud_cover_pct);
            let entry = sums.entry((category, row.hour)).or_insert((0.0, 0));
            entry.0 += row.intensity;
            entry.1 += 1;
        }

        #[expect(clippy::cast_precision_loss)]
        let cells: BTreeMap<_, _> = sums
            .into_iter()
            .map(|(key, (sum, samples))| {
                (
                    key,
                    ProfileCell {
                        mean_intensity: sum / samples as f64,
                        samples,
                    },
                )
            })
            .collect();

        info!(
            "Built historical profile: {} joined rows, {} (category, hour) cells",
            joined.len(),
            cells.len()
        );

        Self {
            cuts,
            cells,
            joined_rows: joined.len(),
        }
    }

    /// Construct a profile from precomputed cells. The joined row count is
    /// the sum of the cell sample counts.
    pub fn from_cells(
        cuts: CategoryCuts,
        cells: impl IntoIterator<Item = ((WeatherCategory, u8), ProfileCell)>,
    ) -> Self {
        let cells: BTreeMap<_, _> = cells.into_iter().collect();
        let joined_rows = cells.values().map(|cell| cell.samples).sum();
        Self {
            cuts,
            cells,
            joined_rows,
        }
    }

    #[cfg(test)]
    pub(crate) fn from_means(
        cuts: CategoryCuts,
        means: impl IntoIterator<Item = ((WeatherCategory, u8), f64)>,
    ) -> Self {
        Self::from_cells(
            cuts,
            means.into_iter().map(|(key, mean_intensity)| {
                (
                    key,
                    ProfileCell {
                        mean_intensity,
                        samples: 1,
                    },
                )
            }),
        )
    }

    pub fn cuts(&self) -> &CategoryCuts {
        &self.cuts
    }

    /// Number of history rows that survived the join
    pub fn joined_rows(&self) -> usize {
        self.joined_rows
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of (category, hour) cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Categorize a live observation with the cut points learned from history
    pub fn categorize(&self, observation: &WeatherObservation) -> WeatherCategory {
        self.cuts.categorize(
            observation.temperature_c,
            observation.wind_speed.as_kmh(),
            observation.cloud_cover_pct,
        )
    }

    /// Categorize, or fall back to the neutral default category when the
    /// live weather could not be fetched
    pub fn categorize_or_default<E: Display>(
        &self,
        observation: Result<WeatherObservation, E>,
    ) -> WeatherCategory {
        match observation {
            Ok(obs) => self.categorize(&obs),
            Err(e) => {
                let fallback = WeatherCategory::default();
                warn!("Live weather unavailable ({}), using default category {}", e, fallback);
                fallback
            }
        }
    }

    pub fn cell(&self, category: WeatherCategory, hour: u8) -> Option<&ProfileCell> {
        self.cells.get(&(category, hour))
    }

    pub fn mean_at(&self, category: WeatherCategory, hour: u8) -> Option<f64> {
        self.cell(category, hour).map(|c| c.mean_intensity)
    }

    /// Hours strictly after `after_hour` (same day) that have data, in
    /// ascending hour order
    pub fn future_hours(
        &self,
        category: WeatherCategory,
        after_hour: u8,
    ) -> impl Iterator<Item = (u8, f64)> + '_ {
        let start = after_hour.saturating_add(1);
        // BTreeMap::range panics on an inverted range
        let window = (start <= 23).then(|| self.cells.range((category, start)..=(category, 23)));
        window
            .into_iter()
            .flatten()
            .map(|((_, hour), cell)| (*hour, cell.mean_intensity))
    }

    /// Full-day mean intensity curve for one category; hours without data
    /// are omitted
    pub fn hourly_curve(&self, category: WeatherCategory) -> Vec<(u8, f64)> {
        self.cells
            .range((category, 0)..=(category, 23))
            .map(|((_, hour), cell)| (*hour, cell.mean_intensity))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, TimeZone, Utc};

    fn local(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    /// Three days of hourly Sydney history with varying weather, plus the
    /// matching intensity history in UTC.
    fn synthetic_history() -> (Vec<WeatherRecord>, Vec<IntensityRecord>) {
        let tz = chrono_tz::Australia::Sydney;
        let mut weather = Vec::new();
        let mut intensity = Vec::new();

        for day in 1..=3u32 {
            for hour in 0..24u32 {
                let local_time = local(day, hour);
                let k = f64::from(day * 24 + hour);
                weather.push(WeatherRecord {
                    local_time,
                    temperature_c: 12.0 + (k * 7.0) % 19.0,
                    wind_speed_kmh: (k * 11.0) % 37.0,
                    cloud_cover_pct: (k * 13.0) % 100.0,
                });
                let utc = tz
                    .from_local_datetime(&local_time)
                    .single()
                    .unwrap()
                    .with_timezone(&Utc);
                intensity.push(IntensityRecord {
                    timestamp: utc,
                    intensity: 550.0 + f64::from(hour) * 10.0 + f64::from(day),
                });
            }
        }
        (weather, intensity)
    }

    #[test]
    fn test_quantile_interpolates_linearly() {
        let cuts = TertileCuts::from_values(&[4.0, 1.0, 3.0, 2.0]);
        assert!((cuts.lower - 2.0).abs() < 1e-9);
        assert!((cuts.upper - 3.0).abs() < 1e-9);

        let single = TertileCuts::from_values(&[7.0]);
        assert_eq!(single, TertileCuts::new(7.0, 7.0));
        assert_eq!(TertileCuts::from_values(&[]), TertileCuts::default());
    }

    #[test]
    fn test_tertile_buckets_are_balanced() {
        for n in [9usize, 10, 11, 30, 31, 32] {
            let values: Vec<f64> = (0..n).map(|i| ((i * 37) % n) as f64 + 0.5).collect();
            let cuts = TertileCuts::from_values(&values);

            let mut counts = [0usize; 3];
            for &v in &values {
                match cuts.bucket(v) {
                    Tertile::Lower => counts[0] += 1,
                    Tertile::Middle => counts[1] += 1,
                    Tertile::Upper => counts[2] += 1,
                }
            }
            let floor = n / 3;
            let ceil = n.div_ceil(3);
            for count in counts {
                assert!(
                    count >= floor && count <= ceil,
                    "n={n}: bucket sizes {counts:?} outside [{floor}, {ceil}]"
                );
            }
        }
    }

    #[test]
    fn test_bucket_boundaries_are_inclusive_low() {
        let cuts = TertileCuts::new(10.0, 20.0);
        assert_eq!(cuts.bucket(10.0), Tertile::Lower);
        assert_eq!(cuts.bucket(10.01), Tertile::Middle);
        assert_eq!(cuts.bucket(20.0), Tertile::Middle);
        assert_eq!(cuts.bucket(20.01), Tertile::Upper);
    }

    #[test]
    fn test_build_joins_on_local_time() {
        let tz = chrono_tz::Australia::Sydney;
        // 14:00 local on 1 March 2024 is 03:00 UTC (AEDT, +11)
        let weather = vec![
            WeatherRecord {
                local_time: local(1, 14),
                temperature_c: 25.0,
                wind_speed_kmh: 10.0,
                cloud_cover_pct: 20.0,
            },
            WeatherRecord {
                local_time: local(1, 15),
                temperature_c: 26.0,
                wind_speed_kmh: 12.0,
                cloud_cover_pct: 30.0,
            },
        ];
        let intensity = vec![
            IntensityRecord {
                timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 3, 0, 0).unwrap(),
                intensity: 640.0,
            },
            // no weather partner
            IntensityRecord {
                timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
                intensity: 900.0,
            },
        ];

        let profile = HistoricalHourlyProfile::build(&weather, &intensity, tz);
        assert_eq!(profile.joined_rows(), 1);
        assert_eq!(profile.len(), 1);

        let category = profile.cuts().categorize(25.0, 10.0, 20.0);
        assert_eq!(profile.mean_at(category, 14), Some(640.0));
        assert_eq!(profile.mean_at(category, 3), None);
    }

    #[test]
    fn test_build_without_common_timestamps_is_empty() {
        let (weather, intensity) = synthetic_history();
        let shifted: Vec<IntensityRecord> = intensity
            .into_iter()
            .map(|r| IntensityRecord {
                timestamp: r.timestamp + Duration::minutes(30),
                intensity: r.intensity,
            })
            .collect();

        let profile =
            HistoricalHourlyProfile::build(&weather, &shifted, chrono_tz::Australia::Sydney);
        assert!(profile.is_empty());
        assert_eq!(profile.joined_rows(), 0);

        let empty = HistoricalHourlyProfile::build(&[], &[], chrono_tz::Australia::Sydney);
        assert!(empty.is_empty());
        assert_eq!(empty.mean_at(WeatherCategory::default(), 12), None);
    }

    #[test]
    fn test_recategorizing_history_reproduces_profile_keys() {
        let (weather, intensity) = synthetic_history();
        let profile =
            HistoricalHourlyProfile::build(&weather, &intensity, chrono_tz::Australia::Sydney);
        assert_eq!(profile.joined_rows(), weather.len());

        let mut total_samples = 0;
        for w in &weather {
            let category = profile.categorize(&WeatherObservation {
                temperature_c: w.temperature_c,
                wind_speed: guide_types::WindSpeed::KilometresPerHour(w.wind_speed_kmh),
                cloud_cover_pct: w.cloud_cover_pct,
            });
            assert!(
                profile.cell(category, hour_of(&w.local_time)).is_some(),
                "row at {} not found under {}",
                w.local_time,
                category
            );
        }
        for cell in profile.cells.values() {
            total_samples += cell.samples;
        }
        assert_eq!(total_samples, weather.len());
    }

    #[test]
    fn test_duplicate_keys_are_averaged() {
        let weather: Vec<WeatherRecord> = (1..=2)
            .map(|day| WeatherRecord {
                local_time: local(day, 10),
                temperature_c: 20.0,
                wind_speed_kmh: 10.0,
                cloud_cover_pct: 50.0,
            })
            .collect();
        let intensity = vec![
            IntensityRecord {
                // 10:00 AEDT on 1 March
                timestamp: Utc.with_ymd_and_hms(2024, 2, 29, 23, 0, 0).unwrap(),
                intensity: 600.0,
            },
            IntensityRecord {
                timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 23, 0, 0).unwrap(),
                intensity: 700.0,
            },
        ];

        let profile =
            HistoricalHourlyProfile::build(&weather, &intensity, chrono_tz::Australia::Sydney);
        let category = profile.cuts().categorize(20.0, 10.0, 50.0);
        let cell = profile.cell(category, 10).unwrap();
        assert_eq!(cell.samples, 2);
        assert!((cell.mean_intensity - 650.0).abs() < 1e-9);
    }

    #[test]
    fn test_live_wind_in_metres_per_second_is_normalised() {
        let cuts = CategoryCuts {
            temperature: TertileCuts::new(15.0, 22.0),
            wind: TertileCuts::new(10.0, 20.0),
            cloud: TertileCuts::new(30.0, 70.0),
        };
        let profile = HistoricalHourlyProfile::from_means(cuts, []);

        // 5 m/s = 18 km/h -> breezy. Read naively as km/h it would be calm.
        let metric = WeatherObservation {
            temperature_c: 18.0,
            wind_speed: guide_types::WindSpeed::MetresPerSecond(5.0),
            cloud_cover_pct: 50.0,
        };
        assert_eq!(profile.categorize(&metric).wind, WindBand::Breezy);

        let kmh = WeatherObservation {
            wind_speed: guide_types::WindSpeed::KilometresPerHour(5.0),
            ..metric
        };
        assert_eq!(profile.categorize(&kmh).wind, WindBand::Calm);
    }

    #[test]
    fn test_categorize_or_default_falls_back() {
        let profile = HistoricalHourlyProfile::default();
        let failed: Result<WeatherObservation, String> = Err("timeout".to_owned());
        assert_eq!(profile.categorize_or_default(failed), WeatherCategory::default());
    }

    #[test]
    fn test_future_hours_and_curve() {
        let category = WeatherCategory::default();
        let other = WeatherCategory::new(TemperatureBand::Hot, WindBand::Calm, CloudBand::Clear);
        let profile = HistoricalHourlyProfile::from_means(
            CategoryCuts::default(),
            [
                ((category, 8), 700.0),
                ((category, 10), 690.0),
                ((category, 11), 650.0),
                ((category, 23), 610.0),
                ((other, 12), 500.0),
            ],
        );

        let future: Vec<u8> = profile.future_hours(category, 10).map(|(h, _)| h).collect();
        assert_eq!(future, vec![11, 23]);
        assert_eq!(profile.future_hours(category, 23).count(), 0);
        assert_eq!(profile.hourly_curve(category).len(), 4);
        assert_eq!(profile.hourly_curve(other), vec![(12, 500.0)]);
    }

    #[test]
    fn test_from_cells_keeps_sample_counts() {
        let category = WeatherCategory::default();
        let profile = HistoricalHourlyProfile::from_cells(
            CategoryCuts::default(),
            [
                (
                    (category, 9),
                    ProfileCell {
                        mean_intensity: 720.0,
                        samples: 30,
                    },
                ),
                (
                    (category, 15),
                    ProfileCell {
                        mean_intensity: 540.0,
                        samples: 28,
                    },
                ),
            ],
        );

        assert_eq!(profile.joined_rows(), 58);
        assert_eq!(profile.mean_at(category, 15), Some(540.0));
        assert_eq!(profile.hourly_curve(category), vec![(9, 720.0), (15, 540.0)]);
    }
}
