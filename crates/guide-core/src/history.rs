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

//! Loading of the two historical tables the profile is built from.
//!
//! Weather history is hourly, keyed by local wall-clock time at the weather
//! location. Intensity history is keyed by an absolute timestamp which is
//! normalised to UTC here; conversion to local time happens in the profile
//! builder.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::errors::{GuideError, GuideResult};

const WEATHER_COLUMNS: [&str; 4] = [
    "datetime_local",
    "temperature_2m_C",
    "wind_speed_10m_kmh",
    "cloud_cover_pct",
];

const INTENSITY_COLUMNS: [&str; 2] = ["datetime", "intensity_gCO2_per_kWh"];

const LOCAL_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];

/// One hourly weather observation from the history table
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherRecord {
    /// Local wall-clock time (no zone)
    pub local_time: NaiveDateTime,
    pub temperature_c: f64,
    pub wind_speed_kmh: f64,
    pub cloud_cover_pct: f64,
}

/// One carbon intensity observation from the history table
#[derive(Debug, Clone, PartialEq)]
pub struct IntensityRecord {
    pub timestamp: DateTime<Utc>,
    pub intensity: f64,
}

#[derive(Debug, Deserialize)]
struct RawWeatherRow {
    datetime_local: String,
    #[serde(rename = "temperature_2m_C")]
    temperature: Option<f64>,
    #[serde(rename = "wind_speed_10m_kmh")]
    wind_speed: Option<f64>,
    #[serde(rename = "cloud_cover_pct")]
    cloud_cover: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawIntensityRow {
    datetime: String,
    #[serde(rename = "intensity_gCO2_per_kWh")]
    intensity: Option<f64>,
}

/// Parse a zone-less local timestamp as written by the weather export
pub fn parse_local_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    LOCAL_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

/// Parse an intensity timestamp. Offsets are honoured; zone-less values are UTC.
pub fn parse_utc_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Some(ts) = OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(s, fmt).ok())
    {
        return Some(ts.with_timezone(&Utc));
    }
    parse_local_timestamp(s).map(|naive| naive.and_utc())
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

fn check_headers<R: Read>(
    reader: &mut csv::Reader<R>,
    required: &[&str],
    table: &str,
) -> GuideResult<()> {
    let headers = reader.headers()?;
    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|col| !headers.iter().any(|h| h.trim() == *col))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(GuideError::History(format!(
            "{table} table is missing column(s): {}",
            missing.join(", ")
        )))
    }
}

/// Read weather history from any CSV source
pub fn read_weather<R: Read>(source: R) -> GuideResult<Vec<WeatherRecord>> {
    let mut reader = csv::Reader::from_reader(source);
    check_headers(&mut reader, &WEATHER_COLUMNS, "weather")?;

    let mut records = Vec::new();
    let mut skipped = 0usize;

    for row in reader.deserialize::<RawWeatherRow>() {
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                debug!("Skipping unreadable weather row: {}", e);
                skipped += 1;
                continue;
            }
        };

        let parsed = parse_local_timestamp(&row.datetime_local).zip(
            finite(row.temperature)
                .zip(finite(row.wind_speed))
                .zip(finite(row.cloud_cover)),
        );

        match parsed {
            Some((local_time, ((temperature_c, wind_speed_kmh), cloud_cover_pct))) => {
                records.push(WeatherRecord {
                    local_time,
                    temperature_c,
                    wind_speed_kmh,
                    cloud_cover_pct,
                });
            }
            None => {
                debug!("Skipping incomplete weather row at '{}'", row.datetime_local);
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        warn!("Skipped {} incomplete weather history rows", skipped);
    }
    info!("Loaded {} weather history rows", records.len());
    Ok(records)
}

/// Read intensity history from any CSV source
pub fn read_intensity<R: Read>(source: R) -> GuideResult<Vec<IntensityRecord>> {
    let mut reader = csv::Reader::from_reader(source);
    check_headers(&mut reader, &INTENSITY_COLUMNS, "intensity")?;

    let mut records = Vec::new();
    let mut skipped = 0usize;

    for row in reader.deserialize::<RawIntensityRow>() {
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                debug!("Skipping unreadable intensity row: {}", e);
                skipped += 1;
                continue;
            }
        };

        match parse_utc_timestamp(&row.datetime).zip(finite(row.intensity)) {
            Some((timestamp, intensity)) => records.push(IntensityRecord {
                timestamp,
                intensity,
            }),
            None => {
                debug!("Skipping incomplete intensity row at '{}'", row.datetime);
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        warn!("Skipped {} incomplete intensity history rows", skipped);
    }
    info!("Loaded {} intensity history rows", records.len());
    Ok(records)
}

pub fn load_weather_csv(path: impl AsRef<Path>) -> GuideResult<Vec<WeatherRecord>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|e| {
        GuideError::History(format!("Failed to open weather history {}: {e}", path.display()))
    })?;
    read_weather(file)
}

pub fn load_intensity_csv(path: impl AsRef<Path>) -> GuideResult<Vec<IntensityRecord>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|e| {
        GuideError::History(format!(
            "Failed to open intensity history {}: {e}",
            path.display()
        ))
    })?;
    read_intensity(file)
}
