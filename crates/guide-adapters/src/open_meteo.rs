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


use async_trait::async_trait;
use guide_core::{GuideResult, WeatherSource};
use guide_types::{WeatherObservation, WindSpeed};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

use crate::errors::{SourceError, SourceResult};
use crate::http::{ApiClient, read_json};

pub const DEFAULT_BASE_URL: &str = "https://api.open-meteo.com";

const CURRENT_VARIABLES: &str = "temperature_2m,wind_speed_10m,cloud_cover";

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    current_units: CurrentUnits,
    current: CurrentBlock,
}

#[derive(Debug, Deserialize)]
struct CurrentUnits {
    #[serde(default = "default_wind_unit")]
    wind_speed_10m: String,
}

fn default_wind_unit() -> String {
    "km/h".to_owned()
}

impl Default for CurrentUnits {
    fn default() -> Self {
        Self {
            wind_speed_10m: default_wind_unit(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CurrentBlock {
    temperature_2m: Option<f64>,
    wind_speed_10m: Option<f64>,
    cloud_cover: Option<f64>,
}

/// Current conditions from the Open-Meteo forecast API
#[derive(Debug, Clone)]
pub struct OpenMeteoWeatherClient {
    api: ApiClient,
    base_url: String,
    latitude: f64,
    longitude: f64,
    timezone: String,
}

impl OpenMeteoWeatherClient {
    pub fn new(
        latitude: f64,
        longitude: f64,
        timezone: impl Into<String>,
        timeout: Duration,
    ) -> SourceResult<Self> {
        Ok(Self {
            api: ApiClient::new(timeout)?,
            base_url: DEFAULT_BASE_URL.to_owned(),
            latitude,
            longitude,
            timezone: timezone.into(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_retry_config(mut self, max_retries: u32, retry_delay: Duration) -> Self {
        self.api = self.api.with_retry_config(max_retries, retry_delay);
        self
    }

    pub async fn fetch_current(&self) -> SourceResult<WeatherObservation> {
        let url = format!("{}/v1/forecast", self.base_url.trim_end_matches('/'));
        let latitude = self.latitude.to_string();
        let longitude = self.longitude.to_string();
        let query = [
            ("latitude", latitude.as_str()),
            ("longitude", longitude.as_str()),
            ("current", CURRENT_VARIABLES),
            ("timezone", self.timezone.as_str()),
        ];
        debug!("🔍 [WEATHER] Current conditions at {}, {}", latitude, longitude);

        let response = self
            .api
            .retry_request(|| async { self.api.http().get(&url).query(&query).send().await })
            .await?;

        let body: ForecastResponse = read_json(response, "Open-Meteo").await?;
        let observation = to_observation(&body)?;
        info!(
            "✅ [WEATHER] {:.1} °C, wind {:.1} km/h, cloud {:.0}%",
            observation.temperature_c,
            observation.wind_speed.as_kmh(),
            observation.cloud_cover_pct
        );
        Ok(observation)
    }
}

fn to_observation(body: &ForecastResponse) -> SourceResult<WeatherObservation> {
    let current = &body.current;
    let missing = |field: &str| SourceError::Parse(format!("current.{field} missing"));

    let temperature_c = current.temperature_2m.ok_or_else(|| missing("temperature_2m"))?;
    let wind = current.wind_speed_10m.ok_or_else(|| missing("wind_speed_10m"))?;
    let cloud_cover_pct = current.cloud_cover.ok_or_else(|| missing("cloud_cover"))?;

    let wind_speed = match body.current_units.wind_speed_10m.as_str() {
        "km/h" => WindSpeed::KilometresPerHour(wind),
        "m/s" => WindSpeed::MetresPerSecond(wind),
        other => {
            return Err(SourceError::Parse(format!(
                "unsupported wind speed unit '{other}'"
            )));
        }
    };

    Ok(WeatherObservation {
        temperature_c,
        wind_speed,
        cloud_cover_pct,
    })
}

#[async_trait]
impl WeatherSource for OpenMeteoWeatherClient {
    fn name(&self) -> &str {
        "open-meteo"
    }

    async fn current_weather(&self) -> GuideResult<WeatherObservation> {
        self.fetch_current()
            .await
            .map_err(|e| e.into_upstream(self.name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn client(url: String) -> OpenMeteoWeatherClient {
        OpenMeteoWeatherClient::new(-33.8688, 151.2093, "Australia/Sydney", Duration::from_secs(5))
            .unwrap()
            .with_base_url(url)
            .with_retry_config(1, Duration::from_millis(10))
    }

    #[tokio::test]
    async fn test_current_weather_kmh() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/v1/forecast")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("latitude".into(), "-33.8688".into()),
                Matcher::UrlEncoded("longitude".into(), "151.2093".into()),
                Matcher::UrlEncoded("current".into(), CURRENT_VARIABLES.into()),
                Matcher::UrlEncoded("timezone".into(), "Australia/Sydney".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "current_units": {"temperature_2m": "°C", "wind_speed_10m": "km/h", "cloud_cover": "%"},
                    "current": {"time": "2025-06-02T10:15", "temperature_2m": 17.4, "wind_speed_10m": 12.6, "cloud_cover": 40}
                })
                .to_string(),
            )
            .create_async()
            .await;

        let obs = client(server.url()).fetch_current().await.unwrap();

        assert!((obs.temperature_c - 17.4).abs() < 1e-9);
        assert_eq!(obs.wind_speed, WindSpeed::KilometresPerHour(12.6));
        assert!((obs.cloud_cover_pct - 40.0).abs() < 1e-9);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_wind_unit_is_tagged() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/v1/forecast")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(
                json!({
                    "current_units": {"wind_speed_10m": "m/s"},
                    "current": {"temperature_2m": 21.0, "wind_speed_10m": 5.0, "cloud_cover": 75.0}
                })
                .to_string(),
            )
            .create_async()
            .await;

        let obs = client(server.url()).fetch_current().await.unwrap();
        assert_eq!(obs.wind_speed, WindSpeed::MetresPerSecond(5.0));
        assert!((obs.wind_speed.as_kmh() - 18.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_missing_field_is_parse_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/v1/forecast")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(json!({"current": {"temperature_2m": 21.0, "cloud_cover": 75.0}}).to_string())
            .create_async()
            .await;

        let result = client(server.url()).fetch_current().await;
        assert!(matches!(result, Err(SourceError::Parse(_))));
    }

    #[tokio::test]
    async fn test_unknown_unit_is_parse_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/v1/forecast")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(
                json!({
                    "current_units": {"wind_speed_10m": "kn"},
                    "current": {"temperature_2m": 21.0, "wind_speed_10m": 5.0, "cloud_cover": 75.0}
                })
                .to_string(),
            )
            .create_async()
            .await;

        let result = client(server.url()).fetch_current().await;
        assert!(matches!(result, Err(SourceError::Parse(_))));
    }

    #[tokio::test]
    async fn test_server_error_maps_to_upstream() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/v1/forecast")
            .match_query(Matcher::Any)
            .with_status(502)
            .create_async()
            .await;

        let err = client(server.url()).current_weather().await.unwrap_err();
        assert!(err.is_upstream());
    }

    #[tokio::test]
    async fn test_unreachable_host_gives_http_error() {
        let client = OpenMeteoWeatherClient::new(0.0, 0.0, "UTC", Duration::from_secs(1))
            .unwrap()
            .with_base_url("http://127.0.0.1:1")
            .with_retry_config(2, Duration::from_millis(5));

        let result = client.fetch_current().await;
        assert!(matches!(result, Err(SourceError::Http(_))));
    }
}
