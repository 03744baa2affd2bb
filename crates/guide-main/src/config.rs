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


use anyhow::{Context, Result};
use chrono_tz::Tz;
use guide_adapters::{csiro, open_electricity, open_meteo};
use guide_core::{RecommendationPolicy, SavingsFactors};
use guide_types::{Appliance, LoadRequest};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub location: LocationConfig,

    #[serde(default)]
    pub history: HistoryConfig,

    /// Band thresholds and the shift rule
    #[serde(default)]
    pub policy: RecommendationPolicy,

    /// Everyday equivalents for avoided emissions
    #[serde(default)]
    pub savings: SavingsFactors,

    /// Default load to advise on
    #[serde(default)]
    pub load: LoadConfig,

    #[serde(default)]
    pub sources: SourcesConfig,

    #[serde(default)]
    pub system: SystemConfig,
}

/// The single grid region and weather location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    #[serde(default = "default_latitude")]
    pub latitude: f64,

    #[serde(default = "default_longitude")]
    pub longitude: f64,

    /// IANA zone used for local hours, history joins and the weather query
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_latitude() -> f64 {
    -33.8688
}

fn default_longitude() -> f64 {
    151.2093
}

fn default_timezone() -> String {
    "Australia/Sydney".to_owned()
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            latitude: default_latitude(),
            longitude: default_longitude(),
            timezone: default_timezone(),
        }
    }
}

impl LocationConfig {
    pub fn tz(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| anyhow::anyhow!("Invalid timezone '{}': {}", self.timezone, e))
    }
}

/// Historical tables the hourly profile is built from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    #[serde(default = "default_weather_csv")]
    pub weather_csv: PathBuf,

    #[serde(default = "default_intensity_csv")]
    pub intensity_csv: PathBuf,
}

fn default_weather_csv() -> PathBuf {
    PathBuf::from("data/historic_weather_data_sydney.csv")
}

fn default_intensity_csv() -> PathBuf {
    PathBuf::from("data/nsw_hourly_carbon_intensity.csv")
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            weather_csv: default_weather_csv(),
            intensity_csv: default_intensity_csv(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    #[serde(default = "default_appliance")]
    pub appliance: Appliance,

    #[serde(default = "default_duration_hours")]
    pub duration_hours: f64,
}

fn default_appliance() -> Appliance {
    Appliance::EvCharger
}

fn default_duration_hours() -> f64 {
    1.0
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            appliance: default_appliance(),
            duration_hours: default_duration_hours(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourcesConfig {
    #[serde(default)]
    pub intensity: IntensitySourceConfig,

    #[serde(default)]
    pub weather: WeatherSourceConfig,

    #[serde(default)]
    pub mix: MixSourceConfig,
}

/// CSIRO Senaps credentials and endpoints.
/// Credentials are usually supplied through the environment.
#[derive(Clone, Serialize, Deserialize)]
pub struct IntensitySourceConfig {
    #[serde(default)]
    pub tenant_id: Option<String>,

    #[serde(default)]
    pub client_id: Option<String>,

    #[serde(default)]
    pub client_secret: Option<String>,

    #[serde(default = "default_stream_id")]
    pub stream_id: String,

    #[serde(default = "default_token_base_url")]
    pub token_base_url: String,

    #[serde(default = "default_observations_url")]
    pub observations_url: String,
}

fn default_stream_id() -> String {
    csiro::DEFAULT_STREAM_ID.to_owned()
}

fn default_token_base_url() -> String {
    csiro::DEFAULT_TOKEN_BASE_URL.to_owned()
}

fn default_observations_url() -> String {
    csiro::DEFAULT_OBSERVATIONS_URL.to_owned()
}

impl Default for IntensitySourceConfig {
    fn default() -> Self {
        Self {
            tenant_id: None,
            client_id: None,
            client_secret: None,
            stream_id: default_stream_id(),
            token_base_url: default_token_base_url(),
            observations_url: default_observations_url(),
        }
    }
}

impl std::fmt::Debug for IntensitySourceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntensitySourceConfig")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "***"))
            .field("stream_id", &self.stream_id)
            .finish_non_exhaustive()
    }
}

impl IntensitySourceConfig {
    /// All three credentials, if every one of them is present and non-empty
    pub fn credentials(&self) -> Option<csiro::CsiroCredentials> {
        let present = |v: &Option<String>| v.clone().filter(|s| !s.trim().is_empty());
        Some(csiro::CsiroCredentials {
            tenant_id: present(&self.tenant_id)?,
            client_id: present(&self.client_id)?,
            client_secret: present(&self.client_secret)?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherSourceConfig {
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
}

fn default_weather_base_url() -> String {
    open_meteo::DEFAULT_BASE_URL.to_owned()
}

impl Default for WeatherSourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_weather_base_url(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct MixSourceConfig {
    /// Fetch the generation mix at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub api_token: Option<String>,

    #[serde(default = "default_mix_base_url")]
    pub base_url: String,

    #[serde(default = "default_network")]
    pub network: String,
}

fn default_true() -> bool {
    true
}

fn default_mix_base_url() -> String {
    open_electricity::DEFAULT_BASE_URL.to_owned()
}

fn default_network() -> String {
    open_electricity::DEFAULT_NETWORK.to_owned()
}

impl Default for MixSourceConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            api_token: None,
            base_url: default_mix_base_url(),
            network: default_network(),
        }
    }
}

impl MixSourceConfig {
    /// The API token, if present and non-empty
    pub fn token(&self) -> Option<&str> {
        self.api_token.as_deref().filter(|t| !t.trim().is_empty())
    }
}

impl std::fmt::Debug for MixSourceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MixSourceConfig")
            .field("enabled", &self.enabled)
            .field("api_token", &self.api_token.as_ref().map(|_| "***"))
            .field("base_url", &self.base_url)
            .field("network", &self.network)
            .finish()
    }
}

/// System configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    /// Seconds between poll ticks
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Per-request HTTP timeout
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Attempts per request on transport failure
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// First backoff delay, doubled after each failed attempt
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

fn default_poll_interval_secs() -> u64 {
    300
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    500
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl SystemConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl AppConfig {
    /// Load configuration from an explicit path, or `config.toml` in the
    /// working directory, or defaults. Environment overrides apply last.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let config = Self::from_file(path)?;
                info!("✅ Loaded configuration from {}", path.display());
                config
            }
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                let config = Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?;
                info!("✅ Loaded configuration from {}", DEFAULT_CONFIG_FILE);
                config
            }
            None => {
                warn!("No configuration file found, using defaults with environment overrides");
                Self::default()
            }
        };

        let config = config.with_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&config_str).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Apply environment overrides through `lookup`
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(tz) = lookup("GUIDE_TIMEZONE") {
            self.location.timezone = tz;
        }
        if let Some(lat) = lookup("GUIDE_LATITUDE")
            && let Ok(lat) = lat.parse::<f64>()
        {
            self.location.latitude = lat;
        }
        if let Some(lon) = lookup("GUIDE_LONGITUDE")
            && let Ok(lon) = lon.parse::<f64>()
        {
            self.location.longitude = lon;
        }

        if let Some(path) = lookup("GUIDE_WEATHER_CSV") {
            self.history.weather_csv = PathBuf::from(path);
        }
        if let Some(path) = lookup("GUIDE_INTENSITY_CSV") {
            self.history.intensity_csv = PathBuf::from(path);
        }

        if let Some(appliance) = lookup("GUIDE_APPLIANCE") {
            match appliance.parse::<Appliance>() {
                Ok(appliance) => self.load.appliance = appliance,
                Err(e) => warn!("Ignoring GUIDE_APPLIANCE: {}", e),
            }
        }
        if let Some(hours) = lookup("GUIDE_DURATION_HOURS")
            && let Ok(hours) = hours.parse::<f64>()
        {
            self.load.duration_hours = hours;
        }

        if let Some(interval) = lookup("GUIDE_POLL_INTERVAL_SECS")
            && let Ok(secs) = interval.parse::<u64>()
        {
            self.system.poll_interval_secs = secs;
        }

        // Credentials
        if let Some(tenant) = lookup("CSIRO_TENANT_ID") {
            self.sources.intensity.tenant_id = Some(tenant);
        }
        if let Some(client_id) = lookup("CSIRO_CLIENT_ID") {
            self.sources.intensity.client_id = Some(client_id);
        }
        if let Some(secret) = lookup("CSIRO_CLIENT_SECRET") {
            self.sources.intensity.client_secret = Some(secret);
        }
        if let Some(token) = lookup("OPENELECTRICITY_API_TOKEN") {
            self.sources.mix.api_token = Some(token);
        }

        self
    }

    pub fn load_request(&self) -> Result<LoadRequest> {
        LoadRequest::new(self.load.appliance, self.load.duration_hours)
    }

    pub fn validate(&self) -> Result<()> {
        self.location.tz()?;
        if !(-90.0..=90.0).contains(&self.location.latitude) {
            anyhow::bail!("latitude must be between -90 and 90");
        }
        if !(-180.0..=180.0).contains(&self.location.longitude) {
            anyhow::bail!("longitude must be between -180 and 180");
        }

        self.policy.validate().context("Invalid [policy] section")?;
        self.savings.validate().context("Invalid [savings] section")?;
        self.load_request().context("Invalid [load] section")?;

        if self.system.poll_interval_secs < 10 {
            anyhow::bail!("poll_interval_secs must be at least 10 seconds");
        }
        if self.system.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be positive");
        }
        if self.system.max_retries == 0 {
            anyhow::bail!("max_retries must be at least 1");
        }
        if self.system.request_timeout_secs >= self.system.poll_interval_secs {
            warn!(
                "request_timeout_secs ({}s) is not shorter than the poll interval ({}s)",
                self.system.request_timeout_secs, self.system.poll_interval_secs
            );
        }

        if self.sources.intensity.credentials().is_none() {
            warn!("CSIRO credentials not configured, live intensity will be unavailable");
        }
        if self.sources.mix.enabled && self.sources.mix.token().is_none() {
            warn!("OpenElectricity token not configured, grid mix will use canned data");
        }

        Ok(())
    }
}
