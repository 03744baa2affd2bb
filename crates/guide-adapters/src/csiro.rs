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


//! Live carbon intensity from the CSIRO Senaps observation API.
//!
//! Each fetch obtains a fresh bearer token with the OAuth2 client
//! credentials flow and then asks for the single newest observation in the
//! last two hours.

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, NaiveDateTime, Utc};
use chrono_tz::Tz;
use guide_core::{GuideResult, IntensitySource};
use guide_types::IntensityReading;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::errors::{SourceError, SourceResult};
use crate::http::{ApiClient, read_json};

pub const DEFAULT_TOKEN_BASE_URL: &str = "https://login.microsoftonline.com";
pub const DEFAULT_OBSERVATIONS_URL: &str = "https://senaps.eratos.com/api/sensor/v2/observations";
pub const DEFAULT_STREAM_ID: &str = "csiro.energy.dch.agshop.regional_global_emissions.nsw";

const QUERY_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S.000Z";

/// Azure AD application credentials for the Senaps API
#[derive(Clone)]
pub struct CsiroCredentials {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
}

impl std::fmt::Debug for CsiroCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsiroCredentials")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    #[serde(default)]
    results: Vec<Observation>,
}

#[derive(Debug, Deserialize)]
struct Observation {
    t: String,
    v: ObservationValue,
}

#[derive(Debug, Deserialize)]
struct ObservationValue {
    v: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct CsiroIntensityClient {
    api: ApiClient,
    credentials: CsiroCredentials,
    token_base_url: String,
    observations_url: String,
    stream_id: String,
    timezone: Tz,
    lookback: ChronoDuration,
}

impl CsiroIntensityClient {
    pub fn new(credentials: CsiroCredentials, timezone: Tz, timeout: Duration) -> SourceResult<Self> {
        if credentials.client_id.is_empty() || credentials.client_secret.is_empty() {
            return Err(SourceError::Config(
                "CSIRO client id and secret must be set".to_owned(),
            ));
        }

        Ok(Self {
            api: ApiClient::new(timeout)?,
            credentials,
            token_base_url: DEFAULT_TOKEN_BASE_URL.to_owned(),
            observations_url: DEFAULT_OBSERVATIONS_URL.to_owned(),
            stream_id: DEFAULT_STREAM_ID.to_owned(),
            timezone,
            lookback: ChronoDuration::hours(2),
        })
    }

    /// Point the client at different token and observation endpoints
    pub fn with_endpoints(
        mut self,
        token_base_url: impl Into<String>,
        observations_url: impl Into<String>,
    ) -> Self {
        self.token_base_url = token_base_url.into();
        self.observations_url = observations_url.into();
        self
    }

    pub fn with_stream(mut self, stream_id: impl Into<String>) -> Self {
        self.stream_id = stream_id.into();
        self
    }

    pub fn with_retry_config(mut self, max_retries: u32, retry_delay: Duration) -> Self {
        self.api = self.api.with_retry_config(max_retries, retry_delay);
        self
    }

    fn token_url(&self) -> String {
        format!(
            "{}/{}/oauth2/v2.0/token",
            self.token_base_url.trim_end_matches('/'),
            self.credentials.tenant_id
        )
    }

    async fn fetch_token(&self) -> SourceResult<String> {
        let url = self.token_url();
        let scope = format!("{}/.default", self.credentials.client_id);
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("scope", scope.as_str()),
        ];
        debug!("🔑 [CSIRO] Requesting access token");

        let response = self
            .api
            .retry_request(|| async { self.api.http().post(&url).form(&form).send().await })
            .await?;

        let token: TokenResponse = read_json(response, "CSIRO token").await?;
        Ok(token.access_token)
    }

    /// Newest observation within the lookback window ending at `now`
    pub async fn fetch_latest_at(&self, now: DateTime<Utc>) -> SourceResult<Option<IntensityReading>> {
        let token = self.fetch_token().await?;

        let start = (now - self.lookback).format(QUERY_TIME_FORMAT).to_string();
        let end = now.format(QUERY_TIME_FORMAT).to_string();
        let query = [
            ("streamid", self.stream_id.as_str()),
            ("start", start.as_str()),
            ("end", end.as_str()),
            ("limit", "1"),
            ("sort", "desc"),
        ];
        debug!("🔍 [CSIRO] Querying {} from {} to {}", self.stream_id, start, end);

        let response = self
            .api
            .retry_request(|| async {
                self.api
                    .http()
                    .get(&self.observations_url)
                    .bearer_auth(&token)
                    .query(&query)
                    .send()
                    .await
            })
            .await?;

        let body: ObservationsResponse = read_json(response, "CSIRO observations").await?;
        let Some(entry) = body.results.into_iter().next() else {
            warn!("⚠️ [CSIRO] No observations in the last {} hours", self.lookback.num_hours());
            return Ok(None);
        };

        let timestamp = parse_observation_time(&entry.t)
            .ok_or_else(|| SourceError::Parse(format!("bad observation time '{}'", entry.t)))?;
        let value = entry
            .v
            .v
            .filter(|v| v.is_finite())
            .ok_or_else(|| SourceError::Parse(format!("observation at {} has no value", entry.t)))?;

        let local = timestamp.with_timezone(&self.timezone).fixed_offset();
        info!("✅ [CSIRO] {:.1} gCO2/kWh at {}", value, local);
        Ok(Some(IntensityReading::new(local, value)))
    }
}

fn parse_observation_time(s: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.fZ")
        .map(|naive| naive.and_utc())
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|ts| ts.with_timezone(&Utc))
        })
}

#[async_trait]
impl IntensitySource for CsiroIntensityClient {
    fn name(&self) -> &str {
        "csiro"
    }

    async fn latest_intensity(&self) -> GuideResult<Option<IntensityReading>> {
        self.fetch_latest_at(Utc::now())
            .await
            .map_err(|e| e.into_upstream(self.name()))
    }
}
