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
use chrono::DateTime;
use guide_core::{GenerationMixSource, GuideResult};
use guide_types::{GenerationPoint, GenerationSnapshot};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::errors::{SourceError, SourceResult};
use crate::http::{ApiClient, read_json};

pub const DEFAULT_BASE_URL: &str = "https://api.openelectricity.org.au";
pub const DEFAULT_NETWORK: &str = "NEM";

/// Fuel tech groups requested from the API. Aggregation later keeps only the
/// tracked subset.
pub const FUELTECH_GROUPS: [&str; 10] = [
    "coal",
    "gas",
    "wind",
    "solar",
    "battery_charging",
    "battery_discharging",
    "hydro",
    "distillate",
    "bioenergy",
    "pumps",
];

#[derive(Debug, Deserialize)]
struct NetworkDataResponse {
    #[serde(default)]
    data: Vec<NetworkData>,
}

#[derive(Debug, Deserialize)]
struct NetworkData {
    #[serde(default)]
    results: Vec<SeriesResult>,
}

#[derive(Debug, Deserialize)]
struct SeriesResult {
    name: String,
    #[serde(default)]
    data: Vec<(Option<String>, Option<f64>)>,
}

/// Latest NEM generation by fuel tech from the OpenElectricity v4 API
#[derive(Clone)]
pub struct OpenElectricityMixClient {
    api: ApiClient,
    base_url: String,
    network: String,
    token: String,
}

impl std::fmt::Debug for OpenElectricityMixClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenElectricityMixClient")
            .field("base_url", &self.base_url)
            .field("network", &self.network)
            .finish_non_exhaustive()
    }
}

impl OpenElectricityMixClient {
    pub fn new(token: impl Into<String>, timeout: Duration) -> SourceResult<Self> {
        let token = token.into();
        if token.is_empty() {
            return Err(SourceError::Config(
                "OpenElectricity API token must be set".to_owned(),
            ));
        }

        Ok(Self {
            api: ApiClient::new(timeout)?,
            base_url: DEFAULT_BASE_URL.to_owned(),
            network: DEFAULT_NETWORK.to_owned(),
            token,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_network(mut self, network: impl Into<String>) -> Self {
        self.network = network.into();
        self
    }

    pub fn with_retry_config(mut self, max_retries: u32, retry_delay: Duration) -> Self {
        self.api = self.api.with_retry_config(max_retries, retry_delay);
        self
    }

    pub async fn fetch_latest(&self) -> SourceResult<Option<GenerationSnapshot>> {
        let url = format!(
            "{}/v4/data/network/{}",
            self.base_url.trim_end_matches('/'),
            self.network
        );
        let mut query = vec![("metrics", "power")];
        query.extend(FUELTECH_GROUPS.iter().map(|fuel| ("fueltech_group", *fuel)));
        debug!("🔍 [MIX] Requesting {} power by fuel tech", self.network);

        let response = self
            .api
            .retry_request(|| async {
                self.api
                    .http()
                    .get(&url)
                    .bearer_auth(&self.token)
                    .query(&query)
                    .send()
                    .await
            })
            .await?;

        let body: NetworkDataResponse = read_json(response, "OpenElectricity").await?;
        let Some(network) = body.data.into_iter().next() else {
            warn!("⚠️ [MIX] No data in OpenElectricity response");
            return Ok(None);
        };

        let snapshot: GenerationSnapshot = network
            .results
            .into_iter()
            .filter_map(|series| {
                let (timestamp, value) = series.data.last()?.clone();
                Some((
                    series.name,
                    GenerationPoint {
                        timestamp: timestamp
                            .as_deref()
                            .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok()),
                        value_mw: value,
                    },
                ))
            })
            .collect();

        if snapshot.is_empty() {
            warn!("⚠️ [MIX] OpenElectricity returned no data points");
            return Ok(None);
        }

        info!("✅ [MIX] {} fuel tech series", snapshot.len());
        Ok(Some(snapshot))
    }
}

#[async_trait]
impl GenerationMixSource for OpenElectricityMixClient {
    fn name(&self) -> &str {
        "openelectricity"
    }

    async fn latest_mix(&self) -> GuideResult<Option<GenerationSnapshot>> {
        self.fetch_latest()
            .await
            .map_err(|e| e.into_upstream(self.name()))
    }
}
