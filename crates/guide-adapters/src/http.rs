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


use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{error, warn};

use crate::errors::{SourceError, SourceResult};

/// Shared HTTP plumbing for the source clients: one pooled client with a
/// request timeout, plus bounded retry on transport failures
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    max_retries: u32,
    retry_delay: Duration,
}

impl ApiClient {
    pub fn new(timeout: Duration) -> SourceResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SourceError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            max_retries: 3,
            retry_delay: Duration::from_millis(500),
        })
    }

    pub fn http(&self) -> &Client {
        &self.client
    }

    /// Set custom retry configuration
    pub fn with_retry_config(mut self, max_retries: u32, retry_delay: Duration) -> Self {
        self.max_retries = max_retries.max(1);
        self.retry_delay = retry_delay;
        self
    }

    /// Retry a request with exponential backoff
    pub async fn retry_request<F, Fut>(&self, mut request_fn: F) -> SourceResult<Response>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<Response, reqwest::Error>>,
    {
        let mut attempts = 0;
        let mut delay = self.retry_delay;

        loop {
            attempts += 1;
            match request_fn().await {
                Ok(response) => return Ok(response),
                Err(e) if attempts >= self.max_retries => {
                    error!("Request failed after {} attempts: {}", attempts, e);
                    return Err(SourceError::Http(e));
                }
                Err(e) => {
                    warn!(
                        "Request failed (attempt {}/{}): {}. Retrying in {:?}",
                        attempts, self.max_retries, e, delay
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2; // Exponential backoff
                }
            }
        }
    }
}

/// Map a non-success status to a typed error, otherwise decode the JSON body
pub async fn read_json<T: DeserializeOwned>(response: Response, what: &str) -> SourceResult<T> {
    match response.status() {
        status if status.is_success() => response
            .json::<T>()
            .await
            .map_err(|e| SourceError::Parse(format!("{what}: {e}"))),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            error!("❌ [{}] Authentication failed", what);
            Err(SourceError::AuthenticationFailed)
        }
        status => {
            let error_text = response.text().await.unwrap_or_default();
            error!("❌ [{}] Status {}: {}", what, status, error_text);
            Err(SourceError::Api {
                status: status.as_u16(),
                message: error_text,
            })
        }
    }
}
