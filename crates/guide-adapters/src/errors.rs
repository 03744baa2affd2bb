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


use guide_core::GuideError;
use thiserror::Error;

/// Errors raised by the live data clients
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Authentication failed")]
    AuthenticationFailed,

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected response: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl SourceError {
    /// Wrap as the core's upstream failure for the named source
    pub fn into_upstream(self, source_name: &str) -> GuideError {
        GuideError::upstream(source_name, self)
    }
}

pub type SourceResult<T> = Result<T, SourceError>;
