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

use thiserror::Error;

/// Errors raised by the recommendation core
#[derive(Error, Debug)]
pub enum GuideError {
    /// A live data source failed or timed out
    #[error("Upstream source '{source_name}' unavailable: {reason}")]
    UpstreamUnavailable { source_name: String, reason: String },

    /// A computed value broke an invariant that correct inputs guarantee
    #[error("Invariant violated: {0}")]
    InvariantViolation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("History error: {0}")]
    History(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GuideError {
    pub fn upstream(source_name: impl Into<String>, reason: impl ToString) -> Self {
        Self::UpstreamUnavailable {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }

    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::UpstreamUnavailable { .. })
    }
}

pub type GuideResult<T> = Result<T, GuideError>;
