// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client-side error taxonomy.
//!
//! Cloneable so one in-flight fetch result can be handed to every caller
//! that joined it.

use crate::error::ErrorResponse;
use reqwest::StatusCode;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// The metrics job has not run yet; never blocks a first plan.
    #[error("Health metrics have not been computed yet")]
    MetricsNotYetComputed,

    #[error("Please acknowledge your health metrics before generating a plan")]
    MetricsAcknowledgmentRequired,

    /// Handled exactly like `MetricsAcknowledgmentRequired` by callers.
    #[error("Your health metrics changed; please review and acknowledge them again")]
    StaleAcknowledgment,

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    /// The single silent refresh-and-retry already failed.
    #[error("Session expired; please sign in again")]
    AuthExpired,

    /// Cache infrastructure failed; callers go straight to the network.
    #[error("Plan cache unavailable")]
    CacheUnavailable,

    #[error("Server returned {status}: {code}")]
    Server { status: u16, code: String },
}

impl ClientError {
    /// Whether retrying the same call later may succeed without user action.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Network(_)
            | ClientError::Timeout
            | ClientError::Validation(_)
            | ClientError::CacheUnavailable => true,
            ClientError::Server { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Whether the user has to do something (acknowledge, fix input, sign in).
    pub fn is_user_actionable(&self) -> bool {
        matches!(
            self,
            ClientError::MetricsAcknowledgmentRequired
                | ClientError::StaleAcknowledgment
                | ClientError::Validation(_)
                | ClientError::AuthExpired
        )
    }

    /// Acknowledgment gate errors, stale or missing alike.
    pub fn requires_acknowledgment(&self) -> bool {
        matches!(
            self,
            ClientError::MetricsAcknowledgmentRequired | ClientError::StaleAcknowledgment
        )
    }

    /// Map a non-success response to the taxonomy.
    ///
    /// The error code decides; the status is only a fallback, so a 400 is
    /// never mistaken for "no metrics yet".
    pub fn from_response(status: StatusCode, body: Option<ErrorResponse>) -> Self {
        let code = body.as_ref().map(|b| b.error.as_str()).unwrap_or_default();
        let details = body
            .as_ref()
            .and_then(|b| b.details.clone())
            .unwrap_or_else(|| code.to_string());

        match code {
            "metrics_not_computed" => ClientError::MetricsNotYetComputed,
            "metrics_acknowledgment_required" => ClientError::MetricsAcknowledgmentRequired,
            "stale_acknowledgment" => ClientError::StaleAcknowledgment,
            "validation_error" => ClientError::Validation(details),
            _ if status == StatusCode::UNAUTHORIZED => ClientError::AuthExpired,
            _ if status == StatusCode::BAD_REQUEST => ClientError::Validation(details),
            _ => ClientError::Server {
                status: status.as_u16(),
                code: if code.is_empty() {
                    "unknown".to_string()
                } else {
                    code.to_string()
                },
            },
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else {
            ClientError::Network(err.to_string())
        }
    }
}
