use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Error text for inputs rejected before any request is made
pub const INVALID_URL_MESSAGE: &str = "Invalid URL format. Please enter a valid HTTP(S) URL.";

/// True iff the status code is in the 2xx range
pub fn is_working_status(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Outcome of probing a single URL
///
/// Built only through the constructors below so that a working result never
/// carries an error and a failed one always has `status == 0` and no headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    pub url: String,
    /// HTTP status, or 0 for "no response"
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    /// Wall-clock duration in milliseconds (0 = rejected before any request)
    pub response_time: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub is_working: bool,
}

impl CheckResult {
    /// A response was received (any status code)
    pub fn from_response(
        url: impl Into<String>,
        status: u16,
        headers: BTreeMap<String, String>,
        response_time: u64,
    ) -> Self {
        Self {
            url: url.into(),
            status,
            headers,
            response_time,
            error: None,
            is_working: is_working_status(status),
        }
    }

    /// The input failed validation; no request was made
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status: 0,
            headers: BTreeMap::new(),
            response_time: 0,
            error: Some(INVALID_URL_MESSAGE.to_string()),
            is_working: false,
        }
    }

    /// The request was attempted but no response arrived
    pub fn transport_failure(
        url: impl Into<String>,
        error: impl Into<String>,
        response_time: u64,
    ) -> Self {
        Self {
            url: url.into(),
            status: 0,
            headers: BTreeMap::new(),
            // Keep 0 reserved for validation failures
            response_time: response_time.max(1),
            error: Some(error.into()),
            is_working: false,
        }
    }
}

/// Aggregate counts for a batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub total: usize,
    pub working: usize,
    pub failed: usize,
}
