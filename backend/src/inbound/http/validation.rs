//! Shared parsing helpers for inbound HTTP requests.

use chrono::NaiveDate;
use serde_json::json;

use crate::domain::{Error, Gender};

use super::ApiResult;

/// Parse an ISO `YYYY-MM-DD` travel date.
pub fn parse_travel_date(raw: &str) -> ApiResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
        Error::invalid_request("date must be an ISO YYYY-MM-DD value")
            .with_details(json!({ "field": "date", "value": raw }))
    })
}

/// Interpret an optional gender filter; anything unrecognised means no
/// filter rather than an error, so listings stay total.
pub fn gender_filter(raw: Option<&str>) -> Option<Gender> {
    raw.and_then(Gender::parse)
}
