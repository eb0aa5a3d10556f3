//! Narrow typed extraction from the opaque listing payload.
//!
//! Domus returns arbitrary JSON per listing; storage only needs the unique
//! code, the status, and the update timestamp as discrete columns. Everything
//! else rides along inside the payload blob.

use chrono::NaiveDateTime;
use serde_json::Value;
use thiserror::Error;

use super::model::ListingRecord;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("listing is missing the unique code field `codpro`")]
    MissingCode,
}

impl ListingRecord {
    /// Extract the storage tuple from a raw listing object.
    ///
    /// Only the unique code is required; status and timestamp are optional
    /// and an unparseable timestamp degrades to `None`.
    pub fn from_value(raw: &Value) -> Result<Self, ExtractError> {
        let codpro = match raw.get("codpro") {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            // Some feeds serialize the code as a bare number.
            Some(Value::Number(n)) => n.to_string(),
            _ => return Err(ExtractError::MissingCode),
        };

        let status = raw
            .get("estado")
            .and_then(Value::as_str)
            .map(str::to_string);

        let updated_at = raw
            .get("fecha_actualizacion")
            .and_then(Value::as_str)
            .and_then(parse_timestamp);

        Ok(Self {
            codpro,
            status,
            updated_at,
            payload: raw.clone(),
        })
    }
}

/// Parse the Domus update timestamp. The feed has been observed with
/// `YYYY-MM-DD HH:MM:SS`, bare dates, and RFC 3339.
fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(ts);
    }
    if let Ok(date) = chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    chrono::DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.naive_utc())
}
