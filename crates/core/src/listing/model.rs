use chrono::NaiveDateTime;
use serde_json::Value;

/// Typed extraction of one raw Domus listing.
/// Maps to the `listings` PostgreSQL table.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingRecord {
    /// Unique external code (`codpro`) — primary key in storage.
    pub codpro: String,
    /// Listing status (`estado`), if present.
    pub status: Option<String>,
    /// Remote update timestamp (`fecha_actualizacion`), if present and parseable.
    pub updated_at: Option<NaiveDateTime>,
    /// The full raw listing object, stored as JSONB.
    pub payload: Value,
}
