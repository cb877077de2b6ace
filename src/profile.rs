//! Profile-level semantic conversions
//!
//! The protocol tags some fields with a semantic profile type on top of their
//! base type. This module holds those tags and the conversions they imply:
//! epoch-offset timestamps to RFC-3339 strings, and angular semicircles to
//! degrees.

use chrono::{SecondsFormat, TimeZone, Utc};

/// Seconds between the Unix epoch and the protocol's reference epoch
/// (1989-12-31T00:00:00Z). Decoded timestamps count from the latter.
pub const EPOCH_OFFSET_SECS: i64 = 631_065_600;

/// Unit string marking angular semicircle fields.
pub const SEMICIRCLES_UNIT: &str = "semicircles";

/// Semantic profile type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProfileType {
    /// No special semantics; the base type alone describes the value.
    #[default]
    Plain,
    /// Seconds since the protocol reference epoch, UTC.
    DateTime,
    /// Seconds since the protocol reference epoch, device-local.
    LocalDateTime,
}

impl ProfileType {
    pub fn is_date_time(self) -> bool {
        matches!(self, ProfileType::DateTime | ProfileType::LocalDateTime)
    }
}

/// Convert a semicircle angle to degrees.
pub fn semicircles_to_degrees(semicircles: i32) -> f64 {
    f64::from(semicircles) * (180.0 / 2_147_483_648.0)
}

/// Render a protocol timestamp (seconds since the reference epoch) as an
/// RFC-3339 string. `None` if the value is outside chrono's representable
/// range.
pub fn timestamp_to_rfc3339(secs: i64) -> Option<String> {
    Utc.timestamp_opt(EPOCH_OFFSET_SECS + secs, 0)
        .single()
        .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
}
