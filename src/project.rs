//! Value projection
//!
//! Turns one decoded field into at most one (name, JSON value) pair, applying
//! the configured policy in a fixed order: validity filter, subfield
//! substitution, array normalization, scale/offset, unit conversion, semantic
//! (date-time) conversion, and a final non-finite filter. Every conversion
//! lives here so the projection stays exhaustive over the value/profile-type
//! union.

use serde_json::{Number, Value as JsonValue};

use crate::message::{Field, Message};
use crate::options::ConvertOptions;
use crate::profile::{semicircles_to_degrees, timestamp_to_rfc3339, ProfileType, SEMICIRCLES_UNIT};
use crate::value::Value;

/// Project one field to its output pair. `None` means the field is dropped.
pub fn project_field(
    field: &Field,
    mesg: &Message,
    options: &ConvertOptions,
) -> Option<(String, JsonValue)> {
    if options.print_only_valid_value && !field.value.is_valid(field.base_type) {
        return None;
    }

    let mut name = field.name.as_str();
    let mut units = field.units.as_str();
    let mut scale = field.scale;
    let mut offset = field.offset;
    let mut profile_type = field.profile_type;

    let substituted;
    let value: &Value = match field.active_subfield(mesg) {
        Some(sub) => {
            name = &sub.name;
            units = &sub.units;
            scale = sub.scale;
            offset = sub.offset;
            profile_type = sub.profile_type;
            substituted = field.value.reinterpret(sub.base_type);
            &substituted
        }
        None => &field.value,
    };

    let json = if value.is_slice() {
        // Arrays bypass scaling and unit conversion entirely.
        value.to_json()?
    } else {
        project_scalar(value, units, scale, offset, profile_type, options)?
    };

    Some((name.to_string(), json))
}

fn project_scalar(
    value: &Value,
    units: &str,
    scale: f64,
    offset: f64,
    profile_type: ProfileType,
    options: &ConvertOptions,
) -> Option<JsonValue> {
    let mut json = if options.use_raw_value || (scale == 1.0 && offset == 0.0) {
        value.to_json()?
    } else {
        match value.as_f64() {
            // A non-finite scaled result drops the field here.
            Some(raw) => JsonValue::Number(Number::from_f64(raw / scale - offset)?),
            // Non-numeric values are not scaled.
            None => value.to_json()?,
        }
    };

    // Unit conversion reads the raw semicircle integer, not the scaled value.
    if options.print_gps_position_in_degrees && units == SEMICIRCLES_UNIT {
        let semicircles = value.as_i64()? as i32;
        json = JsonValue::Number(Number::from_f64(semicircles_to_degrees(semicircles))?);
    }

    if profile_type.is_date_time() {
        json = JsonValue::String(timestamp_to_rfc3339(value.as_i64()?)?);
    }

    Some(json)
}
