//! Typed decoded field values
//!
//! Mirrors the protocol's base-type system: scalars and homogeneous arrays of
//! fixed-width integers, floats, and strings. The external decoder produces
//! these; this crate only converts them onward to JSON.

use serde_json::{json, Number, Value as JsonValue};

/// Protocol base types, as carried in field definitions.
///
/// The `z` variants use zero as their invalid sentinel instead of the
/// all-ones pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseType {
    Enum,
    Sint8,
    Uint8,
    Uint8z,
    Sint16,
    Uint16,
    Uint16z,
    Sint32,
    Uint32,
    Uint32z,
    Sint64,
    Uint64,
    Uint64z,
    Float32,
    Float64,
    String,
    Byte,
}

impl BaseType {
    /// The natural base type for a decoded value (element type for arrays).
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Sint8(_) | Value::SliceSint8(_) => BaseType::Sint8,
            Value::Uint8(_) | Value::SliceUint8(_) => BaseType::Uint8,
            Value::Sint16(_) | Value::SliceSint16(_) => BaseType::Sint16,
            Value::Uint16(_) | Value::SliceUint16(_) => BaseType::Uint16,
            Value::Sint32(_) | Value::SliceSint32(_) => BaseType::Sint32,
            Value::Uint32(_) | Value::SliceUint32(_) => BaseType::Uint32,
            Value::Sint64(_) | Value::SliceSint64(_) => BaseType::Sint64,
            Value::Uint64(_) | Value::SliceUint64(_) => BaseType::Uint64,
            Value::Float32(_) | Value::SliceFloat32(_) => BaseType::Float32,
            Value::Float64(_) | Value::SliceFloat64(_) => BaseType::Float64,
            Value::Text(_) | Value::SliceText(_) => BaseType::String,
        }
    }

    /// The integer invalid sentinel for this base type, if it has one.
    fn invalid_sentinel(self) -> Option<i128> {
        match self {
            BaseType::Enum | BaseType::Uint8 | BaseType::Byte => Some(0xFF),
            BaseType::Sint8 => Some(0x7F),
            BaseType::Uint8z | BaseType::Uint16z | BaseType::Uint32z | BaseType::Uint64z => {
                Some(0)
            }
            BaseType::Sint16 => Some(0x7FFF),
            BaseType::Uint16 => Some(0xFFFF),
            BaseType::Sint32 => Some(0x7FFF_FFFF),
            BaseType::Uint32 => Some(0xFFFF_FFFF),
            BaseType::Sint64 => Some(0x7FFF_FFFF_FFFF_FFFF),
            BaseType::Uint64 => Some(0xFFFF_FFFF_FFFF_FFFF),
            BaseType::Float32 | BaseType::Float64 | BaseType::String => None,
        }
    }
}

/// A decoded field value: one scalar or one homogeneous array.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Sint8(i8),
    Uint8(u8),
    Sint16(i16),
    Uint16(u16),
    Sint32(i32),
    Uint32(u32),
    Sint64(i64),
    Uint64(u64),
    Float32(f32),
    Float64(f64),
    Text(String),
    SliceSint8(Vec<i8>),
    SliceUint8(Vec<u8>),
    SliceSint16(Vec<i16>),
    SliceUint16(Vec<u16>),
    SliceSint32(Vec<i32>),
    SliceUint32(Vec<u32>),
    SliceSint64(Vec<i64>),
    SliceUint64(Vec<u64>),
    SliceFloat32(Vec<f32>),
    SliceFloat64(Vec<f64>),
    SliceText(Vec<String>),
}

impl Value {
    pub fn is_slice(&self) -> bool {
        matches!(
            self,
            Value::SliceSint8(_)
                | Value::SliceUint8(_)
                | Value::SliceSint16(_)
                | Value::SliceUint16(_)
                | Value::SliceSint32(_)
                | Value::SliceUint32(_)
                | Value::SliceSint64(_)
                | Value::SliceUint64(_)
                | Value::SliceFloat32(_)
                | Value::SliceFloat64(_)
                | Value::SliceText(_)
        )
    }

    /// Whether this value passes the protocol's invalid-sentinel check for
    /// `base`. Arrays are valid when at least one element is.
    pub fn is_valid(&self, base: BaseType) -> bool {
        let sentinel = base.invalid_sentinel();
        let int_valid = |v: i128| sentinel.map_or(true, |s| v != s);
        match self {
            Value::Sint8(v) => int_valid(i128::from(*v)),
            Value::Uint8(v) => int_valid(i128::from(*v)),
            Value::Sint16(v) => int_valid(i128::from(*v)),
            Value::Uint16(v) => int_valid(i128::from(*v)),
            Value::Sint32(v) => int_valid(i128::from(*v)),
            Value::Uint32(v) => int_valid(i128::from(*v)),
            Value::Sint64(v) => int_valid(i128::from(*v)),
            Value::Uint64(v) => int_valid(i128::from(*v)),
            Value::Float32(v) => !v.is_nan(),
            Value::Float64(v) => !v.is_nan(),
            Value::Text(s) => !s.is_empty(),
            Value::SliceSint8(v) => v.iter().any(|&x| int_valid(i128::from(x))),
            Value::SliceUint8(v) => v.iter().any(|&x| int_valid(i128::from(x))),
            Value::SliceSint16(v) => v.iter().any(|&x| int_valid(i128::from(x))),
            Value::SliceUint16(v) => v.iter().any(|&x| int_valid(i128::from(x))),
            Value::SliceSint32(v) => v.iter().any(|&x| int_valid(i128::from(x))),
            Value::SliceUint32(v) => v.iter().any(|&x| int_valid(i128::from(x))),
            Value::SliceSint64(v) => v.iter().any(|&x| int_valid(i128::from(x))),
            Value::SliceUint64(v) => v.iter().any(|&x| int_valid(i128::from(x))),
            Value::SliceFloat32(v) => v.iter().any(|x| !x.is_nan()),
            Value::SliceFloat64(v) => v.iter().any(|x| !x.is_nan()),
            Value::SliceText(v) => v.iter().any(|s| !s.is_empty()),
        }
    }

    /// Numeric scalar as f64. `None` for strings and arrays.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Sint8(v) => Some(f64::from(v)),
            Value::Uint8(v) => Some(f64::from(v)),
            Value::Sint16(v) => Some(f64::from(v)),
            Value::Uint16(v) => Some(f64::from(v)),
            Value::Sint32(v) => Some(f64::from(v)),
            Value::Uint32(v) => Some(f64::from(v)),
            Value::Sint64(v) => Some(v as f64),
            Value::Uint64(v) => Some(v as f64),
            Value::Float32(v) => Some(f64::from(v)),
            Value::Float64(v) => Some(v),
            _ => None,
        }
    }

    /// Integer scalar as i64. `None` for floats, strings, and arrays.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::Sint8(v) => Some(i64::from(v)),
            Value::Uint8(v) => Some(i64::from(v)),
            Value::Sint16(v) => Some(i64::from(v)),
            Value::Uint16(v) => Some(i64::from(v)),
            Value::Sint32(v) => Some(i64::from(v)),
            Value::Uint32(v) => Some(i64::from(v)),
            Value::Sint64(v) => Some(v),
            Value::Uint64(v) => Some(v as i64),
            _ => None,
        }
    }

    /// Reinterpret an integer scalar under another base type, truncating or
    /// extending to the target width. Non-integer values pass through
    /// unchanged.
    pub fn reinterpret(&self, base: BaseType) -> Value {
        let bits: u64 = match *self {
            Value::Sint8(v) => v as u64,
            Value::Uint8(v) => u64::from(v),
            Value::Sint16(v) => v as u64,
            Value::Uint16(v) => u64::from(v),
            Value::Sint32(v) => v as u64,
            Value::Uint32(v) => u64::from(v),
            Value::Sint64(v) => v as u64,
            Value::Uint64(v) => v,
            _ => return self.clone(),
        };
        match base {
            BaseType::Sint8 => Value::Sint8(bits as i8),
            BaseType::Enum | BaseType::Uint8 | BaseType::Uint8z | BaseType::Byte => {
                Value::Uint8(bits as u8)
            }
            BaseType::Sint16 => Value::Sint16(bits as i16),
            BaseType::Uint16 | BaseType::Uint16z => Value::Uint16(bits as u16),
            BaseType::Sint32 => Value::Sint32(bits as i32),
            BaseType::Uint32 | BaseType::Uint32z => Value::Uint32(bits as u32),
            BaseType::Sint64 => Value::Sint64(bits as i64),
            BaseType::Uint64 | BaseType::Uint64z => Value::Uint64(bits),
            BaseType::Float32 | BaseType::Float64 | BaseType::String => self.clone(),
        }
    }

    /// Render the raw value as JSON.
    ///
    /// Returns `None` for a non-finite float scalar (the field is dropped).
    /// Float arrays drop non-finite elements, preserving the order of the
    /// rest. Unsigned byte arrays widen to integer arrays rather than being
    /// treated as binary data.
    pub fn to_json(&self) -> Option<JsonValue> {
        let finite32 = |v: &f32| Number::from_f64(f64::from(*v)).map(JsonValue::Number);
        let finite64 = |v: &f64| Number::from_f64(*v).map(JsonValue::Number);
        match self {
            Value::Sint8(v) => Some(json!(v)),
            Value::Uint8(v) => Some(json!(v)),
            Value::Sint16(v) => Some(json!(v)),
            Value::Uint16(v) => Some(json!(v)),
            Value::Sint32(v) => Some(json!(v)),
            Value::Uint32(v) => Some(json!(v)),
            Value::Sint64(v) => Some(json!(v)),
            Value::Uint64(v) => Some(json!(v)),
            Value::Float32(v) => finite32(v),
            Value::Float64(v) => finite64(v),
            Value::Text(s) => Some(json!(s)),
            Value::SliceSint8(v) => Some(json!(v)),
            Value::SliceUint8(v) => {
                Some(JsonValue::Array(v.iter().map(|&x| json!(u64::from(x))).collect()))
            }
            Value::SliceSint16(v) => Some(json!(v)),
            Value::SliceUint16(v) => Some(json!(v)),
            Value::SliceSint32(v) => Some(json!(v)),
            Value::SliceUint32(v) => Some(json!(v)),
            Value::SliceSint64(v) => Some(json!(v)),
            Value::SliceUint64(v) => Some(json!(v)),
            Value::SliceFloat32(v) => {
                Some(JsonValue::Array(v.iter().filter_map(finite32).collect()))
            }
            Value::SliceFloat64(v) => {
                Some(JsonValue::Array(v.iter().filter_map(finite64).collect()))
            }
            Value::SliceText(v) => Some(json!(v)),
        }
    }
}
