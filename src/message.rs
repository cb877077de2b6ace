//! Decoded message data model
//!
//! Structures handed over by the external binary decoder: messages with their
//! typed fields, developer (third-party) fields, and the field-description
//! messages that give developer fields their names. Wire framing, CRC, and
//! component expansion are the decoder's concern and never appear here.

use crate::profile::ProfileType;
use crate::value::{BaseType, Value};

/// Global message numbers this crate routes on.
pub mod mesg_num {
    pub const SPORT: u16 = 12;
    pub const SESSION: u16 = 18;
    pub const LAP: u16 = 19;
    pub const RECORD: u16 = 20;
    pub const FIELD_DESCRIPTION: u16 = 206;
}

/// Message category, derived from the global message number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Session,
    Lap,
    Record,
    Sport,
    FieldDescription,
    Other(u16),
}

impl MessageKind {
    pub fn from_global(num: u16) -> Self {
        match num {
            mesg_num::SESSION => MessageKind::Session,
            mesg_num::LAP => MessageKind::Lap,
            mesg_num::RECORD => MessageKind::Record,
            mesg_num::SPORT => MessageKind::Sport,
            mesg_num::FIELD_DESCRIPTION => MessageKind::FieldDescription,
            n => MessageKind::Other(n),
        }
    }
}

/// A message definition event. The decoder emits one before the messages it
/// defines; the converter accepts them only to preserve wire order.
#[derive(Debug, Clone)]
pub struct MessageDefinition {
    pub global_num: u16,
    pub local_num: u8,
}

/// One decoded message: a category number plus ordered fields.
#[derive(Debug, Clone)]
pub struct Message {
    pub num: u16,
    pub fields: Vec<Field>,
    pub developer_fields: Vec<DeveloperField>,
}

impl Message {
    pub fn new(num: u16) -> Self {
        Self {
            num,
            fields: Vec::new(),
            developer_fields: Vec::new(),
        }
    }

    pub fn with_fields(num: u16, fields: Vec<Field>) -> Self {
        Self {
            num,
            fields,
            developer_fields: Vec::new(),
        }
    }

    pub fn kind(&self) -> MessageKind {
        MessageKind::from_global(self.num)
    }

    /// Look up a field by its declared (pre-substitution) name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// One decoded standard field.
#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub units: String,
    /// Linear transform divisor; 1.0 means untransformed.
    pub scale: f64,
    /// Linear transform offset; subtracted after scaling.
    pub offset: f64,
    pub value: Value,
    pub profile_type: ProfileType,
    pub base_type: BaseType,
    /// Set by the decoder for fields derived through component expansion.
    /// These duplicate other fields' semantics and are skipped.
    pub is_expanded: bool,
    pub subfield: Option<SubField>,
}

impl Field {
    /// A plain field with default scale/offset and a base type inferred from
    /// the value.
    pub fn new(name: &str, value: Value) -> Self {
        let base_type = BaseType::of(&value);
        Self {
            name: name.to_string(),
            units: String::new(),
            scale: 1.0,
            offset: 0.0,
            value,
            profile_type: ProfileType::Plain,
            base_type,
            is_expanded: false,
            subfield: None,
        }
    }

    pub fn with_units(mut self, units: &str) -> Self {
        self.units = units.to_string();
        self
    }

    pub fn with_scale_offset(mut self, scale: f64, offset: f64) -> Self {
        self.scale = scale;
        self.offset = offset;
        self
    }

    pub fn with_profile_type(mut self, profile_type: ProfileType) -> Self {
        self.profile_type = profile_type;
        self
    }

    pub fn with_base_type(mut self, base_type: BaseType) -> Self {
        self.base_type = base_type;
        self
    }

    pub fn expanded(mut self) -> Self {
        self.is_expanded = true;
        self
    }

    pub fn with_subfield(mut self, subfield: SubField) -> Self {
        self.subfield = Some(subfield);
        self
    }

    /// The subfield to substitute for this field, if its reference condition
    /// matches a sibling field's current raw value.
    pub fn active_subfield(&self, mesg: &Message) -> Option<&SubField> {
        let sub = self.subfield.as_ref()?;
        let referee = mesg.field(&sub.ref_name)?;
        (referee.value.as_i64()? == sub.ref_value).then_some(sub)
    }
}

/// A subfield substitution rule: when the sibling field `ref_name` carries
/// `ref_value`, the owning field is reinterpreted with these attributes.
#[derive(Debug, Clone)]
pub struct SubField {
    pub ref_name: String,
    pub ref_value: i64,
    pub name: String,
    pub units: String,
    pub scale: f64,
    pub offset: f64,
    pub profile_type: ProfileType,
    pub base_type: BaseType,
}

/// A third-party field instance. Meaningless until resolved against a
/// [`FieldDescription`] with the same index pair.
#[derive(Debug, Clone)]
pub struct DeveloperField {
    pub developer_data_index: u8,
    pub field_definition_number: u8,
    pub value: Value,
}

impl DeveloperField {
    pub fn new(developer_data_index: u8, field_definition_number: u8, value: Value) -> Self {
        Self {
            developer_data_index,
            field_definition_number,
            value,
        }
    }
}

/// Metadata for a developer field, carried by its own message category ahead
/// of any instance that references it.
#[derive(Debug, Clone)]
pub struct FieldDescription {
    pub developer_data_index: u8,
    pub field_definition_number: u8,
    /// Human-readable name, possibly in several parts.
    pub field_name: Vec<String>,
}

impl FieldDescription {
    /// Read a description out of a field-description message. `None` when the
    /// message is missing any of the required fields.
    pub fn from_message(mesg: &Message) -> Option<Self> {
        let developer_data_index = mesg.field("developer_data_index")?.value.as_i64()? as u8;
        let field_definition_number =
            mesg.field("field_definition_number")?.value.as_i64()? as u8;
        let field_name = match &mesg.field("field_name")?.value {
            Value::Text(s) => vec![s.clone()],
            Value::SliceText(parts) => parts.clone(),
            _ => return None,
        };
        Some(Self {
            developer_data_index,
            field_definition_number,
            field_name,
        })
    }

    /// The output key for fields carrying this description.
    pub fn name(&self) -> String {
        self.field_name.join("|")
    }
}
