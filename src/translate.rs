//! Message translation
//!
//! Converts a full decoded message into its JSON mapping: standard fields go
//! through the value projector, developer fields are resolved against the
//! field-description index. Field-description messages themselves are
//! recorded into the index by the caller and never reach `translate`.

use serde_json::Map;
use tracing::debug;

use crate::message::{FieldDescription, Message};
use crate::options::ConvertOptions;
use crate::project::project_field;

/// A translated message: output key → JSON value, in arrival order.
pub type TranslatedMessage = Map<String, serde_json::Value>;

/// Accumulates developer-field descriptions for one conversion.
///
/// The protocol guarantees a description arrives before any developer field
/// referencing it; this index only stores and looks up.
#[derive(Debug, Default)]
pub struct FieldDescriptionIndex {
    descriptions: Vec<FieldDescription>,
}

impl FieldDescriptionIndex {
    pub fn record(&mut self, desc: FieldDescription) {
        self.descriptions.push(desc);
    }

    pub fn resolve(&self, dev_index: u8, field_num: u8) -> Option<&FieldDescription> {
        self.descriptions.iter().find(|d| {
            d.developer_data_index == dev_index && d.field_definition_number == field_num
        })
    }

    pub fn len(&self) -> usize {
        self.descriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptions.is_empty()
    }
}

/// Translate one message. `None` when no field survived projection, so the
/// caller can skip the message entirely.
pub fn translate(
    mesg: &Message,
    index: &FieldDescriptionIndex,
    options: &ConvertOptions,
) -> Option<TranslatedMessage> {
    let mut out = TranslatedMessage::new();

    for field in &mesg.fields {
        if field.is_expanded {
            continue;
        }
        if let Some((name, value)) = project_field(field, mesg, options) {
            out.insert(name, value);
        }
    }

    for dev_field in &mesg.developer_fields {
        let Some(desc) = index.resolve(
            dev_field.developer_data_index,
            dev_field.field_definition_number,
        ) else {
            debug!(
                dev_index = dev_field.developer_data_index,
                field_num = dev_field.field_definition_number,
                "no field description registered, dropping developer field"
            );
            continue;
        };
        // Developer fields carry no scale metadata at this layer; emit raw,
        // still subject to the non-finite filter.
        if let Some(value) = dev_field.value.to_json() {
            out.insert(desc.name(), value);
        }
    }

    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{mesg_num, DeveloperField, Field};
    use crate::value::Value;
    use serde_json::json;

    fn description(dev_index: u8, field_num: u8, name: &str) -> FieldDescription {
        FieldDescription {
            developer_data_index: dev_index,
            field_definition_number: field_num,
            field_name: vec![name.to_string()],
        }
    }

    #[test]
    fn test_index_resolves_on_both_keys() {
        let mut index = FieldDescriptionIndex::default();
        index.record(description(0, 5, "Power"));
        index.record(description(1, 5, "Cadence"));

        assert_eq!(index.resolve(0, 5).unwrap().name(), "Power");
        assert_eq!(index.resolve(1, 5).unwrap().name(), "Cadence");
        assert!(index.resolve(0, 6).is_none());
        assert!(index.resolve(2, 5).is_none());
    }

    #[test]
    fn test_translate_preserves_field_order() {
        let mesg = Message::with_fields(
            mesg_num::RECORD,
            vec![
                Field::new("heart_rate", Value::Uint8(150)),
                Field::new("cadence", Value::Uint8(90)),
                Field::new("power", Value::Uint16(250)),
            ],
        );
        let index = FieldDescriptionIndex::default();
        let out = translate(&mesg, &index, &ConvertOptions::default()).unwrap();
        let keys: Vec<&str> = out.keys().map(String::as_str).collect();
        assert_eq!(keys, ["heart_rate", "cadence", "power"]);
    }

    #[test]
    fn test_translate_skips_expanded_fields() {
        let mesg = Message::with_fields(
            mesg_num::RECORD,
            vec![
                Field::new("speed", Value::Uint16(3000)),
                Field::new("enhanced_speed", Value::Uint32(3000)).expanded(),
            ],
        );
        let index = FieldDescriptionIndex::default();
        let out = translate(&mesg, &index, &ConvertOptions::default()).unwrap();
        assert!(out.contains_key("speed"));
        assert!(
            !out.contains_key("enhanced_speed"),
            "component-expanded fields must not be emitted"
        );
    }

    #[test]
    fn test_translate_resolves_developer_fields() {
        let mut index = FieldDescriptionIndex::default();
        index.record(description(0, 5, "Form Power"));

        let mut mesg = Message::new(mesg_num::RECORD);
        mesg.developer_fields
            .push(DeveloperField::new(0, 5, Value::Uint16(78)));
        let out = translate(&mesg, &index, &ConvertOptions::default()).unwrap();
        assert_eq!(out.get("Form Power"), Some(&json!(78)));
    }

    #[test]
    fn test_translate_drops_unregistered_developer_field() {
        let index = FieldDescriptionIndex::default();
        let mut mesg = Message::new(mesg_num::RECORD);
        mesg.fields.push(Field::new("cadence", Value::Uint8(90)));
        mesg.developer_fields
            .push(DeveloperField::new(3, 9, Value::Uint16(78)));
        let out = translate(&mesg, &index, &ConvertOptions::default()).unwrap();
        assert_eq!(out.len(), 1);
        assert!(out.contains_key("cadence"));
    }

    #[test]
    fn test_translate_drops_non_finite_developer_value() {
        let mut index = FieldDescriptionIndex::default();
        index.record(description(0, 5, "Ratio"));
        let mut mesg = Message::new(mesg_num::RECORD);
        mesg.fields.push(Field::new("cadence", Value::Uint8(90)));
        mesg.developer_fields
            .push(DeveloperField::new(0, 5, Value::Float64(f64::NAN)));
        let out = translate(&mesg, &index, &ConvertOptions::default()).unwrap();
        assert!(!out.contains_key("Ratio"));
    }

    #[test]
    fn test_translate_empty_result_is_none() {
        let mesg = Message::new(mesg_num::RECORD);
        let index = FieldDescriptionIndex::default();
        assert!(translate(&mesg, &index, &ConvertOptions::default()).is_none());

        // A message whose only field is dropped also yields None.
        let options = ConvertOptions::builder().print_only_valid_value(true).build();
        let mesg = Message::with_fields(
            mesg_num::RECORD,
            vec![Field::new("heart_rate", Value::Uint8(0xFF))],
        );
        assert!(translate(&mesg, &index, &options).is_none());
    }

    #[test]
    fn test_multi_part_description_name_joins_with_pipe() {
        let mut index = FieldDescriptionIndex::default();
        index.record(FieldDescription {
            developer_data_index: 0,
            field_definition_number: 1,
            field_name: vec!["Ground Time".to_string(), "GT".to_string()],
        });
        let mut mesg = Message::new(mesg_num::RECORD);
        mesg.developer_fields
            .push(DeveloperField::new(0, 1, Value::Uint16(240)));
        let out = translate(&mesg, &index, &ConvertOptions::default()).unwrap();
        assert_eq!(out.get("Ground Time|GT"), Some(&json!(240)));
    }
}
