//! Text parsing into existing record fields
//!
//! Scalar and scalar-array fields accept literal token renderings and are
//! always parseable. Composite fields (structures, unions) require the
//! JSON parser behind the `json` feature; without it they fail with
//! `UnsupportedWithoutTextParsing`.
//!
//! Parsing mutates the target in place and marks the offsets it touched in
//! a change set, addressed relative to the record the field came from.

use crate::datatypes::change_set::ChangeSet;
use crate::datatypes::field::{PvField, PvValue};
use crate::datatypes::record::PvStructure;
use crate::error::{PvaError, PvaResult};

/// Parse a text rendering into an existing field, in place
///
/// `base_offset` is the field's own pre-order offset within its record;
/// touched offsets are marked in `change_set` when one is given.
pub fn parse_field(
    field: &mut PvField,
    text: &str,
    base_offset: usize,
    change_set: Option<&mut ChangeSet>,
) -> PvaResult<()> {
    let mut scratch = ChangeSet::new(0);
    let bits = change_set.unwrap_or(&mut scratch);
    if assign_simple(field.value_mut(), text)? {
        bits.set(base_offset);
        return Ok(());
    }
    parse_composite(field, text, base_offset, bits)
}

/// Parse a text rendering of the whole record, in place
///
/// The record is treated as a structure at offset 0; every touched field
/// offset is marked in `change_set`.
pub fn parse_record(
    record: &mut PvStructure,
    text: &str,
    change_set: &mut ChangeSet,
) -> PvaResult<()> {
    parse_record_json(record, text, change_set)
}

/// Assign a literal token rendering to a scalar or scalar-array value.
/// Returns `false` for composite values, which need the JSON path.
fn assign_simple(value: &mut PvValue, text: &str) -> PvaResult<bool> {
    match value {
        PvValue::Scalar(scalar) => {
            scalar.assign_from_text(text)?;
            Ok(true)
        }
        PvValue::ScalarArray(array) => {
            array.assign_from_text(text)?;
            Ok(true)
        }
        _ => Ok(false),
    }
}

#[cfg(feature = "json")]
fn parse_composite(
    field: &mut PvField,
    text: &str,
    base_offset: usize,
    bits: &mut ChangeSet,
) -> PvaResult<()> {
    let value: serde_json::Value = serde_json::from_str(text)
        .map_err(|e| PvaError::ParseError(format!("'{}' is not valid JSON: {}", text, e)))?;
    apply_value(field, &value, base_offset, bits)
}

#[cfg(not(feature = "json"))]
fn parse_composite(
    field: &mut PvField,
    _text: &str,
    _base_offset: usize,
    _bits: &mut ChangeSet,
) -> PvaResult<()> {
    Err(PvaError::UnsupportedWithoutTextParsing(format!(
        "parsing into {} field '{}' requires the json feature",
        field.kind(),
        field.name()
    )))
}

#[cfg(feature = "json")]
fn parse_record_json(
    record: &mut PvStructure,
    text: &str,
    bits: &mut ChangeSet,
) -> PvaResult<()> {
    let value: serde_json::Value = serde_json::from_str(text)
        .map_err(|e| PvaError::ParseError(format!("'{}' is not valid JSON: {}", text, e)))?;
    let members = match value {
        serde_json::Value::Object(members) => members,
        _ => {
            return Err(PvaError::ParseError(format!(
                "'{}' does not parse as a structure",
                text
            )));
        }
    };
    for (name, member) in &members {
        let offset = record
            .offset_of(name)
            .ok_or_else(|| PvaError::UnknownFieldName(format!("record has no field '{}'", name)))?;
        if let Some(field) = record.sub_field_mut(name) {
            apply_value(field, member, offset, bits)?;
        }
    }
    Ok(())
}

#[cfg(not(feature = "json"))]
fn parse_record_json(
    _record: &mut PvStructure,
    _text: &str,
    _bits: &mut ChangeSet,
) -> PvaResult<()> {
    Err(PvaError::UnsupportedWithoutTextParsing(
        "parsing a whole record requires the json feature".to_string(),
    ))
}

#[cfg(feature = "json")]
fn apply_value(
    field: &mut PvField,
    value: &serde_json::Value,
    offset: usize,
    bits: &mut ChangeSet,
) -> PvaResult<()> {
    use crate::datatypes::field::FieldKind;
    use serde_json::Value;

    let kind = field.kind();
    if kind == FieldKind::Structure {
        let members = match value {
            Value::Object(members) => members,
            _ => {
                return Err(PvaError::ParseError(format!(
                    "{} is not a structure rendering",
                    value
                )));
            }
        };
        for (name, member) in members {
            let child_offset = child_offset(field, offset, name).ok_or_else(|| {
                PvaError::UnknownFieldName(format!(
                    "structure '{}' has no field '{}'",
                    field.name(),
                    name
                ))
            })?;
            if let Some(child) = field.sub_field_mut(name) {
                apply_value(child, member, child_offset, bits)?;
            }
        }
        return Ok(());
    }

    match field.value_mut() {
        PvValue::Scalar(scalar) => {
            scalar.assign_from_text(&scalar_token(value)?)?;
            bits.set(offset);
            Ok(())
        }
        PvValue::ScalarArray(array) => match value {
            Value::Array(elements) => {
                array.clear();
                for element in elements {
                    array.push_from_text(&scalar_token(element)?)?;
                }
                bits.set(offset);
                Ok(())
            }
            _ => Err(PvaError::ParseError(format!(
                "{} is not an array rendering",
                value
            ))),
        },
        PvValue::Union(union) => match value {
            Value::Object(members) => {
                let mut entries = members.iter();
                match (entries.next(), entries.next()) {
                    (Some((name, member)), None) => {
                        let variant = union.select(name)?;
                        // the union occupies a single offset; its payload
                        // is opaque to change tracking
                        let mut scratch = ChangeSet::new(0);
                        apply_value(variant, member, 0, &mut scratch)?;
                        bits.set(offset);
                        Ok(())
                    }
                    _ => Err(PvaError::ParseError(format!(
                        "{} does not select a single union variant",
                        value
                    ))),
                }
            }
            _ => Err(PvaError::ParseError(format!(
                "{} does not select a union variant",
                value
            ))),
        },
        _ => Err(PvaError::ParseError(format!(
            "parsing into {} fields is not supported",
            kind
        ))),
    }
}

#[cfg(feature = "json")]
fn scalar_token(value: &serde_json::Value) -> PvaResult<String> {
    use serde_json::Value;
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(PvaError::ParseError(format!(
            "{} is not a scalar rendering",
            value
        ))),
    }
}

#[cfg(feature = "json")]
fn child_offset(field: &PvField, field_offset: usize, name: &str) -> Option<usize> {
    let children = field.as_structure()?;
    let mut cursor = field_offset + 1;
    for child in children {
        if child.name() == name {
            return Some(cursor);
        }
        cursor += child.subtree_size();
    }
    None
}
