//! Text-based field updates
//!
//! Updates arrive as `"field=value"` assignment strings, typically lifted
//! straight from command-line arguments. Scalars take literal tokens,
//! composites take JSON renderings, unions take `variant=value` selections,
//! and enumerated-choice structures take one of their choice strings.
//!
//! A multi-assignment parse replaces the pending change set wholesale: the
//! bitmap is cleared up front and only the fields this call touches end up
//! marked. Assignments that resolve to an enumerated choice, a union, or a
//! bare record-wide value complete the request on their own and terminate
//! the list early; callers mixing them with further assignments lose the
//! remainder, which mirrors how single-field requests behave on the wire.

use crate::data::ClientData;
use pva_core::datatypes::{Enumerated, FieldKind, PvField, PvUnion};
use pva_core::text;
use pva_core::{PvaError, PvaResult};

impl ClientData {
    /// Apply an ordered list of `"field=value"` (or bare `"value"`)
    /// assignment strings to the record
    ///
    /// Clears the change bitmap first; afterwards the bitmap holds exactly
    /// the offsets this call touched. A bare value (no `=`) is parsed
    /// against the whole record and ends the call; so does an assignment
    /// that matches an enumerated choice or selects a union variant.
    ///
    /// # Errors
    ///
    /// `PvaError::NotInitialized` without an installed record,
    /// `PvaError::UnknownFieldName` for an unresolvable field, and the
    /// parse errors of the value renderings.
    pub fn parse(&mut self, args: &[String]) -> PvaResult<()> {
        log::debug!("ClientData::parse");
        let prefix = self.message_prefix().to_string();
        let (pv, bits) = self.parts_mut()?;
        bits.clear();
        for arg in args {
            let (field_name, rest) = match arg.split_once('=') {
                Some((field_name, rest)) => (field_name, rest),
                None => ("", arg.as_str()),
            };
            if field_name.is_empty() {
                // a bare value is a whole-record request
                return text::parse_record(&mut *pv, rest, &mut *bits)
                    .map_err(|e| prefixed(e, &prefix));
            }
            let offset = pv.offset_of(field_name).ok_or_else(|| {
                PvaError::UnknownFieldName(format!(
                    "{}record has no field '{}'",
                    prefix, field_name
                ))
            })?;
            let field = match pv.sub_field_mut(field_name) {
                Some(field) => field,
                None => continue,
            };
            // an exact enumerated-choice match is a complete request
            if let Some(mut enumerated) = Enumerated::attach(&mut *field) {
                let choices = enumerated.choices();
                if let Some(index) = choices.iter().position(|c| c == rest) {
                    enumerated.set_index(index as i32);
                    return Ok(());
                }
            }
            match field.kind() {
                FieldKind::Union => {
                    parse_union_field(field, rest, &prefix)?;
                    bits.set(offset);
                    return Ok(());
                }
                FieldKind::ScalarArray => {
                    if let Some(array) = field.as_scalar_array_mut() {
                        array.clear();
                    }
                    text::parse_field(field, rest, offset, Some(&mut *bits))
                        .map_err(|e| prefixed(e, &prefix))?;
                }
                _ => {
                    text::parse_field(field, rest, offset, Some(&mut *bits))
                        .map_err(|e| prefixed(e, &prefix))?;
                }
            }
        }
        Ok(())
    }

    /// Apply one value rendering to the field at a dotted path
    ///
    /// Union-typed fields take `variant=value` renderings, selecting the
    /// variant before parsing into it; nested unions recurse the same way.
    /// Touched offsets are marked in the change bitmap without clearing it
    /// first.
    ///
    /// # Errors
    ///
    /// `PvaError::UnknownFieldName` for an unresolvable path, plus the
    /// union and rendering parse errors.
    pub fn parse_field(&mut self, path: &str, value: &str) -> PvaResult<()> {
        log::debug!("ClientData::parse_field");
        let prefix = self.message_prefix().to_string();
        let (pv, bits) = self.parts_mut()?;
        let offset = pv.offset_of(path).ok_or_else(|| {
            PvaError::UnknownFieldName(format!("{}record has no field '{}'", prefix, path))
        })?;
        let field = match pv.sub_field_mut(path) {
            Some(field) => field,
            None => return Ok(()),
        };
        if field.kind() == FieldKind::Union {
            parse_union_field(field, value, &prefix)?;
            bits.set(offset);
            return Ok(());
        }
        text::parse_field(field, value, offset, Some(bits)).map_err(|e| prefixed(e, &prefix))
    }
}

fn prefixed(error: PvaError, prefix: &str) -> PvaError {
    let prefix = prefix.to_string();
    error.map_message(move |m| format!("{}{}", prefix, m))
}

fn parse_union_field(field: &mut PvField, text: &str, prefix: &str) -> PvaResult<()> {
    match field.as_union_mut() {
        Some(union) => parse_union_value(union, text, prefix),
        None => Err(PvaError::WrongFieldKind(format!(
            "{}field '{}' is not a union",
            prefix,
            field.name()
        ))),
    }
}

fn parse_union_value(union: &mut PvUnion, text: &str, prefix: &str) -> PvaResult<()> {
    if union.is_variant() {
        return Err(PvaError::VariantUnionUnsupported(format!(
            "{}variant union has no named variants to select",
            prefix
        )));
    }
    let (variant_name, rest) = text.split_once('=').ok_or_else(|| {
        PvaError::MissingFieldSeparator(format!(
            "{}'{}' was expected to start with field=",
            prefix, text
        ))
    })?;
    let variant = union
        .select(variant_name)
        .map_err(|e| prefixed(e, prefix))?;
    if let Some(inner) = variant.as_union_mut() {
        return parse_union_value(inner, rest, prefix);
    }
    // offsets inside a union payload are opaque to change tracking
    text::parse_field(variant, rest, 0, None).map_err(|e| prefixed(e, prefix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pva_core::datatypes::{
        ChangeSet, FieldDesc, PvStructure, ScalarArrayValue, ScalarType, ScalarValue,
        StructureDesc, UnionDesc,
    };

    fn install(desc: &StructureDesc) -> ClientData {
        let mut data = ClientData::new(desc.clone());
        let record = PvStructure::from_desc(desc);
        let bits = ChangeSet::new(record.next_offset());
        data.set_data(record, bits);
        data
    }

    fn enumerated_desc() -> StructureDesc {
        StructureDesc::new(vec![FieldDesc::new(
            "status",
            Enumerated::type_desc(),
        )])
    }

    fn with_choices(data: &mut ClientData, choices: &[&str]) {
        let mut record = data.pv_structure().unwrap().clone();
        if let Some(ScalarArrayValue::String(v)) = record
            .sub_field_mut("status.choices")
            .and_then(|f| f.as_scalar_array_mut())
        {
            *v = choices.iter().map(|s| s.to_string()).collect();
        }
        let bits = ChangeSet::new(record.next_offset());
        data.set_data(record, bits);
    }

    #[test]
    fn test_scalar_assignments_mark_offsets() {
        // offsets: x=1, y=2
        let desc = StructureDesc::new(vec![
            FieldDesc::scalar("x", ScalarType::Double),
            FieldDesc::scalar("y", ScalarType::Double),
        ]);
        let mut data = install(&desc);
        data.parse(&["x=1".to_string(), "y=2".to_string()]).unwrap();
        let pv = data.pv_structure().unwrap();
        assert_eq!(
            pv.sub_field("x").unwrap().as_scalar().unwrap(),
            &ScalarValue::Double(1.0)
        );
        assert_eq!(
            pv.sub_field("y").unwrap().as_scalar().unwrap(),
            &ScalarValue::Double(2.0)
        );
        let bits = data.change_set().unwrap();
        assert!(bits.get(1));
        assert!(bits.get(2));
        assert_eq!(bits.cardinality(), 2);

        // a second parse replaces the pending change set
        data.parse(&["y=5".to_string()]).unwrap();
        let bits = data.change_set().unwrap();
        assert!(!bits.get(1));
        assert!(bits.get(2));
        assert_eq!(bits.cardinality(), 1);
    }

    #[test]
    fn test_unknown_field() {
        let desc = StructureDesc::new(vec![FieldDesc::scalar("x", ScalarType::Double)]);
        let mut data = install(&desc);
        assert!(matches!(
            data.parse(&["nope=1".to_string()]),
            Err(PvaError::UnknownFieldName(_))
        ));
    }

    #[test]
    fn test_enum_choice_short_circuits() {
        let mut data = install(&enumerated_desc());
        with_choices(&mut data, &["Inactive", "Active", "Fault"]);
        // the trailing assignment is dropped: an enum selection is a
        // complete single-field request
        data.parse(&["status=Active".to_string(), "status=Fault".to_string()])
            .unwrap();
        let pv = data.pv_structure().unwrap();
        assert_eq!(
            pv.sub_field("status.index").unwrap().as_scalar().unwrap(),
            &ScalarValue::Int32(1)
        );
    }

    #[test]
    fn test_union_assignment_short_circuits() {
        // offsets: choice=1, x=2
        let desc = StructureDesc::new(vec![
            FieldDesc::union(
                "choice",
                UnionDesc::new(vec![
                    FieldDesc::scalar("ival", ScalarType::Int32),
                    FieldDesc::scalar("sval", ScalarType::String),
                ]),
            ),
            FieldDesc::scalar("x", ScalarType::Double),
        ]);
        let mut data = install(&desc);
        data.parse(&["choice=ival=7".to_string(), "x=3".to_string()])
            .unwrap();
        let pv = data.pv_structure().unwrap();
        let union = pv.sub_field("choice").unwrap().as_union().unwrap();
        assert_eq!(union.selected_name(), Some("ival"));
        assert_eq!(
            union.value().unwrap().as_scalar().unwrap(),
            &ScalarValue::Int32(7)
        );
        // the union's own offset is marked, and x was never applied
        let bits = data.change_set().unwrap();
        assert!(bits.get(1));
        assert_eq!(bits.cardinality(), 1);
        assert_eq!(
            pv.sub_field("x").unwrap().as_scalar().unwrap(),
            &ScalarValue::Double(0.0)
        );
    }

    #[test]
    fn test_union_missing_separator() {
        let desc = StructureDesc::new(vec![FieldDesc::union(
            "choice",
            UnionDesc::new(vec![FieldDesc::scalar("ival", ScalarType::Int32)]),
        )]);
        let mut data = install(&desc);
        assert!(matches!(
            data.parse(&["choice=7".to_string()]),
            Err(PvaError::MissingFieldSeparator(_))
        ));
    }

    #[test]
    fn test_variant_union_rejected() {
        let desc = StructureDesc::new(vec![FieldDesc::union("any", UnionDesc::variant())]);
        let mut data = install(&desc);
        assert!(matches!(
            data.parse(&["any=ival=1".to_string()]),
            Err(PvaError::VariantUnionUnsupported(_))
        ));
    }

    #[test]
    fn test_scalar_array_reset_before_assignment() {
        let desc = StructureDesc::new(vec![FieldDesc::scalar_array("value", ScalarType::Int32)]);
        let mut data = install(&desc);
        data.parse(&["value=[1, 2, 3]".to_string()]).unwrap();
        data.parse(&["value=[4]".to_string()]).unwrap();
        let pv = data.pv_structure().unwrap();
        assert_eq!(
            pv.sub_field("value").unwrap().as_scalar_array().unwrap(),
            &ScalarArrayValue::Int32(vec![4])
        );
    }

    #[cfg(feature = "json")]
    #[test]
    fn test_bare_value_parses_whole_record() {
        let desc = StructureDesc::new(vec![
            FieldDesc::scalar("x", ScalarType::Double),
            FieldDesc::scalar("y", ScalarType::Double),
        ]);
        let mut data = install(&desc);
        data.parse(&[r#"{"x": 1.5, "y": 2.5}"#.to_string(), "x=9".to_string()])
            .unwrap();
        let pv = data.pv_structure().unwrap();
        // the bare value completed the request; "x=9" was never applied
        assert_eq!(
            pv.sub_field("x").unwrap().as_scalar().unwrap(),
            &ScalarValue::Double(1.5)
        );
        assert_eq!(
            pv.sub_field("y").unwrap().as_scalar().unwrap(),
            &ScalarValue::Double(2.5)
        );
    }

    #[test]
    fn test_parse_field_single() {
        let desc = StructureDesc::new(vec![FieldDesc::structure(
            "limits",
            StructureDesc::new(vec![
                FieldDesc::scalar("low", ScalarType::Double),
                FieldDesc::scalar("high", ScalarType::Double),
            ]),
        )]);
        let mut data = install(&desc);
        // offsets: limits=1, low=2, high=3
        data.parse_field("limits.high", "7.5").unwrap();
        let pv = data.pv_structure().unwrap();
        assert_eq!(
            pv.sub_field("limits.high").unwrap().as_scalar().unwrap(),
            &ScalarValue::Double(7.5)
        );
        assert!(data.change_set().unwrap().get(3));
    }

    #[test]
    fn test_enum_no_match_falls_through() {
        let mut data = install(&enumerated_desc());
        with_choices(&mut data, &["Off", "On"]);
        // no choice matches, so the value is parsed as text against the
        // enumerated structure itself, which a bare token cannot satisfy
        assert!(data.parse(&["status=Standby".to_string()]).is_err());
    }
}
