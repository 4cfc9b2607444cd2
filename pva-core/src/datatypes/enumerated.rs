//! View over enumerated-choice structures
//!
//! An enumerated field is a structure exposing a selectable `index`
//! (32-bit int) plus a fixed `choices` list of strings. `Enumerated`
//! attaches to any field of that shape; attaching to anything else
//! yields `None` so callers can probe fields cheaply.

use crate::datatypes::field::PvField;
use crate::datatypes::introspect::{FieldDesc, StructureDesc, TypeDesc};
use crate::datatypes::scalar::{ScalarType, ScalarValue};
use crate::datatypes::scalar_array::ScalarArrayValue;

/// Mutable view over an enumerated-choice structure
pub struct Enumerated<'a> {
    field: &'a mut PvField,
}

impl<'a> Enumerated<'a> {
    /// The conventional shape of an enumerated structure
    pub fn type_desc() -> TypeDesc {
        TypeDesc::Structure(StructureDesc::new(vec![
            FieldDesc::scalar("index", ScalarType::Int32),
            FieldDesc::scalar_array("choices", ScalarType::String),
        ]))
    }

    /// Attach to a field if it has the enumerated shape
    pub fn attach(field: &'a mut PvField) -> Option<Self> {
        let index_ok = matches!(
            field.sub_field("index").and_then(|f| f.as_scalar()),
            Some(ScalarValue::Int32(_))
        );
        let choices_ok = matches!(
            field.sub_field("choices").and_then(|f| f.as_scalar_array()),
            Some(ScalarArrayValue::String(_))
        );
        if index_ok && choices_ok {
            Some(Self { field })
        } else {
            None
        }
    }

    /// The selected choice index
    pub fn index(&self) -> i32 {
        match self.field.sub_field("index").and_then(|f| f.as_scalar()) {
            Some(ScalarValue::Int32(v)) => *v,
            _ => unreachable!("shape was checked on attach"),
        }
    }

    /// The choice strings, copied out
    pub fn choices(&self) -> Vec<String> {
        match self
            .field
            .sub_field("choices")
            .and_then(|f| f.as_scalar_array())
        {
            Some(ScalarArrayValue::String(v)) => v.clone(),
            _ => unreachable!("shape was checked on attach"),
        }
    }

    /// Set the selected choice index
    pub fn set_index(&mut self, index: i32) {
        if let Some(ScalarValue::Int32(v)) = self
            .field
            .sub_field_mut("index")
            .and_then(|f| f.as_scalar_mut())
        {
            *v = index;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatypes::field::PvValue;

    fn enum_field(choices: &[&str]) -> PvField {
        let mut field = Enumerated::type_desc().instantiate("status");
        if let Some(ScalarArrayValue::String(v)) = field
            .sub_field_mut("choices")
            .and_then(|f| f.as_scalar_array_mut())
        {
            *v = choices.iter().map(|s| s.to_string()).collect();
        }
        field
    }

    #[test]
    fn test_attach_and_set_index() {
        let mut field = enum_field(&["Inactive", "Active", "Fault"]);
        let mut enumerated = Enumerated::attach(&mut field).unwrap();
        assert_eq!(enumerated.index(), 0);
        assert_eq!(enumerated.choices(), vec!["Inactive", "Active", "Fault"]);
        enumerated.set_index(2);
        assert_eq!(enumerated.index(), 2);
    }

    #[test]
    fn test_attach_rejects_other_shapes() {
        let mut scalar = PvField::new("x", PvValue::Scalar(ScalarValue::Int32(0)));
        assert!(Enumerated::attach(&mut scalar).is_none());
    }
}
