//! Top-level structured record with offset-indexed field addressing
//!
//! Every field in a record has a stable offset: a pre-order index into the
//! flattened tree, with offset 0 naming the record itself. The change
//! bitmap delivered alongside a record addresses fields by these offsets.

use crate::datatypes::field::{PvField, PvValue};
use crate::datatypes::introspect::StructureDesc;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A structured record: the ordered tree of fields one network exchange
/// delivers for a channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PvStructure {
    fields: Vec<PvField>,
}

impl PvStructure {
    /// Create a record from its top-level fields
    pub fn new(fields: Vec<PvField>) -> Self {
        Self { fields }
    }

    /// Create a default-initialized record for a structure shape
    pub fn from_desc(desc: &StructureDesc) -> Self {
        Self {
            fields: desc.instantiate_fields(),
        }
    }

    /// The top-level fields, in declaration order
    pub fn fields(&self) -> &[PvField] {
        &self.fields
    }

    /// Mutable access to the top-level fields
    pub fn fields_mut(&mut self) -> &mut [PvField] {
        &mut self.fields
    }

    /// Resolve a dotted field path, descending through structure members
    pub fn sub_field(&self, path: &str) -> Option<&PvField> {
        let (first, rest) = split_path(path);
        let field = self.fields.iter().find(|f| f.name() == first)?;
        match rest {
            Some(rest) => field.sub_field(rest),
            None => Some(field),
        }
    }

    /// Resolve a dotted field path, mutably
    pub fn sub_field_mut(&mut self, path: &str) -> Option<&mut PvField> {
        let (first, rest) = split_path(path);
        let field = self.fields.iter_mut().find(|f| f.name() == first)?;
        match rest {
            Some(rest) => field.sub_field_mut(rest),
            None => Some(field),
        }
    }

    /// Total number of offsets in this record, including offset 0 for the
    /// record itself
    pub fn next_offset(&self) -> usize {
        1 + self
            .fields
            .iter()
            .map(|f| f.subtree_size())
            .sum::<usize>()
    }

    /// Resolve the field at a pre-order offset, together with its dotted
    /// full name
    ///
    /// Offset 0 names the record itself and resolves to `None`; callers
    /// treat it as "the whole record".
    pub fn find_by_offset(&self, offset: usize) -> Option<(String, &PvField)> {
        if offset == 0 {
            return None;
        }
        let mut path = Vec::new();
        let mut cursor = 1;
        let field = locate(&self.fields, &mut cursor, offset, &mut path)?;
        Some((path.join("."), field))
    }

    /// Resolve the field at a pre-order offset
    pub fn field_at_offset(&self, offset: usize) -> Option<&PvField> {
        self.find_by_offset(offset).map(|(_, field)| field)
    }

    /// Dotted full name of the field at a pre-order offset
    pub fn full_name_of_offset(&self, offset: usize) -> Option<String> {
        self.find_by_offset(offset).map(|(name, _)| name)
    }

    /// Pre-order offset of the field at a dotted path
    pub fn offset_of(&self, path: &str) -> Option<usize> {
        let mut fields = &self.fields[..];
        let mut container_offset = 0;
        let mut components = path.split('.').peekable();
        loop {
            let component = components.next()?;
            let mut cursor = container_offset + 1;
            let mut found = None;
            for field in fields {
                if field.name() == component {
                    found = Some((cursor, field));
                    break;
                }
                cursor += field.subtree_size();
            }
            let (field_offset, field) = found?;
            if components.peek().is_none() {
                return Some(field_offset);
            }
            fields = field.as_structure()?;
            container_offset = field_offset;
        }
    }
}

fn split_path(path: &str) -> (&str, Option<&str>) {
    match path.split_once('.') {
        Some((first, rest)) => (first, Some(rest)),
        None => (path, None),
    }
}

fn locate<'a>(
    fields: &'a [PvField],
    cursor: &mut usize,
    target: usize,
    path: &mut Vec<&'a str>,
) -> Option<&'a PvField> {
    for field in fields {
        if *cursor == target {
            path.push(field.name());
            return Some(field);
        }
        let size = field.subtree_size();
        if target < *cursor + size {
            // inside this field's subtree, which only structures have
            match field.value() {
                PvValue::Structure(children) => {
                    path.push(field.name());
                    *cursor += 1;
                    return locate(children, cursor, target, path);
                }
                _ => return None,
            }
        }
        *cursor += size;
    }
    None
}

impl fmt::Display for PvStructure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", field.name(), field)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatypes::introspect::{FieldDesc, StructureDesc};
    use crate::datatypes::scalar::{ScalarType, ScalarValue};

    // offsets: a=1, a.b=2, d=3, d.e=4, c=5
    fn sample() -> PvStructure {
        let desc = StructureDesc::new(vec![
            FieldDesc::structure(
                "a",
                StructureDesc::new(vec![FieldDesc::scalar("b", ScalarType::Int32)]),
            ),
            FieldDesc::structure(
                "d",
                StructureDesc::new(vec![FieldDesc::scalar("e", ScalarType::Double)]),
            ),
            FieldDesc::scalar("c", ScalarType::String),
        ]);
        PvStructure::from_desc(&desc)
    }

    #[test]
    fn test_next_offset() {
        assert_eq!(sample().next_offset(), 6);
    }

    #[test]
    fn test_offset_of() {
        let record = sample();
        assert_eq!(record.offset_of("a"), Some(1));
        assert_eq!(record.offset_of("a.b"), Some(2));
        assert_eq!(record.offset_of("d"), Some(3));
        assert_eq!(record.offset_of("d.e"), Some(4));
        assert_eq!(record.offset_of("c"), Some(5));
        assert_eq!(record.offset_of("nope"), None);
    }

    #[test]
    fn test_find_by_offset() {
        let record = sample();
        let (name, field) = record.find_by_offset(2).unwrap();
        assert_eq!(name, "a.b");
        assert_eq!(field.name(), "b");
        let (name, _) = record.find_by_offset(5).unwrap();
        assert_eq!(name, "c");
        assert!(record.find_by_offset(0).is_none());
        assert!(record.find_by_offset(6).is_none());
    }

    #[test]
    fn test_sub_field_mut() {
        let mut record = sample();
        record
            .sub_field_mut("a.b")
            .unwrap()
            .as_scalar_mut()
            .unwrap()
            .assign_from_text("11")
            .unwrap();
        assert_eq!(
            record.sub_field("a.b").unwrap().as_scalar().unwrap(),
            &ScalarValue::Int32(11)
        );
    }
}
