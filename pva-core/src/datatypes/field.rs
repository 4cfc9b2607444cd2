//! Data tree for self-describing PV structured records

use crate::datatypes::introspect::{StructureDesc, UnionDesc};
use crate::datatypes::scalar::ScalarValue;
use crate::datatypes::scalar_array::ScalarArrayValue;
use crate::error::{PvaError, PvaResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Structural category of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    /// Single scalar value
    Scalar,
    /// Homogeneous array of scalar elements
    ScalarArray,
    /// Ordered set of named sub-fields
    Structure,
    /// One active variant out of a declared set
    Union,
    /// Array of structures of one shape
    StructureArray,
    /// Array of unions of one shape
    UnionArray,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::Scalar => "scalar",
            FieldKind::ScalarArray => "scalarArray",
            FieldKind::Structure => "structure",
            FieldKind::Union => "union",
            FieldKind::StructureArray => "structureArray",
            FieldKind::UnionArray => "unionArray",
        };
        write!(f, "{}", name)
    }
}

/// A named, typed node in a structured record tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PvField {
    name: String,
    value: PvValue,
}

impl PvField {
    /// Create a field from its name and value
    pub fn new(name: &str, value: PvValue) -> Self {
        Self {
            name: name.to_string(),
            value,
        }
    }

    /// Field name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Structural kind of this field
    pub fn kind(&self) -> FieldKind {
        self.value.kind()
    }

    /// The held value
    pub fn value(&self) -> &PvValue {
        &self.value
    }

    /// Mutable access to the held value
    pub fn value_mut(&mut self) -> &mut PvValue {
        &mut self.value
    }

    /// Narrow to a scalar value
    pub fn as_scalar(&self) -> Option<&ScalarValue> {
        match &self.value {
            PvValue::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Narrow to a mutable scalar value
    pub fn as_scalar_mut(&mut self) -> Option<&mut ScalarValue> {
        match &mut self.value {
            PvValue::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Narrow to a scalar array value
    pub fn as_scalar_array(&self) -> Option<&ScalarArrayValue> {
        match &self.value {
            PvValue::ScalarArray(a) => Some(a),
            _ => None,
        }
    }

    /// Narrow to a mutable scalar array value
    pub fn as_scalar_array_mut(&mut self) -> Option<&mut ScalarArrayValue> {
        match &mut self.value {
            PvValue::ScalarArray(a) => Some(a),
            _ => None,
        }
    }

    /// Narrow to the sub-fields of a structure
    pub fn as_structure(&self) -> Option<&[PvField]> {
        match &self.value {
            PvValue::Structure(fields) => Some(fields),
            _ => None,
        }
    }

    /// Narrow to the mutable sub-fields of a structure
    pub fn as_structure_mut(&mut self) -> Option<&mut Vec<PvField>> {
        match &mut self.value {
            PvValue::Structure(fields) => Some(fields),
            _ => None,
        }
    }

    /// Narrow to a union value
    pub fn as_union(&self) -> Option<&PvUnion> {
        match &self.value {
            PvValue::Union(u) => Some(u),
            _ => None,
        }
    }

    /// Narrow to a mutable union value
    pub fn as_union_mut(&mut self) -> Option<&mut PvUnion> {
        match &mut self.value {
            PvValue::Union(u) => Some(u),
            _ => None,
        }
    }

    /// Resolve a dotted sub-field path below this field
    ///
    /// Resolution descends through structure members only.
    pub fn sub_field(&self, path: &str) -> Option<&PvField> {
        let mut current = self;
        for component in path.split('.') {
            current = current
                .as_structure()?
                .iter()
                .find(|f| f.name() == component)?;
        }
        Some(current)
    }

    /// Resolve a dotted sub-field path below this field, mutably
    pub fn sub_field_mut(&mut self, path: &str) -> Option<&mut PvField> {
        let mut current = self;
        for component in path.split('.') {
            current = current
                .as_structure_mut()?
                .iter_mut()
                .find(|f| f.name() == component)?;
        }
        Some(current)
    }

    /// Number of offsets occupied by this field in the record's pre-order
    /// offset space. Only structure fields contribute nested offsets; union
    /// and array payloads are opaque to change tracking.
    pub fn subtree_size(&self) -> usize {
        match &self.value {
            PvValue::Structure(fields) => {
                1 + fields.iter().map(|f| f.subtree_size()).sum::<usize>()
            }
            _ => 1,
        }
    }
}

impl fmt::Display for PvField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// The value held by a field, one variant per field kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PvValue {
    /// Scalar value
    Scalar(ScalarValue),
    /// Scalar array value
    ScalarArray(ScalarArrayValue),
    /// Ordered named sub-fields
    Structure(Vec<PvField>),
    /// Union value
    Union(PvUnion),
    /// Structure array value
    StructureArray(StructureArrayValue),
    /// Union array value
    UnionArray(UnionArrayValue),
}

impl PvValue {
    /// Structural kind of this value
    pub fn kind(&self) -> FieldKind {
        match self {
            PvValue::Scalar(_) => FieldKind::Scalar,
            PvValue::ScalarArray(_) => FieldKind::ScalarArray,
            PvValue::Structure(_) => FieldKind::Structure,
            PvValue::Union(_) => FieldKind::Union,
            PvValue::StructureArray(_) => FieldKind::StructureArray,
            PvValue::UnionArray(_) => FieldKind::UnionArray,
        }
    }
}

impl fmt::Display for PvValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PvValue::Scalar(s) => write!(f, "{}", s),
            PvValue::ScalarArray(a) => write!(f, "{}", a),
            PvValue::Structure(fields) => {
                write!(f, "{{")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", field.name(), field)?;
                }
                write!(f, "}}")
            }
            PvValue::Union(u) => write!(f, "{}", u),
            PvValue::StructureArray(a) => write!(f, "{}", a),
            PvValue::UnionArray(a) => write!(f, "{}", a),
        }
    }
}

/// A union value: the declared variants plus the currently selected one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PvUnion {
    desc: UnionDesc,
    selected: Option<usize>,
    value: Option<Box<PvField>>,
}

impl PvUnion {
    /// Create an unselected union for a union shape
    pub fn new(desc: UnionDesc) -> Self {
        Self {
            desc,
            selected: None,
            value: None,
        }
    }

    /// The union shape
    pub fn desc(&self) -> &UnionDesc {
        &self.desc
    }

    /// Check if this is a variant (any-type) union
    pub fn is_variant(&self) -> bool {
        self.desc.is_variant()
    }

    /// Name of the currently selected variant, if any
    pub fn selected_name(&self) -> Option<&str> {
        let index = self.selected?;
        Some(self.desc.variants()[index].name())
    }

    /// The currently held variant value, if any
    pub fn value(&self) -> Option<&PvField> {
        self.value.as_deref()
    }

    /// Select a variant by name and return its field for mutation
    ///
    /// Selecting a variant other than the current one replaces the held
    /// value with a default-initialized instance of that variant.
    ///
    /// # Errors
    ///
    /// Returns `PvaError::UnknownFieldName` if no variant carries the name.
    pub fn select(&mut self, name: &str) -> PvaResult<&mut PvField> {
        let (index, field_desc) = self.desc.variant_named(name).ok_or_else(|| {
            PvaError::UnknownFieldName(format!("union has no variant '{}'", name))
        })?;
        if self.selected != Some(index) {
            self.value = None;
            self.selected = Some(index);
        }
        let value = self
            .value
            .get_or_insert_with(|| Box::new(field_desc.instantiate()));
        Ok(&mut **value)
    }
}

impl fmt::Display for PvUnion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.value, self.selected_name()) {
            (Some(value), Some(name)) => write!(f, "{}={}", name, value),
            _ => write!(f, "(none)"),
        }
    }
}

/// An array whose elements are structures of a single shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureArrayValue {
    element: StructureDesc,
    elements: Vec<Vec<PvField>>,
}

impl StructureArrayValue {
    /// Create an empty structure array for an element shape
    pub fn new(element: StructureDesc) -> Self {
        Self {
            element,
            elements: Vec::new(),
        }
    }

    /// The element shape
    pub fn element_desc(&self) -> &StructureDesc {
        &self.element
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Check if the array has no elements
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// The elements, each an ordered set of fields
    pub fn elements(&self) -> &[Vec<PvField>] {
        &self.elements
    }

    /// Append one default-initialized element and return it for mutation
    pub fn push_default(&mut self) -> &mut Vec<PvField> {
        self.elements.push(self.element.instantiate_fields());
        let last = self.elements.len() - 1;
        &mut self.elements[last]
    }
}

impl fmt::Display for StructureArrayValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, element) in self.elements.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{{")?;
            for (j, field) in element.iter().enumerate() {
                if j > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}: {}", field.name(), field)?;
            }
            write!(f, "}}")?;
        }
        write!(f, "]")
    }
}

/// An array whose elements are unions of a single shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnionArrayValue {
    element: UnionDesc,
    elements: Vec<PvUnion>,
}

impl UnionArrayValue {
    /// Create an empty union array for an element shape
    pub fn new(element: UnionDesc) -> Self {
        Self {
            element,
            elements: Vec::new(),
        }
    }

    /// The element shape
    pub fn element_desc(&self) -> &UnionDesc {
        &self.element
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Check if the array has no elements
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// The elements
    pub fn elements(&self) -> &[PvUnion] {
        &self.elements
    }

    /// Append one unselected element and return it for mutation
    pub fn push_default(&mut self) -> &mut PvUnion {
        self.elements.push(PvUnion::new(self.element.clone()));
        let last = self.elements.len() - 1;
        &mut self.elements[last]
    }
}

impl fmt::Display for UnionArrayValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, element) in self.elements.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", element)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatypes::introspect::{FieldDesc, TypeDesc};
    use crate::datatypes::scalar::ScalarType;

    fn nested_field() -> PvField {
        PvField::new(
            "outer",
            PvValue::Structure(vec![PvField::new(
                "inner",
                PvValue::Structure(vec![PvField::new(
                    "leaf",
                    PvValue::Scalar(ScalarValue::Int32(7)),
                )]),
            )]),
        )
    }

    #[test]
    fn test_sub_field_path() {
        let field = nested_field();
        let leaf = field.sub_field("inner.leaf").unwrap();
        assert_eq!(leaf.as_scalar().unwrap(), &ScalarValue::Int32(7));
        assert!(field.sub_field("inner.missing").is_none());
    }

    #[test]
    fn test_subtree_size() {
        // outer itself, inner, leaf
        assert_eq!(nested_field().subtree_size(), 3);
        let scalar = PvField::new("x", PvValue::Scalar(ScalarValue::Double(0.0)));
        assert_eq!(scalar.subtree_size(), 1);
    }

    #[test]
    fn test_union_select() {
        let desc = UnionDesc::new(vec![
            FieldDesc::scalar("ival", ScalarType::Int32),
            FieldDesc::scalar("sval", ScalarType::String),
        ]);
        let mut union = PvUnion::new(desc);
        assert!(union.selected_name().is_none());
        {
            let variant = union.select("ival").unwrap();
            variant
                .as_scalar_mut()
                .unwrap()
                .assign_from_text("5")
                .unwrap();
        }
        assert_eq!(union.selected_name(), Some("ival"));
        assert_eq!(
            union.value().unwrap().as_scalar().unwrap(),
            &ScalarValue::Int32(5)
        );
        assert!(matches!(
            union.select("nope"),
            Err(PvaError::UnknownFieldName(_))
        ));
    }

    #[test]
    fn test_display_structure() {
        let field = PvField::new(
            "top",
            PvValue::Structure(vec![
                PvField::new("a", PvValue::Scalar(ScalarValue::Int32(1))),
                PvField::new("b", PvValue::Scalar(ScalarValue::Boolean(true))),
            ]),
        );
        assert_eq!(field.to_string(), "{a: 1, b: true}");
    }

    #[test]
    fn test_structure_array() {
        let desc = StructureDesc::new(vec![FieldDesc::new(
            "x",
            TypeDesc::Scalar(ScalarType::Double),
        )]);
        let mut array = StructureArrayValue::new(desc);
        array.push_default();
        assert_eq!(array.len(), 1);
    }
}
