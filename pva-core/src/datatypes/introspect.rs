//! Introspection descriptors for self-describing PV structured data
//!
//! A `StructureDesc` describes the static shape of a record: field names,
//! field kinds, and scalar element types. Shapes are built once per channel
//! and instantiated into data trees (`PvField`) as fresh records arrive.

use crate::datatypes::field::{FieldKind, PvField, PvUnion, PvValue, StructureArrayValue, UnionArrayValue};
use crate::datatypes::scalar::{ScalarType, ScalarValue};
use crate::datatypes::scalar_array::ScalarArrayValue;
use serde::{Deserialize, Serialize};

/// Type descriptor for a single field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypeDesc {
    /// Scalar of the given type
    Scalar(ScalarType),
    /// Scalar array with elements of the given type
    ScalarArray(ScalarType),
    /// Structure with named sub-fields
    Structure(StructureDesc),
    /// Union over named variants
    Union(UnionDesc),
    /// Array of structures of one shape
    StructureArray(StructureDesc),
    /// Array of unions of one shape
    UnionArray(UnionDesc),
}

impl TypeDesc {
    /// Get the field kind this descriptor produces
    pub fn kind(&self) -> FieldKind {
        match self {
            TypeDesc::Scalar(_) => FieldKind::Scalar,
            TypeDesc::ScalarArray(_) => FieldKind::ScalarArray,
            TypeDesc::Structure(_) => FieldKind::Structure,
            TypeDesc::Union(_) => FieldKind::Union,
            TypeDesc::StructureArray(_) => FieldKind::StructureArray,
            TypeDesc::UnionArray(_) => FieldKind::UnionArray,
        }
    }

    /// Build a default-initialized data field for this descriptor
    pub fn instantiate(&self, name: &str) -> PvField {
        let value = match self {
            TypeDesc::Scalar(scalar_type) => PvValue::Scalar(ScalarValue::default_for(*scalar_type)),
            TypeDesc::ScalarArray(element_type) => {
                PvValue::ScalarArray(ScalarArrayValue::default_for(*element_type))
            }
            TypeDesc::Structure(desc) => PvValue::Structure(desc.instantiate_fields()),
            TypeDesc::Union(desc) => PvValue::Union(PvUnion::new(desc.clone())),
            TypeDesc::StructureArray(desc) => {
                PvValue::StructureArray(StructureArrayValue::new(desc.clone()))
            }
            TypeDesc::UnionArray(desc) => PvValue::UnionArray(UnionArrayValue::new(desc.clone())),
        };
        PvField::new(name, value)
    }
}

/// A named field descriptor within a structure or union
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDesc {
    name: String,
    type_desc: TypeDesc,
}

impl FieldDesc {
    /// Create a field descriptor
    pub fn new(name: &str, type_desc: TypeDesc) -> Self {
        Self {
            name: name.to_string(),
            type_desc,
        }
    }

    /// Shorthand for a scalar field descriptor
    pub fn scalar(name: &str, scalar_type: ScalarType) -> Self {
        Self::new(name, TypeDesc::Scalar(scalar_type))
    }

    /// Shorthand for a scalar array field descriptor
    pub fn scalar_array(name: &str, element_type: ScalarType) -> Self {
        Self::new(name, TypeDesc::ScalarArray(element_type))
    }

    /// Shorthand for a structure field descriptor
    pub fn structure(name: &str, desc: StructureDesc) -> Self {
        Self::new(name, TypeDesc::Structure(desc))
    }

    /// Shorthand for a union field descriptor
    pub fn union(name: &str, desc: UnionDesc) -> Self {
        Self::new(name, TypeDesc::Union(desc))
    }

    /// Field name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Field type descriptor
    pub fn type_desc(&self) -> &TypeDesc {
        &self.type_desc
    }

    /// Build the default-initialized data field
    pub fn instantiate(&self) -> PvField {
        self.type_desc.instantiate(&self.name)
    }
}

/// Ordered set of named field descriptors making up a structure shape
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StructureDesc {
    fields: Vec<FieldDesc>,
}

impl StructureDesc {
    /// Create a structure descriptor from its field descriptors
    pub fn new(fields: Vec<FieldDesc>) -> Self {
        Self { fields }
    }

    /// The field descriptors, in declaration order
    pub fn fields(&self) -> &[FieldDesc] {
        &self.fields
    }

    /// Look up an immediate field descriptor by name
    pub fn field(&self, name: &str) -> Option<&FieldDesc> {
        self.fields.iter().find(|f| f.name() == name)
    }

    /// Build default-initialized data fields for every descriptor
    pub fn instantiate_fields(&self) -> Vec<PvField> {
        self.fields.iter().map(|f| f.instantiate()).collect()
    }
}

/// Named variants making up a union shape
///
/// An empty variant list describes a variant (any-type) union.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UnionDesc {
    variants: Vec<FieldDesc>,
}

impl UnionDesc {
    /// Create a union descriptor from its variant descriptors
    pub fn new(variants: Vec<FieldDesc>) -> Self {
        Self { variants }
    }

    /// Create a variant (any-type) union descriptor
    pub fn variant() -> Self {
        Self::default()
    }

    /// The variant descriptors, in declaration order
    pub fn variants(&self) -> &[FieldDesc] {
        &self.variants
    }

    /// Check if this is a variant (any-type) union
    pub fn is_variant(&self) -> bool {
        self.variants.is_empty()
    }

    /// Look up a variant descriptor by name
    pub fn variant_named(&self, name: &str) -> Option<(usize, &FieldDesc)> {
        self.variants
            .iter()
            .enumerate()
            .find(|(_, f)| f.name() == name)
    }
}
