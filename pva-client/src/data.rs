//! Typed data access for one channel's structured records
//!
//! `ClientData` is constructed once per record shape and fed fresh record
//! instances plus their change bitmaps after every network exchange. It
//! locates the conventional "value" field, narrows it to the kind a caller
//! asks for, decodes the well-known "alarm" and "timeStamp" substructures,
//! and reports which fields the last exchange changed.
//!
//! # Value resolution
//!
//! Callers that requested a single deeply-nested field get records without
//! a top-level scalar "value". For those, the scalar and array extractors
//! descend the record as long as every structure on the way has exactly one
//! child; a branch point means the selection was ambiguous and the descent
//! fails rather than guessing.

use pva_core::datatypes::{
    Alarm, ChangeSet, FieldKind, PvField, PvStructure, PvValue, ScalarArrayValue, ScalarValue,
    StructureDesc, TimeStamp,
};
use pva_core::{PvaError, PvaResult};

/// Data wrapper for one channel: the current record, its change bitmap,
/// and typed accessors over both
pub struct ClientData {
    structure: StructureDesc,
    pv_structure: Option<PvStructure>,
    change_set: Option<ChangeSet>,
    value_kind: Option<FieldKind>,
    message_prefix: String,
}

impl ClientData {
    /// Create a wrapper for a record shape
    ///
    /// No record is installed yet; accessors fail with `NotInitialized`
    /// until [`set_data`](Self::set_data) is called.
    pub fn new(structure: StructureDesc) -> Self {
        Self {
            structure,
            pv_structure: None,
            change_set: None,
            value_kind: None,
            message_prefix: String::new(),
        }
    }

    /// Set the prefix prepended to every error message this wrapper raises
    ///
    /// A caller juggling several channels sets a distinct prefix per
    /// wrapper so errors name the record they came from.
    pub fn set_message_prefix(&mut self, prefix: &str) {
        self.message_prefix = format!("{} ", prefix);
    }

    /// The record shape this wrapper was created for
    pub fn structure(&self) -> &StructureDesc {
        &self.structure
    }

    /// Install the record and change bitmap of the latest exchange
    ///
    /// Replaces whatever was installed before and recomputes the cached
    /// "value" lookup by direct top-level name search. Safe to call once
    /// per exchange for the lifetime of the wrapper.
    pub fn set_data(&mut self, pv_structure: PvStructure, change_set: ChangeSet) {
        log::debug!("ClientData::set_data");
        self.value_kind = pv_structure
            .fields()
            .iter()
            .find(|f| f.name() == "value")
            .map(|f| f.kind());
        self.pv_structure = Some(pv_structure);
        self.change_set = Some(change_set);
    }

    /// The installed record
    ///
    /// # Errors
    ///
    /// Returns `PvaError::NotInitialized` if no record was installed.
    pub fn pv_structure(&self) -> PvaResult<&PvStructure> {
        self.pv_structure
            .as_ref()
            .ok_or_else(|| PvaError::NotInitialized(self.msg("no pvStructure")))
    }

    /// The installed change bitmap
    ///
    /// # Errors
    ///
    /// Returns `PvaError::NotInitialized` if no bitmap was installed.
    pub fn change_set(&self) -> PvaResult<&ChangeSet> {
        self.change_set
            .as_ref()
            .ok_or_else(|| PvaError::NotInitialized(self.msg("no change set")))
    }

    /// Check if the record has a top-level field named "value"
    pub fn has_value(&self) -> bool {
        log::debug!("ClientData::has_value");
        self.value_kind.is_some()
    }

    /// Check if the value field is a scalar
    pub fn is_value_scalar(&self) -> bool {
        log::debug!("ClientData::is_value_scalar");
        self.value_kind == Some(FieldKind::Scalar)
    }

    /// Check if the value field is a scalar array
    pub fn is_value_scalar_array(&self) -> bool {
        log::debug!("ClientData::is_value_scalar_array");
        self.value_kind == Some(FieldKind::ScalarArray)
    }

    /// The value field, of whatever kind
    ///
    /// # Errors
    ///
    /// Returns `PvaError::NoValueField` if the record has no top-level
    /// field named "value".
    pub fn value(&self) -> PvaResult<&PvField> {
        log::debug!("ClientData::value");
        self.pv_structure()?
            .sub_field("value")
            .ok_or_else(|| PvaError::NoValueField(self.msg("no value field")))
    }

    /// The value field narrowed to a scalar
    ///
    /// # Errors
    ///
    /// Returns `PvaError::NoValueField` if absent,
    /// `PvaError::WrongFieldKind` if the value field is not a scalar.
    pub fn scalar_value(&self) -> PvaResult<&ScalarValue> {
        log::debug!("ClientData::scalar_value");
        let field = self.value()?;
        field
            .as_scalar()
            .ok_or_else(|| PvaError::WrongFieldKind(self.msg("value is not a scalar")))
    }

    /// The value field narrowed to any array kind
    ///
    /// Accepts scalar arrays, structure arrays, and union arrays.
    ///
    /// # Errors
    ///
    /// Returns `PvaError::NoValueField` if absent,
    /// `PvaError::WrongFieldKind` for non-array kinds.
    pub fn array_value(&self) -> PvaResult<&PvField> {
        log::debug!("ClientData::array_value");
        let field = self.value()?;
        match field.kind() {
            FieldKind::ScalarArray | FieldKind::StructureArray | FieldKind::UnionArray => Ok(field),
            _ => Err(PvaError::WrongFieldKind(self.msg("value is not an array"))),
        }
    }

    /// The value field narrowed to a scalar array
    ///
    /// # Errors
    ///
    /// Returns `PvaError::NoValueField` if absent,
    /// `PvaError::WrongFieldKind` for any other kind, including the other
    /// array kinds.
    pub fn scalar_array_value(&self) -> PvaResult<&ScalarArrayValue> {
        log::debug!("ClientData::scalar_array_value");
        let field = self.value()?;
        field
            .as_scalar_array()
            .ok_or_else(|| PvaError::WrongFieldKind(self.msg("value is not a scalarArray")))
    }

    /// The record's single scalar, as `f64`
    ///
    /// Uses the top-level "value" field when it is a scalar; otherwise
    /// descends through single-child structures to the one selected field.
    /// A `double` is returned exactly; other numeric types go through the
    /// generic numeric conversion.
    ///
    /// # Errors
    ///
    /// `PvaError::AmbiguousField` when a structure on the descent has more
    /// than one child, `PvaError::NoScalarField` when the descent ends on a
    /// non-scalar, `PvaError::NotNumeric` when the scalar has no numeric
    /// conversion.
    pub fn double_value(&self) -> PvaResult<f64> {
        log::debug!("ClientData::double_value");
        let scalar = self.find_single_scalar()?;
        if !scalar.is_numeric() {
            return Err(PvaError::NotNumeric(
                self.msg("did not find a numeric scalar field"),
            ));
        }
        scalar
            .to_f64()
            .map_err(|e| self.prefix_error(e))
    }

    /// The record's single scalar, rendered as text
    ///
    /// Same field resolution as [`double_value`](Self::double_value); the
    /// generic to-string conversion applies to every scalar type.
    pub fn string_value(&self) -> PvaResult<String> {
        log::debug!("ClientData::string_value");
        Ok(self.find_single_scalar()?.to_text())
    }

    /// The record's single scalar array, copied out as `f64` values
    ///
    /// The returned vector is a snapshot; later record updates do not
    /// change it.
    ///
    /// # Errors
    ///
    /// `PvaError::AmbiguousField` / `PvaError::NoScalarField` as for the
    /// scalar descent, `PvaError::NotNumericArray` when the element type
    /// has no numeric conversion.
    pub fn double_array(&self) -> PvaResult<Vec<f64>> {
        log::debug!("ClientData::double_array");
        let array = self.find_single_scalar_array()?;
        if !array.element_type().is_numeric() {
            return Err(PvaError::NotNumericArray(
                self.msg("did not find a numeric scalarArray field"),
            ));
        }
        array.to_f64_vec().map_err(|e| self.prefix_error(e))
    }

    /// The record's single scalar array, copied out as strings
    pub fn string_array(&self) -> PvaResult<Vec<String>> {
        log::debug!("ClientData::string_array");
        Ok(self.find_single_scalar_array()?.to_string_vec())
    }

    /// Decode the record's "alarm" substructure
    ///
    /// # Errors
    ///
    /// Returns `PvaError::NoAlarmField` if the record has no top-level
    /// "alarm" structure or it lacks the conventional members.
    pub fn alarm(&self) -> PvaResult<Alarm> {
        log::debug!("ClientData::alarm");
        let field = self
            .pv_structure()?
            .sub_field("alarm")
            .ok_or_else(|| PvaError::NoAlarmField(self.msg("no alarm")))?;
        Alarm::from_structure(field).map_err(|e| self.prefix_error(e))
    }

    /// Decode the record's "timeStamp" substructure
    ///
    /// # Errors
    ///
    /// Returns `PvaError::NoTimeStampField` if the record has no top-level
    /// "timeStamp" structure or it lacks the conventional members.
    pub fn time_stamp(&self) -> PvaResult<TimeStamp> {
        log::debug!("ClientData::time_stamp");
        let field = self
            .pv_structure()?
            .sub_field("timeStamp")
            .ok_or_else(|| PvaError::NoTimeStampField(self.msg("no timeStamp")))?;
        TimeStamp::from_structure(field).map_err(|e| self.prefix_error(e))
    }

    /// Append one line per changed field to `out`, in ascending offset
    /// order
    ///
    /// Each line reads `<dotted full name> = <textual rendering>`. A set
    /// bit 0 stands for the whole record and renders the record itself.
    ///
    /// # Errors
    ///
    /// Returns `PvaError::NotInitialized` if no record or bitmap was
    /// installed.
    pub fn show_changed(&self, out: &mut String) -> PvaResult<()> {
        let pv = self.pv_structure()?;
        let bits = self.change_set()?;
        let mut next = bits.next_set_bit(0);
        while let Some(offset) = next {
            if offset == 0 {
                out.push_str(&format!("{}\n", pv));
            } else if let Some((name, field)) = pv.find_by_offset(offset) {
                out.push_str(&format!("{} = {}\n", name, field));
            }
            next = bits.next_set_bit(offset + 1);
        }
        Ok(())
    }

    /// Resolve the record's single scalar field, via "value" or the
    /// single-child descent
    fn find_single_scalar(&self) -> PvaResult<&ScalarValue> {
        let pv = self.pv_structure()?;
        if let Some(scalar) = pv.sub_field("value").and_then(|f| f.as_scalar()) {
            return Ok(scalar);
        }
        let mut fields = pv.fields();
        loop {
            if fields.len() != 1 {
                return Err(PvaError::AmbiguousField(
                    self.msg("request selected multiple fields"),
                ));
            }
            match fields[0].value() {
                PvValue::Scalar(scalar) => return Ok(scalar),
                PvValue::Structure(children) => fields = children,
                _ => {
                    return Err(PvaError::NoScalarField(
                        self.msg("did not find a scalar field"),
                    ));
                }
            }
        }
    }

    /// Resolve the record's single scalar-array field, via "value" or the
    /// single-child descent
    fn find_single_scalar_array(&self) -> PvaResult<&ScalarArrayValue> {
        let pv = self.pv_structure()?;
        if let Some(array) = pv.sub_field("value").and_then(|f| f.as_scalar_array()) {
            return Ok(array);
        }
        let mut fields = pv.fields();
        loop {
            if fields.len() != 1 {
                return Err(PvaError::AmbiguousField(
                    self.msg("request selected multiple fields"),
                ));
            }
            match fields[0].value() {
                PvValue::ScalarArray(array) => return Ok(array),
                PvValue::Structure(children) => fields = children,
                _ => {
                    return Err(PvaError::NoScalarField(
                        self.msg("did not find a scalarArray field"),
                    ));
                }
            }
        }
    }

    pub(crate) fn msg(&self, text: &str) -> String {
        format!("{}{}", self.message_prefix, text)
    }

    pub(crate) fn prefix_error(&self, error: PvaError) -> PvaError {
        let prefix = self.message_prefix.clone();
        error.map_message(move |m| format!("{}{}", prefix, m))
    }

    pub(crate) fn message_prefix(&self) -> &str {
        &self.message_prefix
    }

    pub(crate) fn parts_mut(&mut self) -> PvaResult<(&mut PvStructure, &mut ChangeSet)> {
        match (&mut self.pv_structure, &mut self.change_set) {
            (Some(pv), Some(bits)) => Ok((pv, bits)),
            _ => Err(PvaError::NotInitialized(format!(
                "{}no pvStructure",
                self.message_prefix
            ))),
        }
    }
}
