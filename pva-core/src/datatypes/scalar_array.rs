//! Scalar array values for PV structured data

use crate::datatypes::scalar::{ScalarType, ScalarValue};
use crate::error::{PvaError, PvaResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A homogeneous array of scalar elements
///
/// The element type is fixed at construction. Conversion helpers copy the
/// elements out; they never hand back a view into the array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScalarArrayValue {
    /// Boolean elements
    Boolean(Vec<bool>),
    /// Integer 8-bit elements
    Int8(Vec<i8>),
    /// Integer 16-bit elements
    Int16(Vec<i16>),
    /// Integer 32-bit elements
    Int32(Vec<i32>),
    /// Integer 64-bit elements
    Int64(Vec<i64>),
    /// Unsigned integer 8-bit elements
    UInt8(Vec<u8>),
    /// Unsigned integer 16-bit elements
    UInt16(Vec<u16>),
    /// Unsigned integer 32-bit elements
    UInt32(Vec<u32>),
    /// Unsigned integer 64-bit elements
    UInt64(Vec<u64>),
    /// Float 32-bit elements
    Float(Vec<f32>),
    /// Float 64-bit elements
    Double(Vec<f64>),
    /// UTF-8 string elements
    String(Vec<String>),
}

impl ScalarArrayValue {
    /// Construct an empty array for an element type
    pub fn default_for(element_type: ScalarType) -> Self {
        match element_type {
            ScalarType::Boolean => ScalarArrayValue::Boolean(Vec::new()),
            ScalarType::Int8 => ScalarArrayValue::Int8(Vec::new()),
            ScalarType::Int16 => ScalarArrayValue::Int16(Vec::new()),
            ScalarType::Int32 => ScalarArrayValue::Int32(Vec::new()),
            ScalarType::Int64 => ScalarArrayValue::Int64(Vec::new()),
            ScalarType::UInt8 => ScalarArrayValue::UInt8(Vec::new()),
            ScalarType::UInt16 => ScalarArrayValue::UInt16(Vec::new()),
            ScalarType::UInt32 => ScalarArrayValue::UInt32(Vec::new()),
            ScalarType::UInt64 => ScalarArrayValue::UInt64(Vec::new()),
            ScalarType::Float => ScalarArrayValue::Float(Vec::new()),
            ScalarType::Double => ScalarArrayValue::Double(Vec::new()),
            ScalarType::String => ScalarArrayValue::String(Vec::new()),
        }
    }

    /// Get the element type of this array
    pub fn element_type(&self) -> ScalarType {
        match self {
            ScalarArrayValue::Boolean(_) => ScalarType::Boolean,
            ScalarArrayValue::Int8(_) => ScalarType::Int8,
            ScalarArrayValue::Int16(_) => ScalarType::Int16,
            ScalarArrayValue::Int32(_) => ScalarType::Int32,
            ScalarArrayValue::Int64(_) => ScalarType::Int64,
            ScalarArrayValue::UInt8(_) => ScalarType::UInt8,
            ScalarArrayValue::UInt16(_) => ScalarType::UInt16,
            ScalarArrayValue::UInt32(_) => ScalarType::UInt32,
            ScalarArrayValue::UInt64(_) => ScalarType::UInt64,
            ScalarArrayValue::Float(_) => ScalarType::Float,
            ScalarArrayValue::Double(_) => ScalarType::Double,
            ScalarArrayValue::String(_) => ScalarType::String,
        }
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        match self {
            ScalarArrayValue::Boolean(v) => v.len(),
            ScalarArrayValue::Int8(v) => v.len(),
            ScalarArrayValue::Int16(v) => v.len(),
            ScalarArrayValue::Int32(v) => v.len(),
            ScalarArrayValue::Int64(v) => v.len(),
            ScalarArrayValue::UInt8(v) => v.len(),
            ScalarArrayValue::UInt16(v) => v.len(),
            ScalarArrayValue::UInt32(v) => v.len(),
            ScalarArrayValue::UInt64(v) => v.len(),
            ScalarArrayValue::Float(v) => v.len(),
            ScalarArrayValue::Double(v) => v.len(),
            ScalarArrayValue::String(v) => v.len(),
        }
    }

    /// Check if the array has no elements
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reset the length to zero, discarding all elements
    pub fn clear(&mut self) {
        match self {
            ScalarArrayValue::Boolean(v) => v.clear(),
            ScalarArrayValue::Int8(v) => v.clear(),
            ScalarArrayValue::Int16(v) => v.clear(),
            ScalarArrayValue::Int32(v) => v.clear(),
            ScalarArrayValue::Int64(v) => v.clear(),
            ScalarArrayValue::UInt8(v) => v.clear(),
            ScalarArrayValue::UInt16(v) => v.clear(),
            ScalarArrayValue::UInt32(v) => v.clear(),
            ScalarArrayValue::UInt64(v) => v.clear(),
            ScalarArrayValue::Float(v) => v.clear(),
            ScalarArrayValue::Double(v) => v.clear(),
            ScalarArrayValue::String(v) => v.clear(),
        }
    }

    /// Copy the elements out as `f64`
    ///
    /// # Errors
    ///
    /// Returns `PvaError::NotNumericArray` if the element type is not numeric.
    pub fn to_f64_vec(&self) -> PvaResult<Vec<f64>> {
        if !self.element_type().is_numeric() {
            return Err(PvaError::NotNumericArray(format!(
                "array of element type {} has no numeric conversion",
                self.element_type()
            )));
        }
        let values = match self {
            ScalarArrayValue::Int8(v) => v.iter().map(|x| *x as f64).collect(),
            ScalarArrayValue::Int16(v) => v.iter().map(|x| *x as f64).collect(),
            ScalarArrayValue::Int32(v) => v.iter().map(|x| *x as f64).collect(),
            ScalarArrayValue::Int64(v) => v.iter().map(|x| *x as f64).collect(),
            ScalarArrayValue::UInt8(v) => v.iter().map(|x| *x as f64).collect(),
            ScalarArrayValue::UInt16(v) => v.iter().map(|x| *x as f64).collect(),
            ScalarArrayValue::UInt32(v) => v.iter().map(|x| *x as f64).collect(),
            ScalarArrayValue::UInt64(v) => v.iter().map(|x| *x as f64).collect(),
            ScalarArrayValue::Float(v) => v.iter().map(|x| *x as f64).collect(),
            ScalarArrayValue::Double(v) => v.clone(),
            ScalarArrayValue::Boolean(_) | ScalarArrayValue::String(_) => unreachable!(),
        };
        Ok(values)
    }

    /// Copy the elements out as strings, via the generic to-string conversion
    pub fn to_string_vec(&self) -> Vec<String> {
        match self {
            ScalarArrayValue::Boolean(v) => v.iter().map(|x| x.to_string()).collect(),
            ScalarArrayValue::Int8(v) => v.iter().map(|x| x.to_string()).collect(),
            ScalarArrayValue::Int16(v) => v.iter().map(|x| x.to_string()).collect(),
            ScalarArrayValue::Int32(v) => v.iter().map(|x| x.to_string()).collect(),
            ScalarArrayValue::Int64(v) => v.iter().map(|x| x.to_string()).collect(),
            ScalarArrayValue::UInt8(v) => v.iter().map(|x| x.to_string()).collect(),
            ScalarArrayValue::UInt16(v) => v.iter().map(|x| x.to_string()).collect(),
            ScalarArrayValue::UInt32(v) => v.iter().map(|x| x.to_string()).collect(),
            ScalarArrayValue::UInt64(v) => v.iter().map(|x| x.to_string()).collect(),
            ScalarArrayValue::Float(v) => v.iter().map(|x| x.to_string()).collect(),
            ScalarArrayValue::Double(v) => v.iter().map(|x| x.to_string()).collect(),
            ScalarArrayValue::String(v) => v.clone(),
        }
    }

    /// Append one element parsed from a literal text token
    ///
    /// # Errors
    ///
    /// Returns `PvaError::ParseError` if the token does not parse as the
    /// element type.
    pub fn push_from_text(&mut self, token: &str) -> PvaResult<()> {
        let mut element = ScalarValue::default_for(self.element_type());
        element.assign_from_text(token)?;
        self.push(element)
    }

    /// Append one element of the matching scalar type
    ///
    /// # Errors
    ///
    /// Returns `PvaError::WrongFieldKind` if the element's type differs from
    /// the array's element type.
    pub fn push(&mut self, element: ScalarValue) -> PvaResult<()> {
        match (self, element) {
            (ScalarArrayValue::Boolean(v), ScalarValue::Boolean(x)) => v.push(x),
            (ScalarArrayValue::Int8(v), ScalarValue::Int8(x)) => v.push(x),
            (ScalarArrayValue::Int16(v), ScalarValue::Int16(x)) => v.push(x),
            (ScalarArrayValue::Int32(v), ScalarValue::Int32(x)) => v.push(x),
            (ScalarArrayValue::Int64(v), ScalarValue::Int64(x)) => v.push(x),
            (ScalarArrayValue::UInt8(v), ScalarValue::UInt8(x)) => v.push(x),
            (ScalarArrayValue::UInt16(v), ScalarValue::UInt16(x)) => v.push(x),
            (ScalarArrayValue::UInt32(v), ScalarValue::UInt32(x)) => v.push(x),
            (ScalarArrayValue::UInt64(v), ScalarValue::UInt64(x)) => v.push(x),
            (ScalarArrayValue::Float(v), ScalarValue::Float(x)) => v.push(x),
            (ScalarArrayValue::Double(v), ScalarValue::Double(x)) => v.push(x),
            (ScalarArrayValue::String(v), ScalarValue::String(x)) => v.push(x),
            (array, element) => {
                return Err(PvaError::WrongFieldKind(format!(
                    "cannot append {} element to {} array",
                    element.scalar_type(),
                    array.element_type()
                )));
            }
        }
        Ok(())
    }

    /// Replace the contents from a comma-separated literal text rendering
    ///
    /// Accepts `[1, 2, 3]` as well as `1,2,3`. An empty rendering produces
    /// an empty array.
    pub fn assign_from_text(&mut self, text: &str) -> PvaResult<()> {
        let text = text.trim();
        let inner = text
            .strip_prefix('[')
            .and_then(|s| s.strip_suffix(']'))
            .unwrap_or(text)
            .trim();
        self.clear();
        if inner.is_empty() {
            return Ok(());
        }
        for token in inner.split(',') {
            self.push_from_text(token)?;
        }
        Ok(())
    }
}

impl fmt::Display for ScalarArrayValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.to_string_vec().join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_f64_vec() {
        let array = ScalarArrayValue::Int16(vec![1, 2, 3]);
        assert_eq!(array.to_f64_vec().unwrap(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_to_f64_vec_non_numeric() {
        let array = ScalarArrayValue::String(vec!["a".to_string()]);
        assert!(matches!(
            array.to_f64_vec(),
            Err(PvaError::NotNumericArray(_))
        ));
    }

    #[test]
    fn test_assign_from_text() {
        let mut array = ScalarArrayValue::default_for(ScalarType::Double);
        array.assign_from_text("[1.5, 2.5]").unwrap();
        assert_eq!(array, ScalarArrayValue::Double(vec![1.5, 2.5]));
        array.assign_from_text("3").unwrap();
        assert_eq!(array, ScalarArrayValue::Double(vec![3.0]));
        array.assign_from_text("[]").unwrap();
        assert!(array.is_empty());
    }

    #[test]
    fn test_push_wrong_type() {
        let mut array = ScalarArrayValue::default_for(ScalarType::Int32);
        assert!(array.push(ScalarValue::Double(1.0)).is_err());
    }
}
