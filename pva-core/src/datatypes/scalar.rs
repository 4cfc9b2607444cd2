//! Scalar types for PV structured data

use crate::error::{PvaError, PvaResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Primitive type of a scalar field or of a scalar array's elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarType {
    /// Boolean
    Boolean,
    /// Integer 8-bit
    Int8,
    /// Integer 16-bit
    Int16,
    /// Integer 32-bit
    Int32,
    /// Integer 64-bit
    Int64,
    /// Unsigned integer 8-bit
    UInt8,
    /// Unsigned integer 16-bit
    UInt16,
    /// Unsigned integer 32-bit
    UInt32,
    /// Unsigned integer 64-bit
    UInt64,
    /// Float 32-bit
    Float,
    /// Float 64-bit
    Double,
    /// UTF-8 string
    String,
}

impl ScalarType {
    /// Check if this type is a numeric type
    pub fn is_numeric(&self) -> bool {
        !matches!(self, ScalarType::Boolean | ScalarType::String)
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScalarType::Boolean => "boolean",
            ScalarType::Int8 => "byte",
            ScalarType::Int16 => "short",
            ScalarType::Int32 => "int",
            ScalarType::Int64 => "long",
            ScalarType::UInt8 => "ubyte",
            ScalarType::UInt16 => "ushort",
            ScalarType::UInt32 => "uint",
            ScalarType::UInt64 => "ulong",
            ScalarType::Float => "float",
            ScalarType::Double => "double",
            ScalarType::String => "string",
        };
        write!(f, "{}", name)
    }
}

/// A single scalar value held by a PV field
///
/// Stores one primitive value together with its wire type. Conversion
/// helpers follow the generic convert rules of the PV data model: any
/// numeric type widens to `f64` (64-bit integers beyond 2^53 lose
/// precision), and any type renders to text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScalarValue {
    /// Boolean value
    Boolean(bool),
    /// Integer 8-bit
    Int8(i8),
    /// Integer 16-bit
    Int16(i16),
    /// Integer 32-bit
    Int32(i32),
    /// Integer 64-bit
    Int64(i64),
    /// Unsigned integer 8-bit
    UInt8(u8),
    /// Unsigned integer 16-bit
    UInt16(u16),
    /// Unsigned integer 32-bit
    UInt32(u32),
    /// Unsigned integer 64-bit
    UInt64(u64),
    /// Float 32-bit
    Float(f32),
    /// Float 64-bit
    Double(f64),
    /// UTF-8 string
    String(String),
}

impl ScalarValue {
    /// Get the scalar type of this value
    pub fn scalar_type(&self) -> ScalarType {
        match self {
            ScalarValue::Boolean(_) => ScalarType::Boolean,
            ScalarValue::Int8(_) => ScalarType::Int8,
            ScalarValue::Int16(_) => ScalarType::Int16,
            ScalarValue::Int32(_) => ScalarType::Int32,
            ScalarValue::Int64(_) => ScalarType::Int64,
            ScalarValue::UInt8(_) => ScalarType::UInt8,
            ScalarValue::UInt16(_) => ScalarType::UInt16,
            ScalarValue::UInt32(_) => ScalarType::UInt32,
            ScalarValue::UInt64(_) => ScalarType::UInt64,
            ScalarValue::Float(_) => ScalarType::Float,
            ScalarValue::Double(_) => ScalarType::Double,
            ScalarValue::String(_) => ScalarType::String,
        }
    }

    /// Construct the default (zero/empty) value for a scalar type
    pub fn default_for(scalar_type: ScalarType) -> Self {
        match scalar_type {
            ScalarType::Boolean => ScalarValue::Boolean(false),
            ScalarType::Int8 => ScalarValue::Int8(0),
            ScalarType::Int16 => ScalarValue::Int16(0),
            ScalarType::Int32 => ScalarValue::Int32(0),
            ScalarType::Int64 => ScalarValue::Int64(0),
            ScalarType::UInt8 => ScalarValue::UInt8(0),
            ScalarType::UInt16 => ScalarValue::UInt16(0),
            ScalarType::UInt32 => ScalarValue::UInt32(0),
            ScalarType::UInt64 => ScalarValue::UInt64(0),
            ScalarType::Float => ScalarValue::Float(0.0),
            ScalarType::Double => ScalarValue::Double(0.0),
            ScalarType::String => ScalarValue::String(String::new()),
        }
    }

    /// Check if this value is of a numeric type
    pub fn is_numeric(&self) -> bool {
        self.scalar_type().is_numeric()
    }

    /// Generic numeric conversion to `f64`
    ///
    /// # Errors
    ///
    /// Returns `PvaError::NotNumeric` for `Boolean` and `String` values.
    pub fn to_f64(&self) -> PvaResult<f64> {
        match self {
            ScalarValue::Int8(v) => Ok(*v as f64),
            ScalarValue::Int16(v) => Ok(*v as f64),
            ScalarValue::Int32(v) => Ok(*v as f64),
            ScalarValue::Int64(v) => Ok(*v as f64),
            ScalarValue::UInt8(v) => Ok(*v as f64),
            ScalarValue::UInt16(v) => Ok(*v as f64),
            ScalarValue::UInt32(v) => Ok(*v as f64),
            ScalarValue::UInt64(v) => Ok(*v as f64),
            ScalarValue::Float(v) => Ok(*v as f64),
            ScalarValue::Double(v) => Ok(*v),
            ScalarValue::Boolean(_) | ScalarValue::String(_) => Err(PvaError::NotNumeric(
                format!("scalar of type {} has no numeric conversion", self.scalar_type()),
            )),
        }
    }

    /// Generic to-string conversion
    pub fn to_text(&self) -> String {
        self.to_string()
    }

    /// Assign this value from a literal text token, keeping its type
    ///
    /// Strings may be given bare or surrounded by double quotes.
    ///
    /// # Errors
    ///
    /// Returns `PvaError::ParseError` if the token does not parse as the
    /// value's scalar type.
    pub fn assign_from_text(&mut self, token: &str) -> PvaResult<()> {
        let token = token.trim();
        fn bad(token: &str, scalar_type: ScalarType) -> PvaError {
            PvaError::ParseError(format!("'{}' is not a valid {}", token, scalar_type))
        }
        match self {
            ScalarValue::Boolean(v) => {
                *v = token
                    .parse()
                    .map_err(|_| bad(token, ScalarType::Boolean))?;
            }
            ScalarValue::Int8(v) => {
                *v = token.parse().map_err(|_| bad(token, ScalarType::Int8))?;
            }
            ScalarValue::Int16(v) => {
                *v = token.parse().map_err(|_| bad(token, ScalarType::Int16))?;
            }
            ScalarValue::Int32(v) => {
                *v = token.parse().map_err(|_| bad(token, ScalarType::Int32))?;
            }
            ScalarValue::Int64(v) => {
                *v = token.parse().map_err(|_| bad(token, ScalarType::Int64))?;
            }
            ScalarValue::UInt8(v) => {
                *v = token.parse().map_err(|_| bad(token, ScalarType::UInt8))?;
            }
            ScalarValue::UInt16(v) => {
                *v = token.parse().map_err(|_| bad(token, ScalarType::UInt16))?;
            }
            ScalarValue::UInt32(v) => {
                *v = token.parse().map_err(|_| bad(token, ScalarType::UInt32))?;
            }
            ScalarValue::UInt64(v) => {
                *v = token.parse().map_err(|_| bad(token, ScalarType::UInt64))?;
            }
            ScalarValue::Float(v) => {
                *v = token.parse().map_err(|_| bad(token, ScalarType::Float))?;
            }
            ScalarValue::Double(v) => {
                *v = token.parse().map_err(|_| bad(token, ScalarType::Double))?;
            }
            ScalarValue::String(v) => {
                let stripped = token
                    .strip_prefix('"')
                    .and_then(|s| s.strip_suffix('"'))
                    .unwrap_or(token);
                *v = stripped.to_string();
            }
        }
        Ok(())
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Boolean(v) => write!(f, "{}", v),
            ScalarValue::Int8(v) => write!(f, "{}", v),
            ScalarValue::Int16(v) => write!(f, "{}", v),
            ScalarValue::Int32(v) => write!(f, "{}", v),
            ScalarValue::Int64(v) => write!(f, "{}", v),
            ScalarValue::UInt8(v) => write!(f, "{}", v),
            ScalarValue::UInt16(v) => write!(f, "{}", v),
            ScalarValue::UInt32(v) => write!(f, "{}", v),
            ScalarValue::UInt64(v) => write!(f, "{}", v),
            ScalarValue::Float(v) => write!(f, "{}", v),
            ScalarValue::Double(v) => write!(f, "{}", v),
            ScalarValue::String(v) => write!(f, "{}", v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_numeric() {
        assert!(ScalarType::Int32.is_numeric());
        assert!(ScalarType::Double.is_numeric());
        assert!(!ScalarType::Boolean.is_numeric());
        assert!(!ScalarType::String.is_numeric());
    }

    #[test]
    fn test_to_f64_widening() {
        assert_eq!(ScalarValue::Int32(42).to_f64().unwrap(), 42.0);
        assert_eq!(ScalarValue::UInt8(255).to_f64().unwrap(), 255.0);
        assert_eq!(ScalarValue::Double(1.5).to_f64().unwrap(), 1.5);
        assert!(ScalarValue::String("abc".to_string()).to_f64().is_err());
    }

    #[test]
    fn test_assign_from_text() {
        let mut value = ScalarValue::Int32(0);
        value.assign_from_text("17").unwrap();
        assert_eq!(value, ScalarValue::Int32(17));
        assert!(value.assign_from_text("seventeen").is_err());

        let mut value = ScalarValue::String(String::new());
        value.assign_from_text("\"quoted\"").unwrap();
        assert_eq!(value, ScalarValue::String("quoted".to_string()));
        value.assign_from_text("bare").unwrap();
        assert_eq!(value, ScalarValue::String("bare".to_string()));
    }

    #[test]
    fn test_to_text() {
        assert_eq!(ScalarValue::Double(2.5).to_text(), "2.5");
        assert_eq!(ScalarValue::Boolean(true).to_text(), "true");
    }
}
