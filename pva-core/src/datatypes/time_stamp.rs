//! Time stamp decoding for the conventional "timeStamp" substructure

use crate::datatypes::field::PvField;
use crate::datatypes::introspect::{FieldDesc, StructureDesc, TypeDesc};
use crate::datatypes::scalar::{ScalarType, ScalarValue};
use crate::error::{PvaError, PvaResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Time stamp read from a record's "timeStamp" substructure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimeStamp {
    /// Seconds since the POSIX epoch
    pub seconds_past_epoch: i64,
    /// Nanoseconds within the second
    pub nanoseconds: i32,
    /// User tag
    pub user_tag: i32,
}

impl TimeStamp {
    /// Create a time stamp
    pub fn new(seconds_past_epoch: i64, nanoseconds: i32, user_tag: i32) -> Self {
        Self {
            seconds_past_epoch,
            nanoseconds,
            user_tag,
        }
    }

    /// The conventional shape of a timeStamp substructure
    pub fn type_desc() -> TypeDesc {
        TypeDesc::Structure(StructureDesc::new(vec![
            FieldDesc::scalar("secondsPastEpoch", ScalarType::Int64),
            FieldDesc::scalar("nanoseconds", ScalarType::Int32),
            FieldDesc::scalar("userTag", ScalarType::Int32),
        ]))
    }

    /// Seconds including the fractional nanosecond part
    pub fn to_seconds(&self) -> f64 {
        self.seconds_past_epoch as f64 + self.nanoseconds as f64 * 1e-9
    }

    /// Decode the seconds/nanoseconds/tag triple from a timeStamp
    /// substructure
    ///
    /// This is a pure value copy; no binding to the field is kept.
    ///
    /// # Errors
    ///
    /// Returns `PvaError::NoTimeStampField` if the field does not carry the
    /// conventional members.
    pub fn from_structure(field: &PvField) -> PvaResult<TimeStamp> {
        let seconds = match field
            .sub_field("secondsPastEpoch")
            .and_then(|f| f.as_scalar())
        {
            Some(ScalarValue::Int64(v)) => *v,
            _ => {
                return Err(PvaError::NoTimeStampField(
                    "timeStamp structure has no long member 'secondsPastEpoch'".to_string(),
                ));
            }
        };
        let nanoseconds = read_i32(field, "nanoseconds")?;
        let user_tag = read_i32(field, "userTag")?;
        Ok(TimeStamp::new(seconds, nanoseconds, user_tag))
    }
}

fn read_i32(field: &PvField, name: &str) -> PvaResult<i32> {
    match field.sub_field(name).and_then(|f| f.as_scalar()) {
        Some(ScalarValue::Int32(v)) => Ok(*v),
        _ => Err(PvaError::NoTimeStampField(format!(
            "timeStamp structure has no int member '{}'",
            name
        ))),
    }
}

impl fmt::Display for TimeStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:09}", self.seconds_past_epoch, self.nanoseconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_seconds() {
        let ts = TimeStamp::new(10, 500_000_000, 0);
        assert_eq!(ts.to_seconds(), 10.5);
    }

    #[test]
    fn test_from_structure() {
        let mut field = TimeStamp::type_desc().instantiate("timeStamp");
        field
            .sub_field_mut("secondsPastEpoch")
            .unwrap()
            .as_scalar_mut()
            .unwrap()
            .assign_from_text("1700000000")
            .unwrap();
        field
            .sub_field_mut("nanoseconds")
            .unwrap()
            .as_scalar_mut()
            .unwrap()
            .assign_from_text("42")
            .unwrap();
        let ts = TimeStamp::from_structure(&field).unwrap();
        assert_eq!(ts.seconds_past_epoch, 1_700_000_000);
        assert_eq!(ts.nanoseconds, 42);
        assert_eq!(ts.user_tag, 0);
    }

    #[test]
    fn test_from_structure_wrong_shape() {
        let field = PvField::new(
            "timeStamp",
            crate::datatypes::field::PvValue::Scalar(ScalarValue::Int32(0)),
        );
        assert!(matches!(
            TimeStamp::from_structure(&field),
            Err(PvaError::NoTimeStampField(_))
        ));
    }
}
