//! Alarm decoding for the conventional "alarm" substructure

use crate::datatypes::field::PvField;
use crate::datatypes::introspect::{FieldDesc, StructureDesc, TypeDesc};
use crate::datatypes::scalar::{ScalarType, ScalarValue};
use crate::error::{PvaError, PvaResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Alarm severity codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AlarmSeverity {
    /// No alarm
    #[default]
    None,
    /// Minor alarm
    Minor,
    /// Major alarm
    Major,
    /// Invalid data
    Invalid,
    /// Undefined severity
    Undefined,
}

impl AlarmSeverity {
    /// Decode from the integer code carried on the wire
    ///
    /// Codes outside the defined range decode to `Undefined`.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => AlarmSeverity::None,
            1 => AlarmSeverity::Minor,
            2 => AlarmSeverity::Major,
            3 => AlarmSeverity::Invalid,
            _ => AlarmSeverity::Undefined,
        }
    }

    /// The integer code carried on the wire
    pub fn code(&self) -> i32 {
        match self {
            AlarmSeverity::None => 0,
            AlarmSeverity::Minor => 1,
            AlarmSeverity::Major => 2,
            AlarmSeverity::Invalid => 3,
            AlarmSeverity::Undefined => 4,
        }
    }
}

impl fmt::Display for AlarmSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AlarmSeverity::None => "NONE",
            AlarmSeverity::Minor => "MINOR",
            AlarmSeverity::Major => "MAJOR",
            AlarmSeverity::Invalid => "INVALID",
            AlarmSeverity::Undefined => "UNDEFINED",
        };
        write!(f, "{}", name)
    }
}

/// Alarm status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AlarmStatus {
    /// No status
    #[default]
    None,
    /// Device status
    Device,
    /// Driver status
    Driver,
    /// Record status
    Record,
    /// Database status
    Db,
    /// Configuration status
    Conf,
    /// Undefined status
    Undefined,
    /// Client status
    Client,
}

impl AlarmStatus {
    /// Decode from the integer code carried on the wire
    ///
    /// Codes outside the defined range decode to `Undefined`.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => AlarmStatus::None,
            1 => AlarmStatus::Device,
            2 => AlarmStatus::Driver,
            3 => AlarmStatus::Record,
            4 => AlarmStatus::Db,
            5 => AlarmStatus::Conf,
            7 => AlarmStatus::Client,
            _ => AlarmStatus::Undefined,
        }
    }

    /// The integer code carried on the wire
    pub fn code(&self) -> i32 {
        match self {
            AlarmStatus::None => 0,
            AlarmStatus::Device => 1,
            AlarmStatus::Driver => 2,
            AlarmStatus::Record => 3,
            AlarmStatus::Db => 4,
            AlarmStatus::Conf => 5,
            AlarmStatus::Undefined => 6,
            AlarmStatus::Client => 7,
        }
    }
}

impl fmt::Display for AlarmStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AlarmStatus::None => "NONE",
            AlarmStatus::Device => "DEVICE",
            AlarmStatus::Driver => "DRIVER",
            AlarmStatus::Record => "RECORD",
            AlarmStatus::Db => "DB",
            AlarmStatus::Conf => "CONF",
            AlarmStatus::Undefined => "UNDEFINED",
            AlarmStatus::Client => "CLIENT",
        };
        write!(f, "{}", name)
    }
}

/// Alarm state read from a record's "alarm" substructure
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Alarm {
    /// Alarm severity
    pub severity: AlarmSeverity,
    /// Alarm status
    pub status: AlarmStatus,
    /// Free-form alarm message
    pub message: String,
}

impl Alarm {
    /// The conventional shape of an alarm substructure
    pub fn type_desc() -> TypeDesc {
        TypeDesc::Structure(StructureDesc::new(vec![
            FieldDesc::scalar("severity", ScalarType::Int32),
            FieldDesc::scalar("status", ScalarType::Int32),
            FieldDesc::scalar("message", ScalarType::String),
        ]))
    }

    /// Decode the severity/status/message triple from an alarm substructure
    ///
    /// This is a pure value copy; no binding to the field is kept.
    ///
    /// # Errors
    ///
    /// Returns `PvaError::NoAlarmField` if the field does not carry the
    /// conventional members.
    pub fn from_structure(field: &PvField) -> PvaResult<Alarm> {
        let severity = read_i32(field, "severity")?;
        let status = read_i32(field, "status")?;
        let message = match field.sub_field("message").and_then(|f| f.as_scalar()) {
            Some(ScalarValue::String(s)) => s.clone(),
            _ => {
                return Err(PvaError::NoAlarmField(
                    "alarm structure has no string member 'message'".to_string(),
                ));
            }
        };
        Ok(Alarm {
            severity: AlarmSeverity::from_code(severity),
            status: AlarmStatus::from_code(status),
            message,
        })
    }
}

fn read_i32(field: &PvField, name: &str) -> PvaResult<i32> {
    match field.sub_field(name).and_then(|f| f.as_scalar()) {
        Some(ScalarValue::Int32(v)) => Ok(*v),
        _ => Err(PvaError::NoAlarmField(format!(
            "alarm structure has no int member '{}'",
            name
        ))),
    }
}

impl fmt::Display for Alarm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.severity, self.status, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_codes() {
        assert_eq!(AlarmSeverity::from_code(2), AlarmSeverity::Major);
        assert_eq!(AlarmSeverity::from_code(99), AlarmSeverity::Undefined);
        assert_eq!(AlarmSeverity::Minor.code(), 1);
    }

    #[test]
    fn test_from_structure() {
        let mut field = Alarm::type_desc().instantiate("alarm");
        field
            .sub_field_mut("severity")
            .unwrap()
            .as_scalar_mut()
            .unwrap()
            .assign_from_text("1")
            .unwrap();
        field
            .sub_field_mut("message")
            .unwrap()
            .as_scalar_mut()
            .unwrap()
            .assign_from_text("low limit")
            .unwrap();
        let alarm = Alarm::from_structure(&field).unwrap();
        assert_eq!(alarm.severity, AlarmSeverity::Minor);
        assert_eq!(alarm.status, AlarmStatus::None);
        assert_eq!(alarm.message, "low limit");
    }

    #[test]
    fn test_from_structure_wrong_shape() {
        let field = PvField::new(
            "alarm",
            crate::datatypes::field::PvValue::Scalar(ScalarValue::Int32(0)),
        );
        assert!(matches!(
            Alarm::from_structure(&field),
            Err(PvaError::NoAlarmField(_))
        ));
    }
}
