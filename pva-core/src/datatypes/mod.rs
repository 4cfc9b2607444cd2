//! Data types for PV structured records

pub mod alarm;
pub mod change_set;
pub mod enumerated;
pub mod field;
pub mod introspect;
pub mod record;
pub mod scalar;
pub mod scalar_array;
pub mod time_stamp;

// Re-export types
pub use alarm::{Alarm, AlarmSeverity, AlarmStatus};
pub use change_set::ChangeSet;
pub use enumerated::Enumerated;
pub use field::{FieldKind, PvField, PvUnion, PvValue, StructureArrayValue, UnionArrayValue};
pub use introspect::{FieldDesc, StructureDesc, TypeDesc, UnionDesc};
pub use record::PvStructure;
pub use scalar::{ScalarType, ScalarValue};
pub use scalar_array::ScalarArrayValue;
pub use time_stamp::TimeStamp;
