//! pva_rs - Rust data-access layer for a pvAccess client
//!
//! This library wraps the structured records a process-variable (PV)
//! network client receives into typed accessors and text-based updates.
//!
//! # Architecture
//!
//! This library is organized as a workspace with multiple crates:
//!
//! - `pva-core`: Data model (fields, records, change sets), error
//!   handling, and text parsing
//! - `pva-client`: Client-side data access (`ClientData`)
//!
//! # Usage
//!
//! ```no_run
//! use pva::datatypes::{FieldDesc, ScalarType, StructureDesc};
//! use pva::client::ClientData;
//!
//! let desc = StructureDesc::new(vec![FieldDesc::scalar("value", ScalarType::Double)]);
//! let data = ClientData::new(desc);
//! ```

// Re-export core types
pub use pva_core::{PvaError, PvaResult};

pub mod datatypes {
    pub use pva_core::datatypes::*;
}

pub mod text {
    pub use pva_core::text::*;
}

// Re-export client API
pub mod client {
    pub use pva_client::*;
}
