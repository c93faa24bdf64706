//! Domain entities and business logic
//!
//! This module contains the core domain types for drivepath:
//! - Newtypes for remote ids and validated remote paths
//! - The [`Record`] value object describing one remote object
//! - The [`PathIndex`] cache mapping ids and paths to Records
//! - Domain-specific error types

pub mod errors;
pub mod newtypes;
pub mod path_index;
pub mod record;

// Re-export commonly used types
pub use errors::{DomainError, FsError};
pub use newtypes::*;
pub use path_index::PathIndex;
pub use record::{Record, RecordKind};
