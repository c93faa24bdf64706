//! Use cases (interactors) for drivepath
//!
//! Use cases orchestrate domain entities and port interfaces.
//!
//! ## Use Cases
//!
//! - [`DriveFilesystem`] - Path-based `ls`, `ls_all`, `mkdir`, `upload`,
//!   `download`, `mv` and `rm` over the remote store, with lazy path
//!   resolution (`list_children`, `locate`)

pub mod drive_filesystem;
pub mod resolver;

#[cfg(test)]
pub(crate) mod fake_store;

pub use drive_filesystem::{DriveFilesystem, FilesystemOptions};
