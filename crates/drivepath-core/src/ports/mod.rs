//! Port definitions (hexagonal architecture interfaces)
//!
//! Ports are interfaces that the core depends on, but whose implementations
//! live in adapter crates.
//!
//! ## Ports Overview
//!
//! - [`IRemoteStore`] - Id-addressed remote object store (Google Drive, test fakes)

pub mod remote_store;

pub use remote_store::{
    ChildPage, CreateRequest, IRemoteStore, MediaStream, RemoteRecord, UpdatePatch,
};
