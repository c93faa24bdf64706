//! drivepath core - path-indexed cache over an id-addressed remote store
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain entities** - `Record`, `PathIndex`, `RemoteId`, `RemotePath`
//! - **Use cases** - `DriveFilesystem` and its lazy tree resolution
//! - **Port definitions** - `IRemoteStore`, implemented by adapter crates
//! - **Configuration** - YAML config with defaults and validation
//!
//! # Architecture
//!
//! The domain module contains pure data and cache logic and never performs
//! I/O. Ports define trait interfaces that adapter crates implement.
//! Use cases orchestrate domain entities through port interfaces.

pub mod config;
pub mod domain;
pub mod ports;
pub mod usecases;
