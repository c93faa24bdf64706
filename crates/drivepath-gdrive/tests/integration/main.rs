//! Integration tests for drivepath-gdrive
//!
//! Uses wiremock to stand in for the Drive v3 API and the OAuth token
//! endpoint, and drives the GoogleDriveStore through the remote store port.

mod common;

mod test_auth;
mod test_listing;
mod test_media;
mod test_mutations;
