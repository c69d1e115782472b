//! Google Drive media client
//!
//! Keeps a process-wide OAuth access token fresh (refreshing it from a stored
//! refresh credential) and downloads image and audio files from Drive without
//! exposing the provider URL or credential to callers.

pub mod client;
pub mod error;
pub mod token;
pub mod types;

#[cfg(test)]
mod test_support;

pub use client::{validate_file_id, DriveClient};
pub use error::{DriveError, Result};
pub use token::{CredentialKey, CredentialStore, MemoryCredentialStore, TokenRefresher};
pub use types::{AccessToken, ByteRange, FileMetadata, MediaFile, MediaStream};
