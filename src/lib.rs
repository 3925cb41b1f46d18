//! # Kodegen Release Uploader
//!
//! Upload build artifacts to an existing GitHub release as one step of a
//! release pipeline.
//!
//! ## Features
//!
//! - **Replace**: delete existing assets that share a name with an artifact before uploading
//! - **Purge**: optionally delete every asset on the release first
//! - **Retry**: server errors are retried with exponential backoff (8s, 16s, 32s, 64s)
//! - **Error policy**: abort on the first failed artifact, or warn and keep going
//!
//! ## Usage
//!
//! ```bash
//! kodegen_release_uploader upload --repo cyrup-ai/kodegen --release-id 123 --artifacts 'dist/*'
//! kodegen_release_uploader list --repo cyrup-ai/kodegen --release-id 123
//! ```
//!
//! The orchestration in [`ArtifactUploader`] is generic over
//! [`ReleaseArtifactStore`], so it can run against any backend that can list,
//! delete and upload release assets.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod artifact;
pub mod cli;
pub mod config;
pub mod error;
pub mod github;
pub mod store;
pub mod uploader;

pub use artifact::{Artifact, ArtifactBody, ArtifactDiscovery, ArtifactSource};
pub use cli::Args;
pub use config::{ConnectionConfig, EnvConfig, UploadConfig};
pub use error::{Result, StoreError, UploadError};
pub use github::GitHubReleaseStore;
pub use store::{ReleaseArtifactStore, RemoteAsset};
pub use uploader::{ArtifactUploader, FailedArtifact, RetryPolicy, UploadPolicy, UploadReport};
