//! Release artifact store abstraction.
//!
//! The uploader only needs three operations from the remote service: list the
//! assets attached to a release, delete one by id, and upload a new one. The
//! GitHub implementation lives in [`crate::github`]; tests use an in-memory
//! store.

use crate::artifact::ArtifactBody;
use crate::error::StoreError;
use serde::{Deserialize, Serialize};
use std::future::Future;

/// An asset already attached to a release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteAsset {
    /// Identifier assigned by the remote service
    pub id: u64,
    /// Asset file name
    pub name: String,
}

/// Operations the uploader needs from a release hosting service
pub trait ReleaseArtifactStore {
    /// List every asset currently attached to the release
    fn list_artifacts_for_release(
        &self,
        release_id: u64,
    ) -> impl Future<Output = Result<Vec<RemoteAsset>, StoreError>>;

    /// Delete one asset by id
    fn delete_artifact(&self, asset_id: u64) -> impl Future<Output = Result<(), StoreError>>;

    /// Upload `body` as a new asset called `name`
    fn upload_artifact(
        &self,
        upload_url: &str,
        content_length: u64,
        content_type: &str,
        body: ArtifactBody,
        name: &str,
        release_id: u64,
    ) -> impl Future<Output = Result<(), StoreError>>;
}
