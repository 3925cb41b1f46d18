//! Upload orchestration for one release.
//!
//! [`ArtifactUploader`] runs a batch in three strictly ordered steps:
//!
//! 1. delete remote assets whose names collide with the batch (when replacing),
//! 2. delete every remote asset (when removing),
//! 3. upload each artifact in turn, retrying server errors with backoff.
//!
//! Cleanup failures are not guarded and abort the batch. Upload failures go
//! through the retry budget and then the throw/absorb policy.

mod retry;

pub use retry::{Backoff, DEFAULT_INITIAL_DELAY, DEFAULT_MAX_RETRIES, RetryPolicy};

use crate::artifact::Artifact;
use crate::error::{Result, StoreError, UploadError};
use crate::store::{ReleaseArtifactStore, RemoteAsset};
use std::collections::HashMap;

/// Replace/remove/error policy, fixed at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadPolicy {
    /// Delete remote assets named like an artifact in the batch before uploading
    pub replaces_existing_artifacts: bool,
    /// Delete every remote asset before uploading
    pub remove_artifacts: bool,
    /// Abort the batch on the first artifact that fails permanently
    pub throws_upload_errors: bool,
    /// Per-artifact retry budget
    pub retry: RetryPolicy,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            replaces_existing_artifacts: true,
            remove_artifacts: false,
            throws_upload_errors: false,
            retry: RetryPolicy::default(),
        }
    }
}

/// An artifact that failed permanently under the best-effort policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedArtifact {
    /// Artifact name
    pub name: String,
    /// Last error returned by the store
    pub error: StoreError,
}

/// Outcome of one batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadReport {
    /// Artifacts uploaded, in order
    pub uploaded: Vec<String>,
    /// Artifacts that failed and were skipped
    pub failed: Vec<FailedArtifact>,
    /// Remote assets deleted by cleanup, in deletion order
    pub deleted: Vec<String>,
    /// Leftovers of failed attempts deleted before a retry
    pub retry_cleaned: Vec<String>,
}

impl UploadReport {
    /// True when every artifact made it
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Uploads a batch of artifacts to one release
#[derive(Debug)]
pub struct ArtifactUploader<S> {
    store: S,
    policy: UploadPolicy,
}

impl<S: ReleaseArtifactStore> ArtifactUploader<S> {
    /// Create an uploader over `store`
    pub fn new(store: S, policy: UploadPolicy) -> Self {
        Self { store, policy }
    }

    /// The underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Upload `artifacts` to the release, in order.
    ///
    /// Returns `Err` when cleanup fails, or when an artifact fails and
    /// `throws_upload_errors` is set; no further artifacts are attempted in
    /// either case.
    pub async fn upload_artifacts(
        &self,
        artifacts: &[Artifact],
        release_id: u64,
        upload_url: &str,
    ) -> Result<UploadReport> {
        let mut report = UploadReport::default();

        if self.policy.replaces_existing_artifacts {
            self.delete_updated_artifacts(artifacts, release_id, &mut report.deleted)
                .await?;
        }
        if self.policy.remove_artifacts {
            self.delete_all_artifacts(release_id, &mut report.deleted).await?;
        }

        for artifact in artifacts {
            self.upload_artifact(artifact, release_id, upload_url, &mut report)
                .await?;
        }

        Ok(report)
    }

    async fn upload_artifact(
        &self,
        artifact: &Artifact,
        release_id: u64,
        upload_url: &str,
        report: &mut UploadReport,
    ) -> Result<()> {
        let mut backoff = self.policy.retry.backoff();

        loop {
            let error = match self.attempt_upload(artifact, release_id, upload_url).await {
                Ok(()) => {
                    report.uploaded.push(artifact.name().to_string());
                    return Ok(());
                }
                Err(e) => e,
            };

            if error.is_transient()
                && let Some(delay) = backoff.next_delay()
            {
                log::warn!(
                    "Failed to upload artifact {}. {}. Retrying after {} seconds...",
                    artifact.name(),
                    error,
                    delay.as_secs()
                );
                tokio::time::sleep(delay).await;
                // A partially processed upload can leave an asset behind under the same name.
                self.delete_updated_artifacts(
                    std::slice::from_ref(artifact),
                    release_id,
                    &mut report.retry_cleaned,
                )
                .await?;
                continue;
            }

            if self.policy.throws_upload_errors {
                return Err(UploadError::ArtifactFailed {
                    name: artifact.name().to_string(),
                    source: error,
                });
            }

            log::warn!("Failed to upload artifact {}. {}.", artifact.name(), error);
            report.failed.push(FailedArtifact {
                name: artifact.name().to_string(),
                error,
            });
            return Ok(());
        }
    }

    async fn attempt_upload(
        &self,
        artifact: &Artifact,
        release_id: u64,
        upload_url: &str,
    ) -> std::result::Result<(), StoreError> {
        log::debug!("Uploading artifact {}...", artifact.name());

        let body = artifact
            .open()
            .await
            .map_err(|e| StoreError::Source(e.to_string()))?;

        self.store
            .upload_artifact(
                upload_url,
                artifact.content_length(),
                artifact.content_type(),
                body,
                artifact.name(),
                release_id,
            )
            .await
    }

    /// Delete remote assets sharing a name with any of `artifacts`
    async fn delete_updated_artifacts(
        &self,
        artifacts: &[Artifact],
        release_id: u64,
        deleted: &mut Vec<String>,
    ) -> Result<()> {
        let assets = self.store.list_artifacts_for_release(release_id).await?;
        let asset_by_name: HashMap<&str, &RemoteAsset> = assets
            .iter()
            .map(|asset| (asset.name.as_str(), asset))
            .collect();

        for artifact in artifacts {
            if let Some(asset) = asset_by_name.get(artifact.name()) {
                self.delete_asset(asset, deleted).await?;
            }
        }

        Ok(())
    }

    /// Delete every asset on the release
    async fn delete_all_artifacts(&self, release_id: u64, deleted: &mut Vec<String>) -> Result<()> {
        let assets = self.store.list_artifacts_for_release(release_id).await?;
        for asset in &assets {
            self.delete_asset(asset, deleted).await?;
        }
        Ok(())
    }

    async fn delete_asset(&self, asset: &RemoteAsset, deleted: &mut Vec<String>) -> Result<()> {
        log::debug!("Deleting existing artifact {}...", asset.name);
        self.store.delete_artifact(asset.id).await?;
        deleted.push(asset.name.clone());
        Ok(())
    }
}
