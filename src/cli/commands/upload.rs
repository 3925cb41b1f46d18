//! Upload command: discover artifacts and push them to the release.

use crate::artifact::split_patterns;
use crate::cli::{Command, RuntimeConfig};
use crate::config::{ConnectionConfig, EnvConfig, UploadConfig, retry_policy_from_env};
use crate::error::{CliError, Result};
use crate::github::GitHubReleaseStore;
use crate::uploader::{ArtifactUploader, UploadPolicy, UploadReport};

/// Build the upload configuration from the `upload` command
pub(super) fn upload_config(command: &Command, env: &EnvConfig) -> Result<UploadConfig> {
    let Command::Upload {
        release,
        artifacts,
        content_type,
        upload_url,
        replaces_artifacts,
        remove_artifacts,
        fail_on_upload_error,
        fail_on_missing_artifacts,
    } = command
    else {
        return Err(CliError::InvalidArguments {
            reason: format!("'{}' is not an upload command", command.name()),
        }
        .into());
    };

    let connection = ConnectionConfig::resolve(
        release.repo.as_deref(),
        release.token.as_deref(),
        release.api_url.as_deref(),
        env,
    )?;

    Ok(UploadConfig {
        connection,
        release_id: release.release_id,
        upload_url: upload_url.clone(),
        artifacts: split_patterns(artifacts),
        content_type: content_type.clone(),
        fail_on_missing_artifacts: *fail_on_missing_artifacts,
        policy: UploadPolicy {
            replaces_existing_artifacts: *replaces_artifacts,
            remove_artifacts: *remove_artifacts,
            throws_upload_errors: *fail_on_upload_error,
            retry: retry_policy_from_env(env),
        },
    })
}

/// Execute the upload command
pub(super) async fn execute_upload(
    command: &Command,
    env: &EnvConfig,
    config: &RuntimeConfig,
) -> Result<i32> {
    let upload = upload_config(command, env)?;

    let artifacts = upload.discovery().discover()?;
    if artifacts.is_empty() {
        config.warning_println("No artifacts matched - nothing to upload");
        return Ok(0);
    }
    config.output().info(&format!(
        "Uploading {} artifact(s) to {}/{} release {}",
        artifacts.len(),
        upload.connection.owner,
        upload.connection.repo,
        upload.release_id
    ));

    let store = GitHubReleaseStore::new(
        &upload.connection.owner,
        &upload.connection.repo,
        &upload.connection.token,
        &upload.connection.api_url,
    )?;

    let (upload_url, release_page) = match &upload.upload_url {
        Some(url) => (url.clone(), None),
        None => {
            let release = store.get_release(upload.release_id).await?;
            log::debug!("Resolved upload URL for release {}: {}", release.tag_name, release.upload_url);
            (release.upload_url, Some(release.html_url))
        }
    };

    let uploader = ArtifactUploader::new(store, upload.policy);
    let report = uploader
        .upload_artifacts(&artifacts, upload.release_id, &upload_url)
        .await?;

    print_summary(&report, config);
    if let Some(page) = release_page {
        config.println(&format!("Release: {page}"));
    }
    Ok(0)
}

fn print_summary(report: &UploadReport, config: &RuntimeConfig) {
    for name in &report.deleted {
        config.indent(&format!("✗ Deleted existing asset {}", name));
    }
    for name in &report.retry_cleaned {
        config.indent(&format!("↻ Removed partial upload of {} before retrying", name));
    }
    for name in &report.uploaded {
        config.indent(&format!("✓ Uploaded {}", name));
    }
    for failed in &report.failed {
        config.warning_println(&format!("Failed to upload {}: {}", failed.name, failed.error));
    }

    if report.is_complete() {
        config.success_println(&format!("Uploaded {} artifact(s)", report.uploaded.len()));
    } else {
        config.warning_println(&format!(
            "Uploaded {} artifact(s), {} failed",
            report.uploaded.len(),
            report.failed.len()
        ));
    }
}
