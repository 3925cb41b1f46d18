//! List command: show the assets attached to a release.

use crate::cli::{ReleaseArgs, RuntimeConfig};
use crate::config::{ConnectionConfig, EnvConfig};
use crate::error::Result;
use crate::github::GitHubReleaseStore;

/// Execute the list command
pub(super) async fn execute_list(
    release: &ReleaseArgs,
    env: &EnvConfig,
    config: &RuntimeConfig,
) -> Result<i32> {
    let connection = ConnectionConfig::resolve(
        release.repo.as_deref(),
        release.token.as_deref(),
        release.api_url.as_deref(),
        env,
    )?;

    let store = GitHubReleaseStore::new(
        &connection.owner,
        &connection.repo,
        &connection.token,
        &connection.api_url,
    )?;

    let assets = store.list_assets(release.release_id).await?;
    if assets.is_empty() {
        config.println(&format!("Release {} has no assets", release.release_id));
        return Ok(0);
    }

    config.println(&format!(
        "Release {} has {} asset(s):",
        release.release_id,
        assets.len()
    ));
    for asset in &assets {
        config.indent(&format!("{} ({} bytes, id {})", asset.name, asset.size, asset.id));
    }

    Ok(0)
}
