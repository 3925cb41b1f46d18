//! GitHub integration for release asset operations

mod release_store;

pub use release_store::{
    DEFAULT_API_URL, GitHubAsset, GitHubRelease, GitHubReleaseStore, asset_upload_url,
};
