//! GitHub Releases REST API backend for [`ReleaseArtifactStore`].

use crate::artifact::ArtifactBody;
use crate::error::{ConfigError, StoreError, UploadError};
use crate::store::{ReleaseArtifactStore, RemoteAsset};
use reqwest::header::{
    ACCEPT, AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT,
};
use serde::Deserialize;
use url::Url;

/// Public GitHub API endpoint
pub const DEFAULT_API_URL: &str = "https://api.github.com";

const API_VERSION: &str = "2022-11-28";

/// Page size for asset listing (GitHub maximum)
const PER_PAGE: usize = 100;

/// Release metadata returned by `GET /repos/{owner}/{repo}/releases/{id}`
#[derive(Deserialize, Debug, Clone)]
pub struct GitHubRelease {
    /// Tag the release points at
    pub tag_name: String,
    /// RFC 6570 template for asset uploads
    pub upload_url: String,
    /// Release page URL
    pub html_url: String,
}

/// Release asset as listed by the API
#[derive(Deserialize, Debug, Clone)]
pub struct GitHubAsset {
    /// Asset ID
    pub id: u64,
    /// File name
    pub name: String,
    /// Size in bytes
    #[serde(default)]
    pub size: u64,
    /// Public download URL
    #[serde(default)]
    pub browser_download_url: String,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

/// Release asset store backed by the GitHub REST API
#[derive(Debug, Clone)]
pub struct GitHubReleaseStore {
    client: reqwest::Client,
    api_url: String,
    owner: String,
    repo: String,
}

impl GitHubReleaseStore {
    /// Create a store for `owner/repo` authenticated with `token`
    pub fn new(owner: &str, repo: &str, token: &str, api_url: &str) -> Result<Self, UploadError> {
        Url::parse(api_url).map_err(|e| ConfigError::InvalidUrl {
            value: api_url.to_string(),
            reason: e.to_string(),
        })?;

        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| ConfigError::InvalidToken)?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert("x-github-api-version", HeaderValue::from_static(API_VERSION));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            )),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
    }

    fn repo_url(&self, path: &str) -> String {
        format!("{}/repos/{}/{}/{}", self.api_url, self.owner, self.repo, path)
    }

    /// Fetch release metadata, mainly to learn its upload URL
    pub async fn get_release(&self, release_id: u64) -> Result<GitHubRelease, StoreError> {
        let response = self
            .client
            .get(self.repo_url(&format!("releases/{release_id}")))
            .send()
            .await
            .map_err(transport_error)?;

        check_response(response)
            .await?
            .json()
            .await
            .map_err(|e| StoreError::InvalidResponse(e.to_string()))
    }

    /// List assets with full metadata, following pagination
    pub async fn list_assets(&self, release_id: u64) -> Result<Vec<GitHubAsset>, StoreError> {
        let mut assets = Vec::new();

        for page in 1u32.. {
            let response = self
                .client
                .get(self.repo_url(&format!("releases/{release_id}/assets")))
                .query(&[("per_page", PER_PAGE.to_string()), ("page", page.to_string())])
                .send()
                .await
                .map_err(transport_error)?;

            let batch: Vec<GitHubAsset> = check_response(response)
                .await?
                .json()
                .await
                .map_err(|e| StoreError::InvalidResponse(e.to_string()))?;

            let last_page = batch.len() < PER_PAGE;
            assets.extend(batch);
            if last_page {
                break;
            }
        }

        Ok(assets)
    }
}

impl ReleaseArtifactStore for GitHubReleaseStore {
    async fn list_artifacts_for_release(&self, release_id: u64) -> Result<Vec<RemoteAsset>, StoreError> {
        Ok(self
            .list_assets(release_id)
            .await?
            .into_iter()
            .map(|asset| RemoteAsset {
                id: asset.id,
                name: asset.name,
            })
            .collect())
    }

    async fn delete_artifact(&self, asset_id: u64) -> Result<(), StoreError> {
        let response = self
            .client
            .delete(self.repo_url(&format!("releases/assets/{asset_id}")))
            .send()
            .await
            .map_err(transport_error)?;

        // Already gone
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            log::debug!("Asset {asset_id} was already deleted");
            return Ok(());
        }

        check_response(response).await?;
        Ok(())
    }

    async fn upload_artifact(
        &self,
        upload_url: &str,
        content_length: u64,
        content_type: &str,
        body: ArtifactBody,
        name: &str,
        _release_id: u64,
    ) -> Result<(), StoreError> {
        let url = asset_upload_url(upload_url, name)?;

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, content_type)
            .header(CONTENT_LENGTH, content_length)
            .body(body.into_http_body())
            .send()
            .await
            .map_err(transport_error)?;

        check_response(response).await?;
        Ok(())
    }
}

/// Build the POST target for one asset from a release `upload_url`.
///
/// GitHub hands out `.../assets{?name,label}`; the template suffix is dropped
/// and `name` is added as a query parameter.
pub fn asset_upload_url(upload_url: &str, name: &str) -> Result<Url, StoreError> {
    let base = match upload_url.find('{') {
        Some(idx) => &upload_url[..idx],
        None => upload_url,
    };

    let mut url = Url::parse(base).map_err(|e| {
        StoreError::InvalidResponse(format!("invalid upload URL '{upload_url}': {e}"))
    })?;
    url.query_pairs_mut().append_pair("name", name);
    Ok(url)
}

fn transport_error(error: reqwest::Error) -> StoreError {
    match error.status() {
        Some(status) => StoreError::http(status.as_u16(), error.to_string()),
        None => StoreError::Transport(error.to_string()),
    }
}

async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(StoreError::http(status.as_u16(), error_message(status, &body)))
}

/// Prefer the API's `message` field, fall back to the status reason
fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string())
}
