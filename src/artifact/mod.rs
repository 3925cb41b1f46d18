//! Local build outputs that get attached to a release.
//!
//! An [`Artifact`] is immutable once built. Its content is not held open:
//! every upload attempt calls [`Artifact::open`], which starts reading from
//! the beginning again, so a retried upload never resumes from a partial
//! offset.

mod discovery;

pub use discovery::{ArtifactDiscovery, split_patterns};

use crate::error::ArtifactError;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;
use tokio_util::io::ReaderStream;

/// Content type used when nothing more specific is known
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Where an artifact's bytes come from
#[derive(Debug, Clone)]
pub enum ArtifactSource {
    /// A file on disk, streamed on each attempt
    File(PathBuf),
    /// An in-memory buffer
    Memory(Bytes),
}

/// An open, single-use body for one upload attempt
#[derive(Debug)]
pub enum ArtifactBody {
    /// Buffered content
    Memory(Bytes),
    /// File handle positioned at the start
    File(tokio::fs::File),
}

impl ArtifactBody {
    /// Read the whole body into memory
    pub async fn into_bytes(self) -> std::io::Result<Bytes> {
        match self {
            ArtifactBody::Memory(bytes) => Ok(bytes),
            ArtifactBody::File(mut file) => {
                let mut buf = Vec::new();
                file.read_to_end(&mut buf).await?;
                Ok(Bytes::from(buf))
            }
        }
    }

    /// Convert into a request body, streaming files instead of buffering them
    pub fn into_http_body(self) -> reqwest::Body {
        match self {
            ArtifactBody::Memory(bytes) => reqwest::Body::from(bytes),
            ArtifactBody::File(file) => reqwest::Body::wrap_stream(ReaderStream::new(file)),
        }
    }
}

/// A build output to upload, identified by name
#[derive(Debug, Clone)]
pub struct Artifact {
    name: String,
    content_type: String,
    content_length: u64,
    source: ArtifactSource,
}

impl Artifact {
    /// Create an artifact from an in-memory buffer
    pub fn from_bytes(
        name: impl Into<String>,
        content_type: impl Into<String>,
        content: impl Into<Bytes>,
    ) -> Self {
        let content = content.into();
        Self {
            name: name.into(),
            content_type: content_type.into(),
            content_length: content.len() as u64,
            source: ArtifactSource::Memory(content),
        }
    }

    /// Create an artifact backed by a file.
    ///
    /// The asset name is the file name. When `content_type` is `None` it is
    /// detected from the extension.
    pub fn from_path(path: &Path, content_type: Option<&str>) -> Result<Self, ArtifactError> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ArtifactError::InvalidFileName {
                path: path.to_path_buf(),
            })?
            .to_string();

        let metadata = std::fs::metadata(path).map_err(|source| ArtifactError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;

        let content_type = content_type
            .map(str::to_string)
            .unwrap_or_else(|| detect_content_type(path).to_string());

        Ok(Self {
            name,
            content_type,
            content_length: metadata.len(),
            source: ArtifactSource::File(path.to_path_buf()),
        })
    }

    /// Asset name on the release
    pub fn name(&self) -> &str {
        &self.name
    }

    /// MIME type sent with the upload
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Size in bytes
    pub fn content_length(&self) -> u64 {
        self.content_length
    }

    /// Open a fresh body for one upload attempt
    pub async fn open(&self) -> std::io::Result<ArtifactBody> {
        match &self.source {
            ArtifactSource::Memory(bytes) => Ok(ArtifactBody::Memory(bytes.clone())),
            ArtifactSource::File(path) => Ok(ArtifactBody::File(tokio::fs::File::open(path).await?)),
        }
    }
}

/// Detect MIME type for release artifacts from the file extension
pub fn detect_content_type(path: &Path) -> &'static str {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();

    if file_name.ends_with(".tar.gz") {
        return "application/gzip";
    }

    match path.extension().and_then(|e| e.to_str()) {
        Some("deb") => "application/vnd.debian.binary-package",
        Some("rpm") => "application/x-rpm",
        Some("exe") | Some("msi") => "application/x-msdownload",
        Some("dmg") => "application/x-apple-diskimage",
        Some("AppImage") => "application/x-executable",
        Some("zip") => "application/zip",
        Some("gz") | Some("tgz") => "application/gzip",
        Some("tar") => "application/x-tar",
        Some("xz") => "application/x-xz",
        Some("zst") => "application/zstd",
        Some("json") => "application/json",
        Some("txt") | Some("sha256") | Some("sha512") => "text/plain",
        Some("asc") | Some("sig") => "application/pgp-signature",
        _ => DEFAULT_CONTENT_TYPE,
    }
}
