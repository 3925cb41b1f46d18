//! Expand artifact patterns into an ordered batch of artifacts.

use super::Artifact;
use crate::error::ArtifactError;
use std::collections::HashMap;
use std::path::PathBuf;

/// Split a pattern list on commas and newlines, dropping blanks
pub fn split_patterns(input: &str) -> Vec<String> {
    input
        .split([',', '\n'])
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Glob-based artifact discovery
#[derive(Debug, Clone, Default)]
pub struct ArtifactDiscovery {
    patterns: Vec<String>,
    content_type: Option<String>,
    fail_on_missing: bool,
}

impl ArtifactDiscovery {
    /// Create discovery over the given patterns
    pub fn new(patterns: Vec<String>) -> Self {
        Self {
            patterns,
            ..Self::default()
        }
    }

    /// Force one content type for every artifact instead of detecting it
    pub fn with_content_type(mut self, content_type: Option<String>) -> Self {
        self.content_type = content_type;
        self
    }

    /// Fail instead of warning when a pattern matches nothing
    pub fn fail_on_missing(mut self, fail: bool) -> Self {
        self.fail_on_missing = fail;
        self
    }

    /// Expand all patterns in order.
    ///
    /// Files matched by more than one pattern are kept once. Two different
    /// files with the same name are rejected, since the name is what the
    /// release uses to tell assets apart.
    pub fn discover(&self) -> Result<Vec<Artifact>, ArtifactError> {
        let mut artifacts = Vec::new();
        let mut seen: HashMap<String, PathBuf> = HashMap::new();

        for pattern in &self.patterns {
            let paths = glob::glob(pattern).map_err(|e| ArtifactError::InvalidPattern {
                pattern: pattern.clone(),
                reason: e.to_string(),
            })?;

            let mut matched = 0usize;
            for entry in paths {
                let path = match entry {
                    Ok(path) => path,
                    Err(e) => {
                        log::warn!("Skipping unreadable path for pattern {pattern}: {e}");
                        continue;
                    }
                };

                if !path.is_file() {
                    log::warn!("Skipping non-file artifact: {}", path.display());
                    continue;
                }
                matched += 1;

                let artifact = Artifact::from_path(&path, self.content_type.as_deref())?;
                // Patterns may spell the same file differently (`..`, symlinks)
                let canonical = std::fs::canonicalize(&path).map_err(|source| ArtifactError::Unreadable {
                    path: path.clone(),
                    source,
                })?;
                if let Some(first) = seen.get(artifact.name()) {
                    if *first == canonical {
                        continue;
                    }
                    return Err(ArtifactError::DuplicateName {
                        name: artifact.name().to_string(),
                        first: first.clone(),
                        second: canonical,
                    });
                }

                log::debug!("Found artifact {} ({} bytes)", artifact.name(), artifact.content_length());
                seen.insert(artifact.name().to_string(), canonical);
                artifacts.push(artifact);
            }

            if matched == 0 {
                if self.fail_on_missing {
                    return Err(ArtifactError::NoMatch {
                        pattern: pattern.clone(),
                    });
                }
                log::warn!("Artifact pattern {pattern} did not match any files");
            }
        }

        Ok(artifacts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, name.as_bytes()).unwrap();
        path
    }

    fn pattern(dir: &Path, suffix: &str) -> String {
        format!("{}/{}", dir.display(), suffix)
    }

    #[test]
    fn test_split_patterns() {
        assert_eq!(
            split_patterns("dist/*.zip, dist/*.deb\n\n  target/app ,"),
            vec!["dist/*.zip", "dist/*.deb", "target/app"]
        );
        assert!(split_patterns(" , \n").is_empty());
    }

    #[test]
    fn test_discover_in_pattern_order() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "b.zip");
        touch(dir.path(), "a.zip");
        touch(dir.path(), "app.deb");

        let artifacts = ArtifactDiscovery::new(vec![
            pattern(dir.path(), "*.deb"),
            pattern(dir.path(), "*.zip"),
        ])
        .discover()
        .unwrap();

        let names: Vec<_> = artifacts.iter().map(|a| a.name()).collect();
        assert_eq!(names, vec!["app.deb", "a.zip", "b.zip"]);
    }

    #[test]
    fn test_overlapping_patterns_keep_one_copy() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "app.zip");

        let artifacts = ArtifactDiscovery::new(vec![
            pattern(dir.path(), "*.zip"),
            pattern(dir.path(), "app.*"),
        ])
        .discover()
        .unwrap();

        assert_eq!(artifacts.len(), 1);
    }

    #[test]
    fn test_same_file_through_different_paths_kept_once() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "app.zip");
        let dir_name = dir.path().file_name().unwrap().to_string_lossy().into_owned();

        let artifacts = ArtifactDiscovery::new(vec![
            pattern(dir.path(), "*.zip"),
            pattern(dir.path(), &format!("../{dir_name}/app.zip")),
        ])
        .fail_on_missing(true)
        .discover()
        .unwrap();

        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].name(), "app.zip");
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "linux/app.tar.gz");
        touch(dir.path(), "macos/app.tar.gz");

        let err = ArtifactDiscovery::new(vec![pattern(dir.path(), "*/app.tar.gz")])
            .discover()
            .unwrap_err();
        assert!(matches!(err, ArtifactError::DuplicateName { name, .. } if name == "app.tar.gz"));
    }

    #[test]
    fn test_directories_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("bundle.app")).unwrap();
        touch(dir.path(), "bundle.dmg");

        let artifacts = ArtifactDiscovery::new(vec![pattern(dir.path(), "bundle.*")])
            .discover()
            .unwrap();
        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].name(), "bundle.dmg");
    }

    #[test]
    fn test_missing_pattern_warns_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = ArtifactDiscovery::new(vec![pattern(dir.path(), "*.rpm")])
            .discover()
            .unwrap();
        assert!(artifacts.is_empty());
    }

    #[test]
    fn test_missing_pattern_fails_when_requested() {
        let dir = tempfile::tempdir().unwrap();
        let err = ArtifactDiscovery::new(vec![pattern(dir.path(), "*.rpm")])
            .fail_on_missing(true)
            .discover()
            .unwrap_err();
        assert!(matches!(err, ArtifactError::NoMatch { .. }));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = ArtifactDiscovery::new(vec!["dist/[".to_string()])
            .discover()
            .unwrap_err();
        assert!(matches!(err, ArtifactError::InvalidPattern { .. }));
    }

    #[test]
    fn test_content_type_override() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "app.zip");

        let artifacts = ArtifactDiscovery::new(vec![pattern(dir.path(), "*.zip")])
            .with_content_type(Some("raw".to_string()))
            .discover()
            .unwrap();
        assert_eq!(artifacts[0].content_type(), "raw");
    }
}
