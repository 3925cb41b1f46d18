//! Command line argument parsing and validation.
//!
//! Every option can also be supplied through the environment, using the
//! `INPUT_*` names CI action inputs are exported under.

use crate::artifact::split_patterns;
use crate::config::parse_github_repo;
use clap::{ArgAction, Parser, Subcommand};

/// Upload build artifacts to a GitHub release
#[derive(Parser, Debug)]
#[command(
    name = "kodegen_release_uploader",
    version,
    about = "Upload build artifacts to a GitHub release",
    long_about = "Upload build artifacts to an existing GitHub release.

Existing assets with the same name are replaced by default. Uploads that fail
with a server error are retried with exponential backoff (8s, 16s, 32s, 64s).

Usage:
  kodegen_release_uploader upload --repo cyrup-ai/kodegen --release-id 123 --artifacts 'dist/*.tar.gz,dist/*.deb'
  kodegen_release_uploader list --repo cyrup-ai/kodegen --release-id 123"
)]
pub struct Args {
    /// Command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Suppress progress output
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// Release selection and credentials shared by all commands
#[derive(clap::Args, Debug, Clone)]
pub struct ReleaseArgs {
    /// Repository as owner/repo (defaults to GITHUB_REPOSITORY)
    #[arg(long, env = "INPUT_REPO")]
    pub repo: Option<String>,

    /// Numeric id of the release
    #[arg(long, env = "INPUT_RELEASEID")]
    pub release_id: u64,

    /// GitHub token (defaults to GH_TOKEN, then GITHUB_TOKEN)
    #[arg(long, env = "INPUT_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// GitHub API base URL (defaults to GITHUB_API_URL, then https://api.github.com)
    #[arg(long, env = "INPUT_APIURL")]
    pub api_url: Option<String>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Upload artifacts to a release
    Upload {
        /// Release selection and credentials
        #[command(flatten)]
        release: ReleaseArgs,

        /// Artifact glob patterns, separated by commas or newlines
        #[arg(long, env = "INPUT_ARTIFACTS")]
        artifacts: String,

        /// Content type for every artifact (detected from the extension when omitted)
        #[arg(long, env = "INPUT_ARTIFACTCONTENTTYPE")]
        content_type: Option<String>,

        /// Upload endpoint of the release (looked up when omitted)
        #[arg(long, env = "INPUT_UPLOADURL")]
        upload_url: Option<String>,

        /// Delete existing assets that share a name with an artifact
        #[arg(
            long,
            env = "INPUT_REPLACESARTIFACTS",
            action = ArgAction::Set,
            default_value_t = true
        )]
        replaces_artifacts: bool,

        /// Delete every existing asset before uploading
        #[arg(long, env = "INPUT_REMOVEARTIFACTS")]
        remove_artifacts: bool,

        /// Abort on the first artifact that cannot be uploaded
        #[arg(long, env = "INPUT_ARTIFACTERRORSFAILBUILD")]
        fail_on_upload_error: bool,

        /// Fail when an artifact pattern matches no files
        #[arg(long, env = "INPUT_FAILONMISSINGARTIFACTS")]
        fail_on_missing_artifacts: bool,
    },

    /// List assets attached to a release
    List {
        /// Release selection and credentials
        #[command(flatten)]
        release: ReleaseArgs,
    },
}

impl Command {
    /// Command name for messages
    pub fn name(&self) -> &'static str {
        match self {
            Command::Upload { .. } => "upload",
            Command::List { .. } => "list",
        }
    }

    /// Release arguments of the command
    pub fn release(&self) -> &ReleaseArgs {
        match self {
            Command::Upload { release, .. } | Command::List { release } => release,
        }
    }
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        if let Some(repo) = &self.command.release().repo {
            parse_github_repo(repo).map_err(|e| e.to_string())?;
        }

        if let Command::Upload {
            artifacts,
            upload_url,
            ..
        } = &self.command
        {
            if split_patterns(artifacts).is_empty() {
                return Err("At least one artifact pattern is required".to_string());
            }
            if let Some(url) = upload_url
                && url.trim().is_empty()
            {
                return Err("Upload URL must not be empty".to_string());
            }
        }

        Ok(())
    }
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    output: super::OutputManager,
}

impl RuntimeConfig {
    /// Create runtime configuration
    pub fn new(quiet: bool) -> Self {
        Self {
            output: super::OutputManager::new(quiet),
        }
    }

    /// Get a reference to the output manager
    pub fn output(&self) -> &super::OutputManager {
        &self.output
    }

    /// Print message
    pub fn println(&self, message: &str) {
        self.output.println(message);
    }

    /// Print error message (always shown)
    pub fn error_println(&self, message: &str) {
        self.output.error(message);
    }

    /// Print warning message
    pub fn warning_println(&self, message: &str) {
        self.output.warn(message);
    }

    /// Print success message
    pub fn success_println(&self, message: &str) {
        self.output.success(message);
    }

    /// Print indented text
    pub fn indent(&self, message: &str) {
        self.output.indent(message);
    }
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        Self::new(args.quiet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_upload_defaults() {
        let args = parse(&[
            "kodegen_release_uploader",
            "upload",
            "--repo",
            "cyrup-ai/kodegen",
            "--release-id",
            "42",
            "--artifacts",
            "dist/*.zip",
        ]);
        match args.command {
            Command::Upload {
                release,
                replaces_artifacts,
                remove_artifacts,
                fail_on_upload_error,
                ..
            } => {
                assert_eq!(release.release_id, 42);
                assert!(replaces_artifacts);
                assert!(!remove_artifacts);
                assert!(!fail_on_upload_error);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_upload_policy_flags() {
        let args = parse(&[
            "kodegen_release_uploader",
            "upload",
            "--release-id",
            "1",
            "--artifacts",
            "a.zip",
            "--replaces-artifacts",
            "false",
            "--remove-artifacts",
            "--fail-on-upload-error",
        ]);
        match args.command {
            Command::Upload {
                replaces_artifacts,
                remove_artifacts,
                fail_on_upload_error,
                ..
            } => {
                assert!(!replaces_artifacts);
                assert!(remove_artifacts);
                assert!(fail_on_upload_error);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_validate_rejects_bad_repo() {
        let args = parse(&[
            "kodegen_release_uploader",
            "list",
            "--repo",
            "kodegen",
            "--release-id",
            "1",
        ]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_patterns() {
        let args = parse(&[
            "kodegen_release_uploader",
            "upload",
            "--release-id",
            "1",
            "--artifacts",
            " , ",
        ]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_release_id_must_be_numeric() {
        assert!(
            Args::try_parse_from([
                "kodegen_release_uploader",
                "list",
                "--release-id",
                "v1.0.0"
            ])
            .is_err()
        );
    }
}
