//! Application configuration loaded from CLI, environment, and files.
//!
//! This module provides a unified configuration struct that merges values
//! from command-line arguments, environment variables, and configuration
//! files using ortho-config's layered approach.
//!
//! # Precedence
//!
//! Configuration values are loaded with the following precedence (lowest to
//! highest):
//!
//! 1. **Defaults** – Built-in application defaults
//! 2. **Configuration file** – `.boardsync.toml` in current directory, home
//!    directory, or XDG config directory
//! 3. **Environment variables** – `BOARDSYNC_BOARD_OWNER`,
//!    `BOARDSYNC_TOKEN`, or `GITHUB_TOKEN`
//! 4. **Command-line arguments** – `--board-owner`/`-o`, `--token`/`-t`, …
//!
//! # Configuration File
//!
//! ```toml
//! token = "ghp_example"
//! board_owner = "kubernetes"
//! board_title = "SIG Auth: v1.36"
//! manifest = "run.json"
//! link_repos = "enhancements, kubernetes/website"
//! sync = true
//! public = false
//! ```

use std::env;

use camino::Utf8Path;
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

use crate::board::engine::ReconcileRequest;
use crate::board::models::Visibility;
use crate::github::error::BoardError;
use crate::github::locator::{GraphQlEndpoint, PersonalAccessToken, RepositorySlug};
use crate::manifest::RunManifest;

/// Application configuration supporting CLI, environment, and file sources.
///
/// # Example
///
/// ```no_run
/// use boardsync::BoardsyncConfig;
/// use ortho_config::OrthoConfig;
///
/// let config = BoardsyncConfig::load().expect("failed to load configuration");
/// let owner = config.require_board_owner().expect("board owner required");
/// let token = config.resolve_token().expect("token required");
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, OrthoConfig)]
#[serde(default)]
#[ortho_config(
    prefix = "BOARDSYNC",
    discovery(
        dotfile_name = ".boardsync.toml",
        config_file_name = "boardsync.toml",
        app_name = "boardsync"
    )
)]
pub struct BoardsyncConfig {
    /// Personal access token for GitHub API authentication.
    ///
    /// Can be provided via:
    /// - CLI: `--token <TOKEN>` or `-t <TOKEN>`
    /// - Environment: `BOARDSYNC_TOKEN` or `GITHUB_TOKEN`
    /// - Config file: `token = "..."`
    #[ortho_config(cli_short = 't')]
    pub token: Option<String>,

    /// Login of the user or organisation owning the board.
    #[ortho_config(cli_short = 'o')]
    pub board_owner: Option<String>,

    /// Board title; an existing board with this exact title is reused.
    #[ortho_config(cli_short = 'b')]
    pub board_title: Option<String>,

    /// Path to the run manifest JSON.
    #[ortho_config(cli_short = 'm')]
    pub manifest: Option<String>,

    /// Comma-separated repositories to link the board to.
    ///
    /// Bare names are qualified with `board_owner`.
    #[ortho_config(cli_short = 'l')]
    pub link_repos: Option<String>,

    /// Removes board items that are not in the manifest.
    ///
    /// Note: `ortho_config` does not load boolean values from the
    /// environment, so this is set on the CLI (`--sync`/`-s`) or in a file.
    #[ortho_config(cli_short = 's')]
    pub sync: bool,

    /// Makes the board public. Boards are private otherwise.
    #[ortho_config(cli_short = 'p')]
    pub public: bool,

    /// REST API base URL, for GitHub Enterprise Server or tests.
    ///
    /// Defaults to `https://api.github.com`.
    #[ortho_config()]
    pub api_base: Option<String>,
}

fn required<'value>(value: Option<&'value str>, hint: &str) -> Result<&'value str, BoardError> {
    value
        .map(str::trim)
        .filter(|trimmed| !trimmed.is_empty())
        .ok_or_else(|| BoardError::Configuration {
            message: format!("{hint} is required"),
        })
}

impl BoardsyncConfig {
    /// Resolves the token from configuration or the `GITHUB_TOKEN`
    /// environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::MissingToken`] when no source provides a
    /// non-blank value.
    pub fn resolve_token(&self) -> Result<PersonalAccessToken, BoardError> {
        let raw = self
            .token
            .clone()
            .or_else(|| env::var("GITHUB_TOKEN").ok())
            .ok_or(BoardError::MissingToken)?;
        PersonalAccessToken::new(raw)
    }

    /// Returns the board owner.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Configuration`] when it is missing or blank.
    pub fn require_board_owner(&self) -> Result<&str, BoardError> {
        required(
            self.board_owner.as_deref(),
            "board owner (use --board-owner or -o)",
        )
    }

    /// Returns the board title.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Configuration`] when it is missing or blank.
    pub fn require_board_title(&self) -> Result<&str, BoardError> {
        required(
            self.board_title.as_deref(),
            "board title (use --board-title or -b)",
        )
    }

    /// Returns the manifest path.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Configuration`] when it is missing or blank.
    pub fn require_manifest(&self) -> Result<&Utf8Path, BoardError> {
        required(self.manifest.as_deref(), "manifest path (use --manifest or -m)")
            .map(Utf8Path::new)
    }

    /// Parses `link_repos`, qualifying bare names with the board owner.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::InvalidRepository`] for a malformed entry.
    pub fn link_repositories(&self) -> Result<Vec<RepositorySlug>, BoardError> {
        let Some(raw) = self.link_repos.as_deref() else {
            return Ok(Vec::new());
        };
        let default_owner = self.board_owner.as_deref().unwrap_or_default().trim();
        RepositorySlug::parse_list(raw, default_owner)
    }

    /// Requested board visibility.
    #[must_use]
    pub const fn visibility(&self) -> Visibility {
        Visibility::from_public(self.public)
    }

    /// GraphQL endpoint derived from `api_base`.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::InvalidUrl`] when `api_base` cannot be parsed.
    pub fn graphql_endpoint(&self) -> Result<GraphQlEndpoint, BoardError> {
        match self.api_base.as_deref().map(str::trim) {
            Some(base) if !base.is_empty() => GraphQlEndpoint::from_api_base(base),
            _ => GraphQlEndpoint::github(),
        }
    }

    /// Combines this configuration with a manifest into a run request.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Self::require_board_owner`],
    /// [`Self::require_board_title`], and [`Self::link_repositories`].
    pub fn reconcile_request(&self, manifest: RunManifest) -> Result<ReconcileRequest, BoardError> {
        Ok(ReconcileRequest {
            owner: self.require_board_owner()?.to_owned(),
            title: self.require_board_title()?.to_owned(),
            visibility: self.visibility(),
            fields: manifest.fields,
            items: manifest.items,
            link_repositories: self.link_repositories()?,
            sync: self.sync,
        })
    }
}

#[cfg(test)]
mod tests;
