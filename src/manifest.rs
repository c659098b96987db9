//! Run manifest: the desired fields and candidate items for one run.
//!
//! The manifest is a JSON document produced by whatever collects the
//! candidate issues and pull requests:
//!
//! ```json
//! {
//!   "fields": [
//!     { "name": "Stage", "data_type": "SINGLE_SELECT", "options": ["Alpha", "Beta"] },
//!     { "name": "KEP", "data_type": "TEXT" }
//!   ],
//!   "items": [
//!     { "content_id": "I_kwDOA", "title": "Add widgets", "fields": { "Stage": "Beta" } }
//!   ]
//! }
//! ```

use std::collections::BTreeSet;

use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use serde::Deserialize;

use crate::board::models::{CandidateItem, FieldSpec};
use crate::github::error::BoardError;

/// Desired fields and candidate items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RunManifest {
    /// Fields the board should carry.
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
    /// Items the board should contain.
    #[serde(default)]
    pub items: Vec<CandidateItem>,
}

impl RunManifest {
    /// Parses and validates manifest JSON.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Manifest`] for malformed JSON, blank field
    /// names, or a field named twice.
    pub fn parse(raw: &str) -> Result<Self, BoardError> {
        let manifest: Self = serde_json::from_str(raw).map_err(|error| BoardError::Manifest {
            message: format!("invalid manifest JSON: {error}"),
        })?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Reads and parses the manifest at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Io`] when the file cannot be read, and the
    /// errors of [`RunManifest::parse`].
    pub fn load(path: &Utf8Path) -> Result<Self, BoardError> {
        let parent = path
            .parent()
            .filter(|dir| !dir.as_str().is_empty())
            .unwrap_or_else(|| Utf8Path::new("."));
        let file_name = path.file_name().ok_or_else(|| BoardError::Io {
            message: format!("manifest path '{path}' has no file name"),
        })?;

        let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(|error| {
            BoardError::Io {
                message: format!("failed to open manifest directory '{parent}': {error}"),
            }
        })?;
        let raw = dir
            .read_to_string(file_name)
            .map_err(|error| BoardError::Io {
                message: format!("failed to read manifest '{path}': {error}"),
            })?;

        let manifest = Self::parse(&raw)?;
        tracing::debug!(
            path = %path,
            fields = manifest.fields.len(),
            items = manifest.items.len(),
            "loaded run manifest"
        );
        Ok(manifest)
    }

    fn validate(&self) -> Result<(), BoardError> {
        let mut names = BTreeSet::new();
        for spec in &self.fields {
            if spec.name.trim().is_empty() {
                return Err(BoardError::Manifest {
                    message: "field name must not be blank".to_owned(),
                });
            }
            if !names.insert(spec.name.as_str()) {
                return Err(BoardError::Manifest {
                    message: format!("field {:?} is declared more than once", spec.name),
                });
            }
        }
        Ok(())
    }
}
