//! Post payload fixtures.
//!
//! Payloads are addressed by name. The canonical file is a JSON object
//! keyed by fixture name; a bare JSON array is also accepted and its entries
//! are mapped onto the names in [`FixtureKey::LEGACY_ORDER`]. Objects may
//! carry payloads under names no check uses; they are kept but never sent.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("failed to read fixture file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse fixture file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("fixture '{key}' not found in {path}")]
    Missing { key: FixtureKey, path: PathBuf },
}

/// Names of the payloads the checks draw on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureKey {
    /// Sent by POST checks whose response must echo the title.
    Echo,
    /// Sent by PUT checks and the POST status check.
    Update,
    /// Sent by the POST id check.
    Create,
}

impl FixtureKey {
    /// Positional mapping used for array-shaped fixture files.
    pub const LEGACY_ORDER: [FixtureKey; 3] =
        [FixtureKey::Echo, FixtureKey::Update, FixtureKey::Create];

    pub fn as_str(self) -> &'static str {
        match self {
            FixtureKey::Echo => "echo",
            FixtureKey::Update => "update",
            FixtureKey::Create => "create",
        }
    }
}

impl std::fmt::Display for FixtureKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// A post payload. Unknown fields are kept and sent along.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostPayload {
    pub title: String,
    pub body: String,
    #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FixtureFile {
    Named(BTreeMap<String, PostPayload>),
    Positional(Vec<PostPayload>),
}

/// Fixture payloads loaded from one file.
#[derive(Debug, Clone)]
pub struct FixtureSet {
    source: PathBuf,
    payloads: BTreeMap<String, PostPayload>,
}

impl FixtureSet {
    /// Load fixtures from a JSON file.
    pub fn load(path: &Path) -> Result<Self, FixtureError> {
        let content = std::fs::read_to_string(path).map_err(|source| FixtureError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(path, &content)
    }

    /// Parse fixtures from JSON text. `source` is only used in messages.
    pub fn from_json(source: &Path, content: &str) -> Result<Self, FixtureError> {
        let file: FixtureFile =
            serde_json::from_str(content).map_err(|e| FixtureError::Parse {
                path: source.to_path_buf(),
                source: e,
            })?;

        let payloads = match file {
            FixtureFile::Named(map) => map,
            FixtureFile::Positional(list) => FixtureKey::LEGACY_ORDER
                .into_iter()
                .map(|key| key.as_str().to_string())
                .zip(list)
                .collect(),
        };

        debug!(path = %source.display(), count = payloads.len(), "fixtures loaded");

        Ok(Self {
            source: source.to_path_buf(),
            payloads,
        })
    }

    pub fn get(&self, key: FixtureKey) -> Result<&PostPayload, FixtureError> {
        self.payloads.get(key.as_str()).ok_or_else(|| FixtureError::Missing {
            key,
            path: self.source.clone(),
        })
    }

    pub fn len(&self) -> usize {
        self.payloads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }
}
