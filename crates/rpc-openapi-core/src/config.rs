//! Configuration for document generation.

use serde::{Deserialize, Serialize};

/// Options for document generation.
///
/// ## Serialization Format
///
/// Fields are serialized in `kebab-case` (e.g., `path-prefix`). Every field
/// has a default, so an options file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct GenerateOptions {
    /// Prefix prepended to every operation path. Split on `/` with empty
    /// segments dropped, so `/api/v1`, `api/v1/` and `/api//v1/` are the
    /// same prefix. Default: `/` (no prefix).
    pub path_prefix: String,
    /// `info.title` of the generated document. Default: empty.
    pub title: String,
    /// `info.version` of the generated document. Default: empty.
    pub version: String,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            path_prefix: "/".to_string(),
            title: String::new(),
            version: String::new(),
        }
    }
}
