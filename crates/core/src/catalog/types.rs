//! Types for the catalog module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// File name of the per-title metadata record.
pub const METADATA_FILE: &str = "index.json";

/// Metadata record written once per obfuscated title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleMetadata {
    /// `[width, height]` of every page, indexed by page ordinal - 1.
    pub dimensions: Vec<[u32; 2]>,
    /// Obfuscated title name (also the directory name).
    pub name: String,
}

/// A title found in the content directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogTitle {
    /// Directory holding the title.
    pub dir: PathBuf,
    /// Parsed metadata record.
    pub metadata: TitleMetadata,
}

/// A title in catalog order with its neighbours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Stored (obfuscated) name.
    pub name: String,
    /// Recovered original name, used for ordering.
    pub display_name: String,
    /// Directory holding the title.
    pub dir: PathBuf,
    /// Number of pages.
    pub pages: usize,
    /// Stored name of the previous title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
    /// Stored name of the next title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

/// Catalog errors.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to enumerate titles: {0}")]
    Files(#[from] crate::files::FilesError),

    #[error("Failed to read metadata {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid metadata {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
