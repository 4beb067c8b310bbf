//! Catalog ordering of obfuscated titles.
//!
//! Titles are sorted by their recovered original names so the published
//! sequence reads naturally even though directories carry scrambled names.

mod types;

pub use types::*;

use std::io::ErrorKind;
use std::path::Path;

use crate::files::scan_titles;
use crate::naming::{natural_cmp, NameCodec};

/// Loads the metadata record of every title under `content_dir`.
///
/// Directories without a record (not yet obfuscated) are skipped.
pub async fn load_catalog(content_dir: &Path) -> Result<Vec<CatalogTitle>, CatalogError> {
    let mut titles = Vec::new();

    for dir in scan_titles(content_dir).await? {
        let path = dir.join(METADATA_FILE);
        let body = match tokio::fs::read(&path).await {
            Ok(body) => body,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(dir = %dir.display(), "No metadata record, skipping");
                continue;
            }
            Err(source) => return Err(CatalogError::Read { path, source }),
        };
        let metadata: TitleMetadata = serde_json::from_slice(&body)
            .map_err(|source| CatalogError::Parse { path, source })?;
        titles.push(CatalogTitle { dir, metadata });
    }

    Ok(titles)
}

/// Orders titles by recovered name and links each to its neighbours.
pub fn order_catalog(titles: Vec<CatalogTitle>, codec: &NameCodec) -> Vec<CatalogEntry> {
    let mut named: Vec<(String, CatalogTitle)> = titles
        .into_iter()
        .map(|t| (codec.deobfuscate(&t.metadata.name), t))
        .collect();
    named.sort_by(|(a, _), (b, _)| natural_cmp(a, b));

    let names: Vec<String> = named.iter().map(|(_, t)| t.metadata.name.clone()).collect();

    named
        .into_iter()
        .enumerate()
        .map(|(i, (display_name, title))| CatalogEntry {
            name: title.metadata.name,
            display_name,
            dir: title.dir,
            pages: title.metadata.dimensions.len(),
            prev: i.checked_sub(1).map(|p| names[p].clone()),
            next: names.get(i + 1).cloned(),
        })
        .collect()
}

/// Loads and orders the catalog in one step.
pub async fn build_catalog(
    content_dir: &Path,
    codec: &NameCodec,
) -> Result<Vec<CatalogEntry>, CatalogError> {
    let titles = load_catalog(content_dir).await?;
    let entries = order_catalog(titles, codec);
    tracing::info!(titles = entries.len(), "Catalog ordered");
    Ok(entries)
}
