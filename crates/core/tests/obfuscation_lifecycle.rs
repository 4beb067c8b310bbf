//! Obfuscation lifecycle integration tests.
//!
//! These tests verify the obfuscation pass and the catalog built on top:
//! - Idempotent re-runs (stale encrypted files replaced, no duplicates)
//! - Name scrambling and its recovery for catalog ordering
//! - Metadata records written only for complete titles

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use tankobon_core::{
    build_catalog,
    catalog::{load_catalog, METADATA_FILE},
    naming::NameCodec,
    obfuscator::{ObfuscationConfig, ObfuscationOutcome},
    testing::fixtures,
    Obfuscator,
};

const KEY_HEX: &str = "8f1c2b9a7d6e5f4031a2b3c4d5e6f708192a3b4c5d6e7f8091a2b3c4d5e6f701";
const IV_HEX: &str = "0f1e2d3c4b5a69788796a5b4c3d2e1f0";

fn obfuscator() -> Obfuscator {
    Obfuscator::from_config(&ObfuscationConfig::new(KEY_HEX, IV_HEX)).unwrap()
}

fn canonical_title(content: &Path, name: &str) -> PathBuf {
    let dir = fixtures::title_dir(content, name);
    fixtures::write_png(&dir.join("001.png"), 64, 96);
    image::RgbImage::new(80, 120)
        .save(dir.join("002.jpg"))
        .unwrap();
    fixtures::write_png(&dir.join("thumbnail_1.png"), 20, 30);
    dir
}

#[tokio::test]
async fn test_rerun_is_idempotent() {
    let content = TempDir::new().unwrap();
    canonical_title(content.path(), "Book");
    let obfuscator = obfuscator();

    obfuscator.run(content.path()).await.unwrap();
    let dir = content.path().join("Rev kooB");
    let first = fixtures::list_names(&dir);
    assert_eq!(
        first,
        vec![
            "001.gnp",
            "001.png",
            "002.gpj",
            "002.jpg",
            "index.json",
            "thumbnail_1-20-30.gnp",
            "thumbnail_1.png",
        ]
    );

    // A page removed since the last run leaves a stale encrypted file.
    std::fs::write(dir.join("003.gnp"), b"stale").unwrap();

    let report = obfuscator.run(content.path()).await.unwrap();
    assert_eq!(report.processed(), 1);
    assert_eq!(fixtures::list_names(&dir), first);
    assert!(!content.path().join("Rev Rev kooB").exists());
}

#[tokio::test]
async fn test_encrypted_pages_decrypt_to_plaintext() {
    let content = TempDir::new().unwrap();
    let dir = canonical_title(content.path(), "Book");
    let plain = std::fs::read(dir.join("002.jpg")).unwrap();

    let outcome = obfuscator().obfuscate_title(&dir).await.unwrap();
    let ObfuscationOutcome::Obfuscated { dir, metadata } = outcome else {
        panic!("title was skipped");
    };

    assert_eq!(metadata.dimensions, vec![[64, 96], [80, 120]]);
    let key = tankobon_core::ObfuscationKey::from_hex(KEY_HEX, IV_HEX).unwrap();
    let encrypted = std::fs::read(dir.join("002.gpj")).unwrap();
    assert_eq!(key.decrypt(&encrypted).unwrap(), plain);
}

#[tokio::test]
async fn test_already_marked_title_keeps_its_name() {
    let content = TempDir::new().unwrap();
    let dir = canonical_title(content.path(), "Rev kooB");

    let outcome = obfuscator().obfuscate_title(&dir).await.unwrap();
    let ObfuscationOutcome::Obfuscated { dir: after, metadata } = outcome else {
        panic!("title was skipped");
    };
    assert_eq!(after, dir);
    assert_eq!(metadata.name, "Rev kooB");
}

#[tokio::test]
async fn test_catalog_orders_by_recovered_name() {
    let content = TempDir::new().unwrap();
    for name in ["Vol 10", "Vol 2", "Vol 1"] {
        canonical_title(content.path(), name);
    }
    // Not obfuscated yet, so not part of the catalog.
    fixtures::title_dir(content.path(), "Raw");

    obfuscator().run(content.path()).await.unwrap();

    let entries = build_catalog(content.path(), &NameCodec::default())
        .await
        .unwrap();

    let display: Vec<&str> = entries.iter().map(|e| e.display_name.as_str()).collect();
    assert_eq!(display, vec!["Vol 1", "Vol 2", "Vol 10"]);
    assert_eq!(entries[0].name, "Rev 1 loV");
    assert_eq!(entries[0].prev, None);
    assert_eq!(entries[1].prev.as_deref(), Some("Rev 1 loV"));
    assert_eq!(entries[1].next.as_deref(), Some("Rev 01 loV"));
    assert_eq!(entries[2].next, None);
    assert!(entries.iter().all(|e| e.pages == 2));
}

#[tokio::test]
async fn test_failed_title_gets_no_record() {
    let content = TempDir::new().unwrap();
    let dir = canonical_title(content.path(), "Broken");
    std::fs::write(dir.join("003.png"), b"truncated").unwrap();
    canonical_title(content.path(), "Fine");

    let report = obfuscator().run(content.path()).await.unwrap();
    assert_eq!(report.failed(), 1);
    assert_eq!(report.processed(), 1);
    assert!(!dir.join(METADATA_FILE).exists());

    let titles = load_catalog(content.path()).await.unwrap();
    assert_eq!(titles.len(), 1);
    assert_eq!(titles[0].metadata.name, "Rev eniF");
}
