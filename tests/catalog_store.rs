//! Catalog Store Integration Tests
//!
//! Reads and writes `dlc.json` documents on disk.

use std::path::PathBuf;

use dlcman::catalog::{catalog_path, CatalogError, CatalogStore, LoadFailurePolicy};
use dlcman::{ContainerRecord, EntryRecord, TitleId};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const EXISTING_CATALOG: &str = r#"[
  {
    "path": "/games/dlc-pack-1.nsp",
    "dlcNcaList": [
      { "path": "/aaa.nca", "titleId": 72057594037985299, "enabled": true },
      { "path": "/bbb.nca", "titleId": 72057594037985300, "enabled": false }
    ]
  },
  { "path": "/games/broken.nsp", "dlcNcaList": null },
  { "path": "/games/older.nsp" },
  { "path": "/games/empty.nsp", "dlcNcaList": [] }
]"#;

#[test]
fn test_load_existing_catalog() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("dlc.json");
    std::fs::write(&path, EXISTING_CATALOG).unwrap();

    let records = CatalogStore::new(&path).load().unwrap();

    assert_eq!(
        records,
        vec![
            ContainerRecord::new(
                "/games/dlc-pack-1.nsp",
                vec![
                    EntryRecord::new("/aaa.nca", TitleId::new(0x0100_0000_0000_e013), true),
                    EntryRecord::new("/bbb.nca", TitleId::new(0x0100_0000_0000_e014), false),
                ],
            ),
            ContainerRecord::new("/games/empty.nsp", vec![]),
        ]
    );
}

#[test]
fn test_save_then_load() {
    let temp = TempDir::new().unwrap();
    let games = temp.path().join("games");
    let store = CatalogStore::for_title(&games, TitleId::new(0x0100_0000_0000_e000));
    let records = vec![ContainerRecord::new(
        "/games/pack.nsp",
        vec![EntryRecord::new("/x.nca", TitleId::new(0x0100_0000_0000_e001), false)],
    )];

    store.save(&records).unwrap();

    assert_eq!(
        store.path(),
        temp.path().join("games/010000000000e000/dlc.json").as_path()
    );
    assert!(store.path().exists());
    assert_eq!(store.load().unwrap(), records);
}

#[test]
fn test_saved_document_uses_catalog_field_names() {
    let temp = TempDir::new().unwrap();
    let store = CatalogStore::new(temp.path().join("dlc.json"));

    store
        .save(&[ContainerRecord::new(
            "/games/pack.nsp",
            vec![EntryRecord::new("/x.nca", TitleId::new(0x0100_0000_0000_e013), true)],
        )])
        .unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
    assert_eq!(
        raw,
        serde_json::json!([
            {
                "path": "/games/pack.nsp",
                "dlcNcaList": [
                    { "path": "/x.nca", "titleId": 72057594037985299u64, "enabled": true }
                ]
            }
        ])
    );
}

#[test]
fn test_save_replaces_previous_catalog() {
    let temp = TempDir::new().unwrap();
    let store = CatalogStore::new(temp.path().join("dlc.json"));
    std::fs::write(store.path(), EXISTING_CATALOG).unwrap();

    store.save(&[]).unwrap();

    assert!(store.load().unwrap().is_empty());
    let leftovers: Vec<PathBuf> = std::fs::read_dir(temp.path())
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(leftovers, vec![store.path().to_path_buf()]);
}

#[test]
fn test_load_failure_policies() {
    let temp = TempDir::new().unwrap();
    let store = CatalogStore::new(temp.path().join("dlc.json"));

    // Missing file is an empty catalog under either policy
    assert!(store.load().unwrap_err().is_not_found());
    assert!(store.load_with_policy(LoadFailurePolicy::Fail).unwrap().is_empty());

    std::fs::write(store.path(), "{ not json").unwrap();
    assert!(store.load_with_policy(LoadFailurePolicy::Empty).unwrap().is_empty());
    assert!(matches!(
        store.load_with_policy(LoadFailurePolicy::Fail),
        Err(CatalogError::Format { .. })
    ));
}

#[test]
fn test_catalog_path_layout() {
    let path = catalog_path(&PathBuf::from("/data/games"), TitleId::new(0x0100_0000_0000_e000));
    assert_eq!(path, PathBuf::from("/data/games/010000000000e000/dlc.json"));
}
