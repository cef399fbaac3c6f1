//! Workflow Integration Tests
//!
//! Full extract -> edit -> commit -> extract cycles against a database
//! document on disk, the way the tool is used day to day.

use std::fs;

use arcade_core::{
    BackingStore, JsonStore, SchemaNode, SyncEngine, SyncOptions, from_file_tree, from_store,
};
use arcade_fs::{ConfigStore, NormalizedPath};
use arcade_test_utils::{
    RecordingStore, StoreCall, TestRepo, calculation, constraint, schema, validation,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

// =============================================================================
// Test Infrastructure
// =============================================================================

fn city_schema() -> SchemaNode {
    schema(
        "city.gdb",
        &[
            ("", vec![constraint(1, "Global Lock")]),
            ("Parcels", vec![calculation(2, "Area"), validation(3, "Owner")]),
            ("Utilities/Water", vec![calculation(4, "Pipe Length")]),
            ("Utilities/Sewer", vec![]),
        ],
    )
}

struct Database {
    _dir: TempDir,
    path: NormalizedPath,
}

impl Database {
    fn new(schema: &SchemaNode) -> Self {
        let dir = TempDir::new().unwrap();
        let path = NormalizedPath::new(dir.path().join("city.json"));
        ConfigStore::new().save(&path, schema).unwrap();
        Self { _dir: dir, path }
    }

    fn open(&self) -> JsonStore {
        JsonStore::open(&self.path).unwrap()
    }

    fn engine(&self, repo: &TestRepo) -> SyncEngine<JsonStore> {
        SyncEngine::new(self.open(), repo.path()).unwrap()
    }
}

fn rename_in_config(repo: &TestRepo, config: &str, from: &str, to: &str) {
    let content = repo
        .read_file(config)
        .replace(&format!("\"name\": \"{from}\""), &format!("\"name\": \"{to}\""));
    repo.write_file(config, &content);
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_full_edit_cycle() {
    let database = Database::new(&city_schema());
    let repo = TestRepo::new();

    database.engine(&repo).extract().unwrap();
    repo.assert_file_exists("Global Lock/config.json");
    repo.assert_file_exists("Utilities/Water/Pipe Length/Pipe Length.js");
    assert!(repo.root().join("Utilities/Sewer").is_dir());

    // Edit, add, rename and delete
    repo.write_file("Parcels/Area/Area.js", "return Area($feature, 'acres');");
    repo.write_rule("Utilities/Sewer", &calculation(10, "Invert Level"));
    rename_in_config(&repo, "Parcels/Owner/config.json", "Owner", "Owner Required");
    fs::remove_dir_all(repo.root().join("Global Lock")).unwrap();

    let report = database.engine(&repo).commit().unwrap();
    assert_eq!(
        (report.summary.inserted, report.summary.updated, report.summary.deleted),
        (1, 2, 1)
    );
    assert!(!report.has_errors());

    // Everything landed in the document
    let store = database.open();
    let tree = from_store(&store, &NormalizedPath::root()).unwrap();
    assert_eq!(tree.ids().into_iter().collect::<Vec<_>>(), vec![2, 3, 4, 10]);
    assert_eq!(tree.index[&3].name, "Owner Required");
    assert_eq!(tree.index[&10].parent, Some(NormalizedPath::new("Utilities/Sewer")));
    assert_eq!(tree.index[&2].script_expression, "return Area($feature, 'acres');");

    // Nothing left to do
    let second = database.engine(&repo).commit().unwrap();
    assert_eq!(second.summary.mutations(), 0);
    assert_eq!(second.summary.skipped, 4);
}

#[test]
fn test_clean_extract_mirrors_the_database() {
    let database = Database::new(&city_schema());
    let repo = TestRepo::new();
    repo.write_rule("Parcels", &calculation(77, "Leftover"));
    repo.write_file(".git/HEAD", "ref: refs/heads/main\n");

    let options = SyncOptions {
        clean: true,
        ..SyncOptions::default()
    };
    database
        .engine(&repo)
        .with_options(options)
        .extract()
        .unwrap();

    repo.assert_file_not_exists("Parcels/Leftover");
    repo.assert_file_exists(".git/HEAD");

    let on_disk = from_file_tree(&repo.path(), &NormalizedPath::root()).unwrap();
    let in_store = from_store(&database.open(), &NormalizedPath::root()).unwrap();
    assert_eq!(on_disk.root, in_store.root);
}

#[test]
fn test_rerun_after_partial_commit_finishes_the_job() {
    let repo = TestRepo::new();
    let engine = SyncEngine::new(RecordingStore::new(city_schema()), repo.path()).unwrap();
    engine.extract().unwrap();

    repo.write_file("Parcels/Area/Area.js", "return 0;");
    fs::remove_dir_all(repo.root().join("Parcels/Owner")).unwrap();

    // First run: the delete is refused, the update still lands
    let first_store = RecordingStore::new(engine.into_store().schema().clone()).reject("Owner");
    let mut first = SyncEngine::new(first_store, repo.path()).unwrap();
    let report = first.commit().unwrap();
    assert_eq!(report.summary.updated, 1);
    assert_eq!(report.summary.failed, 1);

    // Second run against the same document only deletes
    let second_store = RecordingStore::new(first.into_store().schema().clone());
    let mut second = SyncEngine::new(second_store, repo.path()).unwrap();
    let report = second.commit().unwrap();

    assert_eq!(report.summary.updated, 0);
    assert_eq!(
        second.store().mutations(),
        vec![StoreCall::Delete {
            container: "Parcels".into(),
            name: "Owner".into()
        }]
    );
}

#[test]
fn test_subtree_round_trip_leaves_siblings_alone() {
    let database = Database::new(&city_schema());
    let repo = TestRepo::new();
    let utilities = NormalizedPath::new("Utilities");

    database
        .engine(&repo)
        .with_target(utilities.clone())
        .extract()
        .unwrap();
    repo.assert_file_exists("Water/Pipe Length/config.json");
    repo.assert_file_not_exists("Parcels");

    fs::remove_dir_all(repo.root().join("Water/Pipe Length")).unwrap();
    let report = database
        .engine(&repo)
        .with_target(utilities)
        .commit()
        .unwrap();
    assert_eq!(report.summary.deleted, 1);

    // Rules outside the target are untouched
    let store = database.open();
    assert_eq!(store.name(), "city.json");
    let tree = from_store(&store, &NormalizedPath::root()).unwrap();
    assert_eq!(tree.ids().into_iter().collect::<Vec<_>>(), vec![1, 2, 3]);
}
