mod common;

use album_tagger_core::{Album, Config, Error, ReconcileStrategy, SidecarStatus};
use common::{create_album, create_test_image, move_file, read_sidecar, write_sidecar};
use serde_json::json;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn sorted_paths(album: &Album) -> Vec<String> {
    let mut paths: Vec<String> = album
        .catalog()
        .unwrap()
        .images()
        .iter()
        .map(|e| e.image.relative_path.clone())
        .collect();
    paths.sort();
    paths
}

#[test]
fn test_non_images_do_not_reach_the_catalog() {
    let dir = create_album(&[
        "a.jpg",
        "b.JPG",
        "c.Png",
        "d.gif",
        "nested/e.jpeg",
        "notes.txt",
        "raw/f.cr2",
        "nested/deeper/g.webp",
    ]);

    let album = Album::new(Config::default());
    let report = album.open(dir.path()).unwrap();

    assert_eq!(report.images, 5);
    assert_eq!(report.sidecar, SidecarStatus::Missing);
    assert_eq!(
        sorted_paths(&album),
        vec!["a.jpg", "b.JPG", "c.Png", "d.gif", "nested/e.jpeg"]
    );
}

#[test]
fn test_tags_flow_into_catalog_and_sidecar() {
    let dir = create_album(&["a.jpg", "trip/b.jpg", "trip/c.jpg"]);
    let album = Album::new(Config::default());
    album.open(dir.path()).unwrap();

    album.add_tag("a.jpg", "home").unwrap();
    album.add_tag("trip/b.jpg", "beach").unwrap();
    album.add_tag("trip/b.jpg", "home").unwrap();

    let catalog = album.catalog().unwrap();
    let home: Vec<&str> = catalog
        .filter_by_tags(&["home"])
        .iter()
        .map(|e| e.image.relative_path.as_str())
        .collect();
    assert_eq!(home.len(), 2);
    assert_eq!(catalog.filter_by_tags(&["home", "beach"]).len(), 1);
    assert_eq!(catalog.filter_by_no_tags()[0].image.relative_path, "trip/c.jpg");

    assert_eq!(
        read_sidecar(dir.path()),
        json!({
            "a.jpg": { "tags": ["home"] },
            "trip/b.jpg": { "tags": ["beach", "home"] }
        })
    );
}

#[test]
fn test_tags_survive_rescan() {
    let dir = create_album(&["a.jpg"]);
    let album = Album::new(Config::default());
    album.open(dir.path()).unwrap();
    album.add_tag("a.jpg", "x").unwrap();

    let reopened = Album::new(Config::default());
    let report = reopened.open(dir.path()).unwrap();

    assert_eq!(report.sidecar, SidecarStatus::Loaded);
    assert!(report.reconcile.is_clean());
    assert!(reopened.catalog().unwrap().entry("a.jpg").unwrap().tags.contains("x"));
}

#[test]
fn test_moved_file_keeps_its_tags() {
    let dir = create_album(&["old/a.jpg", "old/b.jpg"]);
    write_sidecar(dir.path(), r#"{ "old/a.jpg": { "tags": ["x"] } }"#);
    move_file(dir.path(), "old/a.jpg", "new/a.jpg");

    let album = Album::new(Config::default());
    let report = album.open(dir.path()).unwrap();

    assert_eq!(report.reconcile.migrated.len(), 1);
    assert!(!report.unsaved_migrations);
    assert_eq!(read_sidecar(dir.path()), json!({ "new/a.jpg": { "tags": ["x"] } }));
    assert!(album.orphans().unwrap().is_empty());
}

#[test]
fn test_ambiguous_move_keeps_orphan() {
    let dir = create_album(&["one/a.jpg", "two/a.jpg"]);
    write_sidecar(dir.path(), r#"{ "old/a.jpg": { "tags": ["x"] } }"#);

    let album = Album::new(Config::default());
    let report = album.open(dir.path()).unwrap();

    assert!(report.reconcile.migrated.is_empty());
    assert_eq!(report.reconcile.unresolved.len(), 1);
    assert_eq!(album.orphans().unwrap(), vec!["old/a.jpg"]);
    assert!(album.catalog().unwrap().tags().is_empty());

    // Nothing migrated, so the sidecar is untouched
    assert_eq!(read_sidecar(dir.path()), json!({ "old/a.jpg": { "tags": ["x"] } }));
}

#[test]
fn test_merge_strategy_combines_tags() {
    let dir = create_album(&["new/a.jpg"]);
    write_sidecar(
        dir.path(),
        r#"{ "old/a.jpg": { "tags": ["moved"] }, "new/a.jpg": { "tags": ["kept"] } }"#,
    );

    let album = Album::new(Config {
        reconcile_strategy: ReconcileStrategy::Merge,
        ..Default::default()
    });
    album.open(dir.path()).unwrap();

    let catalog = album.catalog().unwrap();
    let entry = catalog.entry("new/a.jpg").unwrap();
    assert!(entry.tags.contains("moved"));
    assert!(entry.tags.contains("kept"));
}

#[test]
fn test_add_tag_requires_current_image() {
    let dir = create_album(&["a.jpg"]);
    let album = Album::new(Config::default());

    assert!(matches!(album.add_tag("a.jpg", "x"), Err(Error::NoRootSelected)));

    album.open(dir.path()).unwrap();
    assert!(matches!(album.add_tag("missing.jpg", "x"), Err(Error::UnknownImage(_))));
}

#[test]
fn test_orphan_tags_can_be_removed() {
    let dir = create_album(&["a.jpg"]);
    write_sidecar(dir.path(), r#"{ "gone.png": { "tags": ["x"] } }"#);

    let album = Album::new(Config::default());
    album.open(dir.path()).unwrap();
    assert!(album.remove_tag("gone.png", "x").unwrap());

    assert!(album.orphans().unwrap().is_empty());
    assert_eq!(read_sidecar(dir.path()), json!({}));
}

#[test]
fn test_failed_open_keeps_previous_state() {
    let dir = create_album(&["a.jpg"]);
    let album = Album::new(Config::default());
    album.open(dir.path()).unwrap();

    let missing = dir.path().join("does-not-exist");
    assert!(matches!(album.open(&missing), Err(Error::FileNotFound(_))));

    assert_eq!(album.root().as_deref(), Some(dir.path()));
    assert_eq!(sorted_paths(&album), vec!["a.jpg"]);
}

#[test]
fn test_selecting_a_new_root_replaces_the_catalog() {
    let first = create_album(&["a.jpg"]);
    let second = create_album(&["b.jpg", "c.png"]);
    let album = Album::new(Config::default());

    album.open(first.path()).unwrap();
    album.open(second.path()).unwrap();

    assert_eq!(album.root().as_deref(), Some(second.path()));
    assert_eq!(sorted_paths(&album), vec!["b.jpg", "c.png"]);
}

#[test]
fn test_corrupt_sidecar_policy() {
    let dir = create_album(&["a.jpg"]);
    write_sidecar(dir.path(), "not json at all");

    let lenient = Album::new(Config::default());
    let report = lenient.open(dir.path()).unwrap();
    assert_eq!(report.sidecar, SidecarStatus::Corrupt);
    assert_eq!(lenient.catalog().unwrap().len(), 1);

    let strict = Album::new(Config {
        corrupt_sidecar: album_tagger_core::CorruptSidecarPolicy::Fail,
        ..Default::default()
    });
    assert!(matches!(strict.open(dir.path()), Err(Error::Sidecar(_))));
}

#[test]
fn test_new_files_appear_on_rescan() {
    let dir = create_album(&["a.jpg"]);
    let album = Album::new(Config::default());
    album.open(dir.path()).unwrap();

    create_test_image(dir.path(), "later/b.gif");
    album.open(dir.path()).unwrap();

    assert_eq!(sorted_paths(&album), vec!["a.jpg", "later/b.gif"]);
}

#[test]
fn test_newer_selection_wins_over_slow_scan() {
    let large_files: Vec<String> = (0..20_000)
        .map(|i| format!("batch{}/img{}.jpg", i % 20, i))
        .collect();
    let large_refs: Vec<&str> = large_files.iter().map(String::as_str).collect();
    let large = create_album(&large_refs);
    let small = create_album(&["only.png"]);

    let album = Arc::new(Album::new(Config::default()));
    let slow_album = Arc::clone(&album);
    let large_root = large.path().to_path_buf();
    let slow = thread::spawn(move || slow_album.open(&large_root));

    // Give the slow open time to start walking before selecting again
    thread::sleep(Duration::from_millis(20));
    album.open(small.path()).unwrap();

    let slow_result = slow.join().unwrap();
    assert!(matches!(slow_result, Err(Error::Superseded(_))));
    assert_eq!(album.root().as_deref(), Some(small.path()));
    assert_eq!(sorted_paths(&album), vec!["only.png"]);
}

#[test]
fn test_reopening_same_root_keeps_live_tags() {
    let dir = create_album(&["a.jpg", "b.jpg"]);
    let album = Album::new(Config::default());
    album.open(dir.path()).unwrap();
    album.add_tag("a.jpg", "x").unwrap();

    // The sidecar on disk no longer has the tag when the rescan reads it
    write_sidecar(dir.path(), "{}");
    album.open(dir.path()).unwrap();

    let catalog = album.catalog().unwrap();
    assert!(catalog.entry("a.jpg").unwrap().tags.contains("x"));

    // The next write carries the tag back to disk
    album.add_tag("b.jpg", "y").unwrap();
    assert_eq!(
        read_sidecar(dir.path()),
        json!({
            "a.jpg": { "tags": ["x"] },
            "b.jpg": { "tags": ["y"] }
        })
    );
}

#[test]
fn test_save_rewrites_current_document() {
    let dir = create_album(&["a.jpg"]);
    let album = Album::new(Config::default());
    assert!(matches!(album.save(), Err(Error::NoRootSelected)));

    album.open(dir.path()).unwrap();
    album.add_tag("a.jpg", "x").unwrap();
    std::fs::remove_file(dir.path().join("metadata.json")).unwrap();

    album.save().unwrap();
    assert_eq!(read_sidecar(dir.path()), json!({ "a.jpg": { "tags": ["x"] } }));
}
