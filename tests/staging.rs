mod common;

use data_import::discovery::RawFileRef;
use data_import::staging::{archive_outputs, stage_files};
use data_import::PipelineError;

use common::write_file;

fn refs(names: &[&str]) -> Vec<RawFileRef> {
    names
        .iter()
        .map(|n| RawFileRef::classify(n).unwrap())
        .collect()
}

#[test]
fn stage_moves_files_and_creates_directory() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_file(root, "a.csv", "a\n1\n");
    write_file(root, "b.json", "{}");
    let staging = root.join("unprocessed_data");

    let staged = stage_files(&refs(&["a.csv", "b.json"]), root, &staging).unwrap();

    assert_eq!(staged.len(), 2);
    assert!(staging.join("a.csv").exists());
    assert!(staging.join("b.json").exists());
    assert!(!root.join("a.csv").exists());
    assert_eq!(std::fs::read_to_string(staging.join("a.csv")).unwrap(), "a\n1\n");
}

#[test]
fn stage_skips_files_that_cannot_be_moved() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_file(root, "present.csv", "a\n1\n");
    let staging = root.join("unprocessed_data");

    let staged = stage_files(&refs(&["gone.csv", "present.csv"]), root, &staging).unwrap();

    assert_eq!(staged, refs(&["present.csv"]));
    assert!(staging.join("present.csv").exists());
}

#[test]
fn stage_into_existing_directory_is_fine() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    let staging = root.join("unprocessed_data");
    std::fs::create_dir(&staging).unwrap();
    write_file(root, "a.csv", "a\n");

    let staged = stage_files(&refs(&["a.csv"]), root, &staging).unwrap();
    assert_eq!(staged.len(), 1);
}

#[test]
fn stage_fails_when_directory_cannot_be_created() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    // A regular file where the staging directory should go.
    write_file(root, "unprocessed_data", "blocker");
    write_file(root, "a.csv", "a\n");

    let err = stage_files(&refs(&["a.csv"]), root, &root.join("unprocessed_data")).unwrap_err();

    assert!(matches!(err, PipelineError::Io { .. }));
    assert!(root.join("a.csv").exists());
}

#[test]
fn archive_moves_every_output_csv() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_file(root, "alpha.csv", "a\n1\n");
    write_file(root, "beta.csv", "b\n2\n");
    let processed = root.join("processed_data");

    archive_outputs(["alpha", "beta"], root, &processed).unwrap();

    assert!(processed.join("alpha.csv").exists());
    assert!(processed.join("beta.csv").exists());
    assert!(!root.join("alpha.csv").exists());
}

#[test]
fn archive_fails_on_missing_output() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_file(root, "alpha.csv", "a\n1\n");

    let err = archive_outputs(["alpha", "missing"], root, &root.join("processed_data")).unwrap_err();

    match err {
        PipelineError::Io { path, .. } => assert!(path.ends_with("missing.csv")),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(root.join("processed_data/alpha.csv").exists());
}
