//! End-to-end tests: parse snapshot files, classify, serialize, read back,
//! and flatten to delimited rows.

use reg_differ::{
    classify, read_document, write_document, write_records, Action, DiffDocument, DiffMetadata,
    FlattenConfig, Snapshot,
};
use std::fs;
use std::path::{Path, PathBuf};

fn write_file(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn metadata() -> DiffMetadata {
    DiffMetadata {
        baseline_file: "before.reg".into(),
        baseline_hash: "aa11".into(),
        delta_file: "after.reg".into(),
        delta_hash: "bb22".into(),
        app_name: "SampleApp".into(),
        nsrl_id: Some("4711".into()),
        action: Action::Install,
        host_arch: "x86_64".into(),
        host_system_name: "lab-01".into(),
        host_os_name: "Windows".into(),
        host_os_version: "10.0".into(),
        user: "analyst".into(),
        timestamp: "2026-08-31T12:00:00Z".into(),
    }
}

const BASELINE: &str = "Windows Registry Editor Version 5.00\r\n\
\r\n\
[HKEY_LOCAL_MACHINE\\Software\\Sample]\r\n\
\"Ver\"=\"1.0\"\r\n\
\"Keep\"=\"same\"\r\n\
\r\n\
[HKEY_LOCAL_MACHINE\\Software\\Obsolete]\r\n\
\"Old\"=\"x\"\r\n";

const DELTA: &str = "Windows Registry Editor Version 5.00\r\n\
\r\n\
[HKEY_LOCAL_MACHINE\\Software\\Sample]\r\n\
\"Ver\"=\"2.0\"\r\n\
\"Keep\"=\"same\"\r\n\
\"New\"=\"y\"\r\n\
\r\n\
[HKEY_LOCAL_MACHINE\\Software\\Fresh]\r\n";

#[test]
fn test_full_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let baseline_path = write_file(dir.path(), "before.reg", BASELINE.as_bytes());
    let delta_path = write_file(dir.path(), "after.reg", DELTA.as_bytes());

    let baseline = Snapshot::open(&baseline_path).unwrap();
    let delta = Snapshot::open(&delta_path).unwrap();
    assert!(baseline.malformed_lines.is_empty());

    let diff = classify(&baseline, &delta);
    assert_eq!(diff.keys_added.len(), 1);
    assert_eq!(diff.keys_added[0].path, "HKEY_LOCAL_MACHINE\\Software\\Fresh");
    assert_eq!(diff.keys_deleted.len(), 1);
    assert_eq!(
        diff.keys_deleted[0].path,
        "HKEY_LOCAL_MACHINE\\Software\\Obsolete"
    );
    assert_eq!(diff.values_added.len(), 1);
    assert_eq!(diff.values_added[0].name, "New");
    assert_eq!(diff.values_deleted.len(), 1);
    assert_eq!(diff.values_deleted[0].name, "Old");
    assert_eq!(diff.values_modified.len(), 1);
    assert_eq!(diff.values_modified[0].data, "\"2.0\"");

    // Serialize, persist, read back.
    let document = DiffDocument::new(metadata(), diff);
    let doc_path = write_file(dir.path(), "diff.xml", write_document(&document).as_bytes());
    let restored = read_document(&fs::read_to_string(&doc_path).unwrap()).unwrap();
    assert_eq!(restored, document);

    // Flatten in emission order: add keys, add values, del keys, del
    // values, mod values.
    let mut out = Vec::new();
    let written = write_records(&restored, &mut out, &FlattenConfig::default()).unwrap();
    assert_eq!(written, 5);

    let text = String::from_utf8(out).unwrap();
    let rows: Vec<&str> = text.lines().collect();
    assert!(rows[0].starts_with("add\t") && rows[0].contains("\tkey\t"));
    assert!(rows[1].starts_with("add\t") && rows[1].contains("\tNew\t"));
    assert!(rows[2].starts_with("del\t") && rows[2].contains("\tkey\t"));
    assert!(rows[3].starts_with("del\t") && rows[3].contains("\tOld\t"));
    assert!(rows[4].starts_with("mod\t") && rows[4].contains("\t\"2.0\""));
}

#[test]
fn test_utf16le_snapshot_file() {
    let dir = tempfile::tempdir().unwrap();

    let mut raw = vec![0xFF, 0xFE];
    for unit in "REGEDIT4\n[HKLM\\U16]\n\"A\"=\"1\"\n".encode_utf16() {
        raw.extend_from_slice(&unit.to_le_bytes());
    }
    let path = write_file(dir.path(), "utf16.reg", &raw);

    let snapshot = Snapshot::open(&path).unwrap();
    assert!(snapshot.keys.contains_key("HKLM\\U16"));
    assert_eq!(snapshot.values["HKLM\\U16\\A"].data, "\"1\"");
}

#[test]
fn test_malformed_lines_collected_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        dir.path(),
        "bad.reg",
        b"REGEDIT4\n[HKLM\\X]\nBadName=1\n\"Good\"=\"1\"\n",
    );

    let snapshot = Snapshot::open(&path).unwrap();
    assert_eq!(snapshot.malformed_lines, vec!["[HKLM\\X] BadName=1"]);
    assert_eq!(snapshot.values.len(), 1);
}

#[test]
fn test_truncated_document_is_rejected() {
    let document = DiffDocument::new(metadata(), Default::default());
    let text = write_document(&document);
    let truncated = &text[..text.len() / 2];
    assert!(read_document(truncated).is_err());
}

#[test]
fn test_identical_files_produce_empty_sections() {
    let baseline = Snapshot::parse(BASELINE.lines());
    let delta = Snapshot::parse(BASELINE.lines());
    let document = DiffDocument::new(metadata(), classify(&baseline, &delta));

    let restored = read_document(&write_document(&document)).unwrap();
    assert!(restored.diff.is_empty());

    let mut out = Vec::new();
    let written = write_records(&restored, &mut out, &FlattenConfig::default()).unwrap();
    assert_eq!(written, 0);
    assert!(out.is_empty());
}
