//! Backups, dry runs, extra parts and atomic replacement.

use super::common::*;
use docxfix::{normalize, Error, NormalizeOptions, Stage, MAIN_DOCUMENT_PART};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_backup_holds_the_original_bytes() {
    let dir = TempDir::new().unwrap();
    let path = write_docx(&dir, "t.docx", &body(&five_run_split()));
    let original = fs::read(&path).unwrap();

    let report = normalize(&path, &NormalizeOptions::default()).unwrap();

    let backup = report.backup.expect("backup written");
    assert_eq!(backup, dir.path().join("t.docx.backup"));
    assert_eq!(fs::read(&backup).unwrap(), original);
    assert_eq!(dir_listing(dir.path()), vec!["t.docx", "t.docx.backup"]);
}

#[test]
fn test_rebuild_leaves_no_temporary_files() {
    let dir = TempDir::new().unwrap();
    let path = write_docx(&dir, "t.docx", &body(&[plain_run("{-w:p a}{a}{/a}")]));

    normalize(
        &path,
        &NormalizeOptions {
            backup: false,
            ..Default::default()
        },
    )
    .unwrap();

    assert_eq!(dir_listing(dir.path()), vec!["t.docx"]);
}

#[test]
fn test_dry_run_reports_without_writing() {
    let dir = TempDir::new().unwrap();
    let path = write_docx(&dir, "t.docx", &body(&five_run_split()));
    let original = fs::read(&path).unwrap();

    let report = normalize(
        &path,
        &NormalizeOptions {
            dry_run: true,
            ..Default::default()
        },
    )
    .unwrap();

    assert!(report.changed);
    assert_eq!(report.stage, Stage::Done);
    assert_ne!(report.parts[0].crc32_before, report.parts[0].crc32_after);
    assert_eq!(fs::read(&path).unwrap(), original);
    assert_eq!(dir_listing(dir.path()), vec!["t.docx"]);
}

#[test]
fn test_headers_are_normalized_when_requested() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("t.docx");
    DocxBuilder::new(&body(&[plain_run("{-w:p a}{a}{/a}")]))
        .part(
            "word/header1.xml",
            &header_part(&[plain_run("{-w:p ref}"), plain_run("{ref}{/ref}")]),
        )
        .write_to(&path);

    let report = normalize(
        &path,
        &NormalizeOptions {
            parts: vec![MAIN_DOCUMENT_PART.into(), "word/header1.xml".into()],
            ..Default::default()
        },
    )
    .unwrap();

    assert_eq!(report.parts.len(), 2);
    assert_eq!(report.rewritten(), 2);
    assert_eq!(flat_text(&read_part(&path, "word/header1.xml")), "{ref}");
    assert_eq!(flat_text(&read_part(&path, MAIN_DOCUMENT_PART)), "{a}");
}

#[test]
fn test_default_parts_leave_headers_alone() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("t.docx");
    let header = header_part(&[plain_run("{-w:p ref}{ref}{/ref}")]);
    DocxBuilder::new(&body(&[plain_run("{-w:p a}{a}{/a}")]))
        .part("word/header1.xml", &header)
        .write_to(&path);

    normalize(&path, &NormalizeOptions::default()).unwrap();

    assert_eq!(read_part(&path, "word/header1.xml"), header);
}

#[test]
fn test_failures_leave_the_original_in_place() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("t.docx");
    DocxBuilder::new("<w:document><w:body><w:p><w:r><w:t>{-w:p a}{a}{/a}</w:t></w:p></w:body></w:document>")
        .write_to(&path);
    let original = fs::read(&path).unwrap();

    let err = normalize(&path, &NormalizeOptions::default()).unwrap_err();

    assert!(matches!(err, Error::MalformedXml { .. }));
    assert!(err.to_string().contains(MAIN_DOCUMENT_PART));
    assert_eq!(fs::read(&path).unwrap(), original);
    assert_eq!(dir_listing(dir.path()), vec!["t.docx"]);
}

#[test]
fn test_package_without_main_document() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("t.docx");
    DocxBuilder::new("").without(MAIN_DOCUMENT_PART).write_to(&path);

    let err = normalize(&path, &NormalizeOptions::default()).unwrap_err();

    match err {
        Error::PartNotFound { part, .. } => assert_eq!(part, MAIN_DOCUMENT_PART),
        other => panic!("expected PartNotFound, got {other:?}"),
    }
}

#[cfg(unix)]
#[test]
fn test_rewrite_keeps_file_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let path = write_docx(&dir, "t.docx", &body(&five_run_split()));
    fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

    let report = normalize(&path, &NormalizeOptions::default()).unwrap();

    assert!(report.changed);
    let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o644);
}
