//! Malformed wrappers and canonical placeholders are reported, never rewritten.

use super::common::*;
use docxfix::{normalize, MalformedReason, NormalizeOptions, SourceForm, Stage, MAIN_DOCUMENT_PART};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_mismatched_names_leave_file_untouched() {
    let dir = TempDir::new().unwrap();
    let path = write_docx(
        &dir,
        "t.docx",
        &body(&[plain_run("{-w:p foo}{foo}"), plain_run("{/bar}")]),
    );
    let original = fs::read(&path).unwrap();

    let report = normalize(&path, &NormalizeOptions::default()).unwrap();

    assert!(!report.changed);
    assert_eq!(report.stage, Stage::NoChangeNeeded);
    assert_eq!(fs::read(&path).unwrap(), original);
    let malformed = &report.parts[0].malformed;
    assert_eq!(malformed.len(), 1);
    assert_eq!(malformed[0].text, "{-w:p foo}{foo}{/bar}");
    assert_eq!(
        malformed[0].reason,
        MalformedReason::MismatchedName {
            expected: "foo".into(),
            found: "bar".into()
        }
    );
}

#[test]
fn test_malformed_next_to_valid_placeholder() {
    let dir = TempDir::new().unwrap();
    let path = write_docx(
        &dir,
        "t.docx",
        &body(&[plain_run("{-w:p a}{a} puis {-w:p b}{b}{/b}")]),
    );

    let report = normalize(&path, &NormalizeOptions::default()).unwrap();

    assert!(report.changed);
    assert_eq!(report.rewritten(), 1);
    assert_eq!(report.malformed(), 1);
    let xml = read_part(&path, MAIN_DOCUMENT_PART);
    assert_eq!(flat_text(&xml), "{-w:p a}{a} puis {b}");
}

#[test]
fn test_already_canonical_is_a_noop() {
    let dir = TempDir::new().unwrap();
    let path = write_docx(
        &dir,
        "t.docx",
        &body(&[plain_run("Le {date"), plain_run("Debut} à {lieu}")]),
    );
    let original = fs::read(&path).unwrap();

    let report = normalize(&path, &NormalizeOptions::default()).unwrap();

    assert!(!report.changed);
    assert_eq!(report.canonical(), 2);
    assert!(report.parts[0]
        .matches
        .iter()
        .all(|m| m.form == SourceForm::AlreadyCanonical));
    assert_eq!(fs::read(&path).unwrap(), original);
    assert!(!docxfix::backup_path(&path).exists());
}

#[test]
fn test_normalize_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let mut runs = five_run_split();
    runs.push(plain_run(" et {-w:p b}{b}{/b}"));
    let path = write_docx(&dir, "t.docx", &body(&runs));

    let first = normalize(&path, &NormalizeOptions::default()).unwrap();
    let after_first = fs::read(&path).unwrap();
    let second = normalize(&path, &NormalizeOptions::default()).unwrap();

    assert!(first.changed);
    assert_eq!(first.rewritten(), 2);
    assert!(!second.changed);
    assert_eq!(second.canonical(), 2);
    assert_eq!(fs::read(&path).unwrap(), after_first);
}
