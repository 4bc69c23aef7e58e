//! Placeholders spread over several runs.

use super::common::*;
use docxfix::{normalize, NormalizeOptions, MAIN_DOCUMENT_PART};
use tempfile::TempDir;

#[test]
fn test_five_run_split_becomes_one_token() {
    let dir = TempDir::new().unwrap();
    let path = write_docx(&dir, "convocation.docx", &body(&five_run_split()));

    let report = normalize(&path, &NormalizeOptions::default()).unwrap();

    assert!(report.changed);
    assert_eq!(report.rewritten(), 1);
    let xml = read_part(&path, MAIN_DOCUMENT_PART);
    assert_eq!(flat_text(&xml), "{dateDebut}");
    assert_eq!(run_texts(&xml), vec!["{dateDebut}"]);
    // the token takes the style of the run it started in
    assert!(xml.contains("<w:rPr><w:b/></w:rPr><w:t>{dateDebut}</w:t>"));
    assert!(!xml.contains("<w:i/>"));
}

#[test]
fn test_split_with_surrounding_text() {
    let dir = TempDir::new().unwrap();
    let mut runs = vec![plain_run("Réunion du ")];
    runs.extend(five_run_split());
    runs.push(plain_run(" à 14h"));
    let path = write_docx(&dir, "t.docx", &body(&runs));

    normalize(&path, &NormalizeOptions::default()).unwrap();

    let xml = read_part(&path, MAIN_DOCUMENT_PART);
    assert_eq!(flat_text(&xml), "Réunion du {dateDebut} à 14h");
    assert_eq!(run_texts(&xml), vec!["Réunion du ", "{dateDebut}", " à 14h"]);
}

#[test]
fn test_partial_runs_are_split_not_dropped() {
    let dir = TempDir::new().unwrap();
    let path = write_docx(
        &dir,
        "t.docx",
        &body(&[
            styled_run("<w:u w:val=\"single\"/>", "Le {-w:p lieu}{li"),
            plain_run("eu}{/lieu}, le {-w:p date}{date}{/date}."),
        ]),
    );

    let report = normalize(&path, &NormalizeOptions::default()).unwrap();

    assert_eq!(report.rewritten(), 2);
    let xml = read_part(&path, MAIN_DOCUMENT_PART);
    assert_eq!(flat_text(&xml), "Le {lieu}, le {date}.");
    assert_eq!(
        run_texts(&xml),
        vec!["Le ", "{lieu}", ", le ", "{date}", "."]
    );
    assert_eq!(xml.matches("<w:u w:val=\"single\"/>").count(), 2);
}

#[test]
fn test_placeholder_spanning_paragraphs() {
    let dir = TempDir::new().unwrap();
    let path = write_docx(
        &dir,
        "t.docx",
        &paragraphs(&[
            vec![plain_run("Objet : {-w:p objet}")],
            vec![plain_run("{objet}{/objet}"), plain_run(" fin")],
        ]),
    );

    normalize(&path, &NormalizeOptions::default()).unwrap();

    let xml = read_part(&path, MAIN_DOCUMENT_PART);
    assert_eq!(flat_text(&xml), "Objet : {objet} fin");
    assert_eq!(xml.matches("<w:p>").count(), 2);
}

#[test]
fn test_every_fragmentation_of_a_placeholder() {
    let text = "a{-w:p x1}{x1}{/x1}b";
    let dir = TempDir::new().unwrap();

    for cut_a in 0..text.len() {
        for cut_b in cut_a..text.len() {
            let path = write_docx(&dir, "t.docx", &body(&fragmented(text, &[cut_a, cut_b])));
            normalize(
                &path,
                &NormalizeOptions {
                    backup: false,
                    ..Default::default()
                },
            )
            .unwrap();
            let xml = read_part(&path, MAIN_DOCUMENT_PART);
            assert_eq!(flat_text(&xml), "a{x1}b", "cuts at {} and {}", cut_a, cut_b);
        }
    }
}
