//! Everything that is not a legacy placeholder comes back untouched.

use super::common::*;
use docxfix::{normalize, NormalizeOptions, MAIN_DOCUMENT_PART};
use tempfile::TempDir;
use zip::CompressionMethod;

#[test]
fn test_untouched_runs_are_byte_identical() {
    let before_run = styled_run("<w:color w:val=\"1F4E79\"/><w:sz w:val=\"28\"/>", "Ordre du jour");
    let after_run = "<w:r w:rsidR=\"00A1\"><w:tab/><w:t>1. &lt;point&gt;</w:t></w:r>".to_string();
    let dir = TempDir::new().unwrap();
    let path = write_docx(
        &dir,
        "t.docx",
        &body(&[
            before_run.clone(),
            plain_run("{-w:p point}{point}{/point}"),
            after_run.clone(),
        ]),
    );

    normalize(&path, &NormalizeOptions::default()).unwrap();

    let xml = read_part(&path, MAIN_DOCUMENT_PART);
    assert!(xml.contains(&before_run));
    assert!(xml.contains(&after_run));
}

#[test]
fn test_markup_outside_runs_is_preserved() {
    let document = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <w:document xmlns:w=\"{}\"><w:body>\
         <w:p><w:pPr><w:jc w:val=\"center\"/></w:pPr>\
         <w:bookmarkStart w:id=\"0\" w:name=\"top\"/>{}<w:proofErr w:type=\"spellStart\"/>{}\
         <w:bookmarkEnd w:id=\"0\"/></w:p>\
         <w:sectPr><w:pgSz w:w=\"11906\" w:h=\"16838\"/></w:sectPr>\
         </w:body></w:document>",
        docxfix::testing::W_NS,
        plain_run("{-w:p a}{a"),
        plain_run("}{/a}")
    );
    let dir = TempDir::new().unwrap();
    let path = write_docx(&dir, "t.docx", &document);

    normalize(&path, &NormalizeOptions::default()).unwrap();

    let xml = read_part(&path, MAIN_DOCUMENT_PART);
    for fragment in [
        "<w:pPr><w:jc w:val=\"center\"/></w:pPr>",
        "<w:bookmarkStart w:id=\"0\" w:name=\"top\"/>",
        "<w:proofErr w:type=\"spellStart\"/>",
        "<w:bookmarkEnd w:id=\"0\"/>",
        "<w:sectPr><w:pgSz w:w=\"11906\" w:h=\"16838\"/></w:sectPr>",
    ] {
        assert!(xml.contains(fragment), "lost {}", fragment);
    }
    assert_eq!(flat_text(&xml), "{a}");
}

#[test]
fn test_other_parts_are_raw_copied() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("t.docx");
    DocxBuilder::new(&body(&[plain_run("{-w:p a}{a}{/a}")]))
        .part("word/styles.xml", "<w:styles/>")
        .raw_part("word/media/logo.png", b"\x89PNG\r\n\x1a\nfake", CompressionMethod::Stored)
        .write_to(&path);
    let before = entry_facts(&path);

    normalize(&path, &NormalizeOptions::default()).unwrap();

    let after = entry_facts(&path);
    assert_eq!(before.len(), after.len());
    for (old, new) in before.iter().zip(&after) {
        assert_eq!(old.0, new.0, "entry order changed");
        if old.0 == MAIN_DOCUMENT_PART {
            assert_ne!(old.1, new.1);
            assert_eq!(old.2, new.2, "compression method changed");
        } else {
            assert_eq!(old, new, "{} was not raw-copied", old.0);
        }
    }
}

#[test]
fn test_text_boxes_are_left_alone_but_their_runs_normalized() {
    let text_box = "<w:r><w:drawing><wps:txbx><w:txbxContent><w:p>\
        <w:r><w:t>{-w:p x}{x}{/x}</w:t></w:r>\
        </w:p></w:txbxContent></wps:txbx></w:drawing></w:r>";
    let dir = TempDir::new().unwrap();
    let path = write_docx(
        &dir,
        "t.docx",
        &body(&[plain_run("avant "), text_box.to_string()]),
    );

    normalize(&path, &NormalizeOptions::default()).unwrap();

    let xml = read_part(&path, MAIN_DOCUMENT_PART);
    assert_eq!(flat_text(&xml), "avant {x}");
    assert!(xml.contains("<w:drawing><wps:txbx><w:txbxContent><w:p><w:r><w:t>{x}</w:t></w:r>"));
}

#[test]
fn test_image_and_note_reference_inside_a_split_placeholder_survive() {
    let image = "<w:r><w:drawing><wp:inline><a:graphic><a:graphicData>\
        <pic:pic><pic:blipFill><a:blip r:embed=\"rId7\"/></pic:blipFill></pic:pic>\
        </a:graphicData></a:graphic></wp:inline></w:drawing></w:r>"
        .to_string();
    let note = "<w:r><w:rPr><w:rStyle w:val=\"FootnoteReference\"/></w:rPr>\
        <w:footnoteReference w:id=\"1\"/></w:r>"
        .to_string();
    let dir = TempDir::new().unwrap();
    let path = write_docx(
        &dir,
        "t.docx",
        &body(&[
            styled_run("<w:b/>", "{-w:p logo}{lo"),
            image.clone(),
            plain_run("go}{/lo"),
            note.clone(),
            plain_run("go}"),
        ]),
    );

    let report = normalize(&path, &NormalizeOptions::default()).unwrap();

    assert_eq!(report.rewritten(), 1);
    let xml = read_part(&path, MAIN_DOCUMENT_PART);
    assert_eq!(flat_text(&xml), "{logo}");
    assert!(xml.contains(&image));
    assert!(xml.contains(&note));
    let token = xml.find("{logo}").unwrap();
    assert!(token < xml.find(&image).unwrap());
    assert!(xml.find(&image).unwrap() < xml.find(&note).unwrap());
}
