//! Test utilities shared across unit and integration tests.
//!
//! This module is always compiled but hidden from documentation.
//! It provides canonical implementations of markup and package fixtures so
//! unit tests, integration tests and benches build documents the same way.

#![doc(hidden)]

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::package::MAIN_DOCUMENT_PART;

/// WordprocessingML main namespace.
pub const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Wrap runs in one paragraph of a minimal `<w:document>`.
pub fn body(runs: &[String]) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <w:document xmlns:w=\"{}\"><w:body><w:p>{}</w:p></w:body></w:document>",
        W_NS,
        runs.concat()
    )
}

/// Wrap each group of runs in its own paragraph.
pub fn paragraphs(paras: &[Vec<String>]) -> String {
    let inner: String = paras
        .iter()
        .map(|runs| format!("<w:p>{}</w:p>", runs.concat()))
        .collect();
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <w:document xmlns:w=\"{}\"><w:body>{}</w:body></w:document>",
        W_NS, inner
    )
}

/// `<w:r><w:t xml:space="preserve">text</w:t></w:r>`. `text` is inserted
/// as-is, so it must already be escaped.
pub fn plain_run(text: &str) -> String {
    format!("<w:r><w:t xml:space=\"preserve\">{}</w:t></w:r>", text)
}

/// A run with `<w:rPr>{props}</w:rPr>`.
pub fn styled_run(props: &str, text: &str) -> String {
    format!(
        "<w:r><w:rPr>{}</w:rPr><w:t xml:space=\"preserve\">{}</w:t></w:r>",
        props, text
    )
}

/// Split `text` into one plain run per fragment, cutting at `cuts` (byte
/// offsets, must fall on character boundaries).
pub fn fragmented(text: &str, cuts: &[usize]) -> Vec<String> {
    let mut bounds = vec![0];
    bounds.extend(cuts.iter().copied().filter(|&c| c > 0 && c < text.len()));
    bounds.push(text.len());
    bounds.sort_unstable();
    bounds.dedup();

    bounds
        .windows(2)
        .map(|w| plain_run(&escape_text(&text[w[0]..w[1]])))
        .collect()
}

/// Escape text for use inside `<w:t>`.
pub fn escape_text(text: &str) -> String {
    quick_xml::escape::escape(text).into_owned()
}

const CONTENT_TYPES: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
<Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">\
<Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>\
<Default Extension=\"xml\" ContentType=\"application/xml\"/>\
<Override PartName=\"/word/document.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml\"/>\
</Types>";

const ROOT_RELS: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
<Relationship Id=\"rId1\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument\" Target=\"word/document.xml\"/>\
</Relationships>";

/// Builder for small in-memory `.docx` packages.
///
/// ```ignore
/// let bytes = DocxBuilder::new(&body(&[plain_run("{-w:p a}{a}{/a}")]))
///     .part("word/header1.xml", &header)
///     .build();
/// ```
pub struct DocxBuilder {
    parts: Vec<(String, Vec<u8>, CompressionMethod)>,
}

impl DocxBuilder {
    /// A package with content types, root relationships and `document`.
    pub fn new(document: &str) -> Self {
        Self {
            parts: vec![
                (
                    "[Content_Types].xml".to_string(),
                    CONTENT_TYPES.as_bytes().to_vec(),
                    CompressionMethod::Deflated,
                ),
                (
                    "_rels/.rels".to_string(),
                    ROOT_RELS.as_bytes().to_vec(),
                    CompressionMethod::Deflated,
                ),
                (
                    MAIN_DOCUMENT_PART.to_string(),
                    document.as_bytes().to_vec(),
                    CompressionMethod::Deflated,
                ),
            ],
        }
    }

    /// Add (or replace) a deflated part.
    pub fn part(self, name: &str, contents: &str) -> Self {
        self.raw_part(name, contents.as_bytes(), CompressionMethod::Deflated)
    }

    /// Add (or replace) a part with an explicit compression method.
    pub fn raw_part(mut self, name: &str, contents: &[u8], method: CompressionMethod) -> Self {
        self.parts.retain(|(n, _, _)| n != name);
        self.parts.push((name.to_string(), contents.to_vec(), method));
        self
    }

    /// Drop a part, e.g. to build a package without a main document.
    pub fn without(mut self, name: &str) -> Self {
        self.parts.retain(|(n, _, _)| n != name);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, contents, method) in &self.parts {
            let options = SimpleFileOptions::default().compression_method(*method);
            zip.start_file(name.as_str(), options)
                .expect("start zip entry");
            zip.write_all(contents).expect("write zip entry");
        }
        zip.finish().expect("finish zip").into_inner()
    }

    /// Build and write to `path`.
    pub fn write_to(&self, path: &std::path::Path) {
        std::fs::write(path, self.build()).expect("write docx fixture");
    }
}
