// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! `inspect`: how one part was split into runs, and what the matcher found.

use std::path::Path;

use docxfix::{scan, Error, Package, ScanReport, TextIndex};

use super::display;

/// Widest run text shown before truncation.
const RUN_TEXT_WIDTH: usize = 48;

pub fn run_inspect(file: &Path, part: &str) -> Result<(), String> {
    let mut package = Package::open(file).map_err(|e| e.to_string())?;
    let markup = package.read_part(part).map_err(|e| e.to_string())?;
    let index = TextIndex::build(&markup).map_err(|err| {
        Error::MalformedXml {
            path: file.to_path_buf(),
            part: part.to_string(),
            message: err.to_string(),
        }
        .to_string()
    })?;
    let report = scan(index.flat_text());

    println!();
    display::double_header();
    display::title(&format!("{} :: {}", display::truncate_path(&file.display().to_string(), 50), part));
    display::double_footer();

    print_package(&package, markup.len());
    print_runs(&markup, &index);
    print_flat_text(&index, &report);
    print_placeholders(&report);
    display::section_bot();
    println!();

    Ok(())
}

fn print_package(package: &Package, part_size: usize) {
    display::section_top("PACKAGE");
    display::row(&format!(" {:<14} {}", "Parts:", package.part_names().len()));
    display::row(&format!(" {:<14} {}", "Part size:", display::format_size(part_size)));
}

fn print_runs(markup: &[u8], index: &TextIndex) {
    display::section_mid(&format!("RUNS ({})", index.runs().len()));
    for (i, run) in index.runs().iter().enumerate() {
        let styled = if run.properties.is_some() { "rPr" } else { "   " };
        let text = if run.is_empty() {
            display::dim(if run.is_self_closing() { "<w:r/>" } else { "(no text)" })
        } else {
            format!("{:?}", display::truncate_end(index.run_text(i), RUN_TEXT_WIDTH))
        };
        display::row(&format!(
            " {:>4}  {:>6}..{:<6} {} {}",
            i,
            run.flat.start,
            run.flat.end,
            display::dim(styled),
            text
        ));
        tracing::trace!(run = i, bytes = %String::from_utf8_lossy(&markup[run.span.clone()]), "run markup");
    }
}

fn print_flat_text(index: &TextIndex, report: &ScanReport) {
    display::section_mid("FLAT TEXT");

    let flat = index.flat_text();
    let mut highlighted = String::new();
    let mut cursor = 0;
    for m in &report.matches {
        highlighted.push_str(&flat[cursor..m.flat_start]);
        highlighted.push_str(&display::highlight_token(&flat[m.range()]));
        cursor = m.flat_end;
    }
    highlighted.push_str(&flat[cursor..]);

    for line in wrap(&highlighted, display::BOX_WIDTH - 2) {
        display::row(&format!(" {}", line));
    }
}

fn print_placeholders(report: &ScanReport) {
    display::section_mid(&format!(
        "PLACEHOLDERS ({} legacy, {} canonical, {} malformed)",
        report.legacy_count(),
        report.canonical_count(),
        report.malformed.len()
    ));
    for m in &report.matches {
        display::row(&format!(
            " {} {:>6}..{:<6} {}",
            display::form_label(m.form),
            m.flat_start,
            m.flat_end,
            m.canonical_token()
        ));
    }
    for bad in &report.malformed {
        display::row(&format!(
            " {} {:>6}..{:<6} {} ({})",
            display::themed(display::RED, &[], "malformed"),
            bad.flat_start,
            bad.flat_end,
            display::truncate_end(&bad.text, 30),
            bad.reason
        ));
    }
}

/// Break styled text into lines of at most `width` visible characters.
/// Escape sequences never count toward the width and are never split.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut visible = 0;
    let mut in_escape = false;

    for c in text.chars() {
        if c == '\n' {
            lines.push(std::mem::take(&mut line));
            visible = 0;
            continue;
        }
        line.push(c);
        if c == '\x1b' {
            in_escape = true;
        } else if in_escape {
            in_escape = c != 'm';
        } else {
            visible += 1;
            if visible == width {
                lines.push(std::mem::take(&mut line));
                visible = 0;
            }
        }
    }
    if !line.is_empty() || lines.is_empty() {
        lines.push(line);
    }
    lines
}
