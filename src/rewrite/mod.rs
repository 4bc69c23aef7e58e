// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Splicing canonical tokens back into the markup.
//!
//! Given the legacy matches of a part and the index it was scanned from, the
//! rewriter produces a [`RewritePlan`]: one edit per touched run, each edit
//! replacing exactly that run's bytes. Markup between runs (paragraph
//! boundaries, proofing marks, bookmarks) is never part of an edit, so it stays
//! where it was.
//!
//! # Splice policy
//!
//! For a run touched by one or more matches, the run is cut at every match
//! boundary that falls inside it:
//!
//! ```text
//!   <w:r>[ kept ][ match ... ][ kept ][ match ... ][ kept ]</w:r>
//!         │        │           │        │           │
//!         ▼        ▼           ▼        ▼           ▼
//!   prefix run   replacement  middle  replacement  suffix run
//!                (only in the run owning the match's first character)
//! ```
//!
//! - Kept pieces are re-emitted in a run with the original open tag and
//!   `<w:rPr>`. Whole `<w:t>` elements are copied verbatim; cut ones are
//!   re-escaped into a fresh `<w:t xml:space="preserve">`.
//! - The replacement run carries the open tag and properties of the run that
//!   owns the match's first character, so the token keeps the styling the
//!   placeholder started with.
//! - Text inside a match disappears with it. A run left with nothing but
//!   `<w:rPr>` and whitespace disappears too. Empty runs sitting on a match
//!   boundary are not touched.
//! - Non-text children strictly inside a match (drawings, `<w:fldChar>`,
//!   note references, `<w:tab/>`...) are carried out of it: each covered run
//!   re-emits them, wrapped in its own tags, right after the replacement. Those
//!   on a boundary stay in the adjacent kept run.
//!
//! Edits are disjoint and sorted, so [`RewritePlan::apply`] walks them back to
//! front and splices each into a copy of the original bytes without
//! recomputing any offset.

use std::collections::BTreeMap;
use std::ops::Range;

use quick_xml::escape::escape;

use crate::text_index::{Run, RunPiece, TextIndex};
use crate::types::PlaceholderMatch;

/// Replace the bytes of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunEdit {
    /// Index into [`TextIndex::runs`].
    pub run: usize,
    /// Byte span of that run in the original markup.
    pub span: Range<usize>,
    /// Zero or more runs to put in its place.
    pub replacement: Vec<u8>,
}

/// Every edit needed to normalize one part, in ascending byte order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewritePlan {
    edits: Vec<RunEdit>,
    rewritten: usize,
}

impl RewritePlan {
    pub fn edits(&self) -> &[RunEdit] {
        &self.edits
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Number of legacy placeholders the plan rewrites.
    pub fn rewritten(&self) -> usize {
        self.rewritten
    }

    /// Apply the plan to a copy of `markup`. `markup` must be the bytes the
    /// plan was built from.
    pub fn apply(&self, markup: &[u8]) -> Vec<u8> {
        let grown: usize = self.edits.iter().map(|e| e.replacement.len()).sum();
        let mut out = Vec::with_capacity(markup.len() + grown);
        out.extend_from_slice(markup);

        for edit in self.edits.iter().rev() {
            out.splice(edit.span.clone(), edit.replacement.iter().copied());
        }
        out
    }
}

/// Build the edits for the legacy matches among `matches`. Canonical matches
/// are ignored.
pub fn plan(markup: &[u8], index: &TextIndex, matches: &[PlaceholderMatch]) -> RewritePlan {
    let mut hits: BTreeMap<usize, Vec<&PlaceholderMatch>> = BTreeMap::new();
    let mut rewritten = 0;

    for m in matches.iter().filter(|m| m.is_legacy()) {
        let covering = index.covering_runs(m.range());
        if covering.is_empty() {
            continue;
        }
        rewritten += 1;
        for run in covering {
            hits.entry(run).or_default().push(m);
        }
    }

    let edits = hits
        .into_iter()
        .map(|(run, run_hits)| {
            let target = &index.runs()[run];
            RunEdit {
                run,
                span: target.span.clone(),
                replacement: rewrite_run(markup, target, &run_hits),
            }
        })
        .collect();

    let plan = RewritePlan { edits, rewritten };
    crate::verify::contracts::check_plan_well_formed(index, &plan);
    plan
}

/// Plan and apply in one step. Returns a new buffer; `markup` is untouched.
pub fn apply(markup: &[u8], index: &TextIndex, matches: &[PlaceholderMatch]) -> Vec<u8> {
    plan(markup, index, matches).apply(markup)
}

/// The bytes that replace `run`, given the matches touching it (sorted).
fn rewrite_run(markup: &[u8], run: &Run, hits: &[&PlaceholderMatch]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut cursor = run.flat.start;

    for m in hits {
        if m.flat_start >= cursor {
            emit_kept(&mut out, markup, run, cursor, m.flat_start);
        }
        if run.owns(m.flat_start) {
            emit_replacement(&mut out, markup, run, m);
        }
        emit_carried(&mut out, markup, run, m.flat_start, m.flat_end);
        cursor = cursor.max(m.flat_end);
    }
    if cursor <= run.flat.end {
        emit_kept(&mut out, markup, run, cursor, run.flat.end);
    }

    out
}

/// Re-emit the pieces of `run` inside the closed flat interval `[from, to]`,
/// wrapped in a copy of the run. Emits nothing if no piece lands there.
fn emit_kept(out: &mut Vec<u8>, markup: &[u8], run: &Run, from: usize, to: usize) {
    let mut body = Vec::new();
    let mut has_content = false;

    for piece in &run.pieces {
        match piece {
            RunPiece::Text {
                span,
                text,
                flat_start,
            } => {
                let end = flat_start + text.len();
                let lo = (*flat_start).max(from);
                let hi = end.min(to);
                if lo >= hi {
                    continue;
                }
                has_content = true;
                if lo == *flat_start && hi == end {
                    body.extend_from_slice(&markup[span.clone()]);
                } else {
                    write_text(&mut body, &text[lo - flat_start..hi - flat_start]);
                }
            }
            RunPiece::Markup { span, flat_offset } => {
                if from <= *flat_offset && *flat_offset <= to {
                    let bytes = &markup[span.clone()];
                    has_content |= !bytes.iter().all(u8::is_ascii_whitespace);
                    body.extend_from_slice(bytes);
                }
            }
        }
    }

    if has_content {
        wrap(out, markup, run, &body);
    }
}

/// Re-emit the non-text pieces of `run` pinned strictly inside the match
/// `(from, to)`, wrapped in a copy of the run.
fn emit_carried(out: &mut Vec<u8>, markup: &[u8], run: &Run, from: usize, to: usize) {
    let mut body = Vec::new();

    for piece in &run.pieces {
        if let RunPiece::Markup { span, flat_offset } = piece {
            let bytes = &markup[span.clone()];
            if from < *flat_offset
                && *flat_offset < to
                && !bytes.iter().all(u8::is_ascii_whitespace)
            {
                body.extend_from_slice(bytes);
            }
        }
    }

    if !body.is_empty() {
        wrap(out, markup, run, &body);
    }
}

fn emit_replacement(out: &mut Vec<u8>, markup: &[u8], run: &Run, m: &PlaceholderMatch) {
    let mut body = Vec::new();
    body.extend_from_slice(b"<w:t>");
    body.extend_from_slice(m.canonical_token().as_bytes());
    body.extend_from_slice(b"</w:t>");
    wrap(out, markup, run, &body);
}

/// `<w:r ...><w:rPr>...</w:rPr>{body}</w:r>` using the run's own tags.
fn wrap(out: &mut Vec<u8>, markup: &[u8], run: &Run, body: &[u8]) {
    out.extend_from_slice(&markup[run.open_tag.clone()]);
    if let Some(properties) = &run.properties {
        out.extend_from_slice(&markup[properties.clone()]);
    }
    out.extend_from_slice(body);
    out.extend_from_slice(&markup[run.close_tag.clone()]);
}

fn write_text(out: &mut Vec<u8>, text: &str) {
    out.extend_from_slice(b"<w:t xml:space=\"preserve\">");
    out.extend_from_slice(escape(text).as_bytes());
    out.extend_from_slice(b"</w:t>");
}
