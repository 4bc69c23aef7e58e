// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Flat text of a WordprocessingML part, with a map back to the runs.
//!
//! Word splits what reads as one string across as many `<w:r>` elements as it
//! likes: a spell-check mark, a bold letter, an undo boundary. A placeholder
//! typed in one go can come back as five runs. Matching therefore happens on
//! the *flat text* (every run's decoded `<w:t>` content, concatenated in
//! document order) and this module keeps the bookkeeping needed to get from a
//! flat offset back to bytes in the original markup.
//!
//! # Building
//!
//! One pass of a streaming XML reader, recording the byte position before and
//! after every event. Each `<w:r>` collects its direct children as pieces;
//! `<w:t>` children are decoded (entities, CDATA) into text. A second pass
//! lays the runs out in document order and assigns flat offsets.
//!
//! # Invariants
//!
//! - Concatenating `runs[i].text()` for all `i` reproduces `flat_text()`.
//! - `runs[i].flat.end == runs[i + 1].flat.start`: the mapping is monotonic
//!   and total over `0..flat_text().len()`.
//! - Runs with no text are kept, with `flat.start == flat.end`.
//!
//! A run that contains other runs (a text box inside a drawing) is treated as
//! opaque markup: its inner runs are indexed, the outer run is not, and its own
//! text is left out of the flat text.

mod run;

pub use run::{Run, RunPiece};

use std::ops::Range;

use quick_xml::events::Event;
use quick_xml::Reader;

const RUN: &[u8] = b"w:r";
const TEXT: &[u8] = b"w:t";
const RUN_PROPERTIES: &[u8] = b"w:rPr";

/// The part's markup could not be tokenized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("at byte {offset}: {message}")]
pub struct MarkupError {
    pub offset: usize,
    pub message: String,
}

impl MarkupError {
    fn new(offset: usize, message: impl ToString) -> Self {
        Self {
            offset,
            message: message.to_string(),
        }
    }
}

/// Flat text plus the runs that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextIndex {
    flat: String,
    runs: Vec<Run>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChildKind {
    Text,
    Properties,
    Markup,
}

fn child_kind(name: &[u8]) -> ChildKind {
    match name {
        TEXT => ChildKind::Text,
        RUN_PROPERTIES => ChildKind::Properties,
        _ => ChildKind::Markup,
    }
}

struct OpenChild {
    kind: ChildKind,
    start: usize,
    text: String,
}

enum RawPiece {
    Text { span: Range<usize>, text: String },
    Markup { span: Range<usize> },
}

struct RawRun {
    span: Range<usize>,
    open_tag: Range<usize>,
    close_tag: Range<usize>,
    properties: Option<Range<usize>>,
    pieces: Vec<RawPiece>,
}

struct OpenRun {
    open_tag: Range<usize>,
    /// Element depth of the `<w:r>` itself.
    depth: usize,
    properties: Option<Range<usize>>,
    pieces: Vec<RawPiece>,
    child: Option<OpenChild>,
    nested: bool,
}

impl OpenRun {
    fn new(open_tag: Range<usize>, depth: usize) -> Self {
        Self {
            open_tag,
            depth,
            properties: None,
            pieces: Vec::new(),
            child: None,
            nested: false,
        }
    }

    fn push_child(&mut self, kind: ChildKind, span: Range<usize>, text: String) {
        match kind {
            ChildKind::Text => self.pieces.push(RawPiece::Text { span, text }),
            ChildKind::Properties => self.properties = Some(span),
            ChildKind::Markup => self.pieces.push(RawPiece::Markup { span }),
        }
    }

    fn finish(self, close_tag: Range<usize>) -> RawRun {
        RawRun {
            span: self.open_tag.start..close_tag.end,
            open_tag: self.open_tag,
            close_tag,
            properties: self.properties,
            pieces: self.pieces,
        }
    }
}

impl TextIndex {
    /// Index one XML part.
    pub fn build(markup: &[u8]) -> Result<Self, MarkupError> {
        let raw_runs = collect_runs(markup)?;
        let index = layout(raw_runs);
        crate::verify::contracts::check_index_well_formed(&index);
        Ok(index)
    }

    pub fn flat_text(&self) -> &str {
        &self.flat
    }

    /// Runs in document order.
    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    /// Flat text produced by run `run`.
    pub fn run_text(&self, run: usize) -> &str {
        &self.flat[self.runs[run].flat.clone()]
    }

    /// Which run produced the character at `offset`, and where inside that
    /// run's text it sits. `None` at or past the end of the flat text.
    pub fn locate(&self, offset: usize) -> Option<(usize, usize)> {
        if offset >= self.flat.len() {
            return None;
        }
        let run = self.runs.partition_point(|r| r.flat.end <= offset);
        let found = self.runs.get(run)?;
        debug_assert!(found.owns(offset));
        Some((run, offset - found.flat.start))
    }

    /// Indices of the runs a flat range touches: every run sharing at least one
    /// character with it, plus empty runs strictly inside it. Empty runs sitting
    /// exactly on either boundary are not included.
    pub fn covering_runs(&self, range: Range<usize>) -> Range<usize> {
        let first = self.runs.partition_point(|r| r.flat.end <= range.start);
        if range.is_empty() {
            return first..first;
        }
        let last = self.runs.partition_point(|r| r.flat.start < range.end);
        first..last.max(first)
    }
}

/// Pass one: find every run and its direct children.
fn collect_runs(markup: &[u8]) -> Result<Vec<RawRun>, MarkupError> {
    let mut reader = Reader::from_reader(markup);
    let mut depth = 0usize;
    let mut open: Vec<OpenRun> = Vec::new();
    let mut closed: Vec<RawRun> = Vec::new();

    loop {
        let start = reader.buffer_position() as usize;
        let event = reader
            .read_event()
            .map_err(|err| MarkupError::new(start, err))?;
        let end = reader.buffer_position() as usize;

        match event {
            Event::Start(e) => {
                let name = e.name();
                if let Some(run) = open.last_mut() {
                    if depth == run.depth + 1 && run.child.is_none() {
                        run.child = Some(OpenChild {
                            kind: child_kind(name.as_ref()),
                            start,
                            text: String::new(),
                        });
                    }
                }
                if name.as_ref() == RUN {
                    for outer in &mut open {
                        outer.nested = true;
                    }
                    open.push(OpenRun::new(start..end, depth));
                }
                depth += 1;
            }
            Event::Empty(e) => {
                let name = e.name();
                if name.as_ref() == RUN {
                    for outer in &mut open {
                        outer.nested = true;
                    }
                    closed.push(RawRun {
                        span: start..end,
                        open_tag: start..end,
                        close_tag: end..end,
                        properties: None,
                        pieces: Vec::new(),
                    });
                } else if let Some(run) = open.last_mut() {
                    if depth == run.depth + 1 {
                        run.push_child(child_kind(name.as_ref()), start..end, String::new());
                    }
                }
            }
            Event::Text(e) => {
                if let Some(run) = open.last_mut() {
                    if depth == run.depth + 1 {
                        run.pieces.push(RawPiece::Markup { span: start..end });
                    } else if depth == run.depth + 2 {
                        if let Some(child) = run.child.as_mut().filter(|c| c.kind == ChildKind::Text) {
                            let text = e.unescape().map_err(|err| MarkupError::new(start, err))?;
                            child.text.push_str(&text);
                        }
                    }
                }
            }
            Event::CData(e) => {
                if let Some(run) = open.last_mut() {
                    if depth == run.depth + 1 {
                        run.pieces.push(RawPiece::Markup { span: start..end });
                    } else if depth == run.depth + 2 {
                        if let Some(child) = run.child.as_mut().filter(|c| c.kind == ChildKind::Text) {
                            child.text.push_str(&String::from_utf8_lossy(&e[..]));
                        }
                    }
                }
            }
            Event::Comment(_) | Event::PI(_) => {
                if let Some(run) = open.last_mut() {
                    if depth == run.depth + 1 {
                        run.pieces.push(RawPiece::Markup { span: start..end });
                    }
                }
            }
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                let closes_run = open.last().is_some_and(|run| run.depth == depth);
                if closes_run {
                    if let Some(run) = open.pop() {
                        if !run.nested {
                            closed.push(run.finish(start..end));
                        }
                    }
                } else if let Some(run) = open.last_mut() {
                    if depth == run.depth + 1 {
                        if let Some(child) = run.child.take() {
                            run.push_child(child.kind, child.start..end, child.text);
                        }
                    }
                }
            }
            Event::Eof => {
                if !open.is_empty() {
                    return Err(MarkupError::new(start, "unexpected end of part inside <w:r>"));
                }
                break;
            }
            _ => {}
        }
    }

    Ok(closed)
}

/// Pass two: document order and flat offsets.
fn layout(mut raw_runs: Vec<RawRun>) -> TextIndex {
    raw_runs.sort_by_key(|r| r.span.start);

    let mut flat = String::new();
    let mut runs = Vec::with_capacity(raw_runs.len());

    for raw in raw_runs {
        let flat_start = flat.len();
        let mut pieces = Vec::with_capacity(raw.pieces.len());
        for piece in raw.pieces {
            match piece {
                RawPiece::Text { span, text } => {
                    let piece_start = flat.len();
                    flat.push_str(&text);
                    pieces.push(RunPiece::Text {
                        span,
                        text,
                        flat_start: piece_start,
                    });
                }
                RawPiece::Markup { span } => pieces.push(RunPiece::Markup {
                    span,
                    flat_offset: flat.len(),
                }),
            }
        }
        runs.push(Run {
            span: raw.span,
            open_tag: raw.open_tag,
            close_tag: raw.close_tag,
            properties: raw.properties,
            pieces,
            flat: flat_start..flat.len(),
        });
    }

    TextIndex { flat, runs }
}
