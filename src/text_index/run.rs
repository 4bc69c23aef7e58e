// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Runs and their pieces, as byte spans into the original markup.
//!
//! Nothing here owns markup. A [`Run`] is a set of coordinates: where the
//! `<w:r>` element sits in the part, where its open tag, properties and close
//! tag sit, and which flat-text range its `<w:t>` children produced. The
//! rewriter slices the original bytes with these spans, so anything it does
//! not explicitly replace is copied verbatim.

use std::ops::Range;

/// A direct child of a run, other than its `<w:rPr>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunPiece {
    /// A `<w:t>` element and the decoded text it contributes.
    Text {
        span: Range<usize>,
        text: String,
        flat_start: usize,
    },
    /// Anything else: `<w:tab/>`, `<w:br/>`, `<w:delText>`, field codes,
    /// drawings, whitespace between children. Zero flat width, pinned at
    /// `flat_offset`.
    Markup { span: Range<usize>, flat_offset: usize },
}

impl RunPiece {
    pub fn span(&self) -> &Range<usize> {
        match self {
            RunPiece::Text { span, .. } | RunPiece::Markup { span, .. } => span,
        }
    }

    /// Flat range covered by this piece. Empty for markup.
    pub fn flat_range(&self) -> Range<usize> {
        match self {
            RunPiece::Text {
                text, flat_start, ..
            } => *flat_start..*flat_start + text.len(),
            RunPiece::Markup { flat_offset, .. } => *flat_offset..*flat_offset,
        }
    }
}

/// One `<w:r>` element of a part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    /// The whole element, `<w:r ...>` through `</w:r>`.
    pub span: Range<usize>,
    /// `<w:r ...>`, or the whole element when it is self-closing.
    pub open_tag: Range<usize>,
    /// `</w:r>`. Empty for a self-closing run.
    pub close_tag: Range<usize>,
    /// `<w:rPr>...</w:rPr>`, when present.
    pub properties: Option<Range<usize>>,
    pub pieces: Vec<RunPiece>,
    /// Flat text produced by this run. `start == end` for runs without text.
    pub flat: Range<usize>,
}

impl Run {
    /// Runs that contribute no text still mark a position in the document.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.flat.start == self.flat.end
    }

    #[inline]
    pub fn is_self_closing(&self) -> bool {
        self.close_tag.is_empty()
    }

    /// Decoded text of this run, concatenated over its `<w:t>` children.
    pub fn text(&self) -> String {
        self.pieces
            .iter()
            .filter_map(|piece| match piece {
                RunPiece::Text { text, .. } => Some(text.as_str()),
                RunPiece::Markup { .. } => None,
            })
            .collect()
    }

    /// Whether `offset` falls on a character this run produced.
    #[inline]
    pub fn owns(&self, offset: usize) -> bool {
        self.flat.start <= offset && offset < self.flat.end
    }
}
