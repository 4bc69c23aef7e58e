// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Placeholder types shared by the matcher, the rewriter and the reports.
//!
//! All offsets are byte offsets into the flat text of one part (see
//! [`TextIndex`](crate::TextIndex)). They are UTF-8 byte positions, and every
//! placeholder boundary falls on an ASCII brace, so slicing the flat text with
//! them never splits a character.
//!
//! # Invariants
//!
//! - **PlaceholderMatch**: `flat_start < flat_end`, `name` is an identifier
//!   (`[A-Za-z_][A-Za-z0-9_]*`). A scan yields matches sorted by `flat_start`
//!   and pairwise disjoint.
//!
//! - **MalformedPlaceholder**: never overlaps a match. The text it covers is
//!   left exactly as it was.

use serde::Serialize;
use std::ops::Range;

/// Which placeholder syntax a match was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SourceForm {
    /// `{-w:p name}{name}{/name}`. The only form that gets rewritten.
    ThreeToken,
    /// `{name}` on its own. Reported, never touched.
    AlreadyCanonical,
}

/// A placeholder located in flat text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceholderMatch {
    pub name: String,
    pub flat_start: usize,
    pub flat_end: usize,
    pub form: SourceForm,
}

impl PlaceholderMatch {
    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.flat_start..self.flat_end
    }

    #[inline]
    pub fn is_legacy(&self) -> bool {
        self.form == SourceForm::ThreeToken
    }

    /// The token this placeholder becomes after normalization.
    pub fn canonical_token(&self) -> String {
        format!("{{{}}}", self.name)
    }
}

/// Why a legacy opening token did not complete into a placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum MalformedReason {
    /// `{-w:p a}` is not immediately followed by a `{name}` token.
    MissingValueToken,
    /// `{-w:p a}{a}` is not immediately followed by a `{/name}` token.
    MissingClosingToken,
    /// The wrapper is complete but its names disagree.
    MismatchedName { expected: String, found: String },
}

/// A legacy wrapper that could not be normalized. Its text is left as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MalformedPlaceholder {
    pub flat_start: usize,
    pub flat_end: usize,
    pub text: String,
    pub reason: MalformedReason,
}

impl std::fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MalformedReason::MissingValueToken => write!(f, "opening token without a value token"),
            MalformedReason::MissingClosingToken => {
                write!(f, "value token without a closing token")
            }
            MalformedReason::MismatchedName { expected, found } => {
                write!(f, "expected '{}' but found '{}'", expected, found)
            }
        }
    }
}

/// Everything a scan found in one flat text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    pub matches: Vec<PlaceholderMatch>,
    pub malformed: Vec<MalformedPlaceholder>,
}

impl ScanReport {
    /// Matches that the rewriter will act on.
    pub fn legacy(&self) -> impl Iterator<Item = &PlaceholderMatch> {
        self.matches.iter().filter(|m| m.is_legacy())
    }

    pub fn legacy_count(&self) -> usize {
        self.legacy().count()
    }

    pub fn canonical_count(&self) -> usize {
        self.matches.len() - self.legacy_count()
    }

    /// True when at least one legacy placeholder needs rewriting.
    pub fn needs_rewrite(&self) -> bool {
        self.matches.iter().any(PlaceholderMatch::is_legacy)
    }
}
