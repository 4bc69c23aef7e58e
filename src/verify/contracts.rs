// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Debug-mode assertions over pipeline structures.
//!
//! | Contract Function          | Property                                          |
//! |----------------------------|---------------------------------------------------|
//! | `check_index_well_formed`  | run texts concatenate to the flat text, in order  |
//! | `check_scan_well_formed`   | matches sorted, disjoint, names are identifiers   |
//! | `check_plan_well_formed`   | edits sorted, disjoint, each inside its run       |
//!
//! All checks are skipped entirely in release builds.

use crate::matcher::is_identifier;
use crate::rewrite::RewritePlan;
use crate::text_index::{RunPiece, TextIndex};
use crate::types::ScanReport;

// ============================================================================
// INDEX CONTRACTS
// ============================================================================

/// Check the flat-text mapping of an index.
///
/// # Panics (debug builds only)
/// Panics if runs are out of document order, if flat ranges leave gaps or
/// overlap, or if the pieces of a run disagree with its flat range.
#[inline]
pub fn check_index_well_formed(index: &TextIndex) {
    if !cfg!(debug_assertions) {
        return;
    }

    let flat = index.flat_text();
    let mut cursor = 0;
    let mut last_span_end = 0;

    for (i, run) in index.runs().iter().enumerate() {
        debug_assert!(
            run.span.start >= last_span_end,
            "Contract violation: runs[{}] starts at byte {} inside the previous run (ends {})",
            i,
            run.span.start,
            last_span_end
        );
        debug_assert_eq!(
            run.flat.start, cursor,
            "Contract violation: runs[{}].flat starts at {} but the previous run ended at {}",
            i, run.flat.start, cursor
        );

        let mut piece_cursor = run.flat.start;
        for piece in &run.pieces {
            let range = piece.flat_range();
            debug_assert_eq!(
                range.start, piece_cursor,
                "Contract violation: runs[{}] has a piece at flat {} after {}",
                i, range.start, piece_cursor
            );
            if let RunPiece::Text { text, .. } = piece {
                debug_assert_eq!(
                    flat.get(range.clone()),
                    Some(text.as_str()),
                    "Contract violation: runs[{}] text piece disagrees with flat text",
                    i
                );
            }
            piece_cursor = range.end;
        }
        debug_assert_eq!(
            piece_cursor, run.flat.end,
            "Contract violation: runs[{}] pieces end at {} but the run ends at {}",
            i, piece_cursor, run.flat.end
        );

        cursor = run.flat.end;
        last_span_end = run.span.end;
    }

    debug_assert_eq!(
        cursor,
        flat.len(),
        "Contract violation: runs cover {} flat bytes of {}",
        cursor,
        flat.len()
    );
}

// ============================================================================
// SCAN CONTRACTS
// ============================================================================

/// Check that a scan's matches are sorted, disjoint and in bounds.
#[inline]
pub fn check_scan_well_formed(flat: &str, report: &ScanReport) {
    if !cfg!(debug_assertions) {
        return;
    }

    let mut last_end = 0;
    for (i, m) in report.matches.iter().enumerate() {
        debug_assert!(
            m.flat_start >= last_end && m.flat_start < m.flat_end && m.flat_end <= flat.len(),
            "Contract violation: matches[{}] {}..{} overlaps or exceeds (previous end {}, len {})",
            i,
            m.flat_start,
            m.flat_end,
            last_end,
            flat.len()
        );
        debug_assert!(
            is_identifier(&m.name),
            "Contract violation: matches[{}] name '{}' is not an identifier",
            i,
            m.name
        );
        last_end = m.flat_end;
    }

    for bad in &report.malformed {
        let overlaps = report
            .matches
            .iter()
            .any(|m| m.flat_start < bad.flat_end && bad.flat_start < m.flat_end);
        debug_assert!(
            !overlaps,
            "Contract violation: malformed span {}..{} overlaps a match",
            bad.flat_start,
            bad.flat_end
        );
    }
}

// ============================================================================
// PLAN CONTRACTS
// ============================================================================

/// Check that plan edits can be applied back to front without re-resolving.
#[inline]
pub fn check_plan_well_formed(index: &TextIndex, plan: &RewritePlan) {
    if !cfg!(debug_assertions) {
        return;
    }

    let mut last_end = 0;
    for (i, edit) in plan.edits().iter().enumerate() {
        debug_assert!(
            edit.span.start >= last_end,
            "Contract violation: edits[{}] at byte {} overlaps the previous edit (ends {})",
            i,
            edit.span.start,
            last_end
        );
        debug_assert_eq!(
            index.runs().get(edit.run).map(|r| r.span.clone()),
            Some(edit.span.clone()),
            "Contract violation: edits[{}] does not replace exactly run {}",
            i,
            edit.run
        );
        last_end = edit.span.end;
    }
}
