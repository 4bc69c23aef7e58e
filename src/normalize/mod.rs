// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The normalization driver: one package in, one package (or nothing) out.
//!
//! # Pipeline
//!
//! ```text
//!   Idle ──▶ Extracted ──▶ Indexed ──▶ Matched ──┬──▶ Rewritten ──▶ Repacked ──▶ Done
//!                                                │         │
//!                                                │         └──▶ Done   (dry run)
//!                                                └──▶ NoChangeNeeded
//! ```
//!
//! Parts are read from the archive one at a time, then indexed, scanned and
//! rewritten in parallel (each worker owns one part's bytes), then staged back
//! into the package. A package with no legacy placeholder stops at
//! `NoChangeNeeded`: no backup is written and the file on disk is not opened
//! for writing, so it stays byte-identical.
//!
//! The backup is written before the archive is replaced. If the backup fails
//! the original is not touched.

pub mod batch;

use std::path::{Path, PathBuf};

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::matcher;
use crate::package::{self, Package, MAIN_DOCUMENT_PART};
use crate::rewrite;
use crate::text_index::{MarkupError, TextIndex};
use crate::types::{MalformedPlaceholder, PlaceholderMatch};

pub use batch::{discover_packages, normalize_batch, BatchError, BatchOutcome, PACKAGE_EXTENSIONS};
#[cfg(feature = "parallel")]
pub use batch::normalize_batch_with_progress;

/// What to normalize and how to persist it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Parts to process, in order. Empty means the main document only.
    pub parts: Vec<String>,
    /// Write `<path>.backup` before replacing the package.
    pub backup: bool,
    /// Compute everything, write nothing.
    pub dry_run: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            parts: vec![MAIN_DOCUMENT_PART.to_string()],
            backup: true,
            dry_run: false,
        }
    }
}

impl NormalizeOptions {
    /// The parts to process, deduplicated, falling back to the main document.
    pub fn effective_parts(&self) -> Vec<String> {
        if self.parts.is_empty() {
            return vec![MAIN_DOCUMENT_PART.to_string()];
        }
        let mut parts: Vec<String> = Vec::with_capacity(self.parts.len());
        for part in &self.parts {
            if !parts.contains(part) {
                parts.push(part.clone());
            }
        }
        parts
    }
}

/// Where a package's pipeline stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Stage {
    Idle,
    Extracted,
    Indexed,
    Matched,
    Rewritten,
    Repacked,
    Done,
    NoChangeNeeded,
}

impl Stage {
    fn can_advance_to(self, next: Stage) -> bool {
        use Stage::*;
        matches!(
            (self, next),
            (Idle, Extracted)
                | (Extracted, Indexed)
                | (Indexed, Matched)
                | (Matched, Rewritten)
                | (Matched, NoChangeNeeded)
                | (Rewritten, Repacked)
                | (Rewritten, Done)
                | (Repacked, Done)
        )
    }

    /// Whether the pipeline has nothing left to do.
    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Done | Stage::NoChangeNeeded)
    }
}

/// Stage tracker for one package.
struct Pipeline<'a> {
    path: &'a Path,
    stage: Stage,
}

impl<'a> Pipeline<'a> {
    fn new(path: &'a Path) -> Self {
        Self {
            path,
            stage: Stage::Idle,
        }
    }

    fn advance(&mut self, next: Stage) {
        debug_assert!(
            self.stage.can_advance_to(next),
            "illegal stage transition {:?} -> {:?}",
            self.stage,
            next
        );
        tracing::debug!(
            path = %self.path.display(),
            from = ?self.stage,
            to = ?next,
            "stage transition"
        );
        self.stage = next;
    }
}

/// What happened to one part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartReport {
    pub part: String,
    /// Legacy placeholders rewritten (or that would be, in a dry run).
    pub rewritten: usize,
    /// Placeholders already in canonical form.
    pub canonical: usize,
    pub matches: Vec<PlaceholderMatch>,
    pub malformed: Vec<MalformedPlaceholder>,
    pub crc32_before: u32,
    /// Equal to `crc32_before` when the part is unchanged.
    pub crc32_after: u32,
}

impl PartReport {
    pub fn changed(&self) -> bool {
        self.rewritten > 0
    }
}

/// A part after the in-memory pipeline.
#[derive(Debug, Clone)]
pub struct PartOutcome {
    pub report: PartReport,
    /// The rewritten markup, or `None` when the part needs no change.
    pub markup: Option<Vec<u8>>,
}

/// What happened to one package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizeReport {
    pub path: PathBuf,
    /// At least one legacy placeholder was (or, in a dry run, would be)
    /// rewritten.
    pub changed: bool,
    pub dry_run: bool,
    /// Backup written for this run, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup: Option<PathBuf>,
    pub stage: Stage,
    pub parts: Vec<PartReport>,
}

impl NormalizeReport {
    pub fn rewritten(&self) -> usize {
        self.parts.iter().map(|p| p.rewritten).sum()
    }

    pub fn canonical(&self) -> usize {
        self.parts.iter().map(|p| p.canonical).sum()
    }

    pub fn malformed(&self) -> usize {
        self.parts.iter().map(|p| p.malformed.len()).sum()
    }
}

/// Index, scan and rewrite one part in memory.
pub fn normalize_part(name: &str, markup: &[u8]) -> std::result::Result<PartOutcome, MarkupError> {
    let index = TextIndex::build(markup)?;
    let scan = matcher::scan(index.flat_text());
    let plan = rewrite::plan(markup, &index, &scan.matches);

    let crc32_before = crc32fast::hash(markup);
    let (markup, crc32_after) = if plan.is_empty() {
        (None, crc32_before)
    } else {
        let rewritten = plan.apply(markup);
        let crc = crc32fast::hash(&rewritten);
        (Some(rewritten), crc)
    };

    tracing::trace!(
        part = name,
        runs = index.runs().len(),
        matches = scan.matches.len(),
        edits = plan.edits().len(),
        "part normalized"
    );

    Ok(PartOutcome {
        report: PartReport {
            part: name.to_string(),
            rewritten: plan.rewritten(),
            canonical: scan.canonical_count(),
            matches: scan.matches,
            malformed: scan.malformed,
            crc32_before,
            crc32_after,
        },
        markup,
    })
}

/// Normalize `parts` of an open package and stage the rewritten ones in it.
/// Nothing is written to disk; call [`Package::rebuild`] to persist.
pub fn normalize_package(package: &mut Package, parts: &[String]) -> Result<Vec<PartReport>> {
    let sources = extract(package, parts)?;
    let outcomes = transform(package.path(), &sources)?;
    stage(package, outcomes)
}

/// Normalize the package at `path` in place.
///
/// Returns a report with `changed == false` and leaves the file untouched
/// when no part holds a legacy placeholder. A second run over the output is
/// always a no-op.
pub fn normalize(path: impl AsRef<Path>, options: &NormalizeOptions) -> Result<NormalizeReport> {
    let path = path.as_ref();
    let mut pipeline = Pipeline::new(path);

    let mut package = Package::open(path)?;
    let sources = extract(&mut package, &options.effective_parts())?;
    pipeline.advance(Stage::Extracted);

    let outcomes = transform(path, &sources)?;
    pipeline.advance(Stage::Indexed);
    pipeline.advance(Stage::Matched);

    for outcome in &outcomes {
        for bad in &outcome.report.malformed {
            tracing::warn!(
                path = %path.display(),
                part = %outcome.report.part,
                text = %bad.text,
                reason = %bad.reason,
                "malformed legacy placeholder left as-is"
            );
        }
    }

    let changed = outcomes.iter().any(|o| o.markup.is_some());
    let mut report = NormalizeReport {
        path: path.to_path_buf(),
        changed,
        dry_run: options.dry_run,
        backup: None,
        stage: Stage::Idle,
        parts: Vec::new(),
    };

    if !changed {
        pipeline.advance(Stage::NoChangeNeeded);
        report.parts = outcomes.into_iter().map(|o| o.report).collect();
        report.stage = pipeline.stage;
        return Ok(report);
    }

    report.parts = stage(&mut package, outcomes)?;
    pipeline.advance(Stage::Rewritten);

    if !options.dry_run {
        if options.backup {
            report.backup = Some(package::write_backup(path)?);
        }
        package.rebuild(path)?;
        pipeline.advance(Stage::Repacked);
        tracing::info!(
            path = %path.display(),
            rewritten = report.rewritten(),
            "package normalized"
        );
    }

    pipeline.advance(Stage::Done);
    report.stage = pipeline.stage;
    Ok(report)
}

/// Read every requested part. Serial: the archive has a single cursor.
fn extract(package: &mut Package, parts: &[String]) -> Result<Vec<(String, Vec<u8>)>> {
    parts
        .iter()
        .map(|name| Ok((name.clone(), package.read_part(name)?)))
        .collect()
}

/// Run the part pipeline over every source, in parallel when available.
fn transform(path: &Path, sources: &[(String, Vec<u8>)]) -> Result<Vec<PartOutcome>> {
    let run = |(name, bytes): &(String, Vec<u8>)| {
        normalize_part(name, bytes).map_err(|err| Error::MalformedXml {
            path: path.to_path_buf(),
            part: name.clone(),
            message: err.to_string(),
        })
    };

    #[cfg(feature = "parallel")]
    let outcomes = sources.par_iter().map(run).collect();
    #[cfg(not(feature = "parallel"))]
    let outcomes = sources.iter().map(run).collect();

    outcomes
}

/// Hand rewritten parts back to the package, keeping the reports.
fn stage(package: &mut Package, outcomes: Vec<PartOutcome>) -> Result<Vec<PartReport>> {
    let mut reports = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        if let Some(markup) = outcome.markup {
            package.write_part(&outcome.report.part, markup)?;
        }
        reports.push(outcome.report);
    }
    Ok(reports)
}
