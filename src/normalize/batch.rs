// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Many packages at once.
//!
//! Templates usually live together in one folder, so inputs may be
//! directories as well as files. Directories are scanned one level deep for
//! Word packages; files are taken as given, whatever their extension.
//!
//! Each package gets its own pipeline. They share nothing, so the batch runs
//! them with `par_iter()` and a failure in one never stops the others: it is
//! recorded in that package's [`BatchOutcome`] and the batch moves on.

use std::fs;
use std::path::{Path, PathBuf};
#[cfg(feature = "parallel")]
use std::sync::atomic::{AtomicUsize, Ordering};

#[cfg(feature = "parallel")]
use indicatif::ProgressBar;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::Serialize;

use super::{normalize, NormalizeOptions, NormalizeReport};
use crate::error::{Error, Result};

/// Extensions picked up when scanning a directory.
pub const PACKAGE_EXTENSIONS: &[&str] = &["docx", "docm", "dotx", "dotm"];

/// Why one package of a batch failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchError {
    pub kind: &'static str,
    pub message: String,
}

impl From<&Error> for BatchError {
    fn from(err: &Error) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Result for one package of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOutcome {
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<NormalizeReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<BatchError>,
}

impl BatchOutcome {
    fn new(path: &Path, result: Result<NormalizeReport>) -> Self {
        match result {
            Ok(report) => Self {
                path: path.to_path_buf(),
                report: Some(report),
                error: None,
            },
            Err(err) => {
                tracing::error!(path = %path.display(), kind = err.kind(), "{}", err);
                Self {
                    path: path.to_path_buf(),
                    report: None,
                    error: Some(BatchError::from(&err)),
                }
            }
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn changed(&self) -> bool {
        self.report.as_ref().is_some_and(|r| r.changed)
    }
}

fn is_package(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            PACKAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// Expand `inputs` into package paths.
///
/// Directories contribute their Word packages, sorted by name; files are kept
/// in the order given. Duplicates are dropped, comparing resolved paths, and
/// the first spelling wins. Backups left by earlier runs
/// (`*.docx.backup`) never match the extension filter.
pub fn discover_packages(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();

    for input in inputs {
        if input.is_dir() {
            let entries = fs::read_dir(input).map_err(|e| Error::io(input, e))?;
            let mut packages = Vec::new();
            for entry in entries {
                let path = entry.map_err(|e| Error::io(input, e))?.path();
                if path.is_file() && is_package(&path) {
                    packages.push(path);
                }
            }
            packages.sort();
            tracing::debug!(dir = %input.display(), count = packages.len(), "scanned directory");
            found.extend(packages);
        } else {
            found.push(input.clone());
        }
    }

    // `dir` and `./dir/a.docx` name the same package; it must be queued once.
    let mut seen = std::collections::HashSet::new();
    found.retain(|path| seen.insert(fs::canonicalize(path).unwrap_or_else(|_| path.clone())));
    Ok(found)
}

/// Normalize every package, isolating failures. Outcomes come back in input
/// order.
pub fn normalize_batch(paths: &[PathBuf], options: &NormalizeOptions) -> Vec<BatchOutcome> {
    #[cfg(feature = "parallel")]
    let outcomes = paths
        .par_iter()
        .map(|path| BatchOutcome::new(path, normalize(path, options)))
        .collect();
    #[cfg(not(feature = "parallel"))]
    let outcomes = paths
        .iter()
        .map(|path| BatchOutcome::new(path, normalize(path, options)))
        .collect();

    outcomes
}

/// [`normalize_batch`] with a progress bar ticking once per package.
#[cfg(feature = "parallel")]
pub fn normalize_batch_with_progress(
    paths: &[PathBuf],
    options: &NormalizeOptions,
    progress: &ProgressBar,
) -> Vec<BatchOutcome> {
    let counter = AtomicUsize::new(0);

    paths
        .par_iter()
        .map(|path| {
            let outcome = BatchOutcome::new(path, normalize(path, options));

            let count = counter.fetch_add(1, Ordering::Relaxed) + 1;
            progress.set_position(count as u64);
            if let Some(name) = path.file_name() {
                progress.set_message(name.to_string_lossy().into_owned());
            }

            outcome
        })
        .collect()
}
