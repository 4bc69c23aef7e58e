// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! `normalize` and `check`: batch runs with a summary box or JSON.

use std::path::PathBuf;

#[cfg(feature = "parallel")]
use indicatif::{ProgressBar, ProgressStyle};

use docxfix::{discover_packages, BatchOutcome, NormalizeOptions};

use super::display::{self, Status};

/// Which command the batch runs for. Only affects wording and exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normalize,
    Check,
}

/// Create a progress style for the batch progress bar
#[cfg(feature = "parallel")]
fn create_progress_style() -> ProgressStyle {
    ProgressStyle::with_template(
        "{spinner:.cyan} {prefix:<12} [{bar:40.cyan/dim}] {pos}/{len} {msg}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("━━╸")
}

/// Run `normalize` or `check` over `inputs`.
///
/// Returns `Ok(true)` when the command succeeded: every package processed
/// and, for `check`, none still needing a rewrite.
pub fn run_batch(
    inputs: &[PathBuf],
    options: &NormalizeOptions,
    mode: Mode,
    json: bool,
) -> Result<bool, String> {
    let packages = discover_packages(inputs).map_err(|e| e.to_string())?;
    if packages.is_empty() {
        eprintln!("⚠️  No Word packages found");
        return Ok(true);
    }

    let outcomes = process(&packages, options, json);

    if json {
        let out = serde_json::to_string_pretty(&outcomes)
            .map_err(|e| format!("Failed to serialize reports: {}", e))?;
        println!("{}", out);
    } else {
        print_summary(&outcomes, options, mode);
    }

    let all_ok = outcomes.iter().all(BatchOutcome::is_ok);
    Ok(match mode {
        Mode::Normalize => all_ok,
        Mode::Check => all_ok && !outcomes.iter().any(BatchOutcome::changed),
    })
}

#[cfg(feature = "parallel")]
fn process(packages: &[PathBuf], options: &NormalizeOptions, quiet: bool) -> Vec<BatchOutcome> {
    if quiet || packages.len() < 2 {
        return docxfix::normalize_batch(packages, options);
    }

    let progress = ProgressBar::new(packages.len() as u64);
    progress.set_style(create_progress_style());
    progress.set_prefix(if options.dry_run { "Checking" } else { "Normalizing" });
    let outcomes = docxfix::normalize_batch_with_progress(packages, options, &progress);
    progress.finish_and_clear();
    outcomes
}

#[cfg(not(feature = "parallel"))]
fn process(packages: &[PathBuf], options: &NormalizeOptions, _quiet: bool) -> Vec<BatchOutcome> {
    docxfix::normalize_batch(packages, options)
}

fn status(outcome: &BatchOutcome) -> Status {
    match &outcome.report {
        None => Status::Failed,
        Some(report) if report.changed && report.dry_run => Status::WouldRewrite,
        Some(report) if report.changed => Status::Rewritten,
        Some(_) => Status::Clean,
    }
}

fn print_summary(outcomes: &[BatchOutcome], options: &NormalizeOptions, mode: Mode) {
    let heading = match (mode, options.dry_run) {
        (Mode::Check, _) => "DOCXFIX CHECK",
        (Mode::Normalize, true) => "DOCXFIX NORMALIZE (DRY RUN)",
        (Mode::Normalize, false) => "DOCXFIX NORMALIZE",
    };

    println!();
    display::double_header();
    display::title(heading);
    display::double_footer();

    display::section_top("PACKAGES");
    for outcome in outcomes {
        let path = display::truncate_path(&outcome.path.display().to_string(), 40);
        let badge = display::status_badge(status(outcome));
        match (&outcome.report, &outcome.error) {
            (Some(report), _) => {
                display::row(&format!(
                    " {} {} {} legacy {} canonical {} malformed",
                    badge,
                    display::pad_right(&path, 40),
                    display::count(report.rewritten(), 3, display::YELLOW),
                    display::count(report.canonical(), 3, display::GREEN),
                    display::count(report.malformed(), 3, display::RED),
                ));
                for part in report.parts.iter().filter(|p| !p.malformed.is_empty()) {
                    for bad in &part.malformed {
                        display::row(&display::dim(&format!(
                            "     {}: {} ({})",
                            part.part,
                            display::truncate_end(&bad.text, 30),
                            bad.reason
                        )));
                    }
                }
            }
            (None, Some(error)) => {
                display::row(&format!(" {} {}", badge, path));
                display::row(&display::dim(&format!(
                    "     {}",
                    display::truncate_end(&error.message, display::BOX_WIDTH - 6)
                )));
            }
            (None, None) => {}
        }
    }

    let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
    let changed = outcomes.iter().filter(|o| o.changed()).count();
    let rewritten: usize = outcomes
        .iter()
        .filter_map(|o| o.report.as_ref())
        .map(|r| r.rewritten())
        .sum();

    display::section_mid("TOTAL");
    display::row(&format!(
        " {} packages, {} with legacy placeholders ({} placeholders), {} failed",
        outcomes.len(),
        changed,
        rewritten,
        failed
    ));
    display::section_bot();
    println!();

    match mode {
        Mode::Normalize if failed == 0 && !options.dry_run => {
            eprintln!("✅ Normalized {} of {} packages", changed, outcomes.len())
        }
        Mode::Normalize if failed == 0 => {
            eprintln!("✅ Dry run: {} packages would change", changed)
        }
        Mode::Check if failed == 0 && changed == 0 => {
            eprintln!("✅ No legacy placeholders left")
        }
        Mode::Check if failed == 0 => {
            eprintln!("⚠️  {} packages still hold legacy placeholders", changed)
        }
        _ => eprintln!("⚠️  {} of {} packages failed", failed, outcomes.len()),
    }
}
