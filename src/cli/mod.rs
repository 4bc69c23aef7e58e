// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! CLI definitions for the docxfix command-line interface.
//!
//! Three subcommands: `normalize` rewrites packages in place, `check` runs the
//! same pipeline without writing and fails when legacy placeholders remain
//! (for CI over a template folder), and `inspect` shows how Word split one
//! part into runs and what the matcher sees in it.

pub mod commands;
pub mod display;
pub mod inspect;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use docxfix::MAIN_DOCUMENT_PART;

#[derive(Parser)]
#[command(
    name = "docxfix",
    about = "Normalize legacy {-w:p name}{name}{/name} placeholders in Word templates",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rewrite legacy placeholders to {name}, in place
    Normalize {
        /// Packages, or directories of packages (scanned one level deep)
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Part to normalize; repeat for several (default: word/document.xml)
        ///
        /// Headers and footers live in their own parts, e.g. word/header1.xml.
        #[arg(long = "part", value_name = "NAME")]
        parts: Vec<String>,

        /// Do not write <file>.backup before replacing a package
        #[arg(long)]
        no_backup: bool,

        /// Report what would change without writing anything
        #[arg(long)]
        dry_run: bool,

        /// Print reports as JSON on stdout
        #[arg(long)]
        json: bool,
    },

    /// Fail if any package still holds legacy placeholders (writes nothing)
    Check {
        /// Packages, or directories of packages (scanned one level deep)
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Part to check; repeat for several (default: word/document.xml)
        #[arg(long = "part", value_name = "NAME")]
        parts: Vec<String>,

        /// Print reports as JSON on stdout
        #[arg(long)]
        json: bool,
    },

    /// Show the runs, flat text and placeholders of one part
    Inspect {
        /// Path to the package
        file: PathBuf,

        /// Part to inspect
        #[arg(long, default_value = MAIN_DOCUMENT_PART)]
        part: String,
    },
}
