//! Run-aware normalization of legacy Word template placeholders.
//!
//! Older templates mark a merge field as `{-w:p name}{name}{/name}`; the
//! rendering engine now expects `{name}`. Word stores the text of a paragraph
//! in runs and splits them wherever it pleases, so a single placeholder can be
//! spread over several `<w:r>` elements with different formatting. A plain
//! string replace on the XML misses those. This crate matches on the text as
//! the reader sees it and maps the hits back to the runs.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │  package     │────▶│  text_index  │────▶│   matcher    │────▶│   rewrite    │
//! │ (zip parts,  │     │ (flat text,  │     │ (scan, find_ │     │ (RewritePlan,│
//! │  rebuild)    │     │  run spans)  │     │  matches)    │     │  per-run)    │
//! └──────────────┘     └──────────────┘     └──────────────┘     └──────────────┘
//!        ▲                                                               │
//!        │                ┌─────────────────────────────┐                │
//!        └────────────────│         normalize           │◀───────────────┘
//!                         │ (stages, backup, batches)   │
//!                         └─────────────────────────────┘
//!                                       │
//!                                       ▼
//!                         ┌─────────────────────────────┐
//!                         │          verify             │
//!                         │  (debug-build contracts)    │
//!                         └─────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use docxfix::{normalize, NormalizeOptions};
//!
//! let report = normalize("templates/convocation.docx", &NormalizeOptions::default())?;
//! if report.changed {
//!     println!("rewrote {} placeholders", report.rewritten());
//! }
//! ```
//!
//! In memory, one part at a time:
//!
//! ```ignore
//! let outcome = docxfix::normalize_part("word/document.xml", &markup)?;
//! if let Some(rewritten) = outcome.markup { /* ... */ }
//! ```

pub mod error;
pub mod matcher;
pub mod normalize;
pub mod package;
pub mod rewrite;
pub mod text_index;
mod types;
pub mod verify;

#[doc(hidden)]
pub mod testing;

pub use error::{Error, Result};
pub use matcher::{find_matches, is_identifier, scan};
pub use normalize::{
    discover_packages, normalize, normalize_batch, normalize_package, normalize_part,
    BatchError, BatchOutcome, NormalizeOptions, NormalizeReport, PartOutcome, PartReport, Stage,
};
#[cfg(feature = "parallel")]
pub use normalize::normalize_batch_with_progress;
pub use package::{backup_path, Package, BACKUP_SUFFIX, MAIN_DOCUMENT_PART};
pub use rewrite::{RewritePlan, RunEdit};
pub use text_index::{MarkupError, Run, RunPiece, TextIndex};
pub use types::{MalformedPlaceholder, MalformedReason, PlaceholderMatch, ScanReport, SourceForm};
