// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Error taxonomy for package normalization.
//!
//! Every fatal error carries the package path (and the part name where one is
//! involved) so a batch run can tell the operator exactly which template broke.
//! Malformed placeholders are not errors: they are reported through
//! [`MalformedPlaceholder`](crate::MalformedPlaceholder) and processing continues.

use std::io;
use std::path::PathBuf;

/// Fatal failures while opening, rewriting or persisting a package.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input is not a readable zip container. Nothing was written.
    #[error("{}: not a valid OOXML package: {source}", path.display())]
    CorruptArchive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    /// The package has no part with this name.
    #[error("{}: part '{part}' not found", path.display())]
    PartNotFound { path: PathBuf, part: String },

    /// The part exists but its markup could not be parsed.
    #[error("{}: part '{part}' is not well-formed XML: {message}", path.display())]
    MalformedXml {
        path: PathBuf,
        part: String,
        message: String,
    },

    /// Reading the source, writing the backup or replacing the archive failed.
    /// The original file is untouched when this is returned.
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Path of the package the error belongs to.
    pub fn path(&self) -> &std::path::Path {
        match self {
            Error::CorruptArchive { path, .. }
            | Error::PartNotFound { path, .. }
            | Error::MalformedXml { path, .. }
            | Error::Io { path, .. } => path,
        }
    }

    /// Short category name used in reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::CorruptArchive { .. } => "CorruptArchive",
            Error::PartNotFound { .. } => "PartNotFound",
            Error::MalformedXml { .. } => "MalformedXml",
            Error::Io { .. } => "IOError",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
