// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The OOXML container: open, read parts, replace parts, repack.
//!
//! A `.docx` is a zip archive of XML parts. Normalization only ever touches one
//! or two of them, and everything else must come back out exactly as it went
//! in. So the rebuild never decompresses untouched parts: their local headers,
//! compressed bytes and CRCs are raw-copied into the new archive. Only parts
//! with a pending replacement are recompressed, using the method, timestamp and
//! permissions of the entry they replace.
//!
//! The source file is never modified before [`Package::rebuild`], and the
//! rebuild itself goes through a temporary file in the destination directory
//! that is renamed over the destination only once the archive is complete. A
//! failure at any point drops the temporary file, which deletes it.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::io::{self, Cursor, Read, Seek, Write};
use std::path::{Path, PathBuf};

use zip::read::ZipFile;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::error::{Error, Result};

/// Main document body part of a WordprocessingML package.
pub const MAIN_DOCUMENT_PART: &str = "word/document.xml";

/// Suffix appended to the package path for the pre-rewrite copy.
pub const BACKUP_SUFFIX: &str = ".backup";

/// An opened OOXML package with in-memory part replacements.
pub struct Package {
    path: PathBuf,
    archive: ZipArchive<Cursor<Vec<u8>>>,
    names: Vec<String>,
    replacements: BTreeMap<String, Vec<u8>>,
}

impl Package {
    /// Open the package at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| Error::io(path, e))?;
        Self::from_bytes(path, bytes)
    }

    /// Open a package already loaded into memory. `path` labels errors and is
    /// the default rebuild destination.
    pub fn from_bytes(path: impl Into<PathBuf>, bytes: Vec<u8>) -> Result<Self> {
        let path = path.into();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(|source| {
            Error::CorruptArchive {
                path: path.clone(),
                source,
            }
        })?;

        let mut names = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let entry = archive
                .by_index_raw(index)
                .map_err(|source| Error::CorruptArchive {
                    path: path.clone(),
                    source,
                })?;
            names.push(entry.name().to_string());
        }

        Ok(Self {
            path,
            archive,
            names,
            replacements: BTreeMap::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Part names in archive order.
    pub fn part_names(&self) -> &[String] {
        &self.names
    }

    pub fn contains_part(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Whether any part has a pending replacement.
    pub fn is_modified(&self) -> bool {
        !self.replacements.is_empty()
    }

    /// Read a part's (decompressed) content. Pending replacements win over the
    /// archive content.
    pub fn read_part(&mut self, name: &str) -> Result<Vec<u8>> {
        if let Some(bytes) = self.replacements.get(name) {
            return Ok(bytes.clone());
        }

        let mut entry = match self.archive.by_name(name) {
            Ok(entry) => entry,
            Err(ZipError::FileNotFound) => {
                return Err(Error::PartNotFound {
                    path: self.path.clone(),
                    part: name.to_string(),
                })
            }
            Err(source) => {
                return Err(Error::CorruptArchive {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let mut bytes = Vec::with_capacity(entry.size() as usize);
        entry
            .read_to_end(&mut bytes)
            .map_err(|e| Error::CorruptArchive {
                path: self.path.clone(),
                source: ZipError::Io(e),
            })?;
        Ok(bytes)
    }

    /// Replace a part's content. Nothing touches the disk until a rebuild.
    pub fn write_part(&mut self, name: &str, bytes: Vec<u8>) -> Result<()> {
        if !self.contains_part(name) {
            return Err(self.part_not_found(name));
        }
        self.replacements.insert(name.to_string(), bytes);
        Ok(())
    }

    /// Write the repacked archive to `destination`, atomically replacing
    /// whatever is there. Consumes the package: the archive handle is done once
    /// its content has been persisted.
    pub fn rebuild(mut self, destination: impl AsRef<Path>) -> Result<()> {
        let destination = destination.as_ref();
        let dir = destination
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let staging = tempfile::Builder::new()
            .prefix(".docxfix-")
            .suffix(".tmp")
            .tempfile_in(dir)
            .map_err(|e| Error::io(dir, e))?;

        let staging = self.write_archive(staging, destination)?;
        staging
            .as_file()
            .sync_all()
            .map_err(|e| Error::io(destination, e))?;
        // The staging file is created owner-only; the replaced package keeps
        // the mode it had.
        if let Ok(existing) = fs::metadata(destination) {
            fs::set_permissions(staging.path(), existing.permissions())
                .map_err(|e| Error::io(destination, e))?;
        }
        staging
            .persist(destination)
            .map_err(|e| Error::io(destination, e.error))?;

        tracing::debug!(
            path = %destination.display(),
            replaced = self.replacements.len(),
            "package rebuilt"
        );
        Ok(())
    }

    /// Repack into memory. Used for dry runs and tests.
    pub fn rebuild_to_vec(&mut self) -> Result<Vec<u8>> {
        let path = self.path.clone();
        let cursor = self.write_archive(Cursor::new(Vec::new()), &path)?;
        Ok(cursor.into_inner())
    }

    fn write_archive<W: Write + Seek>(&mut self, sink: W, destination: &Path) -> Result<W> {
        let mut writer = ZipWriter::new(sink);

        for index in 0..self.archive.len() {
            let entry = self
                .archive
                .by_index_raw(index)
                .map_err(|source| Error::CorruptArchive {
                    path: self.path.clone(),
                    source,
                })?;

            match self.replacements.get(entry.name()) {
                Some(bytes) => {
                    let name = entry.name().to_string();
                    let options = entry_options(&entry);
                    drop(entry);
                    writer
                        .start_file(name, options)
                        .map_err(|e| write_error(destination, e))?;
                    writer
                        .write_all(bytes)
                        .map_err(|e| Error::io(destination, e))?;
                }
                None => writer
                    .raw_copy_file(entry)
                    .map_err(|e| write_error(destination, e))?,
            }
        }

        writer.finish().map_err(|e| write_error(destination, e))
    }

    fn part_not_found(&self, name: &str) -> Error {
        Error::PartNotFound {
            path: self.path.clone(),
            part: name.to_string(),
        }
    }
}

/// Options reproducing an existing entry's storage settings.
fn entry_options(entry: &ZipFile<'_>) -> SimpleFileOptions {
    let mut options = SimpleFileOptions::default().compression_method(entry.compression());
    if let Some(modified) = entry.last_modified() {
        options = options.last_modified_time(modified);
    }
    if let Some(mode) = entry.unix_mode() {
        options = options.unix_permissions(mode);
    }
    options
}

fn write_error(path: &Path, err: ZipError) -> Error {
    match err {
        ZipError::Io(source) => Error::io(path, source),
        other => Error::io(path, io::Error::other(other.to_string())),
    }
}

/// `<path>.backup`, next to the original.
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(BACKUP_SUFFIX);
    PathBuf::from(name)
}

/// Copy the package to its backup path before any mutation. Overwrites an
/// existing backup.
pub fn write_backup(path: &Path) -> Result<PathBuf> {
    let backup = backup_path(path);
    fs::copy(path, &backup).map_err(|e| Error::io(&backup, e))?;
    Ok(backup)
}
