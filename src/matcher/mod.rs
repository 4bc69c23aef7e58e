// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Placeholder recognition over flat text.
//!
//! Two forms are recognized, left to right, first match wins:
//!
//! ```text
//! {-w:p name}{name}{/name}     legacy wrapper, rewritten to {name}
//! {name}                       already canonical, reported only
//! ```
//!
//! The legacy wrapper has to be contiguous in the flat text: the three tokens
//! sit back to back with no other braces between them. All three names must
//! agree. An opening `{-w:p name}` that does not complete into a full wrapper
//! is reported as malformed and the scan resumes after whatever part of the
//! wrapper was there, so a broken wrapper never leaks a spurious canonical
//! match for its middle token.
//!
//! Names follow `[A-Za-z_][A-Za-z0-9_]*`. There is no vocabulary: any
//! identifier is a placeholder name.
//!
//! The scanner is hand-written rather than a regex because the wrapper needs
//! back-references (the same name three times).

use crate::types::{MalformedPlaceholder, MalformedReason, PlaceholderMatch, ScanReport, SourceForm};

/// The legacy opening token, up to (not including) the separator whitespace.
pub const LEGACY_OPEN: &str = "{-w:p";

/// Find every placeholder and every malformed legacy wrapper in `flat`.
pub fn scan(flat: &str) -> ScanReport {
    let bytes = flat.as_bytes();
    let mut report = ScanReport::default();
    let mut pos = 0;

    while let Some(offset) = bytes[pos..].iter().position(|&b| b == b'{') {
        let at = pos + offset;

        if bytes[at..].starts_with(LEGACY_OPEN.as_bytes()) {
            match parse_legacy(bytes, at) {
                Legacy::Match { name, end } => {
                    report.matches.push(PlaceholderMatch {
                        name,
                        flat_start: at,
                        flat_end: end,
                        form: SourceForm::ThreeToken,
                    });
                    pos = end;
                    continue;
                }
                Legacy::Malformed { end, reason } => {
                    tracing::trace!(offset = at, %reason, "malformed legacy placeholder");
                    report.malformed.push(MalformedPlaceholder {
                        flat_start: at,
                        flat_end: end,
                        text: flat[at..end].to_string(),
                        reason,
                    });
                    pos = end;
                    continue;
                }
                Legacy::NotLegacy => {}
            }
        }

        if let Some((name, end)) = token(bytes, at, b"") {
            report.matches.push(PlaceholderMatch {
                name: name.to_string(),
                flat_start: at,
                flat_end: end,
                form: SourceForm::AlreadyCanonical,
            });
            pos = end;
            continue;
        }

        pos = at + 1;
    }

    crate::verify::contracts::check_scan_well_formed(flat, &report);
    report
}

/// Placeholders in `flat`, sorted and non-overlapping. Malformed wrappers are
/// left out; use [`scan`] to see them.
pub fn find_matches(flat: &str) -> Vec<PlaceholderMatch> {
    scan(flat).matches
}

/// `[A-Za-z_][A-Za-z0-9_]*`
pub fn is_identifier(name: &str) -> bool {
    identifier_len(name.as_bytes()) == name.len() && !name.is_empty()
}

fn identifier_len(bytes: &[u8]) -> usize {
    match bytes.first() {
        Some(b) if b.is_ascii_alphabetic() || *b == b'_' => {}
        _ => return 0,
    }
    bytes
        .iter()
        .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_')
        .count()
}

/// `{<prefix><identifier>}` at `at`. Returns the identifier and the offset
/// just past the closing brace.
fn token<'a>(bytes: &'a [u8], at: usize, prefix: &[u8]) -> Option<(&'a str, usize)> {
    let rest = bytes.get(at..)?.strip_prefix(b"{")?.strip_prefix(prefix)?;
    let len = identifier_len(rest);
    if len == 0 || rest.get(len) != Some(&b'}') {
        return None;
    }
    let name = std::str::from_utf8(&rest[..len]).ok()?;
    Some((name, at + 1 + prefix.len() + len + 1))
}

enum Legacy {
    Match { name: String, end: usize },
    Malformed { end: usize, reason: MalformedReason },
    NotLegacy,
}

/// Parse `{-w:p name}{name}{/name}` at `at`, which starts with `{-w:p`.
fn parse_legacy(bytes: &[u8], at: usize) -> Legacy {
    let after_keyword = at + LEGACY_OPEN.len();
    let separator = bytes[after_keyword..]
        .iter()
        .take_while(|b| b.is_ascii_whitespace())
        .count();
    if separator == 0 {
        return Legacy::NotLegacy;
    }

    let name_start = after_keyword + separator;
    let len = identifier_len(&bytes[name_start..]);
    if len == 0 || bytes.get(name_start + len) != Some(&b'}') {
        return Legacy::NotLegacy;
    }
    let name = String::from_utf8_lossy(&bytes[name_start..name_start + len]).into_owned();
    let open_end = name_start + len + 1;

    let Some((value, value_end)) = token(bytes, open_end, b"") else {
        return Legacy::Malformed {
            end: open_end,
            reason: MalformedReason::MissingValueToken,
        };
    };

    let Some((closing, close_end)) = token(bytes, value_end, b"/") else {
        if value != name {
            return Legacy::Malformed {
                end: value_end,
                reason: MalformedReason::MismatchedName {
                    expected: name,
                    found: value.to_string(),
                },
            };
        }
        return Legacy::Malformed {
            end: value_end,
            reason: MalformedReason::MissingClosingToken,
        };
    };

    if let Some(found) = [value, closing].into_iter().find(|n| *n != name) {
        return Legacy::Malformed {
            end: close_end,
            reason: MalformedReason::MismatchedName {
                expected: name,
                found: found.to_string(),
            },
        };
    }

    Legacy::Match {
        name,
        end: close_end,
    }
}
