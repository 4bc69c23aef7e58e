// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Runtime contracts for the index, the scan and the rewrite plan.
//!
//! Each stage of the pipeline hands the next one a structure with invariants
//! the next stage relies on without re-checking: monotonic flat offsets,
//! sorted disjoint matches, sorted disjoint edits. The contracts here panic in
//! debug builds when one of them is broken and compile to nothing useful in
//! release. Tests run in debug, so every test doubles as an invariant check.

pub mod contracts;
