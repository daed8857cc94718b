//! Idempotent, backup-safe, pattern-driven rewriting of source trees.
//!
//! A pass walks one or more roots, runs an ordered [`ruleset::RuleSet`] over each
//! matching file and commits changed files only after their original bytes are
//! safely backed up. The crate is split the same way throughout:
//!
//! - **[`core`]**: Pure text logic (rules, CMake token model, edits, encoding).
//!   No I/O.
//! - **[`io`]**: Side effects (walking, configuration, backup-and-commit
//!   writes).
//!
//! [`rewrite`] ties the two together for one pass and [`summary`] reports it.

pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod rewrite;
pub mod ruleset;
pub mod summary;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
