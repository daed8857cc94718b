//! Deterministic, pure logic for the rewrite pipeline.
//!
//! Core modules must be free of I/O side effects. Rules take text in and hand
//! text back; reading, writing and backups live in [`crate::io`].

pub mod cmake;
pub mod cmake_links;
pub mod cmake_version;
pub mod edit;
pub mod encoding;
pub mod engine;
pub mod filter;
pub mod license;
pub mod platform;
pub mod redact;
pub mod rule;
pub mod task;
pub mod types;
