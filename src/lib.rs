//! depscope - Unused dependency detector for Python projects
//!
//! This crate reads the dependencies a `pyproject.toml` declares, scans the
//! project's source tree for what it actually references, and reports the
//! declared packages nothing uses. It can also remove them from the
//! manifest, or write a manifest from scratch from what the scan finds.

pub mod analysis;
pub mod export;
pub mod logging;
pub mod matching;
pub mod parser;
pub mod policy;
pub mod resolve;
pub mod usage;
