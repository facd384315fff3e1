//! Parser module for depscope.
//!
//! This module reads `pyproject.toml` manifests and edits them in place.
//!
//! # Supported Dialects
//!
//! - **PEP 621** `[project] dependencies = [...]` - list of specifiers
//! - **Poetry** `[tool.poetry.dependencies]` - name to constraint table
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use depscope::parser::{pyproject, types::DependencyDialect};
//!
//! let manifest = pyproject::parse_file(Path::new("pyproject.toml"))?;
//!
//! let deps = pyproject::extract_dependencies(&manifest);
//! let poetry: Vec<_> = deps
//!     .iter()
//!     .filter(|d| d.dialect == DependencyDialect::Poetry)
//!     .collect();
//!
//! println!("Found {} poetry dependencies", poetry.len());
//! # Ok::<(), depscope::parser::ManifestError>(())
//! ```

pub mod editor;
pub mod pyproject;
pub mod types;

// Re-export commonly used types for convenience
pub use editor::{populate, remove_unused, PopulateOutcome, Removal, RemovalReport};
pub use pyproject::{
    bare_package_name, declared_names, extract_dependencies, load_config, parse_file, parse_str,
    read_declared, ManifestError, ManifestResult,
};

pub use types::{AnalysisConfig, Dependency, DependencyDialect, OneOrMany, PyProject};
