//! Fixed exclusion policy.
//!
//! Two lists that never change between runs: directories the scanner never
//! descends into, and packages that are never reported unused because they
//! are invoked as external tools rather than imported.

use crate::matching::normalize;

/// Directory names skipped by every walk.
pub const EXCLUDED_DIRS: &[&str] = &[
    "venv",
    ".venv",
    ".git",
    "__pycache__",
    "dist",
    "build",
    ".mypy_cache",
    "node_modules",
    "htmlcov",
];

/// Packages that are never flagged unused.
pub const PROTECTED_PACKAGES: &[&str] = &[
    // this tool
    "depscope",
    // test runners
    "pytest",
    "tox",
    // formatters and linters
    "black",
    "ruff",
    "mypy",
    "pylint",
    "flake8",
    "isort",
    // build and packaging
    "poetry",
    "setuptools",
    "wheel",
    "build",
    "twine",
    // environment tooling
    "pre-commit",
    "virtualenv",
    "pip",
];

/// Returns true if a directory with this name is never scanned.
pub fn is_excluded_dir_name(name: &str) -> bool {
    EXCLUDED_DIRS.contains(&name)
}

/// Check if a walk entry is an excluded directory.
pub fn is_excluded_dir(entry: &walkdir::DirEntry) -> bool {
    if !entry.file_type().is_dir() || entry.depth() == 0 {
        return false;
    }

    is_excluded_dir_name(&entry.file_name().to_string_lossy())
}

/// Returns true if `package` is structurally never reported unused.
///
/// Compared in normalized form, so `pre_commit` and `Pre-Commit` both match.
pub fn is_protected(package: &str) -> bool {
    let normalized = normalize(package);
    PROTECTED_PACKAGES
        .iter()
        .any(|protected| normalize(protected) == normalized)
}
