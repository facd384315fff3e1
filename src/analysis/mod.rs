//! Source scanning for depscope.
//!
//! This module walks a project tree and collects every name that could
//! denote use of a third-party package.
//!
//! # Features
//!
//! - Parse Python `import` and `from ... import` statements with tree-sitter
//! - Regex fallback over raw source text for imports the parser misses
//! - Textual scan of scripts, CI files and Dockerfiles for CLI tools
//! - Standard-library and local-module filtering
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use depscope::analysis::{scan, SegmentPolicy};
//!
//! let result = scan(Path::new("."), SegmentPolicy::All)?;
//! for name in &result.referenced {
//!     println!("{}", name);
//! }
//! # Ok::<(), depscope::analysis::AnalysisError>(())
//! ```

pub mod auxiliary;
pub mod filter;
pub mod imports;

use std::collections::BTreeSet;
use std::path::Path;

// Re-export main types for convenience
pub use auxiliary::{find_tool_references, scan_auxiliary_files};
pub use filter::{is_local_module, post_filter, StdlibModules};
pub use imports::{
    scan_python_files, AnalysisError, AnalysisResult, ImportAnalyzer, ImportSet, SegmentPolicy,
};

/// Everything one scan of a project tree found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResult {
    /// Root modules confirmed by parsing source files.
    pub modules: BTreeSet<String>,
    /// Built-in packages named in scripts and configuration files.
    pub tools: BTreeSet<String>,
    /// Union of every referenced name from both sub-scans.
    pub referenced: BTreeSet<String>,
}

/// Runs the structured and auxiliary scans over `root` and unions them.
///
/// The result is not post-filtered; see [`post_filter`].
pub fn scan(root: &Path, policy: SegmentPolicy) -> AnalysisResult<ScanResult> {
    let imports = scan_python_files(root, policy)?;
    let tools = scan_auxiliary_files(root);

    let mut referenced = imports.referenced;
    referenced.extend(tools.iter().cloned());

    Ok(ScanResult {
        modules: imports.modules,
        tools,
        referenced,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_scan_unions_both_sources() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("main.py"), "import requests\n").unwrap();
        fs::write(root.join("fetch.sh"), "gdown https://example.com/file\n").unwrap();

        let result = scan(root, SegmentPolicy::All).unwrap();

        assert!(result.referenced.contains("requests"));
        assert!(result.referenced.contains("gdown"));
        assert!(result.modules.contains("requests"));
        assert!(!result.modules.contains("gdown"));
        assert!(result.tools.contains("gdown"));
    }

    #[test]
    fn test_scan_empty_tree() {
        let dir = tempfile::tempdir().unwrap();
        let result = scan(dir.path(), SegmentPolicy::TopLevel).unwrap();
        assert_eq!(result, ScanResult::default());
    }
}
