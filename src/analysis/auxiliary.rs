//! Textual scan of scripts and configuration files.
//!
//! Some packages only ever run as command-line tools, so the only evidence
//! of their use is their name appearing in shell scripts, CI configuration,
//! requirement lists or container files.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;
use walkdir::WalkDir;

use crate::policy::is_excluded_dir;
use crate::resolve::builtin::builtin_packages;

/// One case-insensitive word-boundary pattern per package in the built-in
/// mapping table.
static TOOL_PATTERNS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    builtin_packages()
        .filter_map(|package| {
            Regex::new(&format!(r"(?i)\b{}\b", regex::escape(package)))
                .ok()
                .map(|re| (package, re))
        })
        .collect()
});

/// Returns true if the auxiliary scan reads this file.
pub fn is_auxiliary_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };

    if name.ends_with("Dockerfile") {
        return true;
    }

    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("sh") | Some("yml") | Some("yaml") | Some("txt")
    )
}

/// Returns the built-in packages named in `content`.
pub fn find_tool_references(content: &str) -> BTreeSet<String> {
    TOOL_PATTERNS
        .iter()
        .filter(|(_, pattern)| pattern.is_match(content))
        .map(|(package, _)| package.to_string())
        .collect()
}

/// Scans auxiliary files under `root` for built-in package names.
///
/// Unreadable files are skipped without a warning.
pub fn scan_auxiliary_files(root: &Path) -> BTreeSet<String> {
    let mut found = BTreeSet::new();

    for entry in WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| !is_excluded_dir(e))
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !entry.file_type().is_file() || !is_auxiliary_file(path) {
            continue;
        }

        let Ok(content) = fs::read_to_string(path) else {
            continue;
        };

        let hits = find_tool_references(&content);
        if !hits.is_empty() {
            debug!(path = %path.display(), tools = ?hits, "tool references found");
            found.extend(hits);
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_auxiliary_file() {
        assert!(is_auxiliary_file(Path::new("scripts/fetch.sh")));
        assert!(is_auxiliary_file(Path::new(".github/workflows/ci.yml")));
        assert!(is_auxiliary_file(Path::new("compose.yaml")));
        assert!(is_auxiliary_file(Path::new("requirements.txt")));
        assert!(is_auxiliary_file(Path::new("Dockerfile")));
        assert!(is_auxiliary_file(Path::new("api.Dockerfile")));
        assert!(!is_auxiliary_file(Path::new("main.py")));
        assert!(!is_auxiliary_file(Path::new("README.md")));
    }

    #[test]
    fn test_find_tool_references_word_boundaries() {
        let hits = find_tool_references("gdown --id abc\ndvc pull\n");
        assert!(hits.contains("gdown"));
        assert!(hits.contains("dvc"));

        let hits = find_tool_references("run gdownload and advcx\n");
        assert!(hits.is_empty());
    }

    #[test]
    fn test_find_tool_references_ignores_case() {
        let hits = find_tool_references("RUN pip install PyYAML GitPython\n");
        assert!(hits.contains("pyyaml"));
        assert!(hits.contains("gitpython"));
    }

    #[test]
    fn test_find_tool_references_hyphenated_names() {
        let hits = find_tool_references("pip install opencv-python\n");
        assert!(hits.contains("opencv-python"));
    }

    #[test]
    fn test_scan_auxiliary_files() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();

        fs::write(root.join("download.sh"), "#!/bin/sh\ngdown $URL\n").unwrap();
        fs::write(root.join("Dockerfile"), "CMD [\"uvicorn\", \"app:app\"]\n").unwrap();
        fs::write(root.join("notes.md"), "dvc is mentioned here\n").unwrap();
        fs::write(root.join("blob.txt"), [0xff, 0xfe, 0x00]).unwrap();
        fs::create_dir_all(root.join("node_modules/x")).unwrap();
        fs::write(root.join("node_modules/x/run.sh"), "httpx\n").unwrap();

        let found = scan_auxiliary_files(root);

        assert!(found.contains("gdown"));
        assert!(found.contains("uvicorn"));
        assert!(!found.contains("dvc"));
        assert!(!found.contains("httpx"));
    }
}
