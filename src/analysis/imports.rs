//! Import analysis using tree-sitter for Python.
//!
//! This module parses Python source files and collects every module path and
//! imported member name, plus a regex pass over the raw text that catches
//! import-like lines the parser does not see as imports.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use tree_sitter::{Node, Parser, Tree, TreeCursor};
use walkdir::WalkDir;

use crate::policy::is_excluded_dir;

/// Errors that can occur during import analysis.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Failed to read file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse file: {path}")]
    ParseError { path: String },

    #[error("Tree-sitter language initialization failed")]
    LanguageInit,
}

/// Result type for analysis operations.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Matches import-like statements anywhere in the text. A `from x import a, b`
/// clause is one match, so its members never pass for module paths.
static IMPORT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"\bfrom\s+(?P<from>[a-zA-Z0-9_.]+)",
        r"(?:\s+import\s+\(?\s*(?P<members>[a-zA-Z0-9_*]+(?:\s*,\s*[a-zA-Z0-9_*]+)*))?",
        r"|\bimport\s+(?P<import>[a-zA-Z0-9_.]+)",
    ))
    .expect("import pattern is valid")
});

/// How a dotted import path contributes referenced names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SegmentPolicy {
    /// Every segment of a path counts, and so do the member names of
    /// `from x import a, b`.
    #[default]
    All,
    /// Only the root segment of a path counts.
    TopLevel,
}

impl FromStr for SegmentPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(SegmentPolicy::All),
            "top-level" | "toplevel" | "top" => Ok(SegmentPolicy::TopLevel),
            _ => Err(format!(
                "Unknown segment policy: '{}'. Valid policies: all, top-level",
                s
            )),
        }
    }
}

impl fmt::Display for SegmentPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SegmentPolicy::All => write!(f, "all"),
            SegmentPolicy::TopLevel => write!(f, "top-level"),
        }
    }
}

/// Names collected from source files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSet {
    /// Root segments of every imported module path, lowercased.
    pub modules: BTreeSet<String>,
    /// Every referenced name under the active [`SegmentPolicy`], lowercased.
    pub referenced: BTreeSet<String>,
}

impl ImportSet {
    /// Create a new empty ImportSet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a dotted module path.
    pub fn add_module_path(&mut self, path: &str, policy: SegmentPolicy) {
        let mut segments = path.split('.').filter(|s| !s.is_empty());

        let Some(root) = segments.next() else {
            return;
        };
        let root = root.to_lowercase();
        self.modules.insert(root.clone());
        self.referenced.insert(root);

        if policy == SegmentPolicy::All {
            self.referenced
                .extend(segments.map(|segment| segment.to_lowercase()));
        }
    }

    /// Records a dotted path seen by the textual pass or a relative import.
    /// Only `referenced` grows; `modules` holds third-party candidates the
    /// parser confirmed.
    pub fn add_textual_path(&mut self, path: &str, policy: SegmentPolicy) {
        let mut segments = path.split('.').filter(|s| !s.is_empty());

        let Some(root) = segments.next() else {
            return;
        };
        self.referenced.insert(root.to_lowercase());

        if policy == SegmentPolicy::All {
            self.referenced
                .extend(segments.map(|segment| segment.to_lowercase()));
        }
    }

    /// Records a member imported with `from module import name`.
    pub fn add_member(&mut self, name: &str, policy: SegmentPolicy) {
        if policy == SegmentPolicy::All && !name.is_empty() && name != "*" {
            self.referenced.insert(name.to_lowercase());
        }
    }

    /// Merges another set into this one.
    pub fn extend(&mut self, other: ImportSet) {
        self.modules.extend(other.modules);
        self.referenced.extend(other.referenced);
    }

    /// Returns true if nothing was collected.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty() && self.referenced.is_empty()
    }
}

/// Returns true if `path` is a Python source file.
pub fn is_python_source(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("py") | Some("pyi")
    )
}

/// Analyzer for extracting imports from Python source files.
pub struct ImportAnalyzer {
    parser: Parser,
    policy: SegmentPolicy,
}

impl ImportAnalyzer {
    /// Create a new ImportAnalyzer.
    pub fn new(policy: SegmentPolicy) -> AnalysisResult<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .map_err(|_| AnalysisError::LanguageInit)?;

        Ok(Self { parser, policy })
    }

    /// Returns the active segment policy.
    pub fn policy(&self) -> SegmentPolicy {
        self.policy
    }

    /// Analyze a single file.
    pub fn analyze_file(&mut self, path: &Path) -> AnalysisResult<ImportSet> {
        let content = fs::read_to_string(path)?;
        self.analyze_source(&content, path)
    }

    /// Analyze source code directly.
    ///
    /// Source that does not parse cleanly is an error; nothing from it is
    /// kept, not even the regex matches.
    pub fn analyze_source(&mut self, source: &str, path: &Path) -> AnalysisResult<ImportSet> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| AnalysisError::ParseError {
                path: path.display().to_string(),
            })?;

        if tree.root_node().has_error() {
            return Err(AnalysisError::ParseError {
                path: path.display().to_string(),
            });
        }

        let mut imports = self.extract_imports(&tree, source);
        self.extract_textual_imports(source, &mut imports);
        Ok(imports)
    }

    /// Extract imports from a parsed tree.
    fn extract_imports(&self, tree: &Tree, source: &str) -> ImportSet {
        let mut imports = ImportSet::new();
        let mut cursor = tree.root_node().walk();

        self.visit_node(&mut cursor, source, &mut imports);

        imports
    }

    /// Recursively visit nodes to find imports.
    fn visit_node(&self, cursor: &mut TreeCursor, source: &str, imports: &mut ImportSet) {
        let node = cursor.node();

        match node.kind() {
            "import_statement" => self.parse_import(&node, source, imports),
            "import_from_statement" => self.parse_from_import(&node, source, imports),
            _ => {}
        }

        if cursor.goto_first_child() {
            loop {
                self.visit_node(cursor, source, imports);
                if !cursor.goto_next_sibling() {
                    break;
                }
            }
            cursor.goto_parent();
        }
    }

    /// Parse `import a.b, c as d`.
    fn parse_import(&self, node: &Node, source: &str, imports: &mut ImportSet) {
        let mut cursor = node.walk();
        for name in node.children_by_field_name("name", &mut cursor) {
            if let Some(path) = self.imported_path(&name, source) {
                imports.add_module_path(path, self.policy);
            }
        }
    }

    /// Parse `from a.b import c, d as e`.
    ///
    /// Relative imports point at project code: the dotted part after the
    /// dots counts as referenced but never as a module.
    /// Wildcards contribute no member names.
    fn parse_from_import(&self, node: &Node, source: &str, imports: &mut ImportSet) {
        if let Some(module) = node.child_by_field_name("module_name") {
            if module.kind() == "relative_import" {
                if let Some(path) = self
                    .find_child(&module, "dotted_name")
                    .and_then(|dotted| self.node_text(&dotted, source))
                {
                    imports.add_textual_path(path, self.policy);
                }
            } else if let Some(path) = self.node_text(&module, source) {
                imports.add_module_path(path, self.policy);
            }
        }

        let mut cursor = node.walk();
        for name in node.children_by_field_name("name", &mut cursor) {
            if let Some(member) = self.imported_path(&name, source) {
                imports.add_member(member, self.policy);
            }
        }
    }

    /// The original (un-aliased) dotted name of an import target.
    fn imported_path<'a>(&self, node: &Node, source: &'a str) -> Option<&'a str> {
        match node.kind() {
            "dotted_name" => self.node_text(node, source),
            "aliased_import" => node
                .child_by_field_name("name")
                .and_then(|name| self.node_text(&name, source)),
            _ => None,
        }
    }

    /// Find the first direct child of a given kind.
    fn find_child<'t>(&self, node: &Node<'t>, kind: &str) -> Option<Node<'t>> {
        let mut cursor = node.walk();
        let found = node.children(&mut cursor).find(|child| child.kind() == kind);
        found
    }

    /// Collect regex hits over the raw text.
    fn extract_textual_imports(&self, source: &str, imports: &mut ImportSet) {
        for capture in IMPORT_PATTERN.captures_iter(source) {
            if let Some(path) = capture.name("from").or_else(|| capture.name("import")) {
                imports.add_textual_path(path.as_str(), self.policy);
            }
            if let Some(members) = capture.name("members") {
                for member in members.as_str().split(',') {
                    imports.add_member(member.trim(), self.policy);
                }
            }
        }
    }

    /// Extract the text content of a node.
    fn node_text<'a>(&self, node: &Node, source: &'a str) -> Option<&'a str> {
        source.get(node.start_byte()..node.end_byte())
    }
}

/// Scan every Python source file under `root`, skipping excluded
/// directories.
///
/// Files that cannot be read or parsed are logged and skipped; only a
/// grammar initialization failure aborts the scan.
pub fn scan_python_files(root: &Path, policy: SegmentPolicy) -> AnalysisResult<ImportSet> {
    let mut analyzer = ImportAnalyzer::new(policy)?;
    let mut imports = ImportSet::new();
    let mut files = 0usize;

    for entry in WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| !is_excluded_dir(e))
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !entry.file_type().is_file() || !is_python_source(path) {
            continue;
        }

        match analyzer.analyze_file(path) {
            Ok(found) => {
                files += 1;
                imports.extend(found);
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not parse source file");
            }
        }
    }

    debug!(files, names = imports.referenced.len(), "structured scan finished");
    Ok(imports)
}
