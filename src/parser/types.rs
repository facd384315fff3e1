//! Shared types for manifest parsing.
//!
//! This module defines the data structures used to represent a
//! `pyproject.toml` manifest, its declared dependencies, and the
//! `[tool.depscope]` configuration section.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::analysis::SegmentPolicy;
use crate::usage::MatchingMode;

/// Name of the reserved configuration table under `[tool]`.
pub const TOOL_SECTION: &str = "depscope";

/// The pseudo-dependency on the interpreter itself in the nested-table
/// dialect. Never read as a package and never removed.
pub const PYTHON_PSEUDO_DEPENDENCY: &str = "python";

/// Represents the parts of a `pyproject.toml` that dependency analysis reads.
///
/// Every other table is ignored during deserialization.
///
/// # Example
///
/// ```
/// use depscope::parser::types::PyProject;
///
/// let toml = r#"
/// [project]
/// name = "my-app"
/// dependencies = ["requests>=2"]
/// "#;
/// let manifest: PyProject = toml::from_str(toml).unwrap();
/// assert_eq!(manifest.project.unwrap().name, Some("my-app".to_string()));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PyProject {
    /// PEP 621 `[project]` table.
    pub project: Option<ProjectSection>,

    /// `[tool]` table.
    pub tool: Option<ToolSection>,
}

impl PyProject {
    /// Returns the flat dependency specifier list, if present.
    pub fn project_dependencies(&self) -> &[String] {
        self.project
            .as_ref()
            .and_then(|p| p.dependencies.as_deref())
            .unwrap_or(&[])
    }

    /// Returns the nested Poetry dependency table, if present.
    pub fn poetry_dependencies(&self) -> Option<&BTreeMap<String, toml::Value>> {
        self.tool
            .as_ref()
            .and_then(|t| t.poetry.as_ref())
            .and_then(|p| p.dependencies.as_ref())
    }

    /// Returns true if either dependency dialect declares anything.
    ///
    /// The interpreter pseudo-dependency alone does not count.
    pub fn has_dependencies(&self) -> bool {
        !self.project_dependencies().is_empty()
            || self.poetry_dependencies().is_some_and(|deps| {
                deps.keys()
                    .any(|k| !k.eq_ignore_ascii_case(PYTHON_PSEUDO_DEPENDENCY))
            })
    }

    /// Returns the `[tool.depscope]` section, or the defaults.
    pub fn analysis_config(&self) -> AnalysisConfig {
        self.tool
            .as_ref()
            .and_then(|t| t.depscope.clone())
            .unwrap_or_default()
    }
}

/// PEP 621 `[project]` table.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProjectSection {
    /// The distribution name.
    pub name: Option<String>,

    /// The distribution version.
    pub version: Option<String>,

    /// A one-line summary.
    pub description: Option<String>,

    /// Dependency specifiers such as `"requests>=2.31; python_version>'3.8'"`.
    pub dependencies: Option<Vec<String>>,
}

/// `[tool]` table, restricted to the sections analysis cares about.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ToolSection {
    /// `[tool.poetry]`.
    pub poetry: Option<PoetrySection>,

    /// `[tool.depscope]`.
    pub depscope: Option<AnalysisConfig>,
}

/// `[tool.poetry]` table.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PoetrySection {
    /// Package name → version constraint (string or inline table).
    pub dependencies: Option<BTreeMap<String, toml::Value>>,
}

/// Per-project overrides from `[tool.depscope]`.
///
/// Loaded once when an analyzer is built and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Packages that are never reported unused.
    pub ignore: Vec<String>,

    /// Package name → import name(s). Overrides every other resolution tier.
    pub custom_mappings: BTreeMap<String, OneOrMany<String>>,

    /// Minimum fuzzy ratio; the matcher default applies when unset.
    pub similarity_threshold: Option<f64>,

    /// Classifier variant.
    pub matching: Option<MatchingMode>,

    /// How dotted import paths contribute referenced names.
    pub segments: Option<SegmentPolicy>,

    /// Extra `site-packages` directories to read distribution metadata from.
    pub site_packages: Vec<PathBuf>,

    /// File of standard-library module names replacing the built-in list.
    pub stdlib_list: Option<PathBuf>,
}

/// A TOML value that may be written as a single item or as a list.
///
/// `custom_mappings = { pillow = "PIL", opencv = ["cv2", "cv"] }` accepts both.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    /// A bare value.
    One(T),
    /// A list of values.
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    /// Returns the values as a slice, a bare value being a one-element list.
    pub fn as_slice(&self) -> &[T] {
        match self {
            OneOrMany::One(value) => std::slice::from_ref(value),
            OneOrMany::Many(values) => values,
        }
    }

    /// Converts into a list.
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        }
    }
}

/// Which declaration dialect a dependency came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DependencyDialect {
    /// `[project] dependencies = [...]`
    Pep621,
    /// `[tool.poetry.dependencies]`
    Poetry,
}

impl DependencyDialect {
    /// Returns the manifest location of this dialect.
    pub fn table_path(&self) -> &'static str {
        match self {
            DependencyDialect::Pep621 => "project.dependencies",
            DependencyDialect::Poetry => "tool.poetry.dependencies",
        }
    }
}

impl fmt::Display for DependencyDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DependencyDialect::Pep621 => "pep621",
            DependencyDialect::Poetry => "poetry",
        };
        write!(f, "{}", s)
    }
}

/// A single declared dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    /// Bare package name, lowercased.
    pub name: String,

    /// The original specifier (PEP 621) or constraint (Poetry) text.
    pub specifier: String,

    /// Where it was declared.
    pub dialect: DependencyDialect,
}

impl Dependency {
    /// Creates a new Dependency instance.
    pub fn new(
        name: impl Into<String>,
        specifier: impl Into<String>,
        dialect: DependencyDialect,
    ) -> Self {
        Self {
            name: name.into(),
            specifier: specifier.into(),
            dialect,
        }
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.specifier, self.dialect)
    }
}
