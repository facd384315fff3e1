//! The dependency analyzer: one project root, one manifest, one
//! configuration.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use super::classifier::{Classification, MatchingMode, UsageClassifier};
use super::discover::discover_packages;
use crate::analysis::{self, post_filter, AnalysisError, ScanResult, SegmentPolicy, StdlibModules};
use crate::matching::DEFAULT_THRESHOLD;
use crate::parser::editor::{self, PopulateOutcome, RemovalReport};
use crate::parser::pyproject::{self, ManifestError};
use crate::parser::types::AnalysisConfig;
use crate::resolve::{CustomMappings, ImportResolver, SitePackages};

/// Default manifest file name.
pub const DEFAULT_MANIFEST: &str = "pyproject.toml";

/// Project name used by `generate` when the root has no usable name.
const FALLBACK_PROJECT_NAME: &str = "my-project";

/// Errors that can occur while analyzing a project.
#[derive(Error, Debug)]
pub enum UsageError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error("Similarity threshold must be between 0 and 1, got {0}")]
    InvalidThreshold(f64),
}

/// Result type for analyzer operations.
pub type UsageResult<T> = Result<T, UsageError>;

/// Settings given on the command line. Every `Some` overrides the
/// manifest's `[tool.depscope]` table.
#[derive(Debug, Clone, Default)]
pub struct AnalyzerOptions {
    pub root: PathBuf,
    pub manifest: Option<PathBuf>,
    pub threshold: Option<f64>,
    pub matching: Option<MatchingMode>,
    pub segments: Option<SegmentPolicy>,
    pub stdlib_list: Option<PathBuf>,
}

impl AnalyzerOptions {
    /// Options for `root` with everything else taken from the manifest.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }
}

/// Result of one analysis run.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub root: PathBuf,
    pub manifest: PathBuf,
    pub matching: MatchingMode,
    pub segments: SegmentPolicy,
    pub threshold: f64,
    /// Declared package names, lowercased.
    pub declared: BTreeSet<String>,
    /// Referenced names after the post-filter.
    #[serde(skip)]
    pub referenced: BTreeSet<String>,
    pub classification: Classification,
}

impl AnalysisReport {
    /// Declared packages with no evidence of use.
    pub fn unused(&self) -> BTreeSet<String> {
        self.classification.unused()
    }
}

/// Orchestrates manifest reading, scanning, resolution and classification.
///
/// The configuration is read once, here, and never reloaded.
#[derive(Debug)]
pub struct DependencyAnalyzer {
    root: PathBuf,
    manifest: PathBuf,
    config: AnalysisConfig,
    resolver: ImportResolver,
    stdlib: StdlibModules,
    matching: MatchingMode,
    segments: SegmentPolicy,
    threshold: f64,
}

impl DependencyAnalyzer {
    /// Builds an analyzer. A missing manifest is allowed; a malformed one
    /// is an error.
    pub fn new(options: AnalyzerOptions) -> UsageResult<Self> {
        let root = options.root;
        let manifest = options
            .manifest
            .unwrap_or_else(|| root.join(DEFAULT_MANIFEST));

        let config = pyproject::load_config(&manifest)?;

        let threshold = options
            .threshold
            .or(config.similarity_threshold)
            .unwrap_or(DEFAULT_THRESHOLD);
        if !(0.0..=1.0).contains(&threshold) {
            return Err(UsageError::InvalidThreshold(threshold));
        }

        let matching = options.matching.or(config.matching).unwrap_or_default();
        let segments = options.segments.or(config.segments).unwrap_or_default();

        let stdlib_list = options
            .stdlib_list
            .or_else(|| config.stdlib_list.as_ref().map(|p| root.join(p)));
        let stdlib = StdlibModules::load(stdlib_list.as_deref());

        let resolver = ImportResolver::standard(
            CustomMappings::new(&config.custom_mappings),
            SitePackages::discover(&root, &config.site_packages),
        );

        debug!(
            root = %root.display(),
            manifest = %manifest.display(),
            %matching,
            %segments,
            threshold,
            "analyzer ready"
        );

        Ok(Self {
            root,
            manifest,
            config,
            resolver,
            stdlib,
            matching,
            segments,
            threshold,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manifest(&self) -> &Path {
        &self.manifest
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn resolver(&self) -> &ImportResolver {
        &self.resolver
    }

    /// Scans the project tree without filtering.
    pub fn scan(&self) -> UsageResult<ScanResult> {
        Ok(analysis::scan(&self.root, self.segments)?)
    }

    /// Referenced names with standard-library and local modules removed.
    pub fn referenced_names(&self) -> UsageResult<BTreeSet<String>> {
        let scan = self.scan()?;
        Ok(post_filter(scan.referenced, &self.stdlib, &self.root))
    }

    /// Runs the full analysis.
    pub fn analyze(&self) -> UsageResult<AnalysisReport> {
        let declared = pyproject::read_declared(&self.manifest)?;
        let referenced = self.referenced_names()?;

        let classification = UsageClassifier::new(&self.resolver)
            .with_ignore(&self.config.ignore)
            .with_mode(self.matching)
            .with_threshold(self.threshold)
            .classify(&declared, &referenced);

        info!(
            declared = declared.len(),
            referenced = referenced.len(),
            unused = classification.unused().len(),
            "analysis finished"
        );

        Ok(AnalysisReport {
            root: self.root.clone(),
            manifest: self.manifest.clone(),
            matching: self.matching,
            segments: self.segments,
            threshold: self.threshold,
            declared,
            referenced,
            classification,
        })
    }

    /// Returns the declared-but-unused packages.
    pub fn find_unused(&self) -> UsageResult<BTreeSet<String>> {
        Ok(self.analyze()?.unused())
    }

    /// Removes `unused` from the manifest.
    pub fn remove(&self, unused: &BTreeSet<String>) -> UsageResult<RemovalReport> {
        Ok(editor::remove_unused(&self.manifest, unused)?)
    }

    /// Packages the project uses, sorted.
    pub fn discover(&self) -> UsageResult<Vec<String>> {
        let scan = self.scan()?;
        Ok(discover_packages(&scan, &self.stdlib, &self.root, &self.resolver))
    }

    /// Writes discovered packages into the manifest.
    pub fn generate(&self, force: bool) -> UsageResult<(Vec<String>, PopulateOutcome)> {
        let packages = self.discover()?;
        let outcome = editor::populate(&self.manifest, &packages, &self.project_name(), force)?;
        Ok((packages, outcome))
    }

    /// Name for a generated manifest: the root directory's name.
    fn project_name(&self) -> String {
        self.root
            .canonicalize()
            .ok()
            .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| FALLBACK_PROJECT_NAME.to_string())
    }
}
