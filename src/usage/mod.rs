//! Dependency usage analysis.
//!
//! Combines the manifest reader, the source scanner and the import-name
//! resolver to decide which declared packages are used.
//!
//! # Example
//!
//! ```no_run
//! use depscope::usage::{AnalyzerOptions, DependencyAnalyzer};
//!
//! let analyzer = DependencyAnalyzer::new(AnalyzerOptions::new("."))?;
//! for package in analyzer.find_unused()? {
//!     println!("unused: {}", package);
//! }
//! # Ok::<(), depscope::usage::UsageError>(())
//! ```

pub mod analyzer;
pub mod classifier;
pub mod discover;

use std::collections::BTreeSet;
use std::path::Path;

// Re-export main types for convenience
pub use analyzer::{
    AnalysisReport, AnalyzerOptions, DependencyAnalyzer, UsageError, UsageResult,
    DEFAULT_MANIFEST,
};
pub use classifier::{Classification, Evidence, MatchingMode, UsageClassifier, Verdict};
pub use discover::discover_packages;

use crate::matching::DEFAULT_THRESHOLD;
use crate::parser::types::AnalysisConfig;
use crate::resolve::{CustomMappings, ImportResolver, SitePackages};

/// Returns the declared names with no evidence of use in `referenced`.
///
/// Resolution uses the configured custom mappings, the built-in table and
/// any `site_packages` directories the configuration names. Relative
/// `site_packages` entries are resolved against the working directory; use
/// [`classify_in`] to resolve them against a project root instead.
///
/// ```
/// use std::collections::BTreeSet;
/// use depscope::parser::AnalysisConfig;
/// use depscope::usage::classify;
///
/// let declared = BTreeSet::from(["requests".to_string(), "numpy".to_string()]);
/// let referenced = BTreeSet::from(["requests".to_string()]);
///
/// let unused = classify(&declared, &referenced, &AnalysisConfig::default());
/// assert_eq!(unused, BTreeSet::from(["numpy".to_string()]));
/// ```
pub fn classify(
    declared: &BTreeSet<String>,
    referenced: &BTreeSet<String>,
    config: &AnalysisConfig,
) -> BTreeSet<String> {
    classify_in(Path::new("."), declared, referenced, config)
}

/// Like [`classify`], with relative `site_packages` entries resolved
/// against `root`, as [`DependencyAnalyzer`] does.
pub fn classify_in(
    root: &Path,
    declared: &BTreeSet<String>,
    referenced: &BTreeSet<String>,
    config: &AnalysisConfig,
) -> BTreeSet<String> {
    let resolver = ImportResolver::standard(
        CustomMappings::new(&config.custom_mappings),
        SitePackages::from_configured(root, &config.site_packages),
    );

    UsageClassifier::new(&resolver)
        .with_ignore(&config.ignore)
        .with_mode(config.matching.unwrap_or_default())
        .with_threshold(config.similarity_threshold.unwrap_or(DEFAULT_THRESHOLD))
        .classify(declared, referenced)
        .unused()
}
