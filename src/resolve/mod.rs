//! Package name to import name resolution.
//!
//! A declared package is resolved by asking an ordered chain of lookups:
//! the user's custom mappings, the built-in table, then installed
//! distribution metadata. The first lookup with an answer wins and answers
//! are never merged. When every lookup misses, the package name with `-`
//! replaced by `_` is the only candidate.
//!
//! The same chain answers the reverse question (which package provides a
//! module) for package discovery.

pub mod builtin;
pub mod metadata;

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::matching::normalize;
use crate::parser::types::OneOrMany;

pub use builtin::{builtin_import_names, builtin_package_for_import, BASE_MAPPING};
pub use metadata::{Distribution, SitePackages};

/// Where a resolution came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LookupSource {
    /// `[tool.depscope] custom_mappings`.
    Custom,
    /// The built-in mapping table.
    Builtin,
    /// `top_level.txt` of an installed distribution.
    Installed,
    /// Separator replacement on the package name.
    Fallback,
}

impl fmt::Display for LookupSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LookupSource::Custom => "custom",
            LookupSource::Builtin => "builtin",
            LookupSource::Installed => "installed",
            LookupSource::Fallback => "fallback",
        };
        write!(f, "{}", s)
    }
}

/// One tier of the resolution chain.
pub trait ImportLookup {
    /// Which tier this is.
    fn source(&self) -> LookupSource;

    /// Import names for `package`, or `None` to defer to the next tier.
    fn import_names(&self, package: &str) -> Option<Vec<String>>;

    /// The package providing `module`, or `None` to defer to the next tier.
    fn package_for_import(&self, module: &str) -> Option<String>;
}

/// Candidate import names of a package and the tier that produced them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub source: LookupSource,
    pub names: Vec<String>,
}

/// User-supplied package to import-name mappings, keyed by normalized
/// package name.
#[derive(Debug, Clone, Default)]
pub struct CustomMappings {
    entries: Vec<(String, String, Vec<String>)>,
}

impl CustomMappings {
    /// Builds the lookup from the configuration table.
    pub fn new(mappings: &BTreeMap<String, OneOrMany<String>>) -> Self {
        let entries = mappings
            .iter()
            .map(|(package, imports)| {
                (
                    normalize(package),
                    package.to_lowercase(),
                    imports.as_slice().to_vec(),
                )
            })
            .collect();

        Self { entries }
    }

    /// Returns true if no mappings are configured.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ImportLookup for CustomMappings {
    fn source(&self) -> LookupSource {
        LookupSource::Custom
    }

    fn import_names(&self, package: &str) -> Option<Vec<String>> {
        let key = normalize(package);
        self.entries
            .iter()
            .find(|(normalized, _, _)| *normalized == key)
            .map(|(_, _, imports)| imports.clone())
    }

    fn package_for_import(&self, module: &str) -> Option<String> {
        self.entries
            .iter()
            .find(|(_, _, imports)| imports.iter().any(|i| i.eq_ignore_ascii_case(module)))
            .map(|(_, package, _)| package.clone())
    }
}

/// The built-in mapping table as a lookup tier.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinMappings;

impl ImportLookup for BuiltinMappings {
    fn source(&self) -> LookupSource {
        LookupSource::Builtin
    }

    fn import_names(&self, package: &str) -> Option<Vec<String>> {
        builtin_import_names(package).map(|names| names.iter().map(|n| n.to_string()).collect())
    }

    fn package_for_import(&self, module: &str) -> Option<String> {
        builtin_package_for_import(module).map(String::from)
    }
}

impl ImportLookup for SitePackages {
    fn source(&self) -> LookupSource {
        LookupSource::Installed
    }

    fn import_names(&self, package: &str) -> Option<Vec<String>> {
        SitePackages::import_names(self, package)
    }

    fn package_for_import(&self, module: &str) -> Option<String> {
        self.package_for_module(module)
    }
}

/// The ordered resolution chain.
pub struct ImportResolver {
    lookups: Vec<Box<dyn ImportLookup>>,
}

impl ImportResolver {
    /// Creates a resolver from lookups in precedence order.
    pub fn new(lookups: Vec<Box<dyn ImportLookup>>) -> Self {
        Self { lookups }
    }

    /// The standard chain: custom, built-in, installed.
    pub fn standard(custom: CustomMappings, site_packages: SitePackages) -> Self {
        Self::new(vec![
            Box::new(custom),
            Box::new(BuiltinMappings),
            Box::new(site_packages),
        ])
    }

    /// Resolves `package` to candidate import names. Never empty for a
    /// non-empty package name.
    ///
    /// ```
    /// use depscope::resolve::{CustomMappings, ImportResolver, LookupSource, SitePackages};
    ///
    /// let resolver = ImportResolver::standard(CustomMappings::default(), SitePackages::default());
    ///
    /// let pillow = resolver.resolve("pillow");
    /// assert_eq!(pillow.source, LookupSource::Builtin);
    /// assert_eq!(pillow.names, vec!["PIL".to_string()]);
    ///
    /// let dateutil = resolver.resolve("python-dateutil");
    /// assert_eq!(dateutil.source, LookupSource::Fallback);
    /// assert_eq!(dateutil.names, vec!["python_dateutil".to_string()]);
    /// ```
    pub fn resolve(&self, package: &str) -> Resolution {
        for lookup in &self.lookups {
            if let Some(names) = lookup.import_names(package) {
                if !names.is_empty() {
                    return Resolution {
                        source: lookup.source(),
                        names,
                    };
                }
            }
        }

        Resolution {
            source: LookupSource::Fallback,
            names: vec![package.replace('-', "_")],
        }
    }

    /// Maps a module back to the package that provides it, or the module
    /// name itself when no tier knows it.
    pub fn package_for_import(&self, module: &str) -> String {
        self.lookups
            .iter()
            .find_map(|lookup| lookup.package_for_import(module))
            .unwrap_or_else(|| module.to_string())
            .to_lowercase()
    }
}

impl fmt::Debug for ImportResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sources: Vec<LookupSource> = self.lookups.iter().map(|l| l.source()).collect();
        f.debug_struct("ImportResolver")
            .field("lookups", &sources)
            .finish()
    }
}
