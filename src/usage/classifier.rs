//! Used/unused classification of declared dependencies.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::matching::{is_similar, normalize, DEFAULT_THRESHOLD};
use crate::policy::is_protected;
use crate::resolve::{ImportResolver, LookupSource};

/// Which classifier variant runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchingMode {
    /// Exact candidate matching, then fuzzy matching.
    #[default]
    Lenient,
    /// Exact candidate matching only.
    Strict,
}

impl FromStr for MatchingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lenient" => Ok(MatchingMode::Lenient),
            "strict" => Ok(MatchingMode::Strict),
            _ => Err(format!(
                "Unknown matching mode: '{}'. Valid modes: lenient, strict",
                s
            )),
        }
    }
}

impl fmt::Display for MatchingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchingMode::Lenient => write!(f, "lenient"),
            MatchingMode::Strict => write!(f, "strict"),
        }
    }
}

/// Why a dependency counts as used, or that it does not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Evidence {
    /// On the user's ignore list.
    Ignored,
    /// On the built-in protected list.
    Protected,
    /// A candidate import name (or the package name) was referenced.
    Exact { name: String },
    /// A referenced name is similar to the package or a candidate.
    Fuzzy { name: String, referenced: String },
    /// Nothing references it.
    Unused,
}

/// The classification of one declared dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub package: String,
    /// Resolution tier, absent for ignored and protected packages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<LookupSource>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub candidates: Vec<String>,
    pub evidence: Evidence,
}

impl Verdict {
    /// Returns true unless no evidence of use was found.
    pub fn is_used(&self) -> bool {
        !matches!(self.evidence, Evidence::Unused)
    }
}

/// Verdicts for every declared dependency, in package name order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub verdicts: Vec<Verdict>,
}

impl Classification {
    /// Declared names with no evidence of use.
    pub fn unused(&self) -> BTreeSet<String> {
        self.verdicts
            .iter()
            .filter(|v| !v.is_used())
            .map(|v| v.package.clone())
            .collect()
    }

    /// Verdicts of dependencies that count as used.
    pub fn used(&self) -> impl Iterator<Item = &Verdict> {
        self.verdicts.iter().filter(|v| v.is_used())
    }

    /// Looks up the verdict of a package.
    pub fn get(&self, package: &str) -> Option<&Verdict> {
        let package = package.to_lowercase();
        self.verdicts.iter().find(|v| v.package == package)
    }

    pub fn len(&self) -> usize {
        self.verdicts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.verdicts.is_empty()
    }
}

/// Decides for each declared dependency whether the scan found a use.
#[derive(Debug)]
pub struct UsageClassifier<'a> {
    resolver: &'a ImportResolver,
    ignore: BTreeSet<String>,
    mode: MatchingMode,
    threshold: f64,
}

impl<'a> UsageClassifier<'a> {
    /// Creates a lenient classifier with the default threshold.
    pub fn new(resolver: &'a ImportResolver) -> Self {
        Self {
            resolver,
            ignore: BTreeSet::new(),
            mode: MatchingMode::default(),
            threshold: DEFAULT_THRESHOLD,
        }
    }

    /// Packages that are never reported unused.
    pub fn with_ignore<I, S>(mut self, ignore: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.ignore = ignore.into_iter().map(|s| normalize(s.as_ref())).collect();
        self
    }

    pub fn with_mode(mut self, mode: MatchingMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Classifies every declared name against the referenced set.
    ///
    /// `referenced` is expected lowercased, as the scanner produces it.
    pub fn classify(
        &self,
        declared: &BTreeSet<String>,
        referenced: &BTreeSet<String>,
    ) -> Classification {
        let verdicts = declared
            .iter()
            .map(|package| self.classify_one(package, referenced))
            .collect();

        Classification { verdicts }
    }

    fn classify_one(&self, package: &str, referenced: &BTreeSet<String>) -> Verdict {
        let package = package.to_lowercase();

        if self.ignore.contains(&normalize(&package)) {
            return Verdict {
                package,
                source: None,
                candidates: Vec::new(),
                evidence: Evidence::Ignored,
            };
        }
        if is_protected(&package) {
            return Verdict {
                package,
                source: None,
                candidates: Vec::new(),
                evidence: Evidence::Protected,
            };
        }

        let resolution = self.resolver.resolve(&package);
        let evidence = self.find_evidence(&package, &resolution.names, referenced);

        Verdict {
            package,
            source: Some(resolution.source),
            candidates: resolution.names,
            evidence,
        }
    }

    fn find_evidence(
        &self,
        package: &str,
        candidates: &[String],
        referenced: &BTreeSet<String>,
    ) -> Evidence {
        let exact = candidates
            .iter()
            .map(|c| c.to_lowercase())
            .chain(std::iter::once(package.to_string()))
            .find(|name| referenced.contains(name));
        if let Some(name) = exact {
            return Evidence::Exact { name };
        }

        if self.mode == MatchingMode::Strict {
            return Evidence::Unused;
        }

        for name in std::iter::once(package).chain(candidates.iter().map(String::as_str)) {
            if let Some(hit) = referenced
                .iter()
                .find(|r| is_similar(name, r, self.threshold))
            {
                return Evidence::Fuzzy {
                    name: name.to_string(),
                    referenced: hit.clone(),
                };
            }
        }

        Evidence::Unused
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::types::OneOrMany;
    use crate::resolve::{CustomMappings, SitePackages};
    use std::collections::BTreeMap;

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn resolver() -> ImportResolver {
        ImportResolver::standard(CustomMappings::default(), SitePackages::default())
    }

    #[test]
    fn test_exact_candidate_match() {
        let resolver = resolver();
        let result = UsageClassifier::new(&resolver)
            .classify(&set(&["requests", "numpy"]), &set(&["requests", "os"]));

        assert_eq!(result.unused(), set(&["numpy"]));
        assert_eq!(
            result.get("requests").unwrap().evidence,
            Evidence::Exact { name: "requests".to_string() }
        );
    }

    #[test]
    fn test_builtin_mapping_match() {
        let resolver = resolver();
        let result = UsageClassifier::new(&resolver)
            .with_mode(MatchingMode::Strict)
            .classify(&set(&["pillow", "scikit-learn"]), &set(&["pil", "sklearn"]));

        assert!(result.unused().is_empty());
        assert_eq!(result.get("pillow").unwrap().source, Some(LookupSource::Builtin));
    }

    #[test]
    fn test_ignore_list_wins() {
        let resolver = resolver();
        let result = UsageClassifier::new(&resolver)
            .with_ignore(["Gunicorn"])
            .classify(&set(&["gunicorn"]), &BTreeSet::new());

        assert!(result.unused().is_empty());
        assert_eq!(result.get("gunicorn").unwrap().evidence, Evidence::Ignored);
    }

    #[test]
    fn test_protected_packages_never_unused() {
        let resolver = resolver();
        let result = UsageClassifier::new(&resolver)
            .with_mode(MatchingMode::Strict)
            .classify(&set(&["pytest", "black", "depscope"]), &BTreeSet::new());

        assert!(result.unused().is_empty());
        assert!(result.verdicts.iter().all(|v| v.evidence == Evidence::Protected));
    }

    #[test]
    fn test_fuzzy_match_only_when_lenient() {
        let resolver = resolver();
        let declared = set(&["python-dateutil"]);
        let referenced = set(&["dateutil"]);

        let lenient = UsageClassifier::new(&resolver).classify(&declared, &referenced);
        assert!(lenient.unused().is_empty());
        assert!(matches!(
            lenient.get("python-dateutil").unwrap().evidence,
            Evidence::Fuzzy { .. }
        ));

        let strict = UsageClassifier::new(&resolver)
            .with_mode(MatchingMode::Strict)
            .classify(&declared, &referenced);
        assert_eq!(strict.unused(), declared);
    }

    #[test]
    fn test_declared_name_counts_in_strict_mode() {
        let resolver = resolver();
        let result = UsageClassifier::new(&resolver)
            .with_mode(MatchingMode::Strict)
            .classify(&set(&["opencv-python"]), &set(&["opencv-python"]));

        assert!(result.unused().is_empty());
    }

    #[test]
    fn test_custom_mapping_used() {
        let mut map = BTreeMap::new();
        map.insert("internal-sdk".to_string(), OneOrMany::One("acme".to_string()));
        let resolver = ImportResolver::standard(CustomMappings::new(&map), SitePackages::default());

        let result = UsageClassifier::new(&resolver)
            .with_mode(MatchingMode::Strict)
            .classify(&set(&["internal-sdk"]), &set(&["acme"]));

        assert!(result.unused().is_empty());
        assert_eq!(result.get("internal-sdk").unwrap().source, Some(LookupSource::Custom));
    }

    #[test]
    fn test_threshold_controls_fuzzy_matching() {
        let resolver = resolver();
        // "abcd" vs "bcde" has ratio 0.75 and no substring relation
        let declared = set(&["abcd"]);
        let referenced = set(&["bcde"]);

        let loose = UsageClassifier::new(&resolver).with_threshold(0.7);
        assert!(loose.classify(&declared, &referenced).unused().is_empty());

        let tight = UsageClassifier::new(&resolver).with_threshold(0.8);
        assert_eq!(tight.classify(&declared, &referenced).unused(), declared);
    }

    #[test]
    fn test_matching_mode_from_str() {
        assert_eq!("strict".parse::<MatchingMode>().unwrap(), MatchingMode::Strict);
        assert_eq!("LENIENT".parse::<MatchingMode>().unwrap(), MatchingMode::Lenient);
        assert!("fuzzy".parse::<MatchingMode>().is_err());
    }
}
