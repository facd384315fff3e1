//! Package discovery: the packages a project uses, whether or not its
//! manifest declares them.

use std::collections::BTreeSet;
use std::path::Path;

use tracing::debug;

use crate::analysis::{post_filter, ScanResult, StdlibModules};
use crate::policy::is_protected;
use crate::resolve::ImportResolver;

/// Maps the top-level modules and tool hits of a scan to package names.
///
/// Standard-library and local modules are dropped, as are protected
/// packages. The result is sorted and free of duplicates.
pub fn discover_packages(
    scan: &ScanResult,
    stdlib: &StdlibModules,
    root: &Path,
    resolver: &ImportResolver,
) -> Vec<String> {
    let names: BTreeSet<String> = scan.modules.union(&scan.tools).cloned().collect();

    let packages: BTreeSet<String> = post_filter(names, stdlib, root)
        .into_iter()
        .filter(|module| !is_protected(module))
        .map(|module| {
            let package = resolver.package_for_import(&module);
            debug!(module = %module, package = %package, "discovered package");
            package
        })
        .filter(|package| !is_protected(package))
        .collect();

    packages.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::{CustomMappings, SitePackages};
    use std::fs;

    fn scan_of(modules: &[&str], tools: &[&str]) -> ScanResult {
        let modules: BTreeSet<String> = modules.iter().map(|s| s.to_string()).collect();
        let tools: BTreeSet<String> = tools.iter().map(|s| s.to_string()).collect();
        ScanResult {
            referenced: modules.union(&tools).cloned().collect(),
            modules,
            tools,
        }
    }

    #[test]
    fn test_discover_maps_modules_to_packages() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("config.py"), "").unwrap();
        let resolver = ImportResolver::standard(CustomMappings::default(), SitePackages::default());

        let scan = scan_of(
            &["os", "json", "requests", "yaml", "sklearn", "pil", "config", "pytest"],
            &["gdown"],
        );
        let packages = discover_packages(&scan, &StdlibModules::builtin(), dir.path(), &resolver);

        assert_eq!(
            packages,
            vec!["gdown", "pillow", "pyyaml", "requests", "scikit-learn"]
        );
    }

    #[test]
    fn test_discover_empty_scan() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = ImportResolver::standard(CustomMappings::default(), SitePackages::default());

        let packages =
            discover_packages(&ScanResult::default(), &StdlibModules::builtin(), dir.path(), &resolver);
        assert!(packages.is_empty());
    }
}
