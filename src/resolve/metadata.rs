//! Installed-distribution metadata from `site-packages` directories.
//!
//! Every `*.dist-info` and `*.egg-info` directory is indexed by its PEP 503
//! normalized name. Import names come from `top_level.txt`, display names
//! from the `Name:` header of `METADATA` or `PKG-INFO`.

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::matching::pep503_normalize;

/// Virtual environment directories looked for under the project root.
const LOCAL_ENV_DIRS: &[&str] = &[".venv", "venv"];

/// One installed distribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Distribution {
    /// Name taken from the metadata directory, before the version.
    pub name: String,
    /// The `*.dist-info` or `*.egg-info` directory.
    pub metadata_dir: PathBuf,
}

impl Distribution {
    /// Reads the top-level import names.
    ///
    /// `Ok(None)` means the distribution has no `top_level.txt`.
    pub fn top_level(&self) -> std::io::Result<Option<Vec<String>>> {
        let path = self.metadata_dir.join("top_level.txt");
        if !path.is_file() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)?;
        let names: Vec<String> = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect();

        Ok(Some(names))
    }

    /// The `Name:` header of the core metadata file, if readable.
    pub fn display_name(&self) -> Option<String> {
        ["METADATA", "PKG-INFO"].iter().find_map(|file| {
            let content = fs::read_to_string(self.metadata_dir.join(file)).ok()?;
            content
                .lines()
                .take_while(|line| !line.is_empty())
                .find_map(|line| line.strip_prefix("Name:"))
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty())
        })
    }
}

/// Index of installed distributions across a set of `site-packages`
/// directories. Earlier directories take precedence.
#[derive(Debug, Clone, Default)]
pub struct SitePackages {
    dirs: Vec<PathBuf>,
    distributions: BTreeMap<String, Distribution>,
}

impl SitePackages {
    /// Builds the index from configured directories, `$VIRTUAL_ENV`, and
    /// `.venv`/`venv` under `root`.
    ///
    /// Finding no directory at all is logged once; lookups then always miss.
    pub fn discover(root: &Path, configured: &[PathBuf]) -> Self {
        let mut dirs = configured_dirs(root, configured);

        let mut envs: Vec<PathBuf> = Vec::new();
        if let Some(virtual_env) = env::var_os("VIRTUAL_ENV") {
            envs.push(PathBuf::from(virtual_env));
        }
        envs.extend(LOCAL_ENV_DIRS.iter().map(|name| root.join(name)));

        for env_dir in envs {
            for dir in site_packages_of(&env_dir) {
                if !dirs.contains(&dir) {
                    dirs.push(dir);
                }
            }
        }

        if dirs.is_empty() {
            warn!("no site-packages directory found, installed package metadata is unavailable");
        }

        Self::from_dirs(dirs)
    }

    /// Builds the index from configured directories only. Relative entries
    /// are resolved against `root`, the same way [`SitePackages::discover`]
    /// resolves them.
    pub fn from_configured(root: &Path, configured: &[PathBuf]) -> Self {
        Self::from_dirs(configured_dirs(root, configured))
    }

    /// Builds the index from explicit `site-packages` directories.
    pub fn from_dirs(dirs: Vec<PathBuf>) -> Self {
        let mut distributions = BTreeMap::new();

        for dir in &dirs {
            let Ok(entries) = fs::read_dir(dir) else {
                warn!(path = %dir.display(), "could not read site-packages directory");
                continue;
            };

            for entry in entries.filter_map(|e| e.ok()) {
                let file_name = entry.file_name();
                let Some(name) = distribution_name(&file_name.to_string_lossy()) else {
                    continue;
                };
                distributions
                    .entry(pep503_normalize(&name))
                    .or_insert_with(|| Distribution {
                        name,
                        metadata_dir: entry.path(),
                    });
            }
        }

        debug!(
            dirs = dirs.len(),
            distributions = distributions.len(),
            "indexed installed distributions"
        );

        Self { dirs, distributions }
    }

    /// The indexed `site-packages` directories.
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Number of indexed distributions.
    pub fn len(&self) -> usize {
        self.distributions.len()
    }

    /// Returns true if nothing is indexed.
    pub fn is_empty(&self) -> bool {
        self.distributions.is_empty()
    }

    /// Looks up a distribution by package name.
    pub fn get(&self, package: &str) -> Option<&Distribution> {
        self.distributions.get(&pep503_normalize(package))
    }

    /// Top-level import names recorded for `package`.
    ///
    /// Missing packages and packages without `top_level.txt` return `None`.
    /// An unreadable `top_level.txt` is logged and also returns `None`.
    pub fn import_names(&self, package: &str) -> Option<Vec<String>> {
        let distribution = self.get(package)?;

        match distribution.top_level() {
            Ok(Some(names)) if !names.is_empty() => Some(names),
            Ok(_) => None,
            Err(e) => {
                warn!(
                    package,
                    path = %distribution.metadata_dir.display(),
                    error = %e,
                    "malformed top_level.txt"
                );
                None
            }
        }
    }

    /// Finds the installed distribution that provides `module`.
    ///
    /// A distribution named like the module (also with `_` read as `-`)
    /// wins over one that merely lists it in `top_level.txt`. The returned
    /// name is the metadata display name, lowercased.
    pub fn package_for_module(&self, module: &str) -> Option<String> {
        let by_name = self
            .get(module)
            .or_else(|| self.get(&module.replace('_', "-")));

        let distribution = by_name.or_else(|| {
            self.distributions.values().find(|dist| {
                matches!(
                    dist.top_level(),
                    Ok(Some(names)) if names.iter().any(|n| n.eq_ignore_ascii_case(module))
                )
            })
        })?;

        let name = distribution
            .display_name()
            .unwrap_or_else(|| distribution.name.clone());
        Some(name.to_lowercase())
    }
}

/// Extracts the distribution name from a metadata directory name, e.g.
/// `requests-2.31.0.dist-info` or `PyYAML.egg-info`.
fn distribution_name(dir_name: &str) -> Option<String> {
    let stem = dir_name
        .strip_suffix(".dist-info")
        .or_else(|| dir_name.strip_suffix(".egg-info"))?;

    let name = stem.split('-').next().unwrap_or(stem);
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Configured directories that exist, with relative entries joined to `root`.
fn configured_dirs(root: &Path, configured: &[PathBuf]) -> Vec<PathBuf> {
    configured
        .iter()
        .map(|dir| if dir.is_absolute() { dir.clone() } else { root.join(dir) })
        .filter(|dir| dir.is_dir())
        .collect()
}

/// `site-packages` directories inside a virtual environment: the POSIX
/// `lib/python*/site-packages` layout and the Windows `Lib/site-packages`.
fn site_packages_of(env_dir: &Path) -> Vec<PathBuf> {
    let mut found = Vec::new();

    if let Ok(entries) = fs::read_dir(env_dir.join("lib")) {
        let mut pythons: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with("python"))
            .map(|e| e.path().join("site-packages"))
            .filter(|p| p.is_dir())
            .collect();
        pythons.sort();
        found.extend(pythons);
    }

    let windows = env_dir.join("Lib").join("site-packages");
    if windows.is_dir() && !found.contains(&windows) {
        found.push(windows);
    }

    found
}
