//! Removal of names that are not third-party packages.
//!
//! Scanned names include standard-library modules and the project's own
//! modules. Both are dropped before classification and discovery.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use tracing::{debug, warn};

/// Python version the embedded standard-library list was taken from.
pub const BUILTIN_STDLIB_VERSION: &str = "3.11";

const BUILTIN_STDLIB: &str = include_str!("data/stdlib-3.11.txt");

/// Import name of the image library whose package name differs.
const IMAGE_IMPORT_NAME: &str = "pil";
/// Package that provides [`IMAGE_IMPORT_NAME`].
const IMAGE_PACKAGE_NAME: &str = "pillow";

/// Standard-library module names, lowercased.
#[derive(Debug, Clone, Default)]
pub struct StdlibModules {
    version: Option<String>,
    names: BTreeSet<String>,
}

impl StdlibModules {
    /// The list embedded in the binary.
    pub fn builtin() -> Self {
        Self::from_lines(Some(BUILTIN_STDLIB_VERSION.to_string()), BUILTIN_STDLIB)
    }

    /// Loads a list with one module name per line; `#` starts a comment.
    ///
    /// An unreadable file is logged and yields an empty list, so nothing is
    /// filtered as standard library.
    pub fn from_file(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => {
                let modules = Self::from_lines(None, &content);
                debug!(path = %path.display(), count = modules.len(), "loaded stdlib list");
                modules
            }
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "could not read stdlib list, standard library filtering is disabled"
                );
                Self::default()
            }
        }
    }

    /// Loads the configured list, or the embedded one when none is set.
    pub fn load(path: Option<&Path>) -> Self {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::builtin(),
        }
    }

    fn from_lines(version: Option<String>, content: &str) -> Self {
        let names = content
            .lines()
            .map(|line| line.split('#').next().unwrap_or("").trim())
            .filter(|line| !line.is_empty())
            .map(str::to_lowercase)
            .collect();

        Self { version, names }
    }

    /// Returns true if `name` is a standard-library module.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(&name.to_lowercase())
    }

    /// The Python version of the list, when known.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Number of module names.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Check if an import name refers to a module of the project itself.
///
/// A module is local when `root` holds `<name>.py`, or a `<name>` directory
/// with an `__init__.py`.
pub fn is_local_module(name: &str, root: &Path) -> bool {
    let top_level = name.split('.').next().unwrap_or(name);
    if top_level.is_empty() {
        return false;
    }

    let package = root.join(top_level);
    if package.is_dir() && package.join("__init__.py").exists() {
        return true;
    }

    root.join(format!("{}.py", top_level)).is_file()
}

/// Drops standard-library and local names, then adds the image-library
/// package when its import name is present.
pub fn post_filter(
    names: BTreeSet<String>,
    stdlib: &StdlibModules,
    root: &Path,
) -> BTreeSet<String> {
    let mut kept: BTreeSet<String> = names
        .into_iter()
        .filter(|name| !stdlib.contains(name) && !is_local_module(name, root))
        .collect();

    if kept.contains(IMAGE_IMPORT_NAME) {
        kept.insert(IMAGE_PACKAGE_NAME.to_string());
    }

    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_builtin_stdlib() {
        let stdlib = StdlibModules::builtin();
        assert_eq!(stdlib.version(), Some("3.11"));
        for name in ["os", "sys", "json", "typing", "asyncio", "cprofile", "__future__"] {
            assert!(stdlib.contains(name), "missing {}", name);
        }
        assert!(!stdlib.contains("requests"));
        assert!(!stdlib.contains("numpy"));
    }

    #[test]
    fn test_stdlib_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stdlib.txt");
        fs::write(&path, "# custom list\nos\nSys\n\ntomllib  # 3.11+\n").unwrap();

        let stdlib = StdlibModules::from_file(&path);
        assert_eq!(stdlib.len(), 3);
        assert!(stdlib.contains("sys"));
        assert!(stdlib.contains("tomllib"));
        assert!(stdlib.version().is_none());
    }

    #[test]
    fn test_stdlib_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let stdlib = StdlibModules::load(Some(&dir.path().join("missing.txt")));
        assert!(stdlib.is_empty());
        assert!(!stdlib.contains("os"));
    }

    #[test]
    fn test_is_local_module() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("settings.py"), "").unwrap();
        fs::create_dir_all(root.join("app")).unwrap();
        fs::write(root.join("app/__init__.py"), "").unwrap();
        fs::create_dir_all(root.join("data")).unwrap();

        assert!(is_local_module("settings", root));
        assert!(is_local_module("app", root));
        assert!(is_local_module("app.models", root));
        assert!(!is_local_module("data", root));
        assert!(!is_local_module("requests", root));
    }

    #[test]
    fn test_post_filter() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("helpers.py"), "").unwrap();

        let names = set(&["os", "json", "requests", "helpers", "pil", "image"]);
        let filtered = post_filter(names, &StdlibModules::builtin(), root);

        assert_eq!(filtered, set(&["image", "pil", "pillow", "requests"]));
    }

    #[test]
    fn test_post_filter_without_stdlib_keeps_builtins() {
        let dir = tempfile::tempdir().unwrap();
        let filtered = post_filter(set(&["os"]), &StdlibModules::default(), dir.path());
        assert!(filtered.contains("os"));
    }
}
