//! In-place manifest editing.
//!
//! Every write goes through `toml_edit`, so comments, key order and
//! whitespace outside the edited nodes survive unchanged. Files are replaced
//! atomically: the new content is written to a temporary file next to the
//! manifest and renamed over it, so a failed write leaves the original intact.

use std::collections::BTreeSet;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use toml_edit::{Array, DocumentMut, Item};
use tracing::info;

use super::pyproject::{bare_package_name, parse_str, ManifestError, ManifestResult};
use super::types::{DependencyDialect, PYTHON_PSEUDO_DEPENDENCY};

/// One entry removed from a manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removal {
    /// The bare package name.
    pub package: String,

    /// The removed specifier (PEP 621) or key (Poetry), as written.
    pub entry: String,

    /// Which dialect it was removed from.
    pub dialect: DependencyDialect,
}

/// Summary of a removal pass.
#[derive(Debug, Clone, Default)]
pub struct RemovalReport {
    /// The manifest that was edited.
    pub path: PathBuf,

    /// Removed entries, PEP 621 first, each in manifest order.
    pub removals: Vec<Removal>,
}

impl RemovalReport {
    /// Returns true if nothing was removed (and nothing was written).
    pub fn is_empty(&self) -> bool {
        self.removals.is_empty()
    }
}

/// Outcome of [`populate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopulateOutcome {
    /// The manifest was created or updated with this many dependencies.
    Written { added: usize },
    /// The manifest already declares dependencies and `force` was not set.
    AlreadyPopulated,
    /// There was nothing to write.
    NothingDiscovered,
}

/// Removes every dependency whose bare name is in `unused` from the
/// manifest at `path`.
///
/// The file is only rewritten if something was removed; an empty `unused`
/// set leaves it byte-for-byte unchanged.
pub fn remove_unused(path: &Path, unused: &BTreeSet<String>) -> ManifestResult<RemovalReport> {
    let mut doc = load_document(path)?;
    let removals = remove_from_document(&mut doc, unused);

    if !removals.is_empty() {
        write_atomically(path, &doc.to_string())?;
    }

    Ok(RemovalReport {
        path: path.to_path_buf(),
        removals,
    })
}

/// Removes matching entries from both dependency dialects of `doc`.
///
/// `unused` holds lowercased bare names. The interpreter pseudo-dependency
/// is never removed.
pub fn remove_from_document(doc: &mut DocumentMut, unused: &BTreeSet<String>) -> Vec<Removal> {
    let mut removals = Vec::new();
    if unused.is_empty() {
        return removals;
    }

    if let Some(array) = doc
        .get_mut("project")
        .and_then(|project| project.get_mut("dependencies"))
        .and_then(Item::as_array_mut)
    {
        removals.extend(remove_from_array(array, unused));
    }

    if let Some(table) = doc
        .get_mut("tool")
        .and_then(|tool| tool.get_mut("poetry"))
        .and_then(|poetry| poetry.get_mut("dependencies"))
        .and_then(Item::as_table_like_mut)
    {
        let keys: Vec<String> = table
            .iter()
            .map(|(key, _)| key.to_string())
            .filter(|key| {
                let lower = key.to_lowercase();
                lower != PYTHON_PSEUDO_DEPENDENCY && unused.contains(&lower)
            })
            .collect();

        for key in keys {
            table.remove(&key);
            info!(package = %key, dialect = "poetry", "removed dependency");
            removals.push(Removal {
                package: key.to_lowercase(),
                entry: key,
                dialect: DependencyDialect::Poetry,
            });
        }
    }

    removals
}

fn remove_from_array(array: &mut Array, unused: &BTreeSet<String>) -> Vec<Removal> {
    let doomed: Vec<(usize, String)> = array
        .iter()
        .enumerate()
        .filter_map(|(index, value)| {
            let entry = value
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| value.to_string().trim().to_string());
            let package = bare_package_name(&entry);
            (package != PYTHON_PSEUDO_DEPENDENCY && unused.contains(&package))
                .then_some((index, entry))
        })
        .collect();

    // Remove back to front so earlier indices stay valid.
    for (index, _) in doomed.iter().rev() {
        array.remove(*index);
    }

    doomed
        .into_iter()
        .map(|(_, entry)| {
            info!(entry = %entry, dialect = "pep621", "removed dependency");
            Removal {
                package: bare_package_name(&entry),
                entry,
                dialect: DependencyDialect::Pep621,
            }
        })
        .collect()
}

/// Writes `packages` into `project.dependencies` of the manifest at `path`,
/// creating the file (and its parent directories) if needed.
///
/// Existing dependencies are only replaced when `force` is set. `name`,
/// `version` and `description` are filled in only when absent.
pub fn populate(
    path: &Path,
    packages: &[String],
    project_name: &str,
    force: bool,
) -> ManifestResult<PopulateOutcome> {
    if packages.is_empty() {
        return Ok(PopulateOutcome::NothingDiscovered);
    }

    let mut doc = if path.exists() {
        let content = read_manifest(path)?;
        let manifest = parse_str(&content).map_err(|source| ManifestError::Toml {
            path: path.to_path_buf(),
            source,
        })?;
        if manifest.has_dependencies() && !force {
            return Ok(PopulateOutcome::AlreadyPopulated);
        }
        parse_document(path, &content)?
    } else {
        DocumentMut::new()
    };

    if !doc.contains_key("project") {
        doc.insert("project", toml_edit::table());
    }

    let project = doc
        .get_mut("project")
        .and_then(Item::as_table_like_mut)
        .ok_or_else(|| ManifestError::Invalid {
            path: path.to_path_buf(),
            message: "[project] is not a table".to_string(),
        })?;

    if !project.contains_key("name") {
        project.insert("name", toml_edit::value(project_name));
    }
    if !project.contains_key("version") {
        project.insert("version", toml_edit::value("0.1.0"));
    }
    if !project.contains_key("description") {
        project.insert("description", toml_edit::value(""));
    }
    project.insert("dependencies", toml_edit::value(dependency_array(packages)));

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| ManifestError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    }
    write_atomically(path, &doc.to_string())?;

    Ok(PopulateOutcome::Written {
        added: packages.len(),
    })
}

/// Builds a one-entry-per-line dependency array.
fn dependency_array(packages: &[String]) -> Array {
    let mut array: Array = packages.iter().map(String::as_str).collect();
    for value in array.iter_mut() {
        value.decor_mut().set_prefix("\n    ");
    }
    array.set_trailing_comma(true);
    array.set_trailing("\n");
    array
}

fn read_manifest(path: &Path) -> ManifestResult<String> {
    fs::read_to_string(path).map_err(|source| ManifestError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_document(path: &Path, content: &str) -> ManifestResult<DocumentMut> {
    content.parse().map_err(|source| ManifestError::Edit {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads the manifest at `path` as an editable document.
pub fn load_document(path: &Path) -> ManifestResult<DocumentMut> {
    let content = read_manifest(path)?;
    parse_document(path, &content)
}

/// Replaces the file at `path` with `content`, all or nothing.
pub fn write_atomically(path: &Path, content: &str) -> ManifestResult<()> {
    let write_error = |source: io::Error| ManifestError::Write {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir).map_err(write_error)?;
    temp.write_all(content.as_bytes()).map_err(write_error)?;
    temp.as_file().sync_all().map_err(write_error)?;
    if let Ok(metadata) = fs::metadata(path) {
        fs::set_permissions(temp.path(), metadata.permissions()).map_err(write_error)?;
    }
    temp.persist(path).map_err(|e| write_error(e.error))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::pyproject::read_declared;

    const MANIFEST: &str = r#"# project manifest
[project]
name = "demo"
dependencies = [
    "requests>=2.31",
    "numpy>=1.0",
    "pandas",
]

[tool.poetry.dependencies]
python = "^3.11"
NumPy = "^1.26"
flask = "^3.0"

[tool.depscope]
ignore = []
"#;

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_remove_from_both_dialects() {
        let mut doc: DocumentMut = MANIFEST.parse().unwrap();
        let removals = remove_from_document(&mut doc, &set(&["numpy"]));

        assert_eq!(removals.len(), 2);
        assert_eq!(removals[0].dialect, DependencyDialect::Pep621);
        assert_eq!(removals[0].entry, "numpy>=1.0");
        assert_eq!(removals[1].dialect, DependencyDialect::Poetry);
        assert_eq!(removals[1].entry, "NumPy");

        let output = doc.to_string();
        assert!(!output.contains("numpy>=1.0"));
        assert!(!output.contains("NumPy"));
        assert!(output.contains("# project manifest"));
        assert!(output.contains("\"requests>=2.31\","));
        assert!(output.contains("python = \"^3.11\""));
    }

    #[test]
    fn test_remove_preserves_order_of_others() {
        let mut doc: DocumentMut = MANIFEST.parse().unwrap();
        remove_from_document(&mut doc, &set(&["numpy"]));

        let deps: Vec<_> = doc["project"]["dependencies"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap().to_string())
            .collect();
        assert_eq!(deps, vec!["requests>=2.31", "pandas"]);
    }

    #[test]
    fn test_python_is_never_removed() {
        let mut doc: DocumentMut = MANIFEST.parse().unwrap();
        let removals = remove_from_document(&mut doc, &set(&["python"]));

        assert!(removals.is_empty());
        assert!(doc.to_string().contains("python = \"^3.11\""));
    }

    #[test]
    fn test_remove_nothing_leaves_file_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pyproject.toml");
        fs::write(&path, MANIFEST).unwrap();

        let report = remove_unused(&path, &BTreeSet::new()).unwrap();
        assert!(report.is_empty());
        assert_eq!(fs::read_to_string(&path).unwrap(), MANIFEST);
    }

    #[test]
    fn test_remove_unused_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pyproject.toml");
        fs::write(&path, MANIFEST).unwrap();

        let report = remove_unused(&path, &set(&["pandas", "flask"])).unwrap();
        assert_eq!(report.removals.len(), 2);

        let declared = read_declared(&path).unwrap();
        assert_eq!(declared, set(&["numpy", "requests"]));
    }

    #[test]
    fn test_remove_unused_missing_manifest_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = remove_unused(&dir.path().join("pyproject.toml"), &set(&["numpy"]));
        assert!(matches!(result, Err(ManifestError::Io { .. })));
    }

    #[test]
    fn test_populate_creates_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("pyproject.toml");

        let packages = vec!["fastapi".to_string(), "requests".to_string()];
        let outcome = populate(&path, &packages, "demo", false).unwrap();
        assert_eq!(outcome, PopulateOutcome::Written { added: 2 });

        let content = fs::read_to_string(&path).unwrap();
        let manifest = parse_str(&content).unwrap();
        let project = manifest.project.unwrap();
        assert_eq!(project.name.as_deref(), Some("demo"));
        assert_eq!(project.version.as_deref(), Some("0.1.0"));
        assert_eq!(project.dependencies.unwrap(), packages);
    }

    #[test]
    fn test_populate_fills_existing_empty_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pyproject.toml");
        fs::write(&path, "# keep me\n[project]\nname = \"kept\"\n").unwrap();

        let outcome = populate(&path, &["httpx".to_string()], "ignored", false).unwrap();
        assert_eq!(outcome, PopulateOutcome::Written { added: 1 });

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("# keep me"));
        assert!(content.contains("name = \"kept\""));
        assert!(content.contains("\"httpx\""));
    }

    #[test]
    fn test_populate_refuses_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pyproject.toml");
        fs::write(&path, MANIFEST).unwrap();

        let outcome = populate(&path, &["httpx".to_string()], "demo", false).unwrap();
        assert_eq!(outcome, PopulateOutcome::AlreadyPopulated);
        assert_eq!(fs::read_to_string(&path).unwrap(), MANIFEST);
    }

    #[test]
    fn test_populate_force_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pyproject.toml");
        fs::write(&path, MANIFEST).unwrap();

        populate(&path, &["httpx".to_string()], "demo", true).unwrap();

        let manifest = parse_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(manifest.project_dependencies(), &["httpx".to_string()]);
    }

    #[test]
    fn test_populate_nothing_discovered() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pyproject.toml");

        let outcome = populate(&path, &[], "demo", false).unwrap();
        assert_eq!(outcome, PopulateOutcome::NothingDiscovered);
        assert!(!path.exists());
    }
}
