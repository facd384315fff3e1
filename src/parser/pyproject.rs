//! Reader for `pyproject.toml` manifests.
//!
//! This module parses a manifest and extracts the declared dependency set
//! from both the PEP 621 list and the Poetry table.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::warn;

use super::types::{
    AnalysisConfig, Dependency, DependencyDialect, PyProject, PYTHON_PSEUDO_DEPENDENCY,
};

/// Errors that can occur while reading or editing a manifest.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// Failed to read the file from disk.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The manifest is not valid TOML, or a known table has the wrong shape.
    #[error("Failed to parse {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The manifest could not be loaded as an editable document.
    #[error("Failed to parse {path} for editing: {source}")]
    Edit {
        path: PathBuf,
        #[source]
        source: toml_edit::TomlError,
    },

    /// A table the editor needs has an unexpected type.
    #[error("Invalid manifest {path}: {message}")]
    Invalid { path: PathBuf, message: String },

    /// Writing the updated manifest failed; the original is untouched.
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result type alias for manifest operations.
pub type ManifestResult<T> = Result<T, ManifestError>;

/// Characters that end the package-name part of a dependency specifier:
/// markers, version operators, extras and direct references.
const SPECIFIER_DELIMITERS: &[char] = &[';', '<', '>', '=', '~', '!', '[', '@'];

/// Parses a manifest file.
pub fn parse_file(path: &Path) -> ManifestResult<PyProject> {
    let content = fs::read_to_string(path).map_err(|source| ManifestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_str(&content).map_err(|source| ManifestError::Toml {
        path: path.to_path_buf(),
        source,
    })
}

/// Parses a manifest from a string.
///
/// ```
/// use depscope::parser::pyproject::parse_str;
///
/// let manifest = parse_str("[project]\nname = \"demo\"").unwrap();
/// assert_eq!(manifest.project.unwrap().name.as_deref(), Some("demo"));
/// ```
pub fn parse_str(content: &str) -> Result<PyProject, toml::de::Error> {
    toml::from_str(content)
}

/// Parses a manifest that may not exist.
///
/// A missing file is logged and yields `None`; any other failure is an error.
pub fn parse_optional(path: &Path) -> ManifestResult<Option<PyProject>> {
    match parse_file(path) {
        Ok(manifest) => Ok(Some(manifest)),
        Err(ManifestError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "manifest not found");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Extracts the bare, lowercased package name from a dependency specifier.
///
/// ```
/// use depscope::parser::pyproject::bare_package_name;
///
/// assert_eq!(bare_package_name("requests>=2.31"), "requests");
/// assert_eq!(bare_package_name("Uvicorn[standard] ~= 0.30"), "uvicorn");
/// assert_eq!(bare_package_name("tomli; python_version < '3.11'"), "tomli");
/// ```
pub fn bare_package_name(specifier: &str) -> String {
    let end = specifier
        .find(SPECIFIER_DELIMITERS)
        .unwrap_or(specifier.len());
    specifier[..end].trim().to_lowercase()
}

/// Extracts every declared dependency from both dialects, in manifest order
/// (PEP 621 first). The interpreter pseudo-dependency is skipped.
pub fn extract_dependencies(manifest: &PyProject) -> Vec<Dependency> {
    let mut deps = Vec::new();

    for specifier in manifest.project_dependencies() {
        let name = bare_package_name(specifier);
        if name.is_empty() {
            continue;
        }
        deps.push(Dependency::new(name, specifier.as_str(), DependencyDialect::Pep621));
    }

    if let Some(poetry) = manifest.poetry_dependencies() {
        for (name, constraint) in poetry {
            let name = name.to_lowercase();
            if name == PYTHON_PSEUDO_DEPENDENCY {
                continue;
            }
            let constraint = match constraint {
                toml::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            deps.push(Dependency::new(name, constraint, DependencyDialect::Poetry));
        }
    }

    deps
}

/// Returns the declared package names of a parsed manifest, collapsed
/// case-insensitively.
pub fn declared_names(manifest: &PyProject) -> BTreeSet<String> {
    extract_dependencies(manifest)
        .into_iter()
        .map(|d| d.name)
        .collect()
}

/// Reads the declared package names of the manifest at `path`.
///
/// A missing file is not an error: it is logged and yields an empty set.
pub fn read_declared(path: &Path) -> ManifestResult<BTreeSet<String>> {
    Ok(parse_optional(path)?
        .map(|manifest| declared_names(&manifest))
        .unwrap_or_default())
}

/// Loads `[tool.depscope]` from the manifest at `path`.
///
/// A missing manifest yields the default configuration.
pub fn load_config(path: &Path) -> ManifestResult<AnalysisConfig> {
    Ok(parse_optional(path)?
        .map(|manifest| manifest.analysis_config())
        .unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::types::OneOrMany;

    const SAMPLE_PYPROJECT: &str = r#"
[project]
name = "sample"
version = "1.0.0"
dependencies = [
    "requests>=2.31",
    "NumPy==1.26.0",
    "uvicorn[standard]>=0.30",
    "tomli; python_version < '3.11'",
    "pydantic ~= 2.0",
    "attrs!=23.1",
    "mylib @ https://example.com/mylib.whl",
]

[tool.poetry.dependencies]
python = "^3.11"
Flask = "^3.0"
requests = { version = "^2.31", extras = ["socks"] }

[tool.depscope]
ignore = ["gunicorn"]
custom_mappings = { "my-pkg" = "mypkg" }

[tool.black]
line-length = 100
"#;

    #[test]
    fn test_parse_str_valid() {
        let manifest = parse_str(SAMPLE_PYPROJECT).unwrap();
        let project = manifest.project.as_ref().unwrap();

        assert_eq!(project.name.as_deref(), Some("sample"));
        assert_eq!(project.version.as_deref(), Some("1.0.0"));
        assert_eq!(manifest.project_dependencies().len(), 7);
    }

    #[test]
    fn test_parse_str_invalid() {
        assert!(parse_str("[project\nname = ").is_err());
    }

    #[test]
    fn test_bare_package_name_delimiters() {
        assert_eq!(bare_package_name("requests"), "requests");
        assert_eq!(bare_package_name("requests<3"), "requests");
        assert_eq!(bare_package_name("requests>2"), "requests");
        assert_eq!(bare_package_name("requests==2.0"), "requests");
        assert_eq!(bare_package_name("requests~=2.0"), "requests");
        assert_eq!(bare_package_name("requests!=2.0"), "requests");
        assert_eq!(bare_package_name("requests ; os_name == 'nt'"), "requests");
        assert_eq!(bare_package_name("  Requests  "), "requests");
    }

    #[test]
    fn test_extract_dependencies_both_dialects() {
        let manifest = parse_str(SAMPLE_PYPROJECT).unwrap();
        let deps = extract_dependencies(&manifest);

        let pep621: Vec<_> = deps
            .iter()
            .filter(|d| d.dialect == DependencyDialect::Pep621)
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(
            pep621,
            vec!["requests", "numpy", "uvicorn", "tomli", "pydantic", "attrs", "mylib"]
        );

        let poetry: Vec<_> = deps
            .iter()
            .filter(|d| d.dialect == DependencyDialect::Poetry)
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(poetry, vec!["flask", "requests"]);
    }

    #[test]
    fn test_declared_names_collapse_duplicates() {
        let manifest = parse_str(SAMPLE_PYPROJECT).unwrap();
        let names = declared_names(&manifest);

        assert_eq!(names.len(), 8);
        assert!(names.contains("flask"));
        assert!(names.contains("requests"));
        assert!(!names.contains("python"));
    }

    #[test]
    fn test_read_declared_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let names = read_declared(&dir.path().join("pyproject.toml")).unwrap();
        assert!(names.is_empty());
    }

    #[test]
    fn test_read_declared_malformed_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pyproject.toml");
        fs::write(&path, "[project\n").unwrap();

        let err = read_declared(&path).unwrap_err();
        assert!(matches!(err, ManifestError::Toml { .. }));
        assert!(err.to_string().contains("pyproject.toml"));
    }

    #[test]
    fn test_load_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pyproject.toml");
        fs::write(&path, SAMPLE_PYPROJECT).unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.ignore, vec!["gunicorn".to_string()]);
        assert_eq!(
            config.custom_mappings.get("my-pkg"),
            Some(&OneOrMany::One("mypkg".to_string()))
        );
    }

    #[test]
    fn test_load_config_missing_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("pyproject.toml")).unwrap();
        assert_eq!(config, AnalysisConfig::default());
    }

    #[test]
    fn test_poetry_constraint_text() {
        let manifest = parse_str(SAMPLE_PYPROJECT).unwrap();
        let deps = extract_dependencies(&manifest);

        let flask = deps.iter().find(|d| d.name == "flask").unwrap();
        assert_eq!(flask.specifier, "^3.0");
    }
}
