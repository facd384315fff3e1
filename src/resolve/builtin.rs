//! Built-in table of package names that import under a different name, or
//! that are commonly used as command-line tools.

use crate::matching::normalize;

/// Known package → import-name mappings.
pub const BASE_MAPPING: &[(&str, &[&str])] = &[
    // Computer vision
    ("opencv-python", &["cv2"]),
    ("opencv-contrib-python", &["cv2"]),
    // Data science and ML
    ("scikit-learn", &["sklearn"]),
    ("scikit-image", &["skimage"]),
    ("tensorboard", &["tensorboard"]),
    // Image and data processing
    ("pillow", &["PIL"]),
    ("beautifulsoup4", &["bs4"]),
    ("pyyaml", &["yaml"]),
    // Version control
    ("gitpython", &["git"]),
    // Environment and config
    ("python-dotenv", &["dotenv"]),
    // Web frameworks and HTTP
    ("fastapi", &["fastapi"]),
    ("uvicorn", &["uvicorn"]),
    ("uvloop", &["uvloop"]),
    ("starlette", &["starlette"]),
    ("httpx", &["httpx"]),
    // Utilities
    ("python-multipart", &["multipart"]),
    ("pyjwt", &["jwt"]),
    ("python-jose", &["jose"]),
    ("typing-extensions", &["typing_extensions"]),
    // Data version control
    ("dvc", &["dvc"]),
    // Downloads
    ("gdown", &["gdown"]),
];

/// Looks up the import names recorded for `package`, comparing normalized
/// names.
pub fn builtin_import_names(package: &str) -> Option<&'static [&'static str]> {
    let normalized = normalize(package);
    BASE_MAPPING
        .iter()
        .find(|(name, _)| normalize(name) == normalized)
        .map(|(_, imports)| *imports)
}

/// Finds the package whose built-in mapping contains `import_name`
/// (case-insensitive).
pub fn builtin_package_for_import(import_name: &str) -> Option<&'static str> {
    BASE_MAPPING
        .iter()
        .find(|(_, imports)| imports.iter().any(|i| i.eq_ignore_ascii_case(import_name)))
        .map(|(name, _)| *name)
}

/// Package names in the built-in table, in table order.
pub fn builtin_packages() -> impl Iterator<Item = &'static str> {
    BASE_MAPPING.iter().map(|(name, _)| *name)
}
