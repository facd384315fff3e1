//! Canonical name forms.

/// Canonicalizes a name for comparison: lowercases it and removes every
/// hyphen and underscore.
///
/// Total and idempotent.
///
/// ```
/// use depscope::matching::normalize;
///
/// assert_eq!(normalize("Scikit-Learn"), "scikitlearn");
/// assert_eq!(normalize("typing_extensions"), "typingextensions");
/// ```
pub fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Normalizes a distribution name the way installers name metadata
/// directories: lowercase, with every run of `-`, `_` and `.` folded into a
/// single `-`.
pub fn pep503_normalize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_separator = false;

    for c in name.trim().chars() {
        if matches!(c, '-' | '_' | '.') {
            if !in_separator {
                out.push('-');
                in_separator = true;
            }
        } else {
            out.extend(c.to_lowercase());
            in_separator = false;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_separators() {
        assert_eq!(normalize("python-dotenv"), "pythondotenv");
        assert_eq!(normalize("typing_extensions"), "typingextensions");
        assert_eq!(normalize("a-_-b"), "ab");
    }

    #[test]
    fn test_normalize_lowercases() {
        assert_eq!(normalize("PIL"), "pil");
        assert_eq!(normalize("GitPython"), "gitpython");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for name in ["Scikit-Learn", "__init__", "", "-", "PyYAML", "opencv_contrib-python"] {
            let once = normalize(name);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", name);
        }
    }

    #[test]
    fn test_normalize_keeps_dots() {
        assert_eq!(normalize("zope.interface"), "zope.interface");
    }

    #[test]
    fn test_pep503_normalize() {
        assert_eq!(pep503_normalize("Zope.Interface"), "zope-interface");
        assert_eq!(pep503_normalize("typing__extensions"), "typing-extensions");
        assert_eq!(pep503_normalize("ruamel.yaml_clib"), "ruamel-yaml-clib");
        assert_eq!(pep503_normalize("requests"), "requests");
    }
}
