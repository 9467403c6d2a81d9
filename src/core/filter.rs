//! core::filter
//!
//! Path predicates applied to change sets.
//!
//! A [`PathFilter`] is a single predicate over repository-relative paths
//! (`/`-separated, as they appear in tree diffs). Named constructors cover
//! the common cases; [`PathFilter::predicate`] accepts anything else.
//!
//! # Example
//!
//! ```
//! use refscope::core::filter::PathFilter;
//!
//! let yaml = PathFilter::extension("yaml");
//! assert!(yaml.matches("components/svc/dev/conf.YAML"));
//! assert!(!yaml.matches("README.md"));
//!
//! let conf = PathFilter::file_name("conf.yaml");
//! assert!(conf.matches("components/svc/dev/conf.yaml"));
//!
//! assert!(PathFilter::regex("[").is_err());
//! ```

use std::fmt;
use std::sync::Arc;

use regex::Regex;
use thiserror::Error;

/// A filter could not be built.
#[derive(Debug, Error)]
#[error("invalid filter pattern '{pattern}': {message}")]
pub struct FilterError {
    pub pattern: String,
    pub message: String,
}

#[derive(Clone)]
enum Matcher {
    Extension(String),
    FileName(String),
    Regex(Regex),
    Predicate(Arc<dyn Fn(&str) -> bool + Send + Sync>),
}

/// A predicate over changed file paths.
#[derive(Clone)]
pub struct PathFilter {
    matcher: Matcher,
}

impl PathFilter {
    /// Paths whose final extension equals `ext`, case-insensitively.
    ///
    /// A leading dot is optional: `"yaml"` and `".yaml"` are equivalent.
    /// An empty `ext` selects paths without an extension (`Makefile`,
    /// `.gitignore`).
    pub fn extension(ext: &str) -> Self {
        let ext = ext.trim_start_matches('.').to_ascii_lowercase();
        Self {
            matcher: Matcher::Extension(ext),
        }
    }

    /// Paths whose base name equals `name`, case-insensitively.
    pub fn file_name(name: &str) -> Self {
        Self {
            matcher: Matcher::FileName(name.to_lowercase()),
        }
    }

    /// Paths matched anywhere by the regular expression `pattern`.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError`] if the pattern does not compile.
    pub fn regex(pattern: &str) -> Result<Self, FilterError> {
        let re = Regex::new(pattern).map_err(|e| FilterError {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self {
            matcher: Matcher::Regex(re),
        })
    }

    /// Paths accepted by an arbitrary closure.
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self {
            matcher: Matcher::Predicate(Arc::new(f)),
        }
    }

    /// Check a single path.
    pub fn matches(&self, path: &str) -> bool {
        match &self.matcher {
            Matcher::Extension(ext) => match extension_of(path) {
                Some(e) => !ext.is_empty() && e.eq_ignore_ascii_case(ext),
                None => ext.is_empty(),
            },
            Matcher::FileName(name) => base_name(path).to_lowercase() == *name,
            Matcher::Regex(re) => re.is_match(path),
            Matcher::Predicate(f) => f(path),
        }
    }

    /// Keep the paths that match, preserving order.
    pub fn apply(&self, paths: Vec<String>) -> Vec<String> {
        paths.into_iter().filter(|p| self.matches(p)).collect()
    }
}

impl fmt::Debug for PathFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.matcher {
            Matcher::Extension(ext) => write!(f, "PathFilter::extension({:?})", ext),
            Matcher::FileName(name) => write!(f, "PathFilter::file_name({:?})", name),
            Matcher::Regex(re) => write!(f, "PathFilter::regex({:?})", re.as_str()),
            Matcher::Predicate(_) => write!(f, "PathFilter::predicate(..)"),
        }
    }
}

fn base_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn extension_of(path: &str) -> Option<&str> {
    let name = base_name(path);
    match name.rfind('.') {
        // ".gitignore" has no extension
        Some(0) | None => None,
        Some(i) => Some(&name[i + 1..]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod extension {
        use super::*;

        #[test]
        fn leading_dot_optional() {
            assert!(PathFilter::extension(".yaml").matches("a/b.yaml"));
            assert!(PathFilter::extension("yaml").matches("a/b.yaml"));
        }

        #[test]
        fn case_insensitive() {
            assert!(PathFilter::extension("YAML").matches("a/b.yaml"));
            assert!(PathFilter::extension("yaml").matches("a/B.YaMl"));
        }

        #[test]
        fn only_final_extension() {
            let f = PathFilter::extension("yaml");
            assert!(!f.matches("conf.yaml.bak"));
            assert!(!f.matches("yaml"));
            assert!(!f.matches("dir.yaml/file"));
        }

        #[test]
        fn dotfiles_have_no_extension() {
            assert!(!PathFilter::extension("gitignore").matches(".gitignore"));
        }

        #[test]
        fn empty_selects_extensionless_paths() {
            let f = PathFilter::extension("");
            assert!(f.matches("Makefile"));
            assert!(f.matches("build/Dockerfile"));
            assert!(f.matches(".gitignore"));
            assert!(!f.matches("conf.yaml"));
            assert!(!f.matches("trailing."));
            assert_eq!(
                f.apply(vec!["a/Makefile".into(), "a/conf.yaml".into()]),
                vec!["a/Makefile"]
            );
            assert!(PathFilter::extension(".").matches("Makefile"));
        }
    }

    mod file_name {
        use super::*;

        #[test]
        fn matches_base_name_only() {
            let f = PathFilter::file_name("conf.yaml");
            assert!(f.matches("conf.yaml"));
            assert!(f.matches("components/svc/dev/conf.yaml"));
            assert!(!f.matches("components/svc/dev/conf.yaml.orig"));
            assert!(!f.matches("conf.yaml/values.yaml"));
        }

        #[test]
        fn case_insensitive() {
            assert!(PathFilter::file_name("Dockerfile").matches("svc/DOCKERFILE"));
        }
    }

    mod regex {
        use super::*;

        #[test]
        fn matches_full_path() {
            let f = PathFilter::regex(r"^components/[^/]+/dev/").unwrap();
            assert!(f.matches("components/svc/dev/conf.yaml"));
            assert!(!f.matches("components/svc/prod/conf.yaml"));
        }

        #[test]
        fn invalid_pattern() {
            let err = PathFilter::regex("[").unwrap_err();
            assert_eq!(err.pattern, "[");
        }
    }

    #[test]
    fn predicate_and_apply_preserve_order() {
        let f = PathFilter::predicate(|p| p.starts_with("b"));
        let out = f.apply(vec!["b2".into(), "a".into(), "b1".into()]);
        assert_eq!(out, vec!["b2".to_string(), "b1".to_string()]);
    }

    #[test]
    fn debug_names_constructor() {
        assert_eq!(
            format!("{:?}", PathFilter::extension(".YML")),
            "PathFilter::extension(\"yml\")"
        );
    }
}
