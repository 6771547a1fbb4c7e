//! Name-based exclusion rules.
//!
//! An [`ExclusionSet`] is the ordered list of glob patterns that hide
//! entries from a listing: typically the generator's own filename and the
//! `.`/`..` markers. Patterns are matched against the bare entry name, not
//! the full path, with fnmatch-like semantics (`*`, `?`, `[abc]`, `{a,b}`).

use globset::{Glob, GlobMatcher};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExcludeError {
    #[error("invalid exclude pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },
}

/// A compiled pattern that remembers its source text.
#[derive(Debug, Clone)]
struct ExcludePattern {
    original: String,
    matcher: GlobMatcher,
}

/// Ordered set of exclusion patterns, fixed for one invocation.
#[derive(Debug, Clone, Default)]
pub struct ExclusionSet {
    patterns: Vec<ExcludePattern>,
}

impl ExclusionSet {
    /// Compile patterns in order. Fails on the first invalid one.
    pub fn new<I, S>(patterns: I) -> Result<Self, ExcludeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| {
                let pattern = p.as_ref();
                let glob = Glob::new(pattern).map_err(|source| ExcludeError::InvalidPattern {
                    pattern: pattern.to_string(),
                    source,
                })?;
                Ok(ExcludePattern {
                    original: pattern.to_string(),
                    matcher: glob.compile_matcher(),
                })
            })
            .collect::<Result<Vec<_>, ExcludeError>>()?;
        Ok(Self { patterns })
    }

    /// The first pattern matching `name`, if any.
    pub fn matching_pattern(&self, name: &str) -> Option<&str> {
        self.patterns
            .iter()
            .find(|p| p.matcher.is_match(name))
            .map(|p| p.original.as_str())
    }

    pub fn is_excluded(&self, name: &str) -> bool {
        self.matching_pattern(name).is_some()
    }

    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(|p| p.original.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_names_match_exactly() {
        let set = ExclusionSet::new(["index.cgi", ".", ".."]).unwrap();
        assert!(set.is_excluded("index.cgi"));
        assert!(set.is_excluded("."));
        assert!(set.is_excluded(".."));
        assert!(!set.is_excluded("index.cgi.bak"));
        assert!(!set.is_excluded("..."));
    }

    #[test]
    fn wildcards_match_names() {
        let set = ExclusionSet::new(["*.tmp", "draft-?"]).unwrap();
        assert!(set.is_excluded("build.tmp"));
        assert!(set.is_excluded("draft-1"));
        assert!(!set.is_excluded("draft-10"));
        assert!(!set.is_excluded("notes.txt"));
    }

    #[test]
    fn star_matches_dotfiles() {
        let set = ExclusionSet::new([".*"]).unwrap();
        assert!(set.is_excluded(".git"));
        assert!(set.is_excluded(".htaccess"));
        assert!(!set.is_excluded("git"));
    }

    #[test]
    fn first_matching_pattern_wins() {
        let set = ExclusionSet::new(["*.log", "debug.*"]).unwrap();
        assert_eq!(set.matching_pattern("debug.log"), Some("*.log"));
        assert_eq!(set.matching_pattern("debug.txt"), Some("debug.*"));
        assert_eq!(set.matching_pattern("readme"), None);
    }

    #[test]
    fn brace_alternatives() {
        let set = ExclusionSet::new(["*.{bak,swp}"]).unwrap();
        assert!(set.is_excluded("a.bak"));
        assert!(set.is_excluded("a.swp"));
        assert!(!set.is_excluded("a.txt"));
    }

    #[test]
    fn empty_set_excludes_nothing() {
        let set = ExclusionSet::default();
        assert!(set.is_empty());
        assert!(!set.is_excluded("anything"));
    }

    #[test]
    fn invalid_pattern_is_error() {
        let result = ExclusionSet::new(["[unclosed"]);
        assert!(matches!(
            result,
            Err(ExcludeError::InvalidPattern { ref pattern, .. }) if pattern == "[unclosed"
        ));
    }

    #[test]
    fn patterns_preserve_order() {
        let set = ExclusionSet::new(["b", "a", "c"]).unwrap();
        assert_eq!(set.patterns().collect::<Vec<_>>(), vec!["b", "a", "c"]);
    }
}
