//! Glob Pattern Module
//!
//! Key patterns for listing and invalidation, compiled with the `glob` crate.
//! Supported syntax: `*` (any run), `?` (one char), `[abc]`, `[a-z]` and `[!a]`.
//! Metacharacters are matched literally by wrapping them in a class: `[*]`, `[?]`, `[[]`.

use thiserror::Error;

// == Pattern Error ==
/// A pattern rejected at compile time, with the offending position in the source.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason} at position {position}")]
pub struct PatternError {
    /// Char index into the pattern as the caller wrote it
    pub position: usize,
    pub reason: &'static str,
}

// == Glob Pattern ==
/// A compiled glob pattern, anchored at both ends of the key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobPattern {
    source: String,
    compiled: glob::Pattern,
}

impl GlobPattern {
    // == Compile ==
    /// Parses `pattern` once so it can be evaluated against many keys.
    ///
    /// Runs of `*` are collapsed before compiling, since the `glob` crate reserves
    /// `**` for path components while keys have no path structure.
    pub fn compile(pattern: &str) -> Result<Self, PatternError> {
        let (collapsed, origins) = collapse_stars(pattern);

        let compiled = glob::Pattern::new(&collapsed).map_err(|e| PatternError {
            position: origins
                .get(e.pos)
                .copied()
                .unwrap_or_else(|| pattern.chars().count()),
            reason: e.msg,
        })?;

        Ok(Self {
            source: pattern.to_string(),
            compiled,
        })
    }

    /// The pattern as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// True for patterns made only of `*`, which match every key.
    pub fn is_match_all(&self) -> bool {
        self.compiled.as_str() == "*"
    }

    /// Checks whether the whole key matches the pattern.
    pub fn matches(&self, key: &str) -> bool {
        self.compiled.matches(key)
    }
}

impl std::fmt::Display for GlobPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

/// Replaces every run of `*` with a single `*`. Also returns, for each char of the
/// result, its char index in `pattern`.
fn collapse_stars(pattern: &str) -> (String, Vec<usize>) {
    let mut collapsed = String::with_capacity(pattern.len());
    let mut origins = Vec::with_capacity(pattern.len());
    let mut prev_star = false;

    for (idx, c) in pattern.chars().enumerate() {
        if c == '*' && prev_star {
            continue;
        }
        prev_star = c == '*';
        collapsed.push(c);
        origins.push(idx);
    }

    (collapsed, origins)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn glob(p: &str) -> GlobPattern {
        GlobPattern::compile(p).unwrap()
    }

    #[test]
    fn test_literal_is_anchored() {
        let p = glob("user:1");
        assert!(p.matches("user:1"));
        assert!(!p.matches("user:10"));
        assert!(!p.matches("xuser:1"));
    }

    #[test]
    fn test_star() {
        let p = glob("user:*");
        assert!(p.matches("user:"));
        assert!(p.matches("user:42"));
        assert!(p.matches("user:42:profile"));
        assert!(!p.matches("session:42"));

        let mid = glob("a*c");
        assert!(mid.matches("ac"));
        assert!(mid.matches("abbbc"));
        assert!(!mid.matches("abcd"));
    }

    #[test]
    fn test_star_crosses_slashes() {
        assert!(glob("tenant/*").matches("tenant/a/b/c"));
        assert!(glob("*.json").matches("cfg/app/.hidden.json"));
    }

    #[test]
    fn test_repeated_stars_collapse() {
        assert!(glob("**x**").matches("abcxdef"));
        assert!(glob("user:**").matches("user:1"));
        assert_eq!(glob("a***b").as_str(), "a***b");
    }

    #[test]
    fn test_question_mark() {
        let p = glob("h?llo");
        assert!(p.matches("hello"));
        assert!(p.matches("hallo"));
        assert!(!p.matches("hllo"));
        assert!(!p.matches("heello"));
    }

    #[test]
    fn test_classes() {
        let p = glob("h[ae]llo");
        assert!(p.matches("hello"));
        assert!(p.matches("hallo"));
        assert!(!p.matches("hillo"));

        let range = glob("key[0-9]");
        assert!(range.matches("key7"));
        assert!(!range.matches("keyx"));

        let negated = glob("h[!e]llo");
        assert!(negated.matches("hallo"));
        assert!(!negated.matches("hello"));
    }

    #[test]
    fn test_literal_metacharacters_via_class() {
        let p = glob("price[*]");
        assert!(p.matches("price*"));
        assert!(!p.matches("prices"));
        assert!(glob("what[?]").matches("what?"));
        assert!(glob("[[]x").matches("[x"));
    }

    #[test]
    fn test_trailing_dash_is_literal() {
        let p = glob("[a-]");
        assert!(p.matches("a"));
        assert!(p.matches("-"));
        assert!(!p.matches("b"));
    }

    #[test]
    fn test_unicode_keys() {
        assert!(glob("caf?").matches("café"));
        assert!(glob("ü*").matches("über"));
    }

    #[test]
    fn test_match_all() {
        assert!(glob("*").is_match_all());
        assert!(glob("***").is_match_all());
        assert!(!glob("a*").is_match_all());
        assert!(glob("*").matches(""));
    }

    #[test]
    fn test_empty_pattern() {
        let p = glob("");
        assert!(p.matches(""));
        assert!(!p.matches("a"));
    }

    #[test]
    fn test_unterminated_class_reports_position() {
        let err = GlobPattern::compile("user:[abc").unwrap_err();
        assert_eq!(err.position, 5);
        assert!(err.to_string().contains("position 5"));

        // Positions refer to the pattern as written, before stars collapse
        let err = GlobPattern::compile("***[").unwrap_err();
        assert_eq!(err.position, 3);
    }

    #[test]
    fn test_display_keeps_source() {
        assert_eq!(glob("a:*").to_string(), "a:*");
    }
}
