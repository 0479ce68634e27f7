//! Route pattern compilation.
//!
//! Patterns use `:name` for a named segment and at most one trailing `*`
//! that captures every remaining segment. Each pattern compiles into its
//! own single-route [`matchit`] tree. Per-entry matchers keep declaration
//! order meaningful: one shared tree would impose its own precedence
//! ranking and reject overlapping parametric routes outright.

use std::collections::HashMap;

/// Key under which a trailing wildcard capture is surfaced.
pub(crate) const WILDCARD_KEY: &str = "*";

/// Internal parameter name standing in for `*` inside the matchit grammar.
const WILDCARD_PARAM: &str = "__wildcard";

pub(crate) type Params = HashMap<String, String>;

/// A compiled route pattern. Stateless once built; derived solely from the
/// originating pattern.
#[derive(Clone)]
pub(crate) struct PathMatcher {
    tree: matchit::Router<()>,
}

impl PathMatcher {
    /// Compiles `pattern` into a matcher. Deterministic, no side effects.
    ///
    /// # Panics
    ///
    /// Panics on patterns the route grammar rejects. Well-formed patterns
    /// are the host's contract; this mirrors how hosts treat their own
    /// invalid route declarations.
    pub(crate) fn compile(pattern: &str) -> Self {
        let mut tree = matchit::Router::new();
        tree.insert(translate(pattern), ())
            .unwrap_or_else(|e| panic!("invalid route pattern `{pattern}`: {e}"));
        Self { tree }
    }

    /// Tests a concrete path. On a match, returns the named captures; a
    /// wildcard capture appears under [`WILDCARD_KEY`] with its segments
    /// joined by `/`. A pattern with no parameters matches only its exact
    /// literal path.
    pub(crate) fn capture(&self, path: &str) -> Option<Params> {
        let matched = self.tree.at(path).ok()?;
        Some(
            matched
                .params
                .iter()
                .map(|(name, value)| {
                    let name = if name == WILDCARD_PARAM { WILDCARD_KEY } else { name };
                    (name.to_owned(), value.to_owned())
                })
                .collect(),
        )
    }
}

/// Rewrites `:name` / trailing `*` syntax into matchit's brace grammar.
fn translate(pattern: &str) -> String {
    let last = pattern.split('/').count() - 1;
    let segments: Vec<String> = pattern
        .split('/')
        .enumerate()
        .map(|(index, segment)| {
            if index == last && segment == "*" {
                format!("{{*{WILDCARD_PARAM}}}")
            } else if let Some(name) = segment.strip_prefix(':') {
                format!("{{{name}}}")
            } else {
                segment.to_owned()
            }
        })
        .collect();
    segments.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_pattern_matches_only_itself() {
        let matcher = PathMatcher::compile("/healthz");
        assert_eq!(matcher.capture("/healthz"), Some(HashMap::new()));
        assert_eq!(matcher.capture("/healthz/live"), None);
        assert_eq!(matcher.capture("/health"), None);
    }

    #[test]
    fn named_segment_is_captured() {
        let matcher = PathMatcher::compile("/users/:id");
        let params = matcher.capture("/users/42").unwrap();
        assert_eq!(params.get("id").map(String::as_str), Some("42"));
        assert_eq!(matcher.capture("/users"), None);
        assert_eq!(matcher.capture("/users/42/posts"), None);
    }

    #[test]
    fn multiple_named_segments() {
        let matcher = PathMatcher::compile("/users/:user/posts/:post");
        let params = matcher.capture("/users/7/posts/99").unwrap();
        assert_eq!(params.get("user").map(String::as_str), Some("7"));
        assert_eq!(params.get("post").map(String::as_str), Some("99"));
    }

    #[test]
    fn trailing_wildcard_joins_remaining_segments() {
        let matcher = PathMatcher::compile("/files/*");
        let params = matcher.capture("/files/reports/2024/q3.pdf").unwrap();
        assert_eq!(
            params.get(WILDCARD_KEY).map(String::as_str),
            Some("reports/2024/q3.pdf")
        );
    }

    #[test]
    fn named_and_wildcard_segments_combine() {
        let matcher = PathMatcher::compile("/archive/:year/*");
        let params = matcher.capture("/archive/2024/photos/cat.png").unwrap();
        assert_eq!(params.get("year").map(String::as_str), Some("2024"));
        assert_eq!(params.get(WILDCARD_KEY).map(String::as_str), Some("photos/cat.png"));
    }

    #[test]
    fn root_pattern() {
        let matcher = PathMatcher::compile("/");
        assert!(matcher.capture("/").is_some());
        assert_eq!(matcher.capture("/anything"), None);
    }
}
