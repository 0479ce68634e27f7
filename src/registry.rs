//! The mirrored route table.
//!
//! One ordered list per override-eligible verb, appended to as the host
//! announces routes. First structural match wins; there is no specificity
//! ranking beyond declaration order, and entries are never reordered or
//! removed. At this scale a linear scan per verb bucket is the whole
//! lookup.

use std::collections::HashMap;
use std::sync::Arc;

use crate::handler::BoxedHandler;
use crate::hook::Hook;
use crate::method::OverrideMethod;
use crate::pattern::{Params, PathMatcher};
use crate::reply::RouteConfig;

/// One mirrored route. Cheap to clone: matcher, handler, hooks and config
/// are all shared, so `resolve` can hand a copy out from behind the
/// registry lock without holding it across an await.
#[derive(Clone)]
pub(crate) struct RouteEntry {
    pub(crate) pattern: String,
    pub(crate) matcher: Arc<PathMatcher>,
    pub(crate) handler: BoxedHandler,
    pub(crate) hooks: Vec<Hook>,
    pub(crate) config: Option<RouteConfig>,
}

#[derive(Default)]
pub(crate) struct Registry {
    routes: HashMap<OverrideMethod, Vec<RouteEntry>>,
}

impl Registry {
    /// Appends `entry` to the verb's list, declaration order preserved.
    pub(crate) fn register(&mut self, method: OverrideMethod, entry: RouteEntry) {
        self.routes.entry(method).or_default().push(entry);
    }

    /// First entry, in declaration order, whose matcher accepts `path`,
    /// together with the captured parameters. `None` when the verb has no
    /// routes at all or nothing matches.
    pub(crate) fn resolve(
        &self,
        method: OverrideMethod,
        path: &str,
    ) -> Option<(RouteEntry, Params)> {
        self.routes.get(&method)?.iter().find_map(|entry| {
            entry
                .matcher
                .capture(path)
                .map(|params| (entry.clone(), params))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::BoxFuture;
    use crate::reply::Reply;
    use crate::request::Request;

    fn noop<'a>(_req: &'a mut Request, _reply: &'a mut Reply) -> BoxFuture<'a> {
        Box::pin(async move { Ok(()) })
    }

    fn entry(pattern: &str) -> RouteEntry {
        RouteEntry {
            pattern: pattern.to_owned(),
            matcher: Arc::new(PathMatcher::compile(pattern)),
            handler: Arc::new(noop),
            hooks: Vec::new(),
            config: None,
        }
    }

    #[test]
    fn first_declared_match_wins() {
        let mut registry = Registry::default();
        registry.register(OverrideMethod::Delete, entry("/v/:a"));
        registry.register(OverrideMethod::Delete, entry("/v/:b"));

        let (resolved, params) = registry.resolve(OverrideMethod::Delete, "/v/x").unwrap();
        assert_eq!(resolved.pattern, "/v/:a");
        assert_eq!(params.get("a").map(String::as_str), Some("x"));
        assert!(!params.contains_key("b"));
    }

    #[test]
    fn unregistered_verb_resolves_none() {
        let mut registry = Registry::default();
        registry.register(OverrideMethod::Delete, entry("/v/:a"));
        assert!(registry.resolve(OverrideMethod::Patch, "/v/x").is_none());
    }

    #[test]
    fn no_structural_match_resolves_none() {
        let mut registry = Registry::default();
        registry.register(OverrideMethod::Put, entry("/users/:id"));
        assert!(registry.resolve(OverrideMethod::Put, "/teams/1").is_none());
    }
}
