//! The route-declaration notification.

use std::any::Any;
use std::sync::Arc;

use crate::handler::{BoxedHandler, Handler};
use crate::hook::Hook;
use crate::method::Method;
use crate::reply::RouteConfig;

/// Everything the host tells the engine about one declared route.
///
/// Feed each declaration through
/// [`MethodOverride::on_route`](crate::MethodOverride::on_route) before
/// serving starts. Override-eligible verbs are mirrored; POST routes come
/// back with the engine's dispatch hook prepended to `pre_handler`.
///
/// Fields are public because the host owns this structure; the engine only
/// reads it, except for the POST hook injection.
pub struct RouteOptions {
    pub method: Method,
    pub url: String,
    pub handler: BoxedHandler,
    /// Pre-validation hooks, replayed before `pre_handler` on a tunneled
    /// dispatch.
    pub pre_validation: Vec<Hook>,
    pub pre_handler: Vec<Hook>,
    /// Opaque per-route configuration, surfaced on the reply when the
    /// route is reached through the tunnel.
    pub config: Option<RouteConfig>,
}

impl RouteOptions {
    pub fn new(method: Method, url: impl Into<String>, handler: impl Handler) -> Self {
        Self {
            method,
            url: url.into(),
            handler: Arc::new(handler),
            pre_validation: Vec::new(),
            pre_handler: Vec::new(),
            config: None,
        }
    }

    /// Appends a pre-validation hook. Chainable.
    pub fn pre_validation(mut self, hook: Hook) -> Self {
        self.pre_validation.push(hook);
        self
    }

    /// Appends a pre-handler hook. Chainable.
    pub fn pre_handler(mut self, hook: Hook) -> Self {
        self.pre_handler.push(hook);
        self
    }

    /// Attaches opaque per-route configuration.
    pub fn config<T: Any + Send + Sync>(mut self, config: T) -> Self {
        self.config = Some(Arc::new(config));
        self
    }

    /// All hooks in replay order: pre-validation first, then pre-handler,
    /// declaration order within each category.
    pub(crate) fn all_hooks(&self) -> Vec<Hook> {
        self.pre_validation
            .iter()
            .chain(&self.pre_handler)
            .cloned()
            .collect()
    }
}
