//! The override dispatcher.
//!
//! [`MethodOverride`] consumes the host's route-declaration notifications,
//! mirrors the override-eligible ones, and on each POST (or on the host's
//! not-found fallback) decides whether the request is a tunneling
//! candidate. On a hit it rewrites the request, replays the target route's
//! hook chain and invokes the target handler directly, bypassing the
//! host's own dispatch for that verb.

use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::error::{Error, HookError};
use crate::handler::BoxFuture;
use crate::hook::{run_chain, AwaitableHook, Hook, HookOutcome};
use crate::method::{Method, OverrideMethod};
use crate::pattern::PathMatcher;
use crate::registry::{Registry, RouteEntry};
use crate::reply::Reply;
use crate::request::Request;
use crate::route::RouteOptions;

/// Body field naming the tunneled verb.
const OVERRIDE_FIELD: &str = "_method";

/// The override dispatch engine.
///
/// Cloning shares the underlying registry; one instance serves a whole
/// host. Declarations happen during setup, dispatch once serving starts;
/// concurrent registration and dispatch is not supported.
#[derive(Clone)]
pub struct MethodOverride {
    registry: Arc<RwLock<Registry>>,
}

impl MethodOverride {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(RwLock::new(Registry::default())),
        }
    }

    /// Consumes one route-declaration notification.
    ///
    /// Override-eligible verbs are mirrored into the registry, hook chain
    /// and config included. Independently, POST routes get the engine's
    /// dispatch hook prepended to their pre-handler list. Together with
    /// running [`MethodOverride::hook`] on the host's not-found path, this
    /// double registration catches a tunneling request whether or not a
    /// POST route exists at the same path.
    pub fn on_route(&self, route: &mut RouteOptions) {
        if let Some(target) = OverrideMethod::from_method(route.method) {
            let entry = RouteEntry {
                pattern: route.url.clone(),
                matcher: Arc::new(PathMatcher::compile(&route.url)),
                handler: Arc::clone(&route.handler),
                hooks: route.all_hooks(),
                config: route.config.clone(),
            };
            debug!(method = %target, pattern = %route.url, "mirrored override-eligible route");
            self.registry
                .write()
                .expect("route table lock poisoned")
                .register(target, entry);
        }

        if route.method == Method::Post {
            route.pre_handler.insert(0, self.hook());
        }
    }

    /// The dispatch entry point packaged as a hook, for POST route chains
    /// and for the pre-processing step of the host's not-found handler.
    pub fn hook(&self) -> Hook {
        Hook::Awaitable(Arc::new(DispatchHook(self.clone())))
    }

    /// Inspects one request and, if it is a tunneling candidate, dispatches
    /// it to the mirrored route.
    ///
    /// Anything other than a POST carrying an allow-set `_method` field is
    /// left untouched and returns `Ok(())`: the request proceeds through
    /// whatever path invoked the dispatcher, normal handling or the host's
    /// own not-found response.
    ///
    /// On a tunneling candidate with no mirrored match, returns
    /// [`Error::RouteNotFound`]. On a match, the request's effective method
    /// and params are rewritten, the route's config lands on the reply, the
    /// hook chain is replayed, and unless a hook failed or already sent the
    /// reply, the target handler runs.
    pub async fn dispatch(&self, req: &mut Request, reply: &mut Reply) -> Result<(), Error> {
        if req.method() != Method::Post {
            return Ok(());
        }
        let Some(target) = req
            .form_value(OVERRIDE_FIELD)
            .and_then(OverrideMethod::from_token)
        else {
            return Ok(());
        };

        let resolved = self
            .registry
            .read()
            .expect("route table lock poisoned")
            .resolve(target, req.path());
        let Some((entry, params)) = resolved else {
            return Err(Error::RouteNotFound {
                method: target.as_method(),
                path: req.path().to_owned(),
            });
        };

        debug!(method = %target, path = %req.path(), pattern = %entry.pattern, "tunneling POST request");

        req.set_method(target.as_method());
        req.set_params(params);
        if let Some(config) = &entry.config {
            reply.set_route_config(Arc::clone(config));
        }

        match run_chain(&entry.hooks, req, reply).await {
            HookOutcome::Fail(err) => Err(Error::Hook(err)),
            HookOutcome::ResponseAlreadySent => Ok(()),
            HookOutcome::Continue => entry.handler.call(req, reply).await.map_err(Error::Hook),
        }
    }
}

impl Default for MethodOverride {
    fn default() -> Self {
        Self::new()
    }
}

/// [`MethodOverride::dispatch`] in hook clothing.
struct DispatchHook(MethodOverride);

impl AwaitableHook for DispatchHook {
    fn invoke<'a>(&'a self, req: &'a mut Request, reply: &'a mut Reply) -> BoxFuture<'a> {
        let engine = self.0.clone();
        Box::pin(async move {
            engine
                .dispatch(req, reply)
                .await
                .map_err(|err| Box::new(err) as HookError)
        })
    }
}
