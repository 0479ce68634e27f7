//! # swerve
//!
//! Method tunneling for HTTP services. Nothing more. Nothing less.
//!
//! ## The problem
//!
//! HTML forms, legacy proxies and locked-down clients speak GET and POST
//! and nothing else. The verbs that make a REST surface honest (HEAD, PUT,
//! DELETE, OPTIONS, PATCH) never reach the wire. The usual workaround is
//! tunneling: the client sends a POST and names the verb it meant in a
//! `_method` body field.
//!
//! swerve is the dispatch engine for that workaround. It shadows the
//! override-eligible subset of the host's route table as routes are
//! declared. When a tunneling POST arrives it finds the route that would
//! have matched the real verb, rewrites the request's method and params,
//! replays the route's pre-processing hooks with the host's exact
//! semantics (mixed completion styles, failure aborts the chain, a sent
//! reply stops it without error), then invokes the handler directly. The
//! host's own router never sees the difference.
//!
//! What stays the host's job:
//!
//! - **Routing normal traffic**. swerve shadows a subset of the route
//!   table; it never replaces the table.
//! - **Body parsing**. The engine reads one already-parsed field.
//! - **Error rendering**. swerve surfaces typed errors; the host turns
//!   them into wire responses via [`Error::status_code`].
//! - **Timeouts and transport**. No deadlines, no sockets in here.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use swerve::{BoxFuture, Method, MethodOverride, Reply, Request, RouteOptions};
//!
//! fn delete_user<'a>(req: &'a mut Request, reply: &'a mut Reply) -> BoxFuture<'a> {
//!     Box::pin(async move {
//!         let id = req.param("id").unwrap_or("unknown");
//!         reply.send_json(format!(r#"{{"deleted":"{id}"}}"#).into_bytes());
//!         Ok(())
//!     })
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let engine = MethodOverride::new();
//!
//!     // Mirror each route as the host declares it.
//!     let mut route = RouteOptions::new(Method::Delete, "/users/:id", delete_user);
//!     engine.on_route(&mut route);
//!
//!     // A client that cannot speak DELETE tunnels it through POST.
//!     let mut req = Request::new(Method::Post, "/users/42")
//!         .with_form_field("_method", "DELETE");
//!     let mut reply = Reply::new();
//!
//!     engine.dispatch(&mut req, &mut reply).await.unwrap();
//!     assert_eq!(req.method(), Method::Delete);
//!     assert!(reply.is_sent());
//! }
//! ```
//!
//! ## Wiring into a host
//!
//! Feed every declared route through [`MethodOverride::on_route`] before
//! serving starts. POST routes come back with the engine's dispatch hook
//! prepended to their pre-handler list; additionally run
//! [`MethodOverride::hook`] as the pre-processing step of the host's
//! not-found handler. Registering both ways is what catches a tunneled
//! request whether or not a POST route happens to exist at the same path.
//! See `demos/host.rs` for a complete hyper host.

mod dispatch;
mod error;
mod handler;
mod hook;
mod method;
mod pattern;
mod registry;
mod reply;
mod request;
mod route;

pub use dispatch::MethodOverride;
pub use error::{Error, HookError};
pub use handler::{BoxFuture, BoxedHandler, Handler};
pub use hook::{run_chain, AwaitableHook, Done, Hook, HookOutcome, SignaledHook};
pub use method::{Method, OverrideMethod};
pub use reply::{Reply, RouteConfig};
pub use request::Request;
pub use route::RouteOptions;
