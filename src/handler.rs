//! Handler trait and type erasure.
//!
//! # How handlers are stored
//!
//! The registry holds handlers of *different* concrete types in one
//! per-verb list, so handlers hide behind a trait object the same way the
//! host stores its own routes. A handler borrows the request and reply for
//! the length of one call and writes its response into the reply; the
//! returned future carries that borrow, hence the lifetime-tagged
//! [`BoxFuture`].
//!
//! The chain from user code to dispatch is:
//!
//! ```text
//! fn get_user<'a>(req: &'a mut Request, reply: &'a mut Reply) -> BoxFuture<'a>
//!        |  RouteOptions::new(Method::Get, "/users/:id", get_user)
//! Arc::new(get_user)            stored as BoxedHandler = Arc<dyn Handler>
//!        |  at dispatch time
//! handler.call(req, reply)      one virtual call, one Arc clone per entry
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::HookError;
use crate::reply::Reply;
use crate::request::Request;

/// A heap-allocated future borrowing the request/reply pair it works on.
///
/// `Pin<Box<...>>` because the runtime polls the future in place; the `'a`
/// tag lets the future keep the `&mut` borrows alive until it completes.
pub type BoxFuture<'a> = Pin<Box<dyn Future<Output = Result<(), HookError>> + Send + 'a>>;

/// A route handler.
///
/// Writes its response into [`Reply`]; a failure propagates to the host
/// exactly as a pre-processing hook failure would. Automatically satisfied
/// by any function with the shape:
///
/// ```text
/// fn handle<'a>(req: &'a mut Request, reply: &'a mut Reply) -> BoxFuture<'a>
/// ```
pub trait Handler: Send + Sync + 'static {
    fn call<'a>(&'a self, req: &'a mut Request, reply: &'a mut Reply) -> BoxFuture<'a>;
}

impl<F> Handler for F
where
    F: for<'a> Fn(&'a mut Request, &'a mut Reply) -> BoxFuture<'a> + Send + Sync + 'static,
{
    fn call<'a>(&'a self, req: &'a mut Request, reply: &'a mut Reply) -> BoxFuture<'a> {
        self(req, reply)
    }
}

/// A shared, type-erased handler. One clone lives in the host's route
/// table, one per mirrored registry entry.
pub type BoxedHandler = Arc<dyn Handler>;
