//! Hook chain replay.
//!
//! Pre-processing hooks come in two shapes, kept as an explicit tagged
//! union instead of a runtime is-this-a-future probe:
//!
//! - [`Hook::Awaitable`] takes `(req, reply)`; completion of the returned
//!   future signals success, its error signals failure.
//! - [`Hook::Signaled`] takes `(req, reply, done)`; completion arrives
//!   through the single-use [`Done`] token. `Done`'s methods consume it,
//!   so "invoked exactly once" holds at the type level.
//!
//! [`run_chain`] replays a chain strictly in sequence. Hooks mutate shared
//! per-request state and must never interleave: each hook's completion is
//! awaited before the next starts. The first failure aborts the chain, and
//! a hook that has already sent the reply ends the chain without error.

use std::sync::Arc;

use tokio::sync::oneshot;
use tracing::trace;

use crate::error::HookError;
use crate::handler::BoxFuture;
use crate::reply::Reply;
use crate::request::Request;

/// An awaitable-shape hook, with the same shape as a
/// [`Handler`](crate::Handler).
pub trait AwaitableHook: Send + Sync + 'static {
    fn invoke<'a>(&'a self, req: &'a mut Request, reply: &'a mut Reply) -> BoxFuture<'a>;
}

/// A completion-signalled hook. The call itself is synchronous; completion
/// may arrive later through the [`Done`] token, e.g. from a spawned task.
pub trait SignaledHook: Send + Sync + 'static {
    fn invoke(&self, req: &mut Request, reply: &mut Reply, done: Done);
}

/// Newtype bridging a plain awaitable function to the trait-object world.
struct FnHook<F>(F);

impl<F> AwaitableHook for FnHook<F>
where
    F: for<'a> Fn(&'a mut Request, &'a mut Reply) -> BoxFuture<'a> + Send + Sync + 'static,
{
    fn invoke<'a>(&'a self, req: &'a mut Request, reply: &'a mut Reply) -> BoxFuture<'a> {
        (self.0)(req, reply)
    }
}

/// Newtype bridging a plain signalled function to the trait-object world.
struct FnSignaled<F>(F);

impl<F> SignaledHook for FnSignaled<F>
where
    F: Fn(&mut Request, &mut Reply, Done) + Send + Sync + 'static,
{
    fn invoke(&self, req: &mut Request, reply: &mut Reply, done: Done) {
        (self.0)(req, reply, done)
    }
}

/// One unit of pre-processing, replayed before a tunneled handler runs.
///
/// Cloning is cheap; the underlying function is shared between the host's
/// route table and every mirrored registry entry.
#[derive(Clone)]
pub enum Hook {
    Awaitable(Arc<dyn AwaitableHook>),
    Signaled(Arc<dyn SignaledHook>),
}

impl Hook {
    /// Wraps an awaitable-shape function.
    pub fn awaitable<F>(hook: F) -> Self
    where
        F: for<'a> Fn(&'a mut Request, &'a mut Reply) -> BoxFuture<'a> + Send + Sync + 'static,
    {
        Self::Awaitable(Arc::new(FnHook(hook)))
    }

    /// Wraps a completion-signalled function.
    pub fn signaled<F>(hook: F) -> Self
    where
        F: Fn(&mut Request, &mut Reply, Done) + Send + Sync + 'static,
    {
        Self::Signaled(Arc::new(FnSignaled(hook)))
    }

    async fn execute(&self, req: &mut Request, reply: &mut Reply) -> Result<(), HookError> {
        match self {
            Self::Awaitable(hook) => hook.invoke(req, reply).await,
            Self::Signaled(hook) => {
                let (done, completed) = Done::channel();
                hook.invoke(req, reply, done);
                match completed.await {
                    Ok(outcome) => outcome,
                    // The token was dropped without being invoked. Waiting
                    // any longer would hang the request; report the hook as
                    // failed instead.
                    Err(_) => Err("hook dropped its completion token".into()),
                }
            }
        }
    }
}

/// Completion token handed to a [`Hook::Signaled`] hook.
///
/// Both methods consume the token, so a hook cannot complete twice.
/// Dropping the token without calling either counts as a hook failure.
pub struct Done(oneshot::Sender<Result<(), HookError>>);

impl Done {
    fn channel() -> (Self, oneshot::Receiver<Result<(), HookError>>) {
        let (tx, rx) = oneshot::channel();
        (Self(tx), rx)
    }

    /// Signals successful completion.
    pub fn ok(self) {
        let _ = self.0.send(Ok(()));
    }

    /// Signals failure. `err` propagates verbatim to the host.
    pub fn err(self, err: impl Into<HookError>) {
        let _ = self.0.send(Err(err.into()));
    }
}

/// Result of replaying a hook chain.
#[derive(Debug)]
#[must_use]
pub enum HookOutcome {
    /// Every hook completed; the handler may run.
    Continue,
    /// A hook performed the terminal write. The chain stopped and the
    /// handler must not run. Not an error.
    ResponseAlreadySent,
    /// A hook failed; no later hook ran.
    Fail(HookError),
}

/// Replays `hooks` strictly in sequence against one request/reply pair.
pub async fn run_chain(hooks: &[Hook], req: &mut Request, reply: &mut Reply) -> HookOutcome {
    for (index, hook) in hooks.iter().enumerate() {
        if let Err(err) = hook.execute(req, reply).await {
            trace!(hook = index, "hook failed, chain aborted");
            return HookOutcome::Fail(err);
        }
        if reply.is_sent() {
            trace!(hook = index, "reply sent, chain stopped short of the handler");
            return HookOutcome::ResponseAlreadySent;
        }
    }
    HookOutcome::Continue
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::Method;

    fn push_trace(req: &mut Request, step: &str) {
        let trace = match req.param("trace") {
            Some(prev) => format!("{prev},{step}"),
            None => step.to_owned(),
        };
        req.set_param("trace", trace);
    }

    fn awaitable_step<'a>(req: &'a mut Request, _reply: &'a mut Reply) -> BoxFuture<'a> {
        Box::pin(async move {
            push_trace(req, "awaitable");
            Ok(())
        })
    }

    fn failing_step<'a>(_req: &'a mut Request, _reply: &'a mut Reply) -> BoxFuture<'a> {
        Box::pin(async move { Err("boom".into()) })
    }

    fn sending_step<'a>(_req: &'a mut Request, reply: &'a mut Reply) -> BoxFuture<'a> {
        Box::pin(async move {
            reply.send(b"handled by hook".to_vec());
            Ok(())
        })
    }

    #[tokio::test]
    async fn both_shapes_run_in_declaration_order() {
        let hooks = vec![
            Hook::signaled(|req: &mut Request, _: &mut Reply, done: Done| {
                push_trace(req, "signaled");
                done.ok();
            }),
            Hook::awaitable(awaitable_step),
            Hook::signaled(|req: &mut Request, _: &mut Reply, done: Done| {
                push_trace(req, "signaled-again");
                done.ok();
            }),
        ];
        let mut req = Request::new(Method::Patch, "/");
        let mut reply = Reply::new();
        let outcome = run_chain(&hooks, &mut req, &mut reply).await;
        assert!(matches!(outcome, HookOutcome::Continue));
        assert_eq!(req.param("trace"), Some("signaled,awaitable,signaled-again"));
    }

    #[tokio::test]
    async fn failure_aborts_before_later_hooks() {
        let hooks = vec![Hook::awaitable(failing_step), Hook::awaitable(awaitable_step)];
        let mut req = Request::new(Method::Patch, "/");
        let mut reply = Reply::new();
        match run_chain(&hooks, &mut req, &mut reply).await {
            HookOutcome::Fail(err) => assert_eq!(err.to_string(), "boom"),
            other => panic!("expected Fail, got {other:?}"),
        }
        assert_eq!(req.param("trace"), None);
    }

    #[tokio::test]
    async fn sent_reply_stops_the_chain_without_error() {
        let hooks = vec![Hook::awaitable(sending_step), Hook::awaitable(awaitable_step)];
        let mut req = Request::new(Method::Patch, "/");
        let mut reply = Reply::new();
        let outcome = run_chain(&hooks, &mut req, &mut reply).await;
        assert!(matches!(outcome, HookOutcome::ResponseAlreadySent));
        assert_eq!(req.param("trace"), None);
        assert_eq!(reply.body(), b"handled by hook");
    }

    #[tokio::test]
    async fn signaled_failure_carries_its_error() {
        let hooks = vec![Hook::signaled(|_: &mut Request, _: &mut Reply, done: Done| {
            done.err("Some Error");
        })];
        let mut req = Request::new(Method::Patch, "/");
        let mut reply = Reply::new();
        match run_chain(&hooks, &mut req, &mut reply).await {
            HookOutcome::Fail(err) => assert_eq!(err.to_string(), "Some Error"),
            other => panic!("expected Fail, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn dropped_done_token_is_a_failure() {
        let hooks = vec![Hook::signaled(|_: &mut Request, _: &mut Reply, done: Done| {
            drop(done);
        })];
        let mut req = Request::new(Method::Patch, "/");
        let mut reply = Reply::new();
        match run_chain(&hooks, &mut req, &mut reply).await {
            HookOutcome::Fail(err) => {
                assert!(err.to_string().contains("completion token"));
            }
            other => panic!("expected Fail, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn deferred_completion_is_awaited() {
        let hooks = vec![Hook::signaled(|_: &mut Request, _: &mut Reply, done: Done| {
            tokio::spawn(async move {
                tokio::task::yield_now().await;
                done.ok();
            });
        })];
        let mut req = Request::new(Method::Patch, "/");
        let mut reply = Reply::new();
        let outcome = run_chain(&hooks, &mut req, &mut reply).await;
        assert!(matches!(outcome, HookOutcome::Continue));
    }
}
