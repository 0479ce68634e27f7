//! Engine error surface.
//!
//! Two kinds of failure leave this crate: a tunneling target that resolves
//! to no registered route, and a replayed hook (or the target handler)
//! failing. A hook that ends the request early by sending the reply is not
//! an error; see [`HookOutcome::ResponseAlreadySent`](crate::HookOutcome).
//! Neither kind is retried: a failed override attempt is final for that
//! request.

use http::StatusCode;
use thiserror::Error;

use crate::method::Method;

/// Failure value carried by hooks and handlers, surfaced verbatim to the
/// host's error machinery.
pub type HookError = Box<dyn std::error::Error + Send + Sync>;

/// The error type returned by a failed override dispatch.
#[derive(Debug, Error)]
pub enum Error {
    /// The tunneling target verb + path had no registered match.
    #[error("Route {method}:{path} not found")]
    RouteNotFound { method: Method, path: String },

    /// A replayed hook or the resolved handler failed. The cause is exactly
    /// what the hook reported, as if the route had been hit directly.
    #[error(transparent)]
    Hook(#[from] HookError),
}

impl Error {
    /// The HTTP status the host should translate this error into.
    ///
    /// A hook that failed with this crate's own not-found error keeps its
    /// 404; every other hook failure defaults to 500.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::RouteNotFound { .. } => StatusCode::NOT_FOUND,
            Self::Hook(cause) => cause
                .downcast_ref::<Error>()
                .map(Error::status_code)
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_is_exact() {
        let err = Error::RouteNotFound {
            method: Method::Patch,
            path: "/missing".to_owned(),
        };
        assert_eq!(err.to_string(), "Route PATCH:/missing not found");
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn hook_failure_is_transparent() {
        let err = Error::Hook("Some Error".into());
        assert_eq!(err.to_string(), "Some Error");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn nested_not_found_keeps_its_status() {
        let inner = Error::RouteNotFound {
            method: Method::Delete,
            path: "/gone".to_owned(),
        };
        let err = Error::Hook(Box::new(inner));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }
}
