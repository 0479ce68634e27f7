//! The host's reply handle as this engine sees it.

use std::any::Any;
use std::sync::Arc;

use http::StatusCode;

/// Opaque per-route configuration, forwarded untouched from the route
/// declaration into the reply's routing context on an override.
pub type RouteConfig = Arc<dyn Any + Send + Sync>;

/// One outgoing reply.
///
/// The `sent` flag is the load-bearing part: a hook that performs the
/// terminal write ends the request, and the chain must stop short of the
/// handler. The first write wins; later sends are ignored, matching how
/// hosts treat an already-finished reply.
pub struct Reply {
    status: StatusCode,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
    sent: bool,
    route_config: Option<RouteConfig>,
}

impl Reply {
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            headers: Vec::new(),
            body: Vec::new(),
            sent: false,
            route_config: None,
        }
    }

    /// Sets the status for the eventual send. Chainable.
    pub fn set_status(&mut self, status: StatusCode) -> &mut Self {
        self.status = status;
        self
    }

    /// Adds a header. Chainable.
    pub fn header(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Terminal write. Ignored if the reply was already sent.
    pub fn send(&mut self, body: impl Into<Vec<u8>>) {
        if self.sent {
            return;
        }
        self.body = body.into();
        self.sent = true;
    }

    /// Terminal write with an `application/json` content type.
    pub fn send_json(&mut self, body: impl Into<Vec<u8>>) {
        if self.sent {
            return;
        }
        self.header("content-type", "application/json");
        self.send(body);
    }

    /// Terminal write with no body, for HEAD and 204-style responses.
    pub fn send_empty(&mut self) {
        self.send(Vec::new());
    }

    /// Whether terminal I/O has been performed on this reply.
    pub fn is_sent(&self) -> bool {
        self.sent
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// The resolved route's configuration, downcast to its concrete type.
    ///
    /// Populated by the dispatcher on an override, so downstream code sees
    /// the same contextual configuration the target route would have had
    /// under normal dispatch.
    pub fn route_config<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.route_config.as_deref()?.downcast_ref()
    }

    pub(crate) fn set_route_config(&mut self, config: RouteConfig) {
        self.route_config = Some(config);
    }
}

impl Default for Reply {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_send_wins() {
        let mut reply = Reply::new();
        reply.set_status(StatusCode::CREATED);
        reply.send(b"first".to_vec());
        reply.send(b"second".to_vec());
        assert!(reply.is_sent());
        assert_eq!(reply.body(), b"first");
        assert_eq!(reply.status(), StatusCode::CREATED);
    }

    #[test]
    fn route_config_downcasts() {
        struct CachePolicy {
            max_age: u32,
        }
        let mut reply = Reply::new();
        reply.set_route_config(Arc::new(CachePolicy { max_age: 60 }));
        assert_eq!(reply.route_config::<CachePolicy>().map(|c| c.max_age), Some(60));
        assert!(reply.route_config::<String>().is_none());
    }
}
