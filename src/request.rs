//! The host's request object as this engine sees it.

use std::collections::HashMap;

use crate::method::Method;

/// One incoming request, lent to the engine for the length of a dispatch.
///
/// Body parsing happens upstream in the host; the engine only ever reads
/// the already-parsed `_method` form field. On a successful override the
/// engine overwrites the effective method and the parameter set.
pub struct Request {
    method: Method,
    path: String,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
    form: HashMap<String, String>,
    params: HashMap<String, String>,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Vec::new(),
            body: Vec::new(),
            form: HashMap::new(),
            params: HashMap::new(),
        }
    }

    /// Adds a header. Chainable, construction-time.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets the raw body bytes.
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Adds one parsed body field. The host's body parser fills these in
    /// before routing starts.
    pub fn with_form_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.form.insert(name.into(), value.into());
        self
    }

    /// The effective method: the wire verb, or the tunneled target after an
    /// override.
    pub fn method(&self) -> Method {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// A parsed body field, e.g. `_method`.
    pub fn form_value(&self, name: &str) -> Option<&str> {
        self.form.get(name).map(String::as_str)
    }

    /// A named path parameter.
    ///
    /// For a route `/users/:id` matched against `/users/42`,
    /// `req.param("id")` returns `Some("42")`. A trailing wildcard capture
    /// lives under `"*"`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    /// Overwrites the effective method. The dispatcher calls this once a
    /// tunneled verb resolves.
    pub fn set_method(&mut self, method: Method) {
        self.method = method;
    }

    /// Replaces the parameter set wholesale with a resolved route's
    /// captures.
    pub fn set_params(&mut self, params: HashMap<String, String>) {
        self.params = params;
    }

    /// Inserts one parameter. Hooks use this to pass per-request state down
    /// the chain.
    pub fn set_param(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.insert(key.into(), value.into());
    }
}
