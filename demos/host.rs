//! Demo host: a minimal hyper server wired to the override engine.
//!
//! The host owns its own routing table (one matchit tree per method, the
//! usual shape) and feeds every declaration through the engine. POST
//! routes come back with the dispatch hook prepended to their pre-handler
//! chain, and the not-found path runs the same hook before giving up.
//! That double registration is the whole integration contract.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example host
//!
//! Try:
//!   curl http://localhost:3000/users/42
//!   curl -X POST http://localhost:3000/users/42 -d '_method=DELETE'
//!   curl -X POST http://localhost:3000/users/42 -d '_method=PATCH'   # 401, no token
//!   curl -X POST http://localhost:3000/missing  -d '_method=PATCH'   # 404 with message
//!   curl -X POST http://localhost:3000/files/a/b.txt -d '_method=PUT'

use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http::StatusCode;
use http_body_util::{BodyExt, Full};
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info};

use swerve::{
    run_chain, BoxFuture, Done, Hook, HookOutcome, Method, MethodOverride, Reply, Request,
    RouteOptions,
};

// ── Host ─────────────────────────────────────────────────────────────────────

/// A toy host: route options plus one matchit tree per method indexing
/// into them.
struct Host {
    engine: MethodOverride,
    routes: Vec<RouteOptions>,
    trees: HashMap<Method, matchit::Router<usize>>,
}

impl Host {
    fn declare(&mut self, mut route: RouteOptions) {
        // The engine mirrors eligible verbs and injects its hook into POST
        // routes before the host files the declaration away.
        self.engine.on_route(&mut route);

        let index = self.routes.len();
        self.trees
            .entry(route.method)
            .or_default()
            .insert(to_tree_route(&route.url), index)
            .unwrap_or_else(|e| panic!("invalid route `{}`: {e}", route.url));
        self.routes.push(route);
    }

    fn lookup(&self, method: Method, path: &str) -> Option<(usize, HashMap<String, String>)> {
        let matched = self.trees.get(&method)?.at(path).ok()?;
        let params = matched
            .params
            .iter()
            .map(|(name, value)| {
                // Surface the catch-all under the conventional key.
                let name = if name == "rest" { "*" } else { name };
                (name.to_owned(), value.to_owned())
            })
            .collect();
        Some((*matched.value, params))
    }
}

/// The host speaks matchit's brace grammar; route declarations use
/// `:name` / trailing `*`.
fn to_tree_route(url: &str) -> String {
    let last = url.split('/').count() - 1;
    let segments: Vec<String> = url
        .split('/')
        .enumerate()
        .map(|(index, segment)| {
            if index == last && segment == "*" {
                "{*rest}".to_owned()
            } else if let Some(name) = segment.strip_prefix(':') {
                format!("{{{name}}}")
            } else {
                segment.to_owned()
            }
        })
        .collect();
    segments.join("/")
}

// ── Request dispatch ─────────────────────────────────────────────────────────

async fn serve_request(
    host: Arc<Host>,
    hyper_req: hyper::Request<hyper::body::Incoming>,
) -> Result<http::Response<Full<Bytes>>, Infallible> {
    let Ok(method) = hyper_req.method().as_str().parse::<Method>() else {
        return Ok(status_only(StatusCode::NOT_IMPLEMENTED));
    };
    let path = hyper_req.uri().path().to_owned();
    let body = match hyper_req.into_body().collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(_) => return Ok(status_only(StatusCode::BAD_REQUEST)),
    };

    let mut req = Request::new(method, path);
    for (name, value) in parse_form(&body) {
        req = req.with_form_field(name, value);
    }
    req = req.with_body(body.to_vec());
    let mut reply = Reply::new();

    match host.lookup(method, req.path()) {
        Some((index, params)) => {
            req.set_params(params);
            let route = &host.routes[index];
            let hooks: Vec<Hook> = route
                .pre_validation
                .iter()
                .chain(&route.pre_handler)
                .cloned()
                .collect();
            match run_chain(&hooks, &mut req, &mut reply).await {
                HookOutcome::Fail(err) => return Ok(error_response(&err)),
                HookOutcome::ResponseAlreadySent => {}
                HookOutcome::Continue => {
                    if let Err(err) = route.handler.call(&mut req, &mut reply).await {
                        return Ok(error_response(&err));
                    }
                }
            }
        }
        None => {
            // Not-found fallback: give the tunnel a chance before 404ing.
            let fallback = [host.engine.hook()];
            match run_chain(&fallback, &mut req, &mut reply).await {
                HookOutcome::Fail(err) => return Ok(error_response(&err)),
                HookOutcome::ResponseAlreadySent => {}
                HookOutcome::Continue => {
                    reply.set_status(StatusCode::NOT_FOUND);
                    reply.send_json(br#"{"message":"Not Found"}"#.to_vec());
                }
            }
        }
    }

    Ok(into_wire(reply))
}

/// Deliberately naive form decoding: real hosts own body parsing and hand
/// the engine an already-parsed field. Enough for curl's default encoding.
fn parse_form(body: &[u8]) -> Vec<(String, String)> {
    let Ok(text) = std::str::from_utf8(body) else {
        return Vec::new();
    };
    text.split('&')
        .filter_map(|pair| pair.split_once('='))
        .map(|(name, value)| (name.to_owned(), value.to_owned()))
        .collect()
}

fn error_response(err: &swerve::HookError) -> http::Response<Full<Bytes>> {
    let status = err
        .downcast_ref::<swerve::Error>()
        .map(swerve::Error::status_code)
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = format!(r#"{{"message":"{err}"}}"#);
    http::Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .body(Full::new(Bytes::from(body)))
        .expect("well-formed error response")
}

fn status_only(status: StatusCode) -> http::Response<Full<Bytes>> {
    http::Response::builder()
        .status(status)
        .body(Full::new(Bytes::new()))
        .expect("well-formed empty response")
}

fn into_wire(reply: Reply) -> http::Response<Full<Bytes>> {
    let mut response = http::Response::builder().status(reply.status());
    for (name, value) in reply.headers() {
        response = response.header(name.as_str(), value.as_str());
    }
    response
        .body(Full::new(Bytes::copy_from_slice(reply.body())))
        .expect("well-formed reply")
}

// ── Handlers and hooks ───────────────────────────────────────────────────────

fn get_user<'a>(req: &'a mut Request, reply: &'a mut Reply) -> BoxFuture<'a> {
    Box::pin(async move {
        let id = req.param("id").unwrap_or("unknown");
        reply.send_json(format!(r#"{{"id":"{id}","name":"alice"}}"#).into_bytes());
        Ok(())
    })
}

fn create_user<'a>(req: &'a mut Request, reply: &'a mut Reply) -> BoxFuture<'a> {
    Box::pin(async move {
        if req.body().is_empty() {
            reply.set_status(StatusCode::BAD_REQUEST);
            reply.send_empty();
            return Ok(());
        }
        reply
            .set_status(StatusCode::CREATED)
            .header("location", "/users/99");
        reply.send_json(br#"{"id":"99"}"#.to_vec());
        Ok(())
    })
}

fn delete_user<'a>(req: &'a mut Request, reply: &'a mut Reply) -> BoxFuture<'a> {
    Box::pin(async move {
        info!(id = req.param("id").unwrap_or("unknown"), "deleting user");
        reply.set_status(StatusCode::NO_CONTENT);
        reply.send_empty();
        Ok(())
    })
}

fn patch_user<'a>(req: &'a mut Request, reply: &'a mut Reply) -> BoxFuture<'a> {
    Box::pin(async move {
        let id = req.param("id").unwrap_or("unknown");
        reply.send_json(format!(r#"{{"id":"{id}","updated":true}}"#).into_bytes());
        Ok(())
    })
}

fn put_file<'a>(req: &'a mut Request, reply: &'a mut Reply) -> BoxFuture<'a> {
    Box::pin(async move {
        let file = req.param("*").unwrap_or("unknown");
        reply.send_json(format!(r#"{{"stored":"{file}"}}"#).into_bytes());
        Ok(())
    })
}

// Signaled shape: synchronous work, explicit completion.
fn audit(req: &mut Request, _reply: &mut Reply, done: Done) {
    info!(method = %req.method(), path = %req.path(), "audit");
    done.ok();
}

// Awaitable shape: an auth gate that ends the request itself on failure,
// which stops the chain short of the handler.
fn require_token<'a>(req: &'a mut Request, reply: &'a mut Reply) -> BoxFuture<'a> {
    Box::pin(async move {
        if req.header("x-token").is_none() {
            reply.set_status(StatusCode::UNAUTHORIZED);
            reply.send_json(br#"{"message":"token required"}"#.to_vec());
        }
        Ok(())
    })
}

// ── Main ─────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let engine = MethodOverride::new();
    let mut host = Host {
        engine: engine.clone(),
        routes: Vec::new(),
        trees: HashMap::new(),
    };

    host.declare(RouteOptions::new(Method::Get, "/users/:id", get_user));
    host.declare(RouteOptions::new(Method::Post, "/users", create_user));
    host.declare(
        RouteOptions::new(Method::Delete, "/users/:id", delete_user)
            .pre_handler(Hook::signaled(audit)),
    );
    host.declare(
        RouteOptions::new(Method::Patch, "/users/:id", patch_user)
            .pre_validation(Hook::awaitable(require_token)),
    );
    host.declare(RouteOptions::new(Method::Put, "/files/*", put_file));

    let host = Arc::new(host);
    let addr: SocketAddr = "0.0.0.0:3000".parse().expect("valid socket address");
    let listener = TcpListener::bind(addr).await.expect("bind");
    info!(%addr, "demo host listening");

    loop {
        let (stream, remote) = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                error!("accept error: {e}");
                continue;
            }
        };
        let host = Arc::clone(&host);
        tokio::spawn(async move {
            let io = TokioIo::new(stream);
            let svc = service_fn(move |request| serve_request(Arc::clone(&host), request));
            if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                .serve_connection(io, svc)
                .await
            {
                error!(peer = %remote, "connection error: {e}");
            }
        });
    }
}
