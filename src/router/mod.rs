//! Ordered prefix routing.
//!
//! Routes are checked in registration order and the first rule whose method
//! equals the request method and whose prefix starts the request target wins.
//! There is no longest-prefix fallback: a rule for `/api/specific` must be
//! registered before a rule for `/api` or it will never be reached.
//!
//! A [`Router`] is built once at startup and then shared read-only between
//! connections behind an `Arc`.

pub mod handlers;

use std::io::Write;
use std::sync::Arc;

use crate::http::request::{Method, Request};
use crate::http::response::Response;

/// Something that answers a request by writing a response to `out`.
pub trait Handler: Send + Sync + 'static {
    fn handle(&self, req: &Request, out: &mut dyn Write) -> crate::Result<()>;
}

impl<F> Handler for F
where
    F: Fn(&Request, &mut dyn Write) -> crate::Result<()> + Send + Sync + 'static,
{
    fn handle(&self, req: &Request, out: &mut dyn Write) -> crate::Result<()> {
        self(req, out)
    }
}

#[derive(Clone)]
pub struct Route {
    pub method: Method,
    pub prefix: String,
    handler: Arc<dyn Handler>,
}

impl Route {
    pub fn matches(&self, req: &Request) -> bool {
        req.method == self.method && req.target.starts_with(&self.prefix)
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

pub struct Router {
    routes: Vec<Route>,
    not_found: Arc<dyn Handler>,
}

impl Router {
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            not_found: Arc::new(not_found),
        }
    }

    /// Appends a rule. Duplicates are kept; only the first can ever match.
    pub fn register(
        &mut self,
        method: Method,
        prefix: impl Into<String>,
        handler: impl Handler,
    ) -> &mut Self {
        self.routes.push(Route {
            method,
            prefix: prefix.into(),
            handler: Arc::new(handler),
        });
        self
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// The rule that would handle `req`, if any.
    pub fn find(&self, req: &Request) -> Option<&Route> {
        self.routes.iter().find(|r| r.matches(req))
    }

    /// Dispatches `req` to the first matching handler, or the not-found
    /// handler on a miss, and returns the handler's result.
    pub fn route(&self, req: &Request, out: &mut dyn Write) -> crate::Result<()> {
        match self.find(req) {
            Some(route) => {
                tracing::debug!(method = %route.method, prefix = %route.prefix, "Matched route");
                route.handler.handle(req, out)
            }
            None => {
                tracing::debug!(method = %req.method, target = %req.target, "No route matched");
                self.not_found.handle(req, out)
            }
        }
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

/// Fallback handler: 404 with no body.
pub fn not_found(_req: &Request, out: &mut dyn Write) -> crate::Result<()> {
    Response::not_found().write_to(out)
}
