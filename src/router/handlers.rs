//! Application handlers: echo, user-agent, and file upload/download.

use std::io::Write;
use std::sync::Arc;

use crate::files::{FileError, FileStore};
use crate::http::encoding::ContentCoding;
use crate::http::headers::HeaderMap;
use crate::http::request::{Method, Request};
use crate::http::response::{Response, StatusCode};
use crate::router::{Handler, Router, not_found};

pub const TEXT_PLAIN: &str = "text/plain";
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Builds the router for the file server.
///
/// More specific prefixes are registered before `/`, which matches every GET.
pub fn app_router(store: Arc<dyn FileStore>) -> Router {
    let mut router = Router::new();
    router
        .register(Method::GET, "/files", FilesGet { store: Arc::clone(&store) })
        .register(Method::POST, "/files", FilesPost { store })
        .register(Method::GET, "/user-agent", user_agent_get)
        .register(Method::GET, "/echo", echo_get)
        .register(Method::GET, "/", root_get);
    router
}

/// Starting headers for a response to `req`: the request's `Connection`
/// value is carried over so that `close` is echoed back.
pub fn response_headers(req: &Request) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if let Some(connection) = req.header("Connection") {
        headers.set("Connection", connection);
    }
    headers
}

pub fn root_get(req: &Request, out: &mut dyn Write) -> crate::Result<()> {
    if req.target != "/" {
        return not_found(req, out);
    }

    Response::builder(StatusCode::Ok)
        .headers(response_headers(req))
        .build()
        .write_to(out)
}

pub fn echo_get(req: &Request, out: &mut dyn Write) -> crate::Result<()> {
    let echo = req.target.strip_prefix("/echo/").unwrap_or_default();
    let mut headers = response_headers(req);
    headers.set("Content-Type", TEXT_PLAIN);

    let Some(coding) = ContentCoding::from_request(req) else {
        return Response::builder(StatusCode::Ok)
            .headers(headers)
            .body(echo)
            .build()
            .write_to(out);
    };

    match coding.encode(echo.as_bytes()) {
        Ok(encoded) => {
            headers.set("Content-Encoding", coding.as_str());
            Response::builder(StatusCode::Ok)
                .headers(headers)
                .body(encoded)
                .build()
                .write_to(out)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to encode echo body");
            Response::builder(StatusCode::InternalServerError)
                .headers(headers)
                .body(e.to_string())
                .build()
                .write_to(out)
        }
    }
}

pub fn user_agent_get(req: &Request, out: &mut dyn Write) -> crate::Result<()> {
    let user_agent = req.header("User-Agent").unwrap_or_default();
    let mut headers = response_headers(req);
    headers.set("Content-Type", TEXT_PLAIN);

    Response::builder(StatusCode::Ok)
        .headers(headers)
        .body(user_agent)
        .build()
        .write_to(out)
}

fn file_name(req: &Request) -> &str {
    req.target.strip_prefix("/files/").unwrap_or_default()
}

fn file_error(req: &Request, err: &FileError) -> Response {
    let mut headers = response_headers(req);
    headers.set("Content-Type", TEXT_PLAIN);

    Response::builder(StatusCode::InternalServerError)
        .headers(headers)
        .body(err.to_string())
        .build()
}

/// `GET /files/<name>`: serves a stored file.
pub struct FilesGet {
    pub store: Arc<dyn FileStore>,
}

impl Handler for FilesGet {
    fn handle(&self, req: &Request, out: &mut dyn Write) -> crate::Result<()> {
        let name = file_name(req);

        let response = match self.store.read(name) {
            Ok(bytes) => {
                let mut headers = response_headers(req);
                headers.set("Content-Type", OCTET_STREAM);
                Response::builder(StatusCode::Ok)
                    .headers(headers)
                    .body(bytes)
                    .build()
            }
            Err(FileError::NotFound(_)) => Response::builder(StatusCode::NotFound)
                .headers(response_headers(req))
                .build(),
            Err(e) => {
                tracing::error!(file = name, error = %e, "Failed to read file");
                file_error(req, &e)
            }
        };

        response.write_to(out)
    }
}

/// `POST /files/<name>`: stores the request body.
pub struct FilesPost {
    pub store: Arc<dyn FileStore>,
}

impl Handler for FilesPost {
    fn handle(&self, req: &Request, out: &mut dyn Write) -> crate::Result<()> {
        let name = file_name(req);

        let response = match self.store.write(name, &req.body) {
            Ok(()) => Response::builder(StatusCode::Created)
                .headers(response_headers(req))
                .build(),
            Err(e) => {
                tracing::error!(file = name, error = %e, "Failed to write file");
                file_error(req, &e)
            }
        };

        response.write_to(out)
    }
}
