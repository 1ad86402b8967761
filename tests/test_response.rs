use std::io::{self, Write};

use courier::Error;
use courier::http::headers::HeaderMap;
use courier::http::response::{Response, ResponseBuilder, StatusCode};
use courier::http::writer::{serialize_response, write_response};

fn text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

#[test]
fn test_status_code_as_u16() {
    assert_eq!(StatusCode::Ok.as_u16(), 200);
    assert_eq!(StatusCode::Created.as_u16(), 201);
    assert_eq!(StatusCode::NoContent.as_u16(), 204);
    assert_eq!(StatusCode::BadRequest.as_u16(), 400);
    assert_eq!(StatusCode::NotFound.as_u16(), 404);
    assert_eq!(StatusCode::MethodNotAllowed.as_u16(), 405);
    assert_eq!(StatusCode::InternalServerError.as_u16(), 500);
}

#[test]
fn test_status_code_reason_phrase() {
    assert_eq!(StatusCode::Ok.reason_phrase(), "OK");
    assert_eq!(StatusCode::Created.reason_phrase(), "Created");
    assert_eq!(StatusCode::NotFound.reason_phrase(), "Not Found");
    assert_eq!(StatusCode::PayloadTooLarge.reason_phrase(), "Payload Too Large");
    assert_eq!(
        StatusCode::InternalServerError.reason_phrase(),
        "Internal Server Error"
    );
}

#[test]
fn test_status_code_from_u16() {
    for code in [200, 201, 204, 400, 404, 405, 408, 413, 500, 501, 502, 503, 504] {
        assert_eq!(StatusCode::from_u16(code).unwrap().as_u16(), code);
    }
    assert_eq!(StatusCode::from_u16(299), None);
}

#[test]
fn test_response_builder_with_headers() {
    let response = ResponseBuilder::new(StatusCode::Ok)
        .header("content-type", "text/plain")
        .header("X-Custom", "value")
        .body(b"test".to_vec())
        .build();

    assert_eq!(response.headers.get("Content-Type").unwrap(), "text/plain");
    assert_eq!(response.headers.get("X-Custom").unwrap(), "value");
    assert_eq!(response.body, b"test".to_vec());
}

#[test]
fn test_response_helpers() {
    assert_eq!(Response::ok("hi").body, b"hi".to_vec());
    assert!(Response::not_found().body.is_empty());

    let err = Response::internal_error("disk on fire");
    assert_eq!(err.status, StatusCode::InternalServerError);
    assert_eq!(err.headers.get("Content-Type"), Some("text/plain"));
    assert_eq!(err.body, b"disk on fire".to_vec());
}

#[test]
fn test_serialize_without_body_has_no_content_length() {
    let bytes = serialize_response(StatusCode::Ok, None, b"");

    assert_eq!(text(&bytes), "HTTP/1.1 200 OK\r\nConnection: keep-alive\r\n");
}

#[test]
fn test_serialize_with_body() {
    let headers: HeaderMap = [("Content-Type", "text/plain")].into_iter().collect();
    let bytes = serialize_response(StatusCode::Ok, Some(headers), b"abc");

    assert_eq!(
        text(&bytes),
        "HTTP/1.1 200 OK\r\n\
         Content-Type: text/plain\r\n\
         Connection: keep-alive\r\n\
         Content-Length: 3\r\n\r\nabc"
    );
}

#[test]
fn test_serialize_keeps_explicit_connection() {
    let headers: HeaderMap = [("connection", "close")].into_iter().collect();
    let out = text(&serialize_response(StatusCode::NotFound, Some(headers), b""));

    assert_eq!(out, "HTTP/1.1 404 Not Found\r\nConnection: close\r\n");
}

#[test]
fn test_serialize_replaces_caller_content_length() {
    let headers: HeaderMap = [("Content-Length", "999")].into_iter().collect();
    let out = text(&serialize_response(StatusCode::Ok, Some(headers.clone()), b"four"));

    assert!(out.contains("Content-Length: 4\r\n"));
    assert!(!out.contains("999"));

    let empty = text(&serialize_response(StatusCode::Ok, Some(headers), b""));
    assert!(!empty.contains("Content-Length"));
}

#[test]
fn test_serialize_binary_body_length_in_bytes() {
    let body = "héllo".as_bytes();
    let out = serialize_response(StatusCode::Ok, None, body);

    assert!(text(&out).contains("Content-Length: 6\r\n"));
    assert!(out.ends_with(body));
}

#[test]
fn test_write_response_to_buffer() {
    let mut out = Vec::new();
    Response::ok("hello").write_to(&mut out).unwrap();

    assert_eq!(
        text(&out),
        "HTTP/1.1 200 OK\r\nConnection: keep-alive\r\nContent-Length: 5\r\n\r\nhello"
    );
}

struct BrokenPipe;

impl Write for BrokenPipe {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "peer went away"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_write_failure_is_wrapped() {
    let err = write_response(&mut BrokenPipe, StatusCode::Ok, None, b"x").unwrap_err();

    assert!(matches!(&err, Error::Write(e) if e.kind() == io::ErrorKind::BrokenPipe));
    assert!(err.to_string().starts_with("failed to write response"));
}
