#![allow(dead_code)]

use mockito::{Matcher, Mock, Server};
use std::fs::File;
use std::io::Write;
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tinify::{Client, Config};

pub const TEST_KEY: &str = "test-key-0000";
/// base64("api:test-key-0000")
pub const TEST_AUTHORIZATION: &str = "Basic YXBpOnRlc3Qta2V5LTAwMDA=";

pub const PNG_BYTES: &[u8] = &[
    0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, b'I', b'H', b'D', b'R',
];

/// Client pointed at the mock server, authenticated with `TEST_KEY`.
pub fn client_for(server: &Server) -> Client {
    let config = Config::new(TEST_KEY)
        .unwrap()
        .with_endpoint(server.url())
        .unwrap();
    Client::new(config)
}

/// Authenticated `POST /shrink` answered with 201 and `location`.
///
/// Not created yet, so callers can add body matchers first.
pub fn upload_mock(server: &mut Server, location: &str, compression_count: u64) -> Mock {
    server
        .mock("POST", "/shrink")
        .match_header("authorization", TEST_AUTHORIZATION)
        .with_status(201)
        .with_header("location", location)
        .with_header("compression-count", &compression_count.to_string())
        .with_header("content-type", "application/json")
        .with_body(r#"{"input":{"size":16,"type":"image/png"}}"#)
}

/// Authenticated `GET path` answered with a PNG payload.
pub fn image_mock(server: &mut Server, path: &str, data: &[u8], compression_count: u64) -> Mock {
    server
        .mock("GET", path)
        .match_header("authorization", TEST_AUTHORIZATION)
        .with_status(200)
        .with_header("content-type", "image/png")
        .with_header("compression-count", &compression_count.to_string())
        .with_header("image-width", "640")
        .with_header("image-height", "480")
        .with_body(data)
}

/// A JSON error body as the Tinify API sends it.
pub fn error_mock(
    server: &mut Server,
    method: &str,
    path: &str,
    status: usize,
    error: &str,
    message: &str,
) -> Mock {
    let body = serde_json::json!({ "error": error, "message": message }).to_string();
    server
        .mock(method, path)
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(body)
}

pub fn png_body() -> Matcher {
    Matcher::from(PNG_BYTES.to_vec())
}

/// An address nothing listens on.
pub fn closed_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

pub fn create_temp_directory() -> TempDir {
    TempDir::new().unwrap()
}

pub fn create_test_png(temp_dir: &Path) -> PathBuf {
    let path = temp_dir.join("input.png");
    File::create(&path).unwrap().write_all(PNG_BYTES).unwrap();
    path
}
