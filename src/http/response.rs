//! Fixed response builders.
//!
//! Every response is fully buffered, carries an explicit `Content-Length`
//! equal to the body's byte length, and asks the client to close the
//! connection.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use axum::{
    body::{Body, Bytes},
    http::{header, HeaderValue, StatusCode},
    response::Response,
};

/// Environment variable that relocates the advertised store.
pub const TEST_ROOT_VAR: &str = "TEST_ROOT";

/// Store directory advertised when `TEST_ROOT` is not set.
pub const DEFAULT_STORE_DIR: &str = "/nix/store";

/// `<test_root>/store` when a non-empty root is given, `/nix/store` otherwise.
pub fn store_dir(test_root: Option<&OsStr>) -> PathBuf {
    match test_root {
        Some(root) if !root.is_empty() => Path::new(root).join("store"),
        _ => PathBuf::from(DEFAULT_STORE_DIR),
    }
}

/// Resolve the store directory from the process environment.
pub fn store_dir_from_env() -> PathBuf {
    store_dir(std::env::var_os(TEST_ROOT_VAR).as_deref())
}

/// Body of `/nix-cache-info`.
pub fn cache_info_body(store_dir: &Path) -> String {
    format!(
        "StoreDir: {}\nWantMassQuery: 1\nPriority: 30\n",
        store_dir.display()
    )
}

fn fixed(status: StatusCode, content_type: Option<&'static str>, body: Bytes) -> Response {
    let length = body.len();
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;

    let headers = response.headers_mut();
    if let Some(content_type) = content_type {
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    }
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(length));
    headers.insert(header::CONNECTION, HeaderValue::from_static("close"));
    response
}

/// 200 with the cache descriptor.
pub fn cache_info(store_dir: &Path) -> Response {
    fixed(
        StatusCode::OK,
        Some("text/plain"),
        Bytes::from(cache_info_body(store_dir)),
    )
}

/// 404 with an empty body.
pub fn not_found() -> Response {
    fixed(StatusCode::NOT_FOUND, None, Bytes::new())
}

/// 403 with a human-readable reason.
pub fn forbidden(reason: &str) -> Response {
    fixed(
        StatusCode::FORBIDDEN,
        Some("text/plain"),
        Bytes::copy_from_slice(reason.as_bytes()),
    )
}
