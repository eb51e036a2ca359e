//! Route table.
//!
//! The table is fixed: the cache descriptor, then narinfo lookups, then
//! everything else. First match wins. Only `GET` is routed; any other method
//! falls through to the generic 404.

use axum::http::Method;

use crate::routing::matcher::{ExactPath, Matcher, PathSuffix};

/// Path of the cache descriptor.
pub const CACHE_INFO_PATH: &str = "/nix-cache-info";

/// Suffix of per-object metadata lookups.
pub const NARINFO_SUFFIX: &str = ".narinfo";

/// The response policy chosen for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// `/nix-cache-info`: 200 with the store descriptor.
    CacheInfo,
    /// `*.narinfo`: 404, the cache is always empty.
    Narinfo,
    /// Anything else: 404.
    NotFound,
}

impl Route {
    pub fn name(&self) -> &'static str {
        match self {
            Route::CacheInfo => "cache-info",
            Route::Narinfo => "narinfo",
            Route::NotFound => "not-found",
        }
    }
}

static CACHE_INFO: ExactPath = ExactPath::new(CACHE_INFO_PATH);
static NARINFO: PathSuffix = PathSuffix::new(NARINFO_SUFFIX);

/// Ordered route table.
fn table() -> [(&'static dyn Matcher, Route); 2] {
    [(&CACHE_INFO, Route::CacheInfo), (&NARINFO, Route::Narinfo)]
}

/// Resolve a request to its route.
pub fn resolve(method: &Method, target: &str) -> Route {
    if *method != Method::GET {
        return Route::NotFound;
    }
    table()
        .into_iter()
        .find(|(matcher, _)| matcher.matches(target))
        .map(|(_, route)| route)
        .unwrap_or(Route::NotFound)
}
