//! Request target matching.
//!
//! # Responsibilities
//! - Match the request target exactly
//! - Match the request target by suffix
//!
//! # Design Decisions
//! - Matching is case-sensitive and byte-wise
//! - Matchers see the raw request target (path plus any query string)
//! - No regex to guarantee O(n) matching

/// Trait for matching a request target against a condition.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the target matches this condition.
    fn matches(&self, target: &str) -> bool;
}

/// Matches one target exactly.
#[derive(Debug, Clone)]
pub struct ExactPath {
    path: &'static str,
}

impl ExactPath {
    pub const fn new(path: &'static str) -> Self {
        Self { path }
    }
}

impl Matcher for ExactPath {
    fn matches(&self, target: &str) -> bool {
        target == self.path
    }
}

/// Matches any target ending in a fixed suffix.
#[derive(Debug, Clone)]
pub struct PathSuffix {
    suffix: &'static str,
}

impl PathSuffix {
    pub const fn new(suffix: &'static str) -> Self {
        Self { suffix }
    }
}

impl Matcher for PathSuffix {
    fn matches(&self, target: &str) -> bool {
        target.ends_with(self.suffix)
    }
}
