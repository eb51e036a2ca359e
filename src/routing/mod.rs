//! Request routing subsystem.
//!
//! # Data Flow
//! ```text
//! Request target
//!     → router.rs (ordered table, first match wins)
//!     → matcher.rs (exact / suffix conditions)
//!     → Route (CacheInfo | Narinfo | NotFound)
//! ```

pub mod matcher;
pub mod router;

pub use router::{resolve, Route, CACHE_INFO_PATH, NARINFO_SUFFIX};
