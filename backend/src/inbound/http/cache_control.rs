//! Cache headers shared by HTTP handlers.

use crate::domain::ports::CacheStatus;

/// Per-user responses must not be stored by shared or browser caches.
pub const PRIVATE_NO_STORE: &str = "private, no-store";

/// Header reporting whether the progress cache answered a read.
pub const X_CACHE: &str = "X-Cache";

/// Build the standard cache-control header tuple for per-user responses.
pub const fn private_no_store_header() -> (&'static str, &'static str) {
    ("Cache-Control", PRIVATE_NO_STORE)
}

/// Build the `X-Cache: HIT|MISS` header tuple.
pub const fn x_cache_header(status: CacheStatus) -> (&'static str, &'static str) {
    let value = match status {
        CacheStatus::Hit => "HIT",
        CacheStatus::Miss => "MISS",
    };
    (X_CACHE, value)
}
