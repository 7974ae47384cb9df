//! Content-hashed output names.
//!
//! Shipped files are renamed to `<name>_<xxh3 of content>` so that a browser
//! cache never serves a stale copy. The hash only depends on the bytes, which
//! keeps repeated builds of unchanged content byte-identical.

use xxhash_rust::xxh3::xxh3_64;

/// `img/hero` + content → `img/hero_<16 hex digits>`
pub fn hashed_asset_name(name: &str, content: &[u8]) -> String {
    format!("{}_{:016x}", name, xxh3_64(content))
}
