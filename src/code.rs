//! Audio code derivation.
//!
//! An audio code is the first 10 hex characters of the MD5 digest of the
//! upstream URL. The same URL always yields the same code, across calls and
//! across process restarts.

/// Number of hex characters kept from the digest (40 bits).
pub const CODE_LEN: usize = 10;

/// Derive the opaque code for an upstream URL.
pub fn derive_code(url: &str) -> String {
    let digest = md5::compute(url.as_bytes());
    let mut hex = format!("{digest:x}");
    hex.truncate(CODE_LEN);
    hex
}
