//! Content fingerprints for input windows.
//!
//! A window is rendered as a canonical JSON matrix and folded through a
//! 32-bit rolling hash, then printed in base-36. The result is a short cache
//! address, not a digest: two distinct windows may collide, in which case the
//! cache hands back the other window's (structurally valid) response. That is
//! a known limitation of the key scheme.
//!
//! Author: kelexine (<https://github.com/kelexine>)

use std::fmt::{self, Write};

/// Magnitudes outside `[EXP_LOWER, EXP_UPPER)` are printed in exponent form.
const EXP_LOWER: f64 = 1e-6;
const EXP_UPPER: f64 = 1e21;

/// Short, deterministic address derived from a window's contents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Namespaced address of an entry in the storage medium.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(prefix: &str, fingerprint: &Fingerprint) -> Self {
        Self(format!("{}{}", prefix, fingerprint.as_str()))
    }

    /// Recover the fingerprint from a raw key, if it belongs to `prefix`.
    pub fn parse(prefix: &str, raw: &str) -> Option<Fingerprint> {
        raw.strip_prefix(prefix)
            .filter(|fp| !fp.is_empty())
            .map(|fp| Fingerprint(fp.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fingerprint an input window (rows of feature values, in order).
pub fn fingerprint<R: AsRef<[f64]>>(window: &[R]) -> Fingerprint {
    let canonical = canonical_window(window);
    Fingerprint(to_base36(rolling_hash(&canonical)))
}

/// Render a window as a compact JSON matrix, e.g. `[[1,0.5],[2,-3]]`.
pub fn canonical_window<R: AsRef<[f64]>>(window: &[R]) -> String {
    let mut out = String::with_capacity(window.len() * 16 + 2);
    out.push('[');
    for (i, row) in window.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push('[');
        for (j, value) in row.as_ref().iter().enumerate() {
            if j > 0 {
                out.push(',');
            }
            push_number(&mut out, *value);
        }
        out.push(']');
    }
    out.push(']');
    out
}

fn push_number(out: &mut String, value: f64) {
    if !value.is_finite() {
        // JSON has no representation for NaN or infinities
        out.push_str("null");
    } else if value == 0.0 {
        // -0 serializes as 0
        out.push('0');
    } else if value.abs() < EXP_LOWER || value.abs() >= EXP_UPPER {
        push_exponent(out, value);
    } else {
        // Shortest round-trip digits, no trailing ".0" on integral values
        let _ = write!(out, "{}", value);
    }
}

/// Exponent form with an explicit sign on the exponent: `1e-7`, `1.5e+21`.
fn push_exponent(out: &mut String, value: f64) {
    let formatted = format!("{:e}", value);
    match formatted.split_once('e') {
        Some((mantissa, exp)) if !exp.starts_with('-') => {
            let _ = write!(out, "{}e+{}", mantissa, exp);
        }
        _ => out.push_str(&formatted),
    }
}

/// `h = (h << 5) - h + c` over UTF-16 code units, wrapped to i32.
fn rolling_hash(s: &str) -> i32 {
    s.encode_utf16().fold(0i32, |h, c| {
        h.wrapping_shl(5).wrapping_sub(h).wrapping_add(i32::from(c))
    })
}

fn to_base36(hash: i32) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    let mut n = i64::from(hash).unsigned_abs();
    if n == 0 {
        return "0".to_string();
    }
    let mut buf = Vec::with_capacity(7);
    while n > 0 {
        buf.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    buf.reverse();
    String::from_utf8(buf).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_window_formats_like_json() {
        let window = vec![vec![1.0, 0.5], vec![-2.0, 0.1]];
        assert_eq!(canonical_window(&window), "[[1,0.5],[-2,0.1]]");
    }

    #[test]
    fn test_canonical_window_edge_values() {
        let window = vec![vec![-0.0, f64::NAN, f64::INFINITY, 1e20]];
        assert_eq!(
            canonical_window(&window),
            "[[0,null,null,100000000000000000000]]"
        );
        assert_eq!(canonical_window(&[vec![0.000001, 1e-7]]), "[[0.000001,1e-7]]");
        assert_eq!(canonical_window(&[vec![-1.5e-7, 1e21, 2.5e22]]), "[[-1.5e-7,1e+21,2.5e+22]]");
        assert_eq!(canonical_window::<Vec<f64>>(&[]), "[]");
        assert_eq!(canonical_window(&[Vec::<f64>::new()]), "[[]]");
    }

    #[test]
    fn test_rolling_hash_known_values() {
        assert_eq!(rolling_hash(""), 0);
        // 'a' = 97
        assert_eq!(rolling_hash("a"), 97);
        // 97 * 31 + 98
        assert_eq!(rolling_hash("ab"), 3105);
        // wraps instead of overflowing
        let long = "z".repeat(64);
        let _ = rolling_hash(&long);
    }

    #[test]
    fn test_base36_rendering() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(-36), "10");
        // |i32::MIN| does not fit in i32
        assert_eq!(to_base36(i32::MIN), "zik0zk");
    }

    #[test]
    fn test_empty_window_fingerprint() {
        // "[]" = 91, 93 -> 91 * 31 + 93 = 2914
        assert_eq!(fingerprint::<Vec<f64>>(&[]).as_str(), to_base36(2914));
    }

    #[test]
    fn test_fingerprint_is_order_sensitive() {
        let a = fingerprint(&[vec![1.0, 2.0], vec![3.0, 4.0]]);
        let b = fingerprint(&[vec![3.0, 4.0], vec![1.0, 2.0]]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_fingerprint_is_precision_sensitive() {
        let a = fingerprint(&[vec![0.1]]);
        let b = fingerprint(&[vec![0.10000000000000002]]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_cache_key_bijection() {
        let fp = fingerprint(&[vec![1.0]]);
        let key = CacheKey::new("ns_", &fp);
        assert_eq!(key.as_str(), format!("ns_{}", fp));
        assert_eq!(CacheKey::parse("ns_", key.as_str()), Some(fp));
        assert_eq!(CacheKey::parse("other_", key.as_str()), None);
        assert_eq!(CacheKey::parse("ns_", "ns_"), None);
    }
}
