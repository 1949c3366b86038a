//! Stable query digests (versioned).
//!
//! The CLI names encoded queries after their content so that encoding the same
//! algebra twice yields the same root IRI. We use a simple, deterministic,
//! non-cryptographic digest:
//!
//! - algorithm: **FNV-1a 64-bit**
//! - input: the compact JSON serialization of the [`Query`]
//! - output: `"fnv1a64:<16 lowercase hex digits>"`
//!
//! The JSON form is canonical because every model type serializes its fields
//! in declaration order and contains no maps.
//!
//! This digest is not a security primitive.

use crate::query::Query;

/// Prefix used in serialized digests.
pub const QUERY_DIGEST_V1_PREFIX: &str = "fnv1a64:";

/// FNV-1a 64-bit over arbitrary bytes, as `"fnv1a64:<hex>"`.
pub fn fnv1a64_digest_bytes(bytes: &[u8]) -> String {
    const FNV_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x00000100000001b3;

    let mut hash = FNV_OFFSET_BASIS;
    for b in bytes {
        hash ^= (*b) as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }

    format!("{QUERY_DIGEST_V1_PREFIX}{hash:016x}")
}

/// Digest of a query's canonical JSON form.
pub fn query_digest_v1(query: &Query) -> Result<String, serde_json::Error> {
    let bytes = serde_json::to_vec(query)?;
    Ok(fnv1a64_digest_bytes(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::{GraphPattern, TermPattern, TriplePattern};
    use crate::query::ProjectionItem;

    #[test]
    fn fnv1a64_known_vectors() {
        assert_eq!(fnv1a64_digest_bytes(b""), "fnv1a64:cbf29ce484222325");
        assert_eq!(fnv1a64_digest_bytes(b"a"), "fnv1a64:af63dc4c8601ec8c");
    }

    #[test]
    fn digest_tracks_structure() {
        let bgp = |o: &str| {
            GraphPattern::basic(vec![TriplePattern::new(
                TermPattern::var("s"),
                TermPattern::iri("http://e/p"),
                TermPattern::var(o),
            )])
        };
        let a = Query::select(Some(vec![ProjectionItem::var("s")]), bgp("o"));
        let b = Query::select(Some(vec![ProjectionItem::var("s")]), bgp("o"));
        let c = Query::select(Some(vec![ProjectionItem::var("s")]), bgp("x"));
        assert_eq!(query_digest_v1(&a).unwrap(), query_digest_v1(&b).unwrap());
        assert_ne!(query_digest_v1(&a).unwrap(), query_digest_v1(&c).unwrap());
        assert!(query_digest_v1(&a).unwrap().starts_with(QUERY_DIGEST_V1_PREFIX));
    }
}
