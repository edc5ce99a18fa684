//! Deterministic signature fingerprints.
//!
//! Provides [`SigHash`], a 64-bit hash identifying a member signature for
//! hiding and de-duplication decisions: a method in a derived type hides a
//! base method with the *same signature*, and a member reached through two
//! inheritance paths must collapse to one candidate. Fingerprints are
//! computed with XXHash64 plus domain-separation constants so that a method,
//! an indexer, and a plain named member never collide by accident.

use std::fmt;

use xxhash_rust::xxh64::xxh64;

use crate::symbol::RefKind;
use crate::TypeId;

/// Domain-separation mixing constants.
pub mod hash_constants {
    /// Fold constant for chaining parameter slots.
    pub const SEP: u64 = 0x9d5c3f82e4a16b07;

    /// Domain marker for method signatures.
    pub const METHOD: u64 = 0x6b1fd4c8a3970e25;

    /// Domain marker for indexer signatures.
    pub const INDEXER: u64 = 0xc47a90e16d2b5f38;

    /// Domain marker for non-method members (hide by name alone).
    pub const NAMED: u64 = 0x31e8b6059cf47da2;

    /// Per-position parameter mixing constants; positions beyond the table
    /// derive a marker from the first entry.
    pub const PARAM_MARKERS: [u64; 16] = [
        0xa1f68d03274c9be5,
        0x5d30e9b7c82f146a,
        0xe94b7a2856d1c3f0,
        0x127fc5d8093ae64b,
        0x86d24e9fb35a071c,
        0x4ba0f1673e8d25c9,
        0xd3581c4ea7062fb9,
        0x7e9263b0f54d18ac,
        0x0cf5a48d6192e37b,
        0xb87d0e25c4f3961a,
        0x693cf18b05d7a2e4,
        0xfa14b6d9832e05c7,
        0x2e87d30a6f41b95c,
        0x91c5623fda08e47b,
        0x3f0a8e51b96c72d4,
        0xc6291df4057b8ea3,
    ];
}

/// A deterministic 64-bit member-signature fingerprint.
///
/// Equal signatures produce equal hashes by construction; the registry
/// treats equal hashes within one compilation as equal signatures.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct SigHash(pub u64);

impl SigHash {
    /// Empty/absent signature.
    pub const EMPTY: SigHash = SigHash(0);

    /// Fingerprint of a method signature: name plus parameter types and
    /// ref-kinds in order. Return type is deliberately excluded; methods
    /// differing only by return type have the same signature.
    pub fn method(name: &str, params: &[(TypeId, RefKind)]) -> Self {
        Self::fold(hash_constants::METHOD ^ xxh64(name.as_bytes(), 0), params)
    }

    /// Fingerprint of an indexer signature: parameter list only, indexers
    /// have no name of their own.
    pub fn indexer(params: &[(TypeId, RefKind)]) -> Self {
        Self::fold(hash_constants::INDEXER, params)
    }

    /// Fingerprint for a member that hides by name alone (fields,
    /// properties, events, nested types).
    pub fn named(name: &str) -> Self {
        SigHash(hash_constants::NAMED ^ xxh64(name.as_bytes(), 0))
    }

    fn fold(seed: u64, params: &[(TypeId, RefKind)]) -> Self {
        let mut hash = seed;
        for (i, (ty, ref_kind)) in params.iter().enumerate() {
            let marker = hash_constants::PARAM_MARKERS
                .get(i)
                .copied()
                .unwrap_or_else(|| hash_constants::PARAM_MARKERS[0].wrapping_add(i as u64));
            let slot = ((ty.index() as u64) << 3) | *ref_kind as u64;
            // wrapping_mul keeps the fold non-commutative so order matters
            hash = hash.wrapping_mul(hash_constants::SEP).wrapping_add(marker ^ slot);
        }
        SigHash(hash)
    }
}

impl fmt::Debug for SigHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SigHash({:#018x})", self.0)
    }
}

impl fmt::Display for SigHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(i: u32) -> (TypeId, RefKind) {
        (TypeId::new(i), RefKind::Value)
    }

    #[test]
    fn same_signature_same_hash() {
        let a = SigHash::method("update", &[p(1), p(2)]);
        let b = SigHash::method("update", &[p(1), p(2)]);
        assert_eq!(a, b);
    }

    #[test]
    fn parameter_order_matters() {
        let a = SigHash::method("update", &[p(1), p(2)]);
        let b = SigHash::method("update", &[p(2), p(1)]);
        assert_ne!(a, b);
    }

    #[test]
    fn ref_kind_is_part_of_the_signature() {
        let by_value = SigHash::method("take", &[(TypeId::new(4), RefKind::Value)]);
        let by_ref = SigHash::method("take", &[(TypeId::new(4), RefKind::Ref)]);
        assert_ne!(by_value, by_ref);
    }

    #[test]
    fn domains_do_not_collide() {
        let method = SigHash::method("x", &[]);
        let named = SigHash::named("x");
        let indexer = SigHash::indexer(&[]);
        assert_ne!(method, named);
        assert_ne!(method, indexer);
        assert_ne!(named, indexer);
    }

    #[test]
    fn positions_past_the_marker_table_still_distinguish() {
        let long: Vec<_> = (0..20).map(p).collect();
        let mut reordered = long.clone();
        reordered.swap(17, 18);
        assert_ne!(
            SigHash::method("f", &long),
            SigHash::method("f", &reordered)
        );
    }
}
