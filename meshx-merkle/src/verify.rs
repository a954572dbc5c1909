//! Proof verification.
//!
//! Pure functions, no tree required. A verifier needs only the leaf hash,
//! the sibling list and the expected root; the fold below is the whole
//! algorithm and is what an on-chain or third-party verifier reimplements.

use crate::{
    Hash, Result,
    hash::{combine_sorted, parse_hash},
};

/// Recompute the root implied by `leaf` and its sibling path.
pub fn compute_root(leaf: &Hash, siblings: &[Hash]) -> Hash {
    siblings
        .iter()
        .fold(*leaf, |node, sibling| combine_sorted(&node, sibling))
}

/// Check that `leaf` with `siblings` folds to `root`.
///
/// An empty sibling list verifies exactly when `leaf == root`.
pub fn verify_proof(leaf: &Hash, siblings: &[Hash], root: &Hash) -> bool {
    compute_root(leaf, siblings) == *root
}

/// [`verify_proof`] over hex-encoded inputs.
///
/// Malformed hex is an error; a well-formed proof that does not match is
/// `Ok(false)`.
pub fn verify_hex_proof<S: AsRef<str>>(leaf: &str, siblings: &[S], root: &str) -> Result<bool> {
    let leaf = parse_hash(leaf)?;
    let root = parse_hash(root)?;
    let siblings = siblings
        .iter()
        .map(|s| parse_hash(s.as_ref()))
        .collect::<Result<Vec<_>>>()?;
    Ok(verify_proof(&leaf, &siblings, &root))
}
