//! A minimal stand-in for an `absl::Cord`-style flat rope, sufficient to
//! exercise the bridging contract the real data model expects from a rope
//! type: construction from N flat fragments, a shared external block for
//! each large fragment, and a merged internal block for small/tiny ones.

use alloc::boxed::Box;

use crate::block::SharedBlock;

use super::Chain;

/// A single flat fragment of a rope being bridged into a [`Chain`].
///
/// Large fragments become a shared external block (no byte copy); small
/// fragments are copied into the chain's normal merge/rewrite path so they
/// don't leave behind a trail of tiny blocks.
pub enum RopeFragment {
    Flat(Box<[u8]>),
}

impl RopeFragment {
    /// Wraps an owned byte buffer as a single flat fragment.
    pub fn new(bytes: Box<[u8]>) -> Self {
        RopeFragment::Flat(bytes)
    }
}

/// Fragments at or above this size are attached as their own external
/// block; smaller ones are copied in so they can still merge with a tiny
/// neighbor.
const LARGE_FRAGMENT_THRESHOLD: usize = crate::block::DEFAULT_MIN_BLOCK_SIZE;

pub(super) fn append_fragment(chain: &mut Chain, fragment: RopeFragment) {
    match fragment {
        RopeFragment::Flat(bytes) if bytes.len() >= LARGE_FRAGMENT_THRESHOLD => {
            chain.append_block(SharedBlock::from_owned_bytes(bytes));
        }
        RopeFragment::Flat(bytes) => {
            chain.append(&bytes);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn large_fragment_becomes_external_block() {
        let bytes: Vec<u8> = alloc::vec![7u8; LARGE_FRAGMENT_THRESHOLD * 2];
        let fragments = alloc::vec![RopeFragment::new(Box::from(bytes.as_slice()))];
        let chain = Chain::from_fragments(fragments);
        assert_eq!(chain.size(), LARGE_FRAGMENT_THRESHOLD * 2);
        assert_eq!(chain.to_vec(), bytes);
    }

    #[test]
    fn small_fragments_merge_together() {
        let fragments = alloc::vec![
            RopeFragment::new(Box::from(&b"ab"[..])),
            RopeFragment::new(Box::from(&b"cd"[..])),
            RopeFragment::new(Box::from(&b"ef"[..])),
        ];
        let chain = Chain::from_fragments(fragments);
        assert_eq!(chain.to_vec(), b"abcdef");
    }
}
