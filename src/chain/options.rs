//! [`Options`], the tunable block-sizing policy threaded through every
//! [`super::Chain`] append/prepend.

use crate::block::{DEFAULT_MAX_BLOCK_SIZE, DEFAULT_MIN_BLOCK_SIZE};

/// Tunable block-sizing policy for a single append/prepend/append_buffer
/// call. A default-constructed `Options` reproduces the block's own
/// defaults; callers doing many small appends with a known final size
/// should set `size_hint` to avoid over-allocating the last block.
#[derive(Clone, Copy, Debug)]
pub struct Options {
    size_hint: Option<usize>,
    min_block_size: usize,
    max_block_size: usize,
}

impl Options {
    /// Default-sized options: no size hint, standard min/max block size.
    pub const fn new() -> Self {
        Options {
            size_hint: None,
            min_block_size: DEFAULT_MIN_BLOCK_SIZE,
            max_block_size: DEFAULT_MAX_BLOCK_SIZE,
        }
    }

    /// Sets the caller's estimate of the chain's final size, clamping
    /// freshly allocated blocks so that a single block can hold the
    /// remaining expected bytes (up to `max_block_size`).
    pub fn with_size_hint(mut self, hint: usize) -> Self {
        self.size_hint = Some(hint);
        self
    }

    /// Sets the new-block floor: blocks smaller than this are `tiny` and
    /// get merged with a neighbor rather than left to accumulate.
    pub fn with_min_block_size(mut self, min_block_size: usize) -> Self {
        self.min_block_size = min_block_size;
        self
    }

    /// Sets the new-block ceiling: appends beyond this allocate additional
    /// blocks instead of growing one block further.
    pub fn with_max_block_size(mut self, max_block_size: usize) -> Self {
        self.max_block_size = max_block_size;
        self
    }

    pub(crate) fn size_hint(&self) -> Option<usize> {
        self.size_hint
    }

    pub(crate) fn min_block_size(&self) -> usize {
        self.min_block_size
    }

    pub(crate) fn max_block_size(&self) -> usize {
        self.max_block_size
    }
}

impl Default for Options {
    fn default() -> Self {
        Self::new()
    }
}
