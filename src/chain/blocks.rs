//! [`BlockArray`]: the allocated representation backing a [`super::Chain`]
//! once it has grown past short-data mode — a small-vector of
//! [`SharedBlock`]s plus a parallel prefix-offset table.

use smallvec::SmallVec;

use crate::block::SharedBlock;

use super::Locator;

/// Inline capacity before the block array spills to the heap. Mirrors the
/// "here" form described for the slot array: most chains built by a single
/// append/prepend never need more than a couple of blocks.
const INLINE_BLOCKS: usize = 2;

/// The allocated (non-short-data) representation of a [`super::Chain`]:
/// an ordered list of blocks plus, for each block, the cumulative byte
/// offset of everything before it. Offset `i` is stored for every block
/// (including the trivial `0` for the first), which is a simpler
/// representation than the strictly-necessary "skip the last entry"
/// scheme and costs one redundant `usize` per chain.
#[derive(Default)]
pub(super) struct BlockArray {
    blocks: SmallVec<[SharedBlock; INLINE_BLOCKS]>,
    offsets: SmallVec<[usize; INLINE_BLOCKS]>,
}

impl BlockArray {
    pub(super) fn len(&self) -> usize {
        self.blocks.len()
    }

    pub(super) fn iter(&self) -> impl Iterator<Item = &SharedBlock> {
        self.blocks.iter()
    }

    pub(super) fn first(&self) -> Option<&SharedBlock> {
        self.blocks.first()
    }

    pub(super) fn first_mut(&mut self) -> Option<&mut SharedBlock> {
        self.blocks.first_mut()
    }

    pub(super) fn last(&self) -> Option<&SharedBlock> {
        self.blocks.last()
    }

    pub(super) fn last_mut(&mut self) -> Option<&mut SharedBlock> {
        self.blocks.last_mut()
    }

    pub(super) fn at(&self, index: usize) -> &SharedBlock {
        &self.blocks[index]
    }

    /// Appends a block, recording its start offset as the current total.
    pub(super) fn push_back(&mut self, block: SharedBlock, total_size_before: usize) {
        self.offsets.push(total_size_before);
        self.blocks.push(block);
    }

    /// Replaces the last block in place (used by rewrite/merge-in-place
    /// paths); its start offset is unchanged.
    pub(super) fn replace_last(&mut self, block: SharedBlock) {
        *self.blocks.last_mut().expect("replace_last on empty array") = block;
    }

    pub(super) fn pop_back(&mut self) -> Option<SharedBlock> {
        self.offsets.pop();
        self.blocks.pop()
    }

    /// Prepends a block. Every existing offset shifts forward by the new
    /// block's size, and the new block's own offset is 0.
    pub(super) fn push_front(&mut self, block: SharedBlock) {
        let size = block.size();
        for offset in self.offsets.iter_mut() {
            *offset += size;
        }
        self.offsets.insert(0, 0);
        self.blocks.insert(0, block);
    }

    /// Called after the first block's live window shrinks in place
    /// (`trim_prefix`) without being replaced: every later block's stored
    /// offset is relative to the first block's start, which hasn't moved,
    /// but the bytes between them have, so later offsets shift down by
    /// `removed`.
    pub(super) fn shrink_first_in_place(&mut self, removed: usize) {
        for offset in self.offsets.iter_mut().skip(1) {
            *offset -= removed;
        }
    }

    pub(super) fn replace_first(&mut self, block: SharedBlock) {
        let old_size = self.blocks.first().map(SharedBlock::size).unwrap_or(0);
        let new_size = block.size();
        if new_size != old_size {
            let delta = new_size as isize - old_size as isize;
            for offset in self.offsets.iter_mut().skip(1) {
                *offset = (*offset as isize + delta) as usize;
            }
        }
        self.blocks[0] = block;
    }

    /// Replaces the first two blocks with a single `merged` block covering
    /// both. `merged`'s start offset is the same as the old first block's
    /// (the bytes before it haven't moved); every later offset is
    /// unaffected since the total size of the two replaced blocks is
    /// unchanged.
    pub(super) fn merge_first_two(&mut self, merged: SharedBlock) {
        debug_assert!(self.blocks.len() >= 2);
        self.blocks.remove(1);
        self.offsets.remove(1);
        self.blocks[0] = merged;
    }

    /// Replaces the last two blocks with a single `merged` block; symmetric
    /// to [`BlockArray::merge_first_two`].
    pub(super) fn merge_last_two(&mut self, merged: SharedBlock) {
        debug_assert!(self.blocks.len() >= 2);
        self.blocks.pop();
        self.offsets.pop();
        let last = self.blocks.len() - 1;
        self.blocks[last] = merged;
    }

    pub(super) fn pop_front(&mut self) -> Option<SharedBlock> {
        if self.blocks.is_empty() {
            return None;
        }
        let removed = self.blocks.remove(0);
        let removed_size = removed.size();
        self.offsets.remove(0);
        for offset in self.offsets.iter_mut() {
            *offset -= removed_size;
        }
        Some(removed)
    }

    /// Locates the block containing logical byte `index` and the
    /// intra-block offset within it, via binary search (`upper_bound`) over
    /// the offset table.
    pub(super) fn block_and_char(&self, index: usize, total_size: usize) -> Locator<'_> {
        if index >= total_size {
            return Locator::Eof;
        }
        let slot = self.offsets.partition_point(|&offset| offset <= index).saturating_sub(1);
        Locator::Block(&self.blocks[slot], index - self.offsets[slot])
    }
}
