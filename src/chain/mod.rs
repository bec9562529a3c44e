//! [`Chain`], a segmented byte buffer: an ordered sequence of
//! [`crate::block::SharedBlock`]s presenting one logical byte string, with
//! O(1) amortized append/prepend, cheap substring removal, and a
//! small-buffer optimization for short payloads.
//!
//! The merge/rewrite policy applied at every append/prepend boundary lives
//! in [`merge`]; the allocated (non-short-data) block-array representation
//! lives in [`blocks`]. This module assembles both into the public `Chain`
//! API.

mod blocks;
mod merge;
mod options;
mod rope;

pub use options::Options;
pub use rope::RopeFragment;

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::cmp::Ordering;

use crate::block::SharedBlock;
use blocks::BlockArray;

/// Payloads at or below this size live inline in the `Chain` value itself,
/// with no block allocated at all. Exact equality stays inline; only sizes
/// strictly greater promote to the block-array representation.
pub const MAX_SHORT_DATA_SIZE: usize = 15;

/// Where a logical byte index resolves to: inline short data, a specific
/// block and intra-block offset, or past the end of the chain.
pub enum Locator<'a> {
    /// `index` falls within the inline short-data buffer, at byte offset
    /// `.1` of slice `.0`.
    Short(&'a [u8], usize),
    /// `index` falls within `.0`, at intra-block offset `.1`.
    Block(&'a SharedBlock, usize),
    /// `index == size`: one past the last byte.
    Eof,
}

#[derive(Clone, Copy)]
struct ShortData {
    buf: [u8; MAX_SHORT_DATA_SIZE],
    len: u8,
}

impl Default for ShortData {
    fn default() -> Self {
        ShortData { buf: [0u8; MAX_SHORT_DATA_SIZE], len: 0 }
    }
}

impl ShortData {
    fn as_slice(&self) -> &[u8] {
        &self.buf[..self.len as usize]
    }

    fn push_back(&mut self, bytes: &[u8]) {
        let start = self.len as usize;
        self.buf[start..start + bytes.len()].copy_from_slice(bytes);
        self.len += bytes.len() as u8;
    }

    fn push_front(&mut self, bytes: &[u8]) {
        let old_len = self.len as usize;
        self.buf.copy_within(0..old_len, bytes.len());
        self.buf[..bytes.len()].copy_from_slice(bytes);
        self.len += bytes.len() as u8;
    }
}

enum Storage {
    Short(ShortData),
    Blocks(BlockArray),
}

impl Default for Storage {
    fn default() -> Self {
        Storage::Short(ShortData::default())
    }
}

/// A logical byte string assembled out of shared, refcounted blocks.
///
/// Cloning a `Chain` is cheap: blocks are shared via refcount bumps, not
/// copied. Most mutation happens at the front or back; interior edits are
/// not supported (real usage builds a chain by appending/prepending and
/// occasionally trimming either end).
#[derive(Default)]
pub struct Chain {
    size: usize,
    storage: Storage,
}

impl Chain {
    /// An empty chain.
    pub fn new() -> Self {
        Chain::default()
    }

    /// Builds a chain from a byte slice, using [`Options::default`].
    pub fn from_slice(bytes: &[u8]) -> Self {
        let mut chain = Chain::new();
        chain.append(bytes);
        chain
    }

    /// Builds a chain from a sequence of flat fragments, bridging in the
    /// style of [`RopeFragment`] (see that type for the merge-vs-share
    /// rule applied per fragment).
    pub fn from_fragments(fragments: Vec<RopeFragment>) -> Self {
        let mut chain = Chain::new();
        for fragment in fragments {
            rope::append_fragment(&mut chain, fragment);
        }
        chain
    }

    /// Builds a chain of `len` zero bytes, attaching one or more shared
    /// [`SharedBlock::zero_page`] views rather than allocating and zeroing
    /// real memory.
    pub fn zeros(len: usize) -> Self {
        let mut chain = Chain::new();
        let mut remaining = len;
        while remaining > 0 {
            let block = SharedBlock::zero_page(remaining);
            remaining -= block.size();
            chain.append_block(block);
        }
        chain
    }

    /// Total number of logical bytes.
    pub fn size(&self) -> usize {
        self.size
    }

    /// `true` if the chain holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Discards all content, returning to the empty short-data state.
    pub fn clear(&mut self) {
        self.size = 0;
        self.storage = Storage::Short(ShortData::default());
    }

    /// Appends `bytes` using [`Options::default`].
    pub fn append(&mut self, bytes: &[u8]) {
        self.append_with_options(bytes, &Options::default());
    }

    /// Appends `bytes`, applying the boundary-join policy described in
    /// [`merge`] and governed by `options`.
    pub fn append_with_options(&mut self, bytes: &[u8], options: &Options) {
        if bytes.is_empty() {
            return;
        }
        self.ensure_blocks_for_growth(bytes.len(), options);
        match &mut self.storage {
            Storage::Short(short) => short.push_back(bytes),
            Storage::Blocks(array) => {
                let size_before = self.size;
                append_to_back(array, size_before, Incoming::Bytes(bytes), options);
            }
        }
        self.size += bytes.len();
    }

    /// Prepends `bytes` using [`Options::default`].
    pub fn prepend(&mut self, bytes: &[u8]) {
        self.prepend_with_options(bytes, &Options::default());
    }

    /// Prepends `bytes`; symmetric to [`Chain::append_with_options`] with
    /// "first" in place of "last".
    pub fn prepend_with_options(&mut self, bytes: &[u8], options: &Options) {
        if bytes.is_empty() {
            return;
        }
        self.ensure_blocks_for_growth(bytes.len(), options);
        let size_before = self.size;
        match &mut self.storage {
            Storage::Short(short) => short.push_front(bytes),
            Storage::Blocks(array) => {
                prepend_to_front(array, size_before, Incoming::Bytes(bytes), options)
            }
        }
        self.size += bytes.len();
    }

    /// Attaches a whole block at the back, applying the same boundary-join
    /// policy as [`Chain::append_with_options`] at the seam: a tiny-adjacent
    /// to a tiny `block` merges into one fresh block (a small copy), an
    /// empty or wasteful edge block is replaced, and otherwise `block` is
    /// attached directly, sharing ownership rather than copying. Used to
    /// bridge in externally-owned data ([`crate::block::external`]) or
    /// another chain's tail.
    pub fn append_block(&mut self, block: SharedBlock) {
        let len = block.size();
        if len == 0 {
            return;
        }
        self.promote_if_short(&Options::default());
        let size_before = self.size;
        if let Storage::Blocks(array) = &mut self.storage {
            append_to_back(array, size_before, Incoming::Block(block), &Options::default());
        }
        self.size += len;
    }

    /// Attaches a whole block at the front; symmetric to
    /// [`Chain::append_block`].
    pub fn prepend_block(&mut self, block: SharedBlock) {
        let len = block.size();
        if len == 0 {
            return;
        }
        self.promote_if_short(&Options::default());
        let size_before = self.size;
        if let Storage::Blocks(array) = &mut self.storage {
            prepend_to_front(array, size_before, Incoming::Block(block), &Options::default());
        }
        self.size += len;
    }

    /// Appends the entirety of `other`, sharing its blocks via refcount
    /// bumps (no byte copy) rather than flattening first.
    pub fn append_chain(&mut self, other: &Chain) {
        self.append_chain_with_options(other, &Options::default());
    }

    /// Like [`Chain::append_chain`], but routes a short-data source through
    /// the normal merge policy. A block-array source applies the
    /// boundary-join policy only at the seam (its first block against
    /// `self`'s current last block, same as [`Chain::append_block`]); every
    /// later source block is shared wholesale via a refcount bump, since by
    /// then it is adjacent only to blocks that were already its neighbors
    /// inside `other`.
    pub fn append_chain_with_options(&mut self, other: &Chain, options: &Options) {
        if other.is_empty() {
            return;
        }
        match &other.storage {
            Storage::Short(short) => self.append_with_options(short.as_slice(), options),
            Storage::Blocks(array) => {
                self.promote_if_short(options);
                let mut blocks = array.iter();
                if let Some(first) = blocks.next() {
                    let size_before = self.size;
                    if let Storage::Blocks(dest) = &mut self.storage {
                        append_to_back(dest, size_before, Incoming::Block(first.clone()), options);
                    }
                    self.size += first.size();
                }
                for block in blocks {
                    let size_before = self.size;
                    if let Storage::Blocks(dest) = &mut self.storage {
                        dest.push_back(block.clone(), size_before);
                    }
                    self.size += block.size();
                }
            }
        }
    }

    /// Ensures at least `min` bytes (up to `max`) of writable space are
    /// available at the back, returning that window. Growing the window
    /// advances `size()` immediately, so callers must fill every byte
    /// returned.
    pub fn append_buffer(&mut self, min: usize, hint: usize, max: usize, options: &Options) -> &mut [u8] {
        self.promote_if_short(options);
        self.ensure_blocks_for_growth(core::cmp::max(min, 1), options);
        let size_before = self.size;
        let array = match &mut self.storage {
            Storage::Blocks(array) => array,
            Storage::Short(_) => unreachable!("promoted above"),
        };
        let needs_new_block = match array.last() {
            Some(last) => !last.can_append_moving(core::cmp::max(min, 1)),
            None => true,
        };
        if needs_new_block {
            let recommended = core::cmp::max(core::cmp::max(hint, min), size_before);
            let capacity = merge::new_block_capacity(0, min, recommended, options);
            array.push_back(SharedBlock::new_internal(capacity), size_before);
        }
        let last = array.last_mut().expect("just ensured a block exists");
        let window = last.append_buffer_moving(core::cmp::max(min, max));
        self.size += window.len();
        window
    }

    /// Removes the leading `n` bytes. Cheap in every mode: short data
    /// slides, a block's window shrinks in place when unique, or a new
    /// substring view is produced when the boundary block is shared.
    pub fn remove_prefix(&mut self, n: usize, options: &Options) {
        assert!(n <= self.size, "remove_prefix beyond chain size");
        if n == 0 {
            return;
        }
        let mut remaining = n;
        match &mut self.storage {
            Storage::Short(short) => {
                let kept = short.len as usize - n;
                short.buf.copy_within(n..n + kept, 0);
                short.len = kept as u8;
            }
            Storage::Blocks(array) => {
                while remaining > 0 {
                    let first_size = array.first().expect("remaining <= size").size();
                    if remaining < first_size {
                        break;
                    }
                    array.pop_front();
                    remaining -= first_size;
                }
                if remaining > 0 {
                    let (is_unique, keep) = {
                        let first =
                            array.first().expect("remaining < first_size implies a block remains");
                        (first.is_unique(), first.size() - remaining)
                    };
                    if is_unique {
                        array.first_mut().unwrap().trim_prefix(remaining);
                        array.shrink_first_in_place(remaining);
                    } else {
                        let view = array.first().unwrap().substring_view(remaining, keep);
                        array.replace_first(view);
                    }
                }
                self.reblend_boundary_after_trim(options);
            }
        }
        self.size -= n;
    }

    /// Removes the trailing `n` bytes; symmetric to
    /// [`Chain::remove_prefix`].
    pub fn remove_suffix(&mut self, n: usize, options: &Options) {
        assert!(n <= self.size, "remove_suffix beyond chain size");
        if n == 0 {
            return;
        }
        let mut remaining = n;
        match &mut self.storage {
            Storage::Short(short) => {
                short.len = (short.len as usize - n) as u8;
            }
            Storage::Blocks(array) => {
                while remaining > 0 {
                    let last_size = array.last().expect("remaining <= size").size();
                    if remaining < last_size {
                        break;
                    }
                    array.pop_back();
                    remaining -= last_size;
                }
                if remaining > 0 {
                    let (is_unique, keep) = {
                        let last = array.last().expect("remaining < last_size implies a block remains");
                        (last.is_unique(), last.size() - remaining)
                    };
                    if is_unique {
                        array.last_mut().unwrap().trim_suffix(remaining);
                    } else {
                        let view = array.last().unwrap().substring_view(0, keep);
                        array.replace_last(view);
                    }
                }
                self.reblend_boundary_after_trim(options);
            }
        }
        self.size -= n;
    }

    /// Locates the block (or inline buffer) and intra-block offset for
    /// logical byte `index`; `index == size()` yields [`Locator::Eof`].
    pub fn block_and_char(&self, index: usize) -> Locator<'_> {
        match &self.storage {
            Storage::Short(short) => {
                if index >= self.size {
                    Locator::Eof
                } else {
                    Locator::Short(short.as_slice(), index)
                }
            }
            Storage::Blocks(array) => array.block_and_char(index, self.size),
        }
    }

    /// Ensures the chain is backed by a single contiguous block (or inline
    /// buffer) and returns a view of it.
    pub fn flatten(&mut self) -> &[u8] {
        if let Storage::Blocks(array) = &self.storage {
            if array.len() > 1 {
                let capacity = merge::new_block_capacity(0, self.size, self.size, &Options::default());
                let mut fresh = SharedBlock::new_internal(capacity);
                {
                    let window = fresh.append_buffer(self.size);
                    let mut offset = 0;
                    for block in array.iter() {
                        let slice = block.as_slice();
                        window[offset..offset + slice.len()].copy_from_slice(slice);
                        offset += slice.len();
                    }
                }
                let mut fresh_array = BlockArray::default();
                fresh_array.push_back(fresh, 0);
                self.storage = Storage::Blocks(fresh_array);
            }
        }
        match &self.storage {
            Storage::Short(short) => short.as_slice(),
            Storage::Blocks(array) => array.first().map(SharedBlock::as_slice).unwrap_or(&[]),
        }
    }

    /// Iterates over each block's contents as a slice (a single slice for
    /// short data or a fully flattened chain).
    pub fn iter_blocks(&self) -> impl Iterator<Item = &[u8]> {
        let short = match &self.storage {
            Storage::Short(short) => Some(short.as_slice()),
            Storage::Blocks(_) => None,
        };
        let blocks = match &self.storage {
            Storage::Blocks(array) => Some(array.iter().map(SharedBlock::as_slice)),
            Storage::Short(_) => None,
        };
        short.into_iter().chain(blocks.into_iter().flatten())
    }

    /// Iterates over every logical byte without flattening or allocating.
    pub fn bytes(&self) -> impl Iterator<Item = u8> + '_ {
        self.iter_blocks().flat_map(|slice| slice.iter().copied())
    }

    /// Copies the full logical byte string out as an owned buffer.
    pub fn to_vec(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.size);
        for slice in self.iter_blocks() {
            out.extend_from_slice(slice);
        }
        out
    }

    fn promote_if_short(&mut self, options: &Options) {
        if let Storage::Short(short) = &self.storage {
            if short.len == 0 {
                self.storage = Storage::Blocks(BlockArray::default());
                return;
            }
            let bytes = short.as_slice();
            let capacity = merge::new_block_capacity(0, bytes.len(), bytes.len(), options);
            let mut block = SharedBlock::new_internal(capacity);
            block.append_buffer(bytes.len()).copy_from_slice(bytes);
            let mut array = BlockArray::default();
            array.push_back(block, 0);
            self.storage = Storage::Blocks(array);
        }
    }

    /// Promotes short data to a block array if the incoming growth would
    /// overflow the inline buffer.
    fn ensure_blocks_for_growth(&mut self, incoming: usize, options: &Options) {
        if let Storage::Short(short) = &self.storage {
            if short.len as usize + incoming <= MAX_SHORT_DATA_SIZE {
                return;
            }
        }
        self.promote_if_short(options);
    }

    /// After trimming a boundary block down, re-applies the tiny/merge
    /// check against its new neighbor so that repeated
    /// `remove_prefix`/`remove_suffix` calls never leave two tiny blocks
    /// adjacent to each other. Checks both ends: a trim only ever touches
    /// one boundary, but after a `pop_front`/`pop_back` run the *other* end
    /// is unaffected and needs no work, so this is cheap in the common case.
    fn reblend_boundary_after_trim(&mut self, options: &Options) {
        if let Storage::Blocks(array) = &mut self.storage {
            merge_front_if_both_tiny(array, options);
            merge_back_if_both_tiny(array, options);
        }
    }
}

impl Clone for Chain {
    fn clone(&self) -> Self {
        match &self.storage {
            Storage::Short(short) => Chain { size: self.size, storage: Storage::Short(*short) },
            Storage::Blocks(array) => {
                let mut cloned = BlockArray::default();
                let mut offset = 0;
                for block in array.iter() {
                    cloned.push_back(block.clone(), offset);
                    offset += block.size();
                }
                Chain { size: self.size, storage: Storage::Blocks(cloned) }
            }
        }
    }
}

impl PartialEq for Chain {
    fn eq(&self, other: &Self) -> bool {
        self.size == other.size && self.bytes().eq(other.bytes())
    }
}

impl Eq for Chain {}

impl PartialOrd for Chain {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Chain {
    fn cmp(&self, other: &Self) -> Ordering {
        self.bytes().cmp(other.bytes())
    }
}

impl core::fmt::Debug for Chain {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Chain").field("size", &self.size).finish()
    }
}

impl From<&[u8]> for Chain {
    fn from(bytes: &[u8]) -> Self {
        Chain::from_slice(bytes)
    }
}

impl From<Box<[u8]>> for Chain {
    fn from(bytes: Box<[u8]>) -> Self {
        let mut chain = Chain::new();
        if bytes.len() > MAX_SHORT_DATA_SIZE {
            chain.append_block(SharedBlock::from_owned_bytes(bytes));
        } else {
            chain.append(&bytes);
        }
        chain
    }
}

/// Data joining a chain at one edge: either fresh bytes to copy in, or a
/// whole [`SharedBlock`] to attach by refcount. The boundary-join policy in
/// [`merge::plan_join`] is the same for both; only the "attach as a new
/// block" leaf differs (copy vs. share), handled by [`push_back_incoming`]
/// and [`push_front_incoming`].
enum Incoming<'a> {
    Bytes(&'a [u8]),
    Block(SharedBlock),
}

impl Incoming<'_> {
    fn len(&self) -> usize {
        match self {
            Incoming::Bytes(bytes) => bytes.len(),
            Incoming::Block(block) => block.size(),
        }
    }

    fn as_slice(&self) -> &[u8] {
        match self {
            Incoming::Bytes(bytes) => bytes,
            Incoming::Block(block) => block.as_slice(),
        }
    }
}

fn append_to_back(array: &mut BlockArray, size_before: usize, incoming: Incoming<'_>, options: &Options) {
    match merge::plan_join(array.last(), incoming.len(), size_before, options, true) {
        merge::Plan::InPlace => {
            let last = array.last_mut().expect("InPlace implies a last block");
            last.append_buffer_moving(incoming.len()).copy_from_slice(incoming.as_slice());
        }
        merge::Plan::MergeNewBlock { capacity } => {
            let last = array.pop_back().expect("MergeNewBlock implies a last block");
            let mut merged = SharedBlock::new_internal(capacity);
            {
                let window = merged.append_buffer(last.size() + incoming.len());
                window[..last.size()].copy_from_slice(last.as_slice());
                window[last.size()..].copy_from_slice(incoming.as_slice());
            }
            let base = size_before - last.size();
            array.push_back(merged, base);
        }
        merge::Plan::DropEmpty { capacity } => {
            array.pop_back();
            push_back_incoming(array, size_before, incoming, capacity);
        }
        merge::Plan::RewriteThenAttach { new_capacity } => {
            if let Some(last) = array.last() {
                let rewritten = last.copy();
                array.replace_last(rewritten);
            }
            push_back_incoming(array, size_before, incoming, new_capacity);
        }
        merge::Plan::Attach { capacity } => {
            push_back_incoming(array, size_before, incoming, capacity);
        }
    }
}

/// Attaches `incoming` as a fresh trailing block: a byte slice is copied
/// into a newly allocated block of `capacity`, while a whole block is
/// pushed directly, sharing ownership rather than copying.
fn push_back_incoming(array: &mut BlockArray, size_before: usize, incoming: Incoming<'_>, capacity: usize) {
    match incoming {
        Incoming::Bytes(bytes) => {
            let mut fresh = SharedBlock::new_internal(capacity);
            fresh.append_buffer(bytes.len()).copy_from_slice(bytes);
            array.push_back(fresh, size_before);
        }
        Incoming::Block(block) => array.push_back(block, size_before),
    }
}

fn prepend_to_front(array: &mut BlockArray, size_before: usize, incoming: Incoming<'_>, options: &Options) {
    match merge::plan_join(array.first(), incoming.len(), size_before, options, false) {
        merge::Plan::InPlace => {
            let first = array.first_mut().expect("InPlace implies a first block");
            first.prepend_buffer_moving(incoming.len()).copy_from_slice(incoming.as_slice());
        }
        merge::Plan::MergeNewBlock { capacity } => {
            let first = array.pop_front().expect("MergeNewBlock implies a first block");
            let mut merged = SharedBlock::new_internal_positioned(capacity, true);
            {
                let window = merged.prepend_buffer(first.size() + incoming.len());
                let (lo, hi) = window.split_at_mut(incoming.len());
                lo.copy_from_slice(incoming.as_slice());
                hi.copy_from_slice(first.as_slice());
            }
            array.push_front(merged);
        }
        merge::Plan::DropEmpty { capacity } => {
            array.pop_front();
            push_front_incoming(array, incoming, capacity);
        }
        merge::Plan::RewriteThenAttach { new_capacity } => {
            if let Some(first) = array.first() {
                let rewritten = first.copy();
                array.replace_first(rewritten);
            }
            push_front_incoming(array, incoming, new_capacity);
        }
        merge::Plan::Attach { capacity } => {
            push_front_incoming(array, incoming, capacity);
        }
    }
}

/// Attaches `incoming` as a fresh leading block; see [`push_back_incoming`].
fn push_front_incoming(array: &mut BlockArray, incoming: Incoming<'_>, capacity: usize) {
    match incoming {
        Incoming::Bytes(bytes) => {
            let mut fresh = SharedBlock::new_internal_positioned(capacity, true);
            fresh.prepend_buffer(bytes.len()).copy_from_slice(bytes);
            array.push_front(fresh);
        }
        Incoming::Block(block) => array.push_front(block),
    }
}

/// Re-applies the tiny-merge rule (spec §4.3 point 1) against the first two
/// blocks, looping in case the merge itself leaves a still-tiny result next
/// to a third tiny block.
fn merge_front_if_both_tiny(array: &mut BlockArray, options: &Options) {
    let min_block_size = options.min_block_size();
    while array.len() >= 2 {
        let a_size = array.at(0).size();
        let b_size = array.at(1).size();
        if a_size >= min_block_size || b_size >= min_block_size {
            break;
        }
        let merged_len = a_size + b_size;
        let capacity = merge::new_block_capacity(0, merged_len, merged_len, options);
        let mut merged = SharedBlock::new_internal(capacity);
        {
            let window = merged.append_buffer(merged_len);
            window[..a_size].copy_from_slice(array.at(0).as_slice());
            window[a_size..].copy_from_slice(array.at(1).as_slice());
        }
        array.merge_first_two(merged);
    }
}

/// Symmetric to [`merge_front_if_both_tiny`], against the last two blocks.
fn merge_back_if_both_tiny(array: &mut BlockArray, options: &Options) {
    let min_block_size = options.min_block_size();
    loop {
        let len = array.len();
        if len < 2 {
            break;
        }
        let a_size = array.at(len - 2).size();
        let b_size = array.at(len - 1).size();
        if a_size >= min_block_size || b_size >= min_block_size {
            break;
        }
        let merged_len = a_size + b_size;
        let capacity = merge::new_block_capacity(0, merged_len, merged_len, options);
        let mut merged = SharedBlock::new_internal(capacity);
        {
            let window = merged.append_buffer(merged_len);
            window[..a_size].copy_from_slice(array.at(len - 2).as_slice());
            window[a_size..].copy_from_slice(array.at(len - 1).as_slice());
        }
        array.merge_last_two(merged);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_chain_is_short_and_empty() {
        let c = Chain::new();
        assert_eq!(c.size(), 0);
        assert!(c.is_empty());
    }

    #[test]
    fn short_append_stays_inline() {
        let mut c = Chain::new();
        c.append(b"hello");
        assert_eq!(c.size(), 5);
        assert_eq!(c.to_vec(), b"hello");
    }

    #[test]
    fn append_at_exact_short_boundary_stays_inline() {
        let mut c = Chain::new();
        c.append(&[b'a'; MAX_SHORT_DATA_SIZE]);
        assert_eq!(c.size(), MAX_SHORT_DATA_SIZE);
        assert!(matches!(c.storage, Storage::Short(_)));
    }

    #[test]
    fn append_past_short_boundary_promotes() {
        let mut c = Chain::new();
        c.append(&[b'a'; MAX_SHORT_DATA_SIZE + 1]);
        assert_eq!(c.size(), MAX_SHORT_DATA_SIZE + 1);
        assert!(matches!(c.storage, Storage::Blocks(_)));
    }

    #[test]
    fn prepend_then_append_round_trips() {
        let mut c = Chain::new();
        c.append(b"cd");
        c.prepend(b"ab");
        c.append(b"ef");
        assert_eq!(c.to_vec(), b"abcdef");
    }

    #[test]
    fn large_appends_build_multiple_blocks() {
        let mut c = Chain::new();
        for _ in 0..20 {
            c.append(&[1u8; 5000]);
        }
        assert_eq!(c.size(), 100_000);
        assert_eq!(c.to_vec().len(), 100_000);
    }

    #[test]
    fn remove_prefix_and_suffix_shrink_without_losing_data() {
        let mut c = Chain::new();
        c.append(&Vec::from_iter(core::iter::repeat(b'a').take(5000)));
        c.remove_prefix(2500, &Options::default());
        c.remove_suffix(1000, &Options::default());
        assert_eq!(c.size(), 1500);
        let expected: Vec<u8> = core::iter::repeat(b'a').take(1500).collect();
        assert_eq!(c.flatten(), expected.as_slice());
    }

    #[test]
    fn remove_prefix_to_empty() {
        let mut c = Chain::from_slice(b"hello world");
        let size = c.size();
        c.remove_prefix(size, &Options::default());
        assert!(c.is_empty());
    }

    #[test]
    fn remove_suffix_zero_is_noop() {
        let mut c = Chain::from_slice(b"hello");
        c.remove_suffix(0, &Options::default());
        assert_eq!(c.to_vec(), b"hello");
    }

    #[test]
    fn block_and_char_locates_every_byte() {
        let mut c = Chain::new();
        c.append(&[1u8; 5000]);
        c.append(&[2u8; 5000]);
        let flat = c.to_vec();
        for i in 0..c.size() {
            match c.block_and_char(i) {
                Locator::Block(block, offset) => {
                    assert_eq!(block.as_slice()[offset], flat[i]);
                }
                Locator::Short(slice, offset) => assert_eq!(slice[offset], flat[i]),
                Locator::Eof => panic!("unexpected eof at {i}"),
            }
        }
        assert!(matches!(c.block_and_char(c.size()), Locator::Eof));
    }

    #[test]
    fn flatten_merges_into_one_block() {
        let mut c = Chain::new();
        for _ in 0..10 {
            c.append(&[7u8; 2000]);
        }
        let expected = c.to_vec();
        c.flatten();
        if let Storage::Blocks(array) = &c.storage {
            assert_eq!(array.len(), 1);
        }
        assert_eq!(c.to_vec(), expected);
    }

    #[test]
    fn clone_shares_blocks() {
        let mut c = Chain::new();
        c.append(&[9u8; 5000]);
        let c2 = c.clone();
        assert_eq!(c, c2);
    }

    #[test]
    fn equality_and_ordering_are_byte_wise() {
        let a = Chain::from_slice(b"abc");
        let b = Chain::from_slice(b"abd");
        assert_ne!(a, b);
        assert!(a < b);
        assert_eq!(Chain::from_slice(b"abc"), Chain::from_slice(b"abc"));
    }

    #[test]
    fn append_chain_shares_blocks_by_refcount() {
        let mut src = Chain::new();
        src.append(&[3u8; 5000]);
        let mut dest = Chain::new();
        dest.append_chain(&src);
        assert_eq!(dest.to_vec(), src.to_vec());
    }

    #[test]
    fn byte_at_a_time_append_allocates_geometrically() {
        let mut c = Chain::new();
        let options = Options::default();
        let n = 64 * crate::block::DEFAULT_MIN_BLOCK_SIZE;
        for i in 0..n {
            c.append_with_options(&[i as u8], &options);
        }
        assert_eq!(c.size(), n);
        let block_count = match &c.storage {
            Storage::Blocks(array) => array.len(),
            Storage::Short(_) => panic!("expected block-array storage"),
        };
        // A block count linear in n (one new ~min-size block every
        // min_block_size bytes) would be roughly n / min_block_size; a
        // block count that grows with the chain should stay far below that.
        assert!(
            block_count * 4 < n / crate::block::DEFAULT_MIN_BLOCK_SIZE,
            "expected O(log n) blocks, got {block_count} for n={n}"
        );
    }

    #[test]
    fn append_block_merges_two_tiny_blocks_at_the_seam() {
        let mut dest = Chain::new();
        dest.append_block(SharedBlock::from_owned_bytes(Box::from(&b"ab"[..])));
        dest.append_block(SharedBlock::from_owned_bytes(Box::from(&b"cd"[..])));
        assert_eq!(dest.to_vec(), b"abcd");
        if let Storage::Blocks(array) = &dest.storage {
            assert_eq!(array.len(), 1, "two tiny blocks at the seam should merge into one");
        }
    }

    #[test]
    fn repeated_remove_prefix_never_leaves_two_adjacent_tiny_blocks() {
        let mut c = Chain::new();
        let options = Options::default();
        for _ in 0..40 {
            c.append_with_options(&[1u8; 300], &options);
        }
        let min = options.min_block_size();
        while c.size() > 10 {
            let step = core::cmp::min(37, c.size() - 10);
            c.remove_prefix(step, &options);
            if let Storage::Blocks(array) = &c.storage {
                for i in 1..array.len() {
                    assert!(
                        array.at(i - 1).size() >= min || array.at(i).size() >= min,
                        "tiny blocks adjacent at {} and {}",
                        i - 1,
                        i
                    );
                }
            }
        }
    }

    #[test]
    fn zeros_builds_all_zero_chain_from_shared_pages() {
        let len = crate::block::external::ZERO_PAGE_SIZE * 2 + 100;
        let c = Chain::zeros(len);
        assert_eq!(c.size(), len);
        assert!(c.bytes().all(|b| b == 0));
    }

    #[test]
    fn zeros_of_zero_is_empty() {
        assert!(Chain::zeros(0).is_empty());
    }

    #[test]
    fn append_buffer_then_fill() {
        let mut c = Chain::new();
        {
            let window = c.append_buffer(10, 10, 10, &Options::default());
            window.copy_from_slice(b"0123456789");
        }
        assert_eq!(c.to_vec(), b"0123456789");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use alloc::vec::Vec;
    use proptest::prelude::*;

    proptest! {
        /// `Chain(s).to_vec() == s` for arbitrary byte strings, across the
        /// short-data/block-array boundary.
        #[test]
        fn from_slice_round_trips(bytes in proptest::collection::vec(any::<u8>(), 0..4000)) {
            let chain = Chain::from_slice(&bytes);
            prop_assert_eq!(chain.to_vec(), bytes);
        }

        /// `(a + b).to_vec() == a.to_vec() + b.to_vec()`.
        #[test]
        fn append_is_concatenation(
            a in proptest::collection::vec(any::<u8>(), 0..2000),
            b in proptest::collection::vec(any::<u8>(), 0..2000),
        ) {
            let mut chain = Chain::from_slice(&a);
            chain.append(&b);
            let mut expected = a.clone();
            expected.extend_from_slice(&b);
            prop_assert_eq!(chain.to_vec(), expected);
        }

        /// Removing a prefix of length `n` and then prepending it back
        /// reconstructs the original chain byte-wise.
        #[test]
        fn remove_prefix_then_prepend_is_identity(
            bytes in proptest::collection::vec(any::<u8>(), 0..3000),
            frac in 0.0f64..1.0,
        ) {
            let n = (bytes.len() as f64 * frac) as usize;
            let mut chain = Chain::from_slice(&bytes);
            let removed: Vec<u8> = bytes[..n].to_vec();
            chain.remove_prefix(n, &Options::default());
            chain.prepend(&removed);
            prop_assert_eq!(chain.to_vec(), bytes);
        }

        /// Removing a suffix of length `n` and then appending it back
        /// reconstructs the original chain byte-wise.
        #[test]
        fn remove_suffix_then_append_is_identity(
            bytes in proptest::collection::vec(any::<u8>(), 0..3000),
            frac in 0.0f64..1.0,
        ) {
            let n = (bytes.len() as f64 * frac) as usize;
            let split = bytes.len() - n;
            let mut chain = Chain::from_slice(&bytes);
            let removed: Vec<u8> = bytes[split..].to_vec();
            chain.remove_suffix(n, &Options::default());
            chain.append(&removed);
            prop_assert_eq!(chain.to_vec(), bytes);
        }

        /// `flatten()` never changes the represented byte string, and always
        /// leaves at most one block behind.
        #[test]
        fn flatten_preserves_content(bytes in proptest::collection::vec(any::<u8>(), 0..3000)) {
            let mut chain = Chain::from_slice(&bytes);
            let flattened = chain.flatten().to_vec();
            prop_assert_eq!(flattened, bytes);
            if let Storage::Blocks(array) = &chain.storage {
                prop_assert!(array.len() <= 1);
            }
        }

        /// Ordering of chains agrees with ordering of their byte strings.
        #[test]
        fn ordering_matches_byte_strings(
            a in proptest::collection::vec(any::<u8>(), 0..500),
            b in proptest::collection::vec(any::<u8>(), 0..500),
        ) {
            let chain_a = Chain::from_slice(&a);
            let chain_b = Chain::from_slice(&b);
            prop_assert_eq!(chain_a.cmp(&chain_b), a.cmp(&b));
        }
    }
}
