//! Type-erased payloads backing external [`super::SharedBlock`]s.
//!
//! This is the Rust rendering of the C++ "Methods" vtable from the data
//! model: rather than a hand-rolled function-pointer table, an external
//! payload is simply `Box<dyn ErasedPayload>`. The block's `data`/`size`
//! fields are independent of the payload (they may be a narrower view into
//! it), so the trait only needs to answer "what backs this, and how do I
//! describe/account for it" — not "where are the live bytes".

use core::fmt;

use super::SharedBlock;

/// A type-erased object that owns bytes borrowed by an external
/// [`super::SharedBlock`]. Implementors must keep the bytes the block was
/// constructed with alive for as long as the payload itself is alive.
pub trait ErasedPayload: Send + Sync {
    /// A short label used in debug dumps, e.g. `"owned bytes"` or `"zero page"`.
    fn kind(&self) -> &'static str;

    /// The size of the payload's own allocation, for `dynamic_sizeof`-style
    /// accounting. Does not need to match the block's live `size`.
    fn dynamic_sizeof(&self) -> usize;

    /// Writes a short structural dump, analogous to the C++ "dump" method.
    fn dump(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} payload>", self.kind())
    }
}

impl fmt::Debug for dyn ErasedPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.dump(f)
    }
}

/// A payload owning a heap-allocated byte buffer, e.g. the contents of a
/// user-supplied `String`/`Vec<u8>` or one flat fragment of a rope being
/// bridged into a [`Chain`](crate::chain::Chain).
pub struct OwnedBytes(alloc::boxed::Box<[u8]>);

impl OwnedBytes {
    /// Takes ownership of `bytes`, returning both the payload and a pointer
    /// to (and length of) its contents, for use with
    /// [`SharedBlock::new_external`](super::SharedBlock::new_external).
    pub fn new(bytes: alloc::boxed::Box<[u8]>) -> (Self, *const u8, usize) {
        let ptr = bytes.as_ptr();
        let len = bytes.len();
        (OwnedBytes(bytes), ptr, len)
    }
}

impl ErasedPayload for OwnedBytes {
    fn kind(&self) -> &'static str {
        "owned bytes"
    }

    fn dynamic_sizeof(&self) -> usize {
        self.0.len()
    }
}

/// A singleton-style payload describing a static, all-zero buffer.
///
/// Constructing a block from `ZeroPage` never allocates or zeroes memory at
/// runtime beyond the one static array baked into the binary; it exists so
/// that callers building zero-filled chains (e.g. pre-sized scratch space)
/// don't pay for a real allocation.
pub struct ZeroPage;

/// The size of the static zero-filled page backing [`ZeroPage`]. Requests for
/// more zero bytes than this are served by chaining multiple `ZeroPage`
/// blocks together (see [`crate::chain::Chain::zeros`]).
pub const ZERO_PAGE_SIZE: usize = 4096;

static ZERO_PAGE_BYTES: [u8; ZERO_PAGE_SIZE] = [0u8; ZERO_PAGE_SIZE];

impl ZeroPage {
    /// Returns a pointer to (a prefix of) the static zero page, at most
    /// `len` bytes (`len` is clamped to [`ZERO_PAGE_SIZE`]).
    pub fn slice(len: usize) -> &'static [u8] {
        &ZERO_PAGE_BYTES[..core::cmp::min(len, ZERO_PAGE_SIZE)]
    }
}

impl ErasedPayload for ZeroPage {
    fn kind(&self) -> &'static str {
        "zero page"
    }

    fn dynamic_sizeof(&self) -> usize {
        0
    }
}

/// A payload that keeps a donor block alive so that another block can
/// present a narrower, independently-trimmable view of the donor's bytes.
///
/// This is how [`Chain::remove_prefix`](crate::chain::Chain::remove_prefix)
/// and [`Chain::remove_suffix`](crate::chain::Chain::remove_suffix) shrink a
/// *shared* block without copying: rather than mutating the shared block (which
/// other owners can still see), they construct a brand new external block
/// whose payload is a clone of the original [`SharedBlock`] handle.
pub struct SubstringPayload(pub SharedBlock);

impl ErasedPayload for SubstringPayload {
    fn kind(&self) -> &'static str {
        "substring view"
    }

    fn dynamic_sizeof(&self) -> usize {
        0
    }
}
