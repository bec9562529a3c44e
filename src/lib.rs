//! A segmented byte buffer ("Chain") with refcounted, size-capped blocks,
//! a reader/writer facade over it, and a sequential-record C ABI shim.
//!
//! The crate is organized bottom-up, mirroring the dependency order of the
//! data structures:
//!
//! * [`refcount`] — an atomic reference counter with a fast-path uniqueness check.
//! * [`block`] — [`block::SharedBlock`], the refcounted storage unit: either an
//!   internally-owned mutable arena or an externally-borrowed type-erased payload.
//! * [`chain`] — [`chain::Chain`], the segmented buffer itself: an ordered sequence
//!   of blocks presenting one logical byte string, with a small-buffer optimization
//!   for short contents.
//! * [`io`] — the `Reader`/`Writer` facade consumed and produced by the record layer.
//! * [`record`] — a minimal length-prefixed record codec used only to give the C
//!   ABI shim something concrete to read; it is not the on-disk Riegeli chunk format.
//! * [`ffi`] — the C ABI shim for a sequential record reader (requires `std`).
//!
//! The `std` feature (on by default) gates everything that needs an operating
//! system: file-backed readers/writers, the error type's `std::error::Error`
//! impl, and the C ABI shim. Without it, [`refcount`], [`block`], and [`chain`]
//! still work on any target with a global allocator.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub mod refcount;
pub mod block;
pub mod chain;
pub mod error;

#[cfg(feature = "std")]
pub mod io;

#[cfg(feature = "std")]
pub mod record;

#[cfg(feature = "std")]
pub mod ffi;

pub use chain::Chain;
pub use error::Error;
