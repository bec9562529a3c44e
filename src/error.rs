//! The error taxonomy shared by [`crate::chain`], [`crate::io`], and [`crate::ffi`].
//!
//! Every fallible operation in this crate reports failure through this single
//! `Error` enum rather than panicking or aborting, except for invariant
//! assertions (`Internal`), which only fire in debug builds and indicate a
//! bug in this crate rather than a condition a caller can recover from.

use alloc::string::String;

#[cfg(feature = "std")]
use std::path::PathBuf;

/// The result type used throughout this crate.
pub type Result<T> = core::result::Result<T, Error>;

cfg_if::cfg_if! {
    if #[cfg(feature = "std")] {
        /// Failure taxonomy for buffer, reader/writer, and FFI operations.
        #[derive(Debug, thiserror::Error)]
        pub enum Error {
            /// A copy exceeded a caller-supplied `max_length`, or a requested
            /// allocation would overflow the block-capacity or `usize` limit.
            #[error("resource exhausted: {message}")]
            ResourceExhausted {
                /// Human-readable detail, e.g. "maximum length exceeded".
                message: String,
            },
            /// Reader/writer I/O failed.
            #[error("I/O error at {path:?} (position {position}): {source}")]
            Io {
                /// The path being read or written, if known.
                path: Option<PathBuf>,
                /// The stream position at the time of failure.
                position: u64,
                /// The underlying I/O error.
                #[source]
                source: std::io::Error,
            },
            /// Malformed caller input at a public boundary.
            #[error("invalid argument: {message}")]
            InvalidArgument {
                /// Human-readable detail.
                message: String,
            },
            /// A seek or remove went beyond the current size.
            #[error("out of range: index {index} exceeds size {size}")]
            OutOfRange {
                /// The offending index or length.
                index: usize,
                /// The size it was compared against.
                size: usize,
            },
            /// An internal invariant was violated. Only produced by debug
            /// assertions; a well-formed caller never observes this variant
            /// in a release build.
            #[error("internal invariant violated: {message}")]
            Internal {
                /// Human-readable detail.
                message: String,
            },
        }

        impl Error {
            /// Builds an [`Error::Io`] from the path, current position, and
            /// underlying `std::io::Error`.
            pub fn io(path: Option<PathBuf>, position: u64, source: std::io::Error) -> Self {
                Error::Io { path, position, source }
            }
        }
    } else {
        /// Failure taxonomy for buffer operations (the `std`-gated I/O and
        /// FFI variants are unavailable without the `std` feature).
        #[derive(Debug)]
        pub enum Error {
            /// A requested allocation would overflow the block-capacity or
            /// `usize` limit.
            ResourceExhausted {
                /// Human-readable detail.
                message: String,
            },
            /// Malformed caller input at a public boundary.
            InvalidArgument {
                /// Human-readable detail.
                message: String,
            },
            /// A seek or remove went beyond the current size.
            OutOfRange {
                /// The offending index or length.
                index: usize,
                /// The size it was compared against.
                size: usize,
            },
            /// An internal invariant was violated.
            Internal {
                /// Human-readable detail.
                message: String,
            },
        }

        impl core::fmt::Display for Error {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                match self {
                    Error::ResourceExhausted { message } => {
                        write!(f, "resource exhausted: {message}")
                    }
                    Error::InvalidArgument { message } => write!(f, "invalid argument: {message}"),
                    Error::OutOfRange { index, size } => {
                        write!(f, "out of range: index {index} exceeds size {size}")
                    }
                    Error::Internal { message } => {
                        write!(f, "internal invariant violated: {message}")
                    }
                }
            }
        }

        impl core::error::Error for Error {}
    }
}

impl Error {
    /// Builds an [`Error::ResourceExhausted`] with the given detail message.
    pub fn resource_exhausted(message: impl Into<String>) -> Self {
        Error::ResourceExhausted { message: message.into() }
    }

    /// Builds an [`Error::InvalidArgument`] with the given detail message.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Error::InvalidArgument { message: message.into() }
    }

    /// Builds an [`Error::OutOfRange`].
    pub fn out_of_range(index: usize, size: usize) -> Self {
        Error::OutOfRange { index, size }
    }

    /// Builds an [`Error::Internal`] with the given detail message.
    pub fn internal(message: impl Into<String>) -> Self {
        Error::Internal { message: message.into() }
    }
}
