//! A minimal length-prefixed record representation: each record is a single
//! LEB128-encoded byte length followed by that many payload bytes, read
//! directly off a [`crate::io::Reader`].
//!
//! This is explicitly not the real Riegeli chunk/block/transpose format; it
//! exists only to give the C ABI shim ([`crate::ffi`]) something concrete
//! and testable to read.

use alloc::vec::Vec;

use crate::chain::Chain;
use crate::error::{Error, Result};
use crate::io::{Reader, Writer};

/// Writes `bytes` as one record: a LEB128 length prefix followed by the
/// payload itself.
pub fn write_record(writer: &mut dyn Writer, bytes: &[u8]) -> Result<()> {
    let mut len_buf = Vec::new();
    encode_leb128(bytes.len() as u64, &mut len_buf);
    writer.write_all(&len_buf)?;
    writer.write_all(bytes)
}

/// Reads one record: a LEB128 length prefix followed by that many payload
/// bytes, pulled into a [`Chain`] (zero-copy when `reader` is chain-backed).
///
/// Returns `Ok(None)` on a clean end of stream encountered before any byte
/// of a new record is read. A length prefix or payload that ends partway
/// through is reported as [`Error::Io`] (for a non-EOF read failure) or
/// [`Error::InvalidArgument`] (for a length prefix truncated by EOF).
pub fn read_record(reader: &mut dyn Reader) -> Result<Option<Chain>> {
    let Some(len) = decode_leb128(reader)? else {
        return Ok(None);
    };
    let len = len as usize;
    let payload = reader.read(len)?;
    if payload.size() != len {
        return Err(Error::invalid_argument("record payload truncated before its declared length"));
    }
    Ok(Some(payload))
}

fn encode_leb128(mut value: u64, out: &mut Vec<u8>) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            break;
        }
        out.push(byte | 0x80);
    }
}

/// Reads a LEB128-encoded `u64` one byte at a time via `reader.pull`/`read`.
/// Returns `Ok(None)` if the stream ends before the first byte of the
/// varint; a truncation partway through an in-progress varint is an error.
fn decode_leb128(reader: &mut dyn Reader) -> Result<Option<u64>> {
    let mut value: u64 = 0;
    let mut shift = 0u32;
    let mut first = true;
    loop {
        if !reader.pull(1, 1)? {
            return if first {
                Ok(None)
            } else {
                Err(Error::invalid_argument("length prefix truncated before its terminating byte"))
            };
        }
        let byte = reader.available()[0];
        reader.consume(1);
        first = false;
        value |= ((byte & 0x7f) as u64) << shift;
        if byte & 0x80 == 0 {
            return Ok(Some(value));
        }
        shift += 7;
        if shift >= 64 {
            return Err(Error::invalid_argument("length prefix too long"));
        }
    }
}
