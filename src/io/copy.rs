use super::{Reader, Writer};
use crate::error::{Error, Result};

/// Copies from `src` to `dest`, stopping at end of stream or once
/// `max_length` bytes have been copied, whichever comes first. Returns the
/// number of bytes actually copied; returns an error (after copying exactly
/// `max_length` bytes) if `src` had more to give.
///
/// When `src.size()` is known, `dest` is given a size hint up front so a
/// chain- or file-backed writer can size its first allocation accordingly.
pub fn copy_all(src: &mut dyn Reader, dest: &mut dyn Writer, max_length: u64) -> Result<u64> {
    if let Some(size) = src.size() {
        let remaining = size.saturating_sub(src.pos());
        if remaining > max_length {
            copy_exact(src, dest, max_length)?;
            return Err(Error::resource_exhausted("maximum length exceeded"));
        }
        dest.set_write_size_hint(remaining);
        copy_exact(src, dest, remaining)?;
        return Ok(remaining);
    }

    let mut copied = 0u64;
    while copied < max_length {
        if !src.pull(1, 0)? {
            return Ok(copied);
        }
        let avail = src.available().len() as u64;
        if avail == 0 {
            return Ok(copied);
        }
        let take = avail.min(max_length - copied);
        let chunk = src.read(take as usize)?;
        dest.write_chain(&chunk)?;
        copied += take;
    }
    if src.pull(1, 0)? && !src.available().is_empty() {
        return Err(Error::resource_exhausted("maximum length exceeded"));
    }
    Ok(copied)
}

fn copy_exact(src: &mut dyn Reader, dest: &mut dyn Writer, n: u64) -> Result<()> {
    let mut remaining = n;
    while remaining > 0 {
        let chunk = src.read(remaining as usize)?;
        let got = chunk.size() as u64;
        dest.write_chain(&chunk)?;
        if got == 0 {
            return Err(Error::resource_exhausted("source ended before max_length"));
        }
        remaining -= got;
    }
    Ok(())
}
