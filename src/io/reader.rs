use crate::chain::{Chain, Locator};
use crate::error::{Error, Result};

/// A pull-based byte source.
///
/// `pull` is the only method that may do real work (read from a file,
/// decompress, etc.); `available`/`consume` walk the window it produced.
/// `read`/`skip` are built from those two primitives and need no
/// implementation-specific override unless a concrete reader can do better
/// (see [`ChainReader::read`], which shares blocks instead of copying).
pub trait Reader {
    /// Ensures at least `min` bytes are buffered, if that many remain,
    /// trying to buffer up to `hint` when convenient. Returns `false` only
    /// at genuine end of stream (`min` may still be 0 bytes available).
    fn pull(&mut self, min: usize, hint: usize) -> Result<bool>;

    /// The bytes made available by the most recent successful `pull`, not
    /// yet consumed.
    fn available(&self) -> &[u8];

    /// Advances past the first `len` bytes of `available()`.
    fn consume(&mut self, len: usize);

    /// Current logical position.
    fn pos(&self) -> u64;

    /// Total size, if known without scanning to the end.
    fn size(&self) -> Option<u64> {
        None
    }

    /// Repositions to an absolute offset. The default rejects any seek;
    /// override where random access is actually possible.
    fn seek(&mut self, pos: u64) -> Result<()> {
        let _ = pos;
        Err(Error::invalid_argument("this reader does not support seek"))
    }

    /// Reads up to `n` bytes into a fresh [`Chain`], stopping early at end
    /// of stream. Copies by default; a reader already backed by a `Chain`
    /// shares blocks instead (see [`ChainReader`]).
    fn read(&mut self, n: usize) -> Result<Chain> {
        let mut out = Chain::new();
        let mut remaining = n;
        while remaining > 0 {
            if !self.pull(1, remaining)? {
                break;
            }
            let slice = self.available();
            if slice.is_empty() {
                break;
            }
            let take = remaining.min(slice.len());
            out.append(&slice[..take]);
            self.consume(take);
            remaining -= take;
        }
        Ok(out)
    }

    /// Discards up to `n` bytes, stopping early at end of stream.
    fn skip(&mut self, n: usize) -> Result<usize> {
        let mut remaining = n;
        while remaining > 0 {
            if !self.pull(1, remaining)? {
                break;
            }
            let avail = self.available().len();
            if avail == 0 {
                break;
            }
            let take = remaining.min(avail);
            self.consume(take);
            remaining -= take;
        }
        Ok(n - remaining)
    }
}

/// A [`Reader`] over an owned [`Chain`]: `available`/`consume` walk its
/// blocks directly, and `read` shares them back out by refcount rather than
/// copying.
pub struct ChainReader {
    chain: Chain,
    pos: usize,
}

impl ChainReader {
    /// Wraps `chain` for sequential reading from its start.
    pub fn new(chain: Chain) -> Self {
        ChainReader { chain, pos: 0 }
    }

    /// Consumes the reader, returning the chain unread bytes and all.
    pub fn into_chain(self) -> Chain {
        self.chain
    }
}

impl Reader for ChainReader {
    fn pull(&mut self, _min: usize, _hint: usize) -> Result<bool> {
        Ok(self.pos < self.chain.size())
    }

    fn available(&self) -> &[u8] {
        match self.chain.block_and_char(self.pos) {
            Locator::Block(block, offset) => &block.as_slice()[offset..],
            Locator::Short(slice, offset) => &slice[offset..],
            Locator::Eof => &[],
        }
    }

    fn consume(&mut self, len: usize) {
        self.pos += len;
    }

    fn pos(&self) -> u64 {
        self.pos as u64
    }

    fn size(&self) -> Option<u64> {
        Some(self.chain.size() as u64)
    }

    fn seek(&mut self, pos: u64) -> Result<()> {
        let pos = pos as usize;
        if pos > self.chain.size() {
            return Err(Error::out_of_range(pos, self.chain.size()));
        }
        self.pos = pos;
        Ok(())
    }

    fn read(&mut self, n: usize) -> Result<Chain> {
        let n = n.min(self.chain.size().saturating_sub(self.pos));
        let mut out = Chain::new();
        let mut remaining = n;
        while remaining > 0 {
            match self.chain.block_and_char(self.pos) {
                Locator::Block(block, offset) => {
                    let take = remaining.min(block.size() - offset);
                    out.append_block(block.substring_view(offset, take));
                    self.pos += take;
                    remaining -= take;
                }
                Locator::Short(slice, offset) => {
                    let take = remaining.min(slice.len() - offset);
                    out.append(&slice[offset..offset + take]);
                    self.pos += take;
                    remaining -= take;
                }
                Locator::Eof => break,
            }
        }
        Ok(out)
    }
}

/// A [`Reader`] over a file, buffered through [`std::io::BufReader`].
///
/// `pull`'s `min`/`hint` are best-effort: the buffer never grows past
/// `std::io::BufReader`'s own capacity, so a single `pull` only ever
/// triggers one fill from the underlying file.
pub struct FileReader {
    path: Option<std::path::PathBuf>,
    inner: std::io::BufReader<std::fs::File>,
    pos: u64,
    size: Option<u64>,
}

impl FileReader {
    /// Opens `path` for buffered sequential reading.
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = std::fs::File::open(&path).map_err(|e| Error::io(Some(path.clone()), 0, e))?;
        let size = file.metadata().ok().map(|m| m.len());
        Ok(FileReader { path: Some(path), inner: std::io::BufReader::new(file), pos: 0, size })
    }
}

impl Reader for FileReader {
    fn pull(&mut self, _min: usize, _hint: usize) -> Result<bool> {
        let buf = std::io::BufRead::fill_buf(&mut self.inner)
            .map_err(|e| Error::io(self.path.clone(), self.pos, e))?;
        Ok(!buf.is_empty())
    }

    fn available(&self) -> &[u8] {
        std::io::BufRead::buffer(&self.inner)
    }

    fn consume(&mut self, len: usize) {
        std::io::BufRead::consume(&mut self.inner, len);
        self.pos += len as u64;
    }

    fn pos(&self) -> u64 {
        self.pos
    }

    fn size(&self) -> Option<u64> {
        self.size
    }

    fn seek(&mut self, pos: u64) -> Result<()> {
        use std::io::Seek;
        self.inner
            .seek(std::io::SeekFrom::Start(pos))
            .map_err(|e| Error::io(self.path.clone(), self.pos, e))?;
        self.pos = pos;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::Options;

    #[test]
    fn chain_reader_reads_whole_content() {
        let mut chain = Chain::new();
        chain.append(&[1u8; 5000]);
        chain.append(&[2u8; 5000]);
        let mut reader = ChainReader::new(chain.clone());
        let out = reader.read(10_000).unwrap();
        assert_eq!(out.to_vec(), chain.to_vec());
        assert_eq!(reader.pos(), 10_000);
        assert!(!reader.pull(1, 1).unwrap());
    }

    #[test]
    fn chain_reader_partial_reads_track_position() {
        let chain = Chain::from_slice(b"abcdefgh");
        let mut reader = ChainReader::new(chain);
        let first = reader.read(3).unwrap();
        assert_eq!(first.to_vec(), b"abc");
        let second = reader.read(100).unwrap();
        assert_eq!(second.to_vec(), b"defgh");
    }

    #[test]
    fn chain_reader_read_shares_blocks() {
        let mut chain = Chain::new();
        chain.append(&[5u8; 5000]);
        let mut reader = ChainReader::new(chain.clone());
        let before = match chain.block_and_char(0) {
            Locator::Block(block, _) => block.ref_count(),
            _ => panic!("expected a block-backed chain"),
        };
        let out = reader.read(5000).unwrap();
        let after = match chain.block_and_char(0) {
            Locator::Block(block, _) => block.ref_count(),
            _ => panic!("expected a block-backed chain"),
        };
        assert!(after > before, "reading should share the donor block, not copy it");
        assert_eq!(out.to_vec(), chain.to_vec());
    }

    #[test]
    fn chain_reader_seek_rejects_past_end() {
        let mut reader = ChainReader::new(Chain::from_slice(b"abc"));
        assert!(reader.seek(10).is_err());
        assert!(reader.seek(3).is_ok());
    }

    #[test]
    fn skip_advances_without_reading() {
        let mut reader = ChainReader::new(Chain::from_slice(b"abcdef"));
        let skipped = reader.skip(3).unwrap();
        assert_eq!(skipped, 3);
        assert_eq!(reader.read(100).unwrap().to_vec(), b"def");
    }

    #[test]
    fn append_buffer_then_chain_reader_round_trips() {
        let mut chain = Chain::new();
        chain.append_buffer(4, 4, 4, &Options::default()).copy_from_slice(b"abcd");
        let mut reader = ChainReader::new(chain);
        assert_eq!(reader.read(4).unwrap().to_vec(), b"abcd");
    }
}
