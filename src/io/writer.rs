use crate::chain::{Chain, Options};
use crate::error::{Error, Result};

/// A push-based byte sink.
///
/// `write_all` and `flush` are the only required methods; `write_chain`
/// has a byte-copying default but is overridden by [`ChainWriter`] to share
/// blocks instead.
pub trait Writer {
    /// Writes every byte of `bytes`, or fails without a defined partial
    /// effect.
    fn write_all(&mut self, bytes: &[u8]) -> Result<()>;

    /// Flushes any buffering internal to this writer.
    fn flush(&mut self) -> Result<()>;

    /// Current logical position (bytes written so far).
    fn pos(&self) -> u64;

    /// Advises the writer of the total size expected, if known, so it can
    /// size its first allocation accordingly. Advisory; the default is a
    /// no-op.
    fn set_write_size_hint(&mut self, hint: u64) {
        let _ = hint;
    }

    /// Writes the contents of `chain`. The default walks its blocks and
    /// copies each one; a writer already backed by a `Chain` overrides this
    /// to share blocks by refcount instead.
    fn write_chain(&mut self, chain: &Chain) -> Result<()> {
        for slice in chain.iter_blocks() {
            self.write_all(slice)?;
        }
        Ok(())
    }
}

/// A [`Writer`] that accumulates into an owned [`Chain`], by refcount
/// sharing wherever the source permits it.
pub struct ChainWriter {
    chain: Chain,
}

impl ChainWriter {
    /// An empty writer.
    pub fn new() -> Self {
        ChainWriter { chain: Chain::new() }
    }

    /// Consumes the writer, returning everything written so far.
    pub fn into_chain(self) -> Chain {
        self.chain
    }

    /// Reserves writable space directly in the chain, as
    /// [`Chain::append_buffer`] does; callers must fill every byte
    /// returned.
    pub fn push(&mut self, min: usize, hint: usize, max: usize, options: &Options) -> &mut [u8] {
        self.chain.append_buffer(min, hint, max, options)
    }
}

impl Default for ChainWriter {
    fn default() -> Self {
        ChainWriter::new()
    }
}

impl Writer for ChainWriter {
    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        self.chain.append(bytes);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn pos(&self) -> u64 {
        self.chain.size() as u64
    }

    fn write_chain(&mut self, chain: &Chain) -> Result<()> {
        self.chain.append_chain(chain);
        Ok(())
    }
}

/// A [`Writer`] over a file, buffered through [`std::io::BufWriter`].
pub struct FileWriter {
    path: Option<std::path::PathBuf>,
    inner: std::io::BufWriter<std::fs::File>,
    pos: u64,
}

impl FileWriter {
    /// Creates (or truncates) `path` for buffered sequential writing.
    pub fn create(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file =
            std::fs::File::create(&path).map_err(|e| Error::io(Some(path.clone()), 0, e))?;
        Ok(FileWriter { path: Some(path), inner: std::io::BufWriter::new(file), pos: 0 })
    }
}

impl Writer for FileWriter {
    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        use std::io::Write;
        self.inner
            .write_all(bytes)
            .map_err(|e| Error::io(self.path.clone(), self.pos, e))?;
        self.pos += bytes.len() as u64;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        use std::io::Write;
        self.inner.flush().map_err(|e| Error::io(self.path.clone(), self.pos, e))
    }

    fn pos(&self) -> u64 {
        self.pos
    }
}
