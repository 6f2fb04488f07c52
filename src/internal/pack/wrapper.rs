//! Reader wrapper that tracks how many bytes of a pack have been consumed while
//! keeping a running SHA-1 hash for trailer verification.

use std::io::{self, BufRead, Read};

use sha1::{Digest, Sha1};

use crate::hash::ObjectHash;

/// [`Wrapper`] is a wrapper around a reader that also computes the SHA-1 hash
/// of the data read.
///
/// It is designed to work with any reader that implements `BufRead`. Every
/// byte that passes through, whether via `read` or via `consume` from an
/// inflate stream, feeds the digest and the byte counter, so after the last
/// entry the digest equals the pack's trailer checksum and the counter marks
/// where the trailer begins.
pub struct Wrapper<R> {
    inner: R,
    hash: Sha1,
    bytes_read: usize,
}

impl<R> Wrapper<R>
where
    R: BufRead,
{
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            hash: Sha1::new(),
            bytes_read: 0,
        }
    }

    /// Returns the number of bytes read so far.
    pub fn bytes_read(&self) -> usize {
        self.bytes_read
    }

    /// Returns the SHA-1 hash of the data read so far.
    ///
    /// This is a clone of the internal hash state finalized into a SHA-1 hash.
    pub fn final_hash(&self) -> ObjectHash {
        let digest: [u8; 20] = self.hash.clone().finalize().into();
        ObjectHash(digest)
    }
}

impl<R> BufRead for Wrapper<R>
where
    R: BufRead,
{
    /// Provides access to the internal buffer of the wrapped reader without
    /// consuming it.
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.inner.fill_buf()
    }

    /// Consumes data from the buffer, feeding the digest and counter first.
    fn consume(&mut self, amt: usize) {
        // fill_buf on an already-filled BufRead returns the same buffer.
        if let Ok(buffer) = self.inner.fill_buf() {
            self.hash.update(&buffer[..amt]);
        }
        self.inner.consume(amt);
        self.bytes_read += amt;
    }
}

impl<R> Read for Wrapper<R>
where
    R: BufRead,
{
    /// Reads data into the provided buffer, feeding the digest and counter.
    /// <br> [Read::read_exact] calls it internally.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let o = self.inner.read(buf)?;
        self.hash.update(&buf[..o]);
        self.bytes_read += o;
        Ok(o)
    }
}
