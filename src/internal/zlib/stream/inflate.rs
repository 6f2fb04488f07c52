//! Buffered inflate reader that decodes Git's zlib-compressed objects while
//! simultaneously tracking a SHA-1 digest for content addressing.

use std::{io, io::BufRead};

use flate2::{Decompress, FlushDecompress, Status};
use sha1::{Digest, Sha1};

use crate::{hash::ObjectHash, internal::object::types::ObjectType};

/// ReadBoxed inflates one zlib DEFLATE stream out of a larger byte stream.
/// It consumes from `inner` exactly the compressed bytes that belong to this
/// stream, so the next pack entry can be read right where this one ended.
pub struct ReadBoxed<R> {
    /// The reader from which bytes should be decompressed.
    pub inner: R,
    /// The decompressor doing all the work.
    pub decompressor: Box<Decompress>,
    /// Whether the hash state is fed at all. Delta payloads are raw
    /// instruction bytes, not canonical records, so they skip hashing.
    count_hash: bool,
    /// Running SHA-1 over the canonical record, seeded with the
    /// `"<kind> <size>\0"` header so the digest equals the object's id once
    /// the body has streamed through.
    hash: Sha1,
}

impl<R> ReadBoxed<R>
where
    R: BufRead,
{
    /// New a ReadBoxed for a base object entry. The hash state is pre-seeded
    /// with the canonical header, so callers only stream the body through.
    ///
    /// Delta entries carry no canonical header; use [`Self::new_for_delta`]
    /// for those.
    pub fn new(inner: R, obj_type: ObjectType, size: usize) -> Self {
        let mut hash = Sha1::new();
        hash.update(
            obj_type
                .to_bytes()
                .expect("ReadBoxed::new called with a delta type"),
        );
        hash.update(b" ");
        hash.update(size.to_string().as_bytes());
        hash.update(b"\0");
        ReadBoxed {
            inner,
            hash,
            count_hash: true,
            decompressor: Box::new(Decompress::new(true)),
        }
    }

    /// New a ReadBoxed for a delta payload, which is hashed only after
    /// reconstruction and therefore skips the running digest.
    pub fn new_for_delta(inner: R) -> Self {
        ReadBoxed {
            inner,
            hash: Sha1::new(),
            count_hash: false,
            decompressor: Box::new(Decompress::new(true)),
        }
    }

    /// The object id accumulated so far. Valid once the whole body has been
    /// read through a hashing reader.
    pub fn final_hash(&mut self) -> ObjectHash {
        let digest = self.hash.finalize_reset();
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(digest.as_ref());
        ObjectHash(bytes)
    }
}

impl<R> io::Read for ReadBoxed<R>
where
    R: BufRead,
{
    fn read(&mut self, into: &mut [u8]) -> io::Result<usize> {
        let o = read(&mut self.inner, &mut self.decompressor, into)?;
        if self.count_hash {
            self.hash.update(&into[..o]);
        }
        Ok(o)
    }
}

/// Read bytes from `rd` and decompress them using `state` into a pre-allocated
/// fitting buffer `dst`, returning the amount of bytes written.
fn read(rd: &mut impl BufRead, state: &mut Decompress, mut dst: &mut [u8]) -> io::Result<usize> {
    let mut total_written = 0;
    loop {
        let (written, consumed, ret, eof);
        {
            let input = rd.fill_buf()?;
            eof = input.is_empty();
            let before_out = state.total_out();
            let before_in = state.total_in();
            let flush = if eof {
                FlushDecompress::Finish
            } else {
                FlushDecompress::None
            };
            ret = state.decompress(input, dst, flush);
            written = (state.total_out() - before_out) as usize;
            total_written += written;
            dst = &mut dst[written..];
            consumed = (state.total_in() - before_in) as usize;
        }
        rd.consume(consumed);

        match ret {
            // The stream has officially ended, nothing more to do here.
            Ok(Status::StreamEnd) => return Ok(total_written),
            // Either input or output are depleted even though the stream is not depleted yet.
            Ok(Status::Ok | Status::BufError) if eof || dst.is_empty() => return Ok(total_written),
            // Some progress was made in both the input and the output, it must continue to reach the end.
            Ok(Status::Ok | Status::BufError) if consumed != 0 || written != 0 => continue,
            // A strange state, where zlib makes no progress but isn't done either. Call it out.
            Ok(Status::Ok | Status::BufError) => unreachable!("Definitely a bug somewhere"),
            Err(..) => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "corrupt deflate stream",
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};

    use flate2::{Compression, write::ZlibEncoder};

    use super::*;
    use crate::hash::ObjectHash;

    fn zlib_compress(data: &[u8]) -> Vec<u8> {
        let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
        enc.write_all(data).unwrap();
        enc.finish().unwrap()
    }

    #[test]
    fn inflate_object_counts_hash() {
        let body = b"hello\n";
        let compressed = zlib_compress(body);
        let cursor = io::Cursor::new(compressed);

        let mut reader = ReadBoxed::new(cursor, ObjectType::Blob, body.len());
        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        assert_eq!(out, body);

        let expected = ObjectHash::from_type_and_data(ObjectType::Blob, body).unwrap();
        assert_eq!(reader.final_hash(), expected);
    }

    #[test]
    fn inflate_stops_at_stream_end() {
        let body = b"first stream";
        let mut compressed = zlib_compress(body);
        let tail = b"unrelated trailing bytes";
        compressed.extend_from_slice(tail);
        let mut cursor = io::Cursor::new(compressed);

        let mut reader = ReadBoxed::new_for_delta(&mut cursor);
        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        assert_eq!(out, body);

        // The trailing bytes must still be readable from the inner stream.
        let mut rest = Vec::new();
        cursor.read_to_end(&mut rest).unwrap();
        assert_eq!(rest, tail);
    }

    #[test]
    fn corrupt_stream_returns_error() {
        let data = b"not a valid zlib stream";
        let mut reader = ReadBoxed::new(io::Cursor::new(data), ObjectType::Blob, data.len());
        let mut out = [0u8; 16];
        let err = reader.read(&mut out).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }
}
