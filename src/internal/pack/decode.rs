//! Streaming pack decoder.
//!
//! A pack stream is `"PACK"`, a big-endian version and entry count, `count`
//! entries back to back, and a SHA-1 trailer over everything before it. Each
//! entry is a varint header followed by one zlib stream; nothing marks where
//! the zlib stream ends, so the decoder relies on the inflater consuming
//! exactly the compressed bytes that belong to it.
//!
//! The decoder is single-pass and order-preserving: entries are handed to the
//! caller one at a time in stream order, without buffering the whole pack.

use std::io::{self, BufRead, Read};

use byteorder::{BigEndian, ReadBytesExt};

use crate::{
    errors::GitError,
    hash::ObjectHash,
    internal::{
        object::types::ObjectType,
        pack::{Pack, entry::Entry, utils, wrapper::Wrapper},
        zlib::stream::inflate::ReadBoxed,
    },
};

/// One decoded pack entry, in stream order.
pub enum PackObject {
    /// A full object: body inflated, id computed over the canonical record.
    Base(Entry),
    /// A ref-delta: instruction bytes against a base named by hash. The base
    /// may not have been seen yet; resolution is the caller's problem.
    RefDelta { base: ObjectHash, data: Vec<u8> },
    /// An entry kind the decoder consumed but does not handle (tag objects,
    /// offset deltas). The payload was skipped over; the stream stays intact.
    Unsupported { obj_type: ObjectType },
}

impl Pack {
    /// Decode a pack stream, invoking `callback` once per entry.
    ///
    /// Bytes preceding the `"PACK"` signature (protocol acknowledgement lines,
    /// for instance) are scanned past and excluded from the trailer checksum.
    /// A missing trailer is tolerated with a debug log; a present trailer that
    /// does not match the running digest fails the decode.
    pub fn decode<R, F>(reader: &mut R, mut callback: F) -> Result<Pack, GitError>
    where
        R: BufRead,
        F: FnMut(PackObject) -> Result<(), GitError>,
    {
        scan_for_signature(reader)?;

        // The trailer digest covers the signature, so splice it back in front
        // of the remaining stream before wrapping.
        let chained = io::Cursor::new(b"PACK".as_slice()).chain(reader);
        let mut pack_data = Wrapper::new(chained);

        let mut magic = [0u8; 4];
        pack_data.read_exact(&mut magic)?;
        let version = pack_data.read_u32::<BigEndian>()?;
        if version != 2 {
            return Err(GitError::InvalidPackHeader(format!(
                "unsupported pack version {version}"
            )));
        }
        let count = pack_data.read_u32::<BigEndian>()? as usize;
        tracing::debug!("pack header: version {version}, {count} objects");

        for index in 0..count {
            let (obj_type, size) = utils::read_entry_header(&mut pack_data)
                .map_err(|e| GitError::InvalidObjectInfo(format!("entry {index}: {e}")))?;

            match obj_type {
                ObjectType::Commit | ObjectType::Tree | ObjectType::Blob => {
                    let mut boxed = ReadBoxed::new(&mut pack_data, obj_type, size);
                    let data = inflate_entry(&mut boxed, size, index)?;
                    let hash = boxed.final_hash();
                    callback(PackObject::Base(Entry {
                        obj_type,
                        data,
                        hash,
                    }))?;
                }
                ObjectType::RefDelta => {
                    let base = ObjectHash::from_stream(&mut pack_data)?;
                    let mut boxed = ReadBoxed::new_for_delta(&mut pack_data);
                    let data = inflate_entry(&mut boxed, size, index)?;
                    callback(PackObject::RefDelta { base, data })?;
                }
                ObjectType::Tag | ObjectType::OffsetDelta => {
                    // Only the delta kind carries a base-offset field before
                    // its payload.
                    if !obj_type.is_base() {
                        utils::skip_offset_encoding(&mut pack_data)?;
                    }
                    // Inflate into the void so the entry boundary holds.
                    let mut boxed = ReadBoxed::new_for_delta(&mut pack_data);
                    inflate_entry(&mut boxed, size, index)?;
                    callback(PackObject::Unsupported { obj_type })?;
                }
            }
        }

        tracing::debug!(
            "decoded {count} entries from {} pack bytes",
            pack_data.bytes_read()
        );
        let signature = pack_data.final_hash();
        match ObjectHash::from_stream(&mut pack_data) {
            Ok(trailer) => {
                if trailer != signature {
                    return Err(GitError::InvalidPackFile(format!(
                        "checksum mismatch: trailer {trailer}, computed {signature}"
                    )));
                }
            }
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                tracing::debug!("pack stream ended without a trailer checksum");
            }
            Err(e) => return Err(e.into()),
        }

        Ok(Pack {
            number: count,
            version,
            signature,
        })
    }
}

/// Inflate one entry payload and check it against the declared size.
fn inflate_entry<R: BufRead>(
    boxed: &mut ReadBoxed<R>,
    size: usize,
    index: usize,
) -> Result<Vec<u8>, GitError> {
    let mut data = Vec::with_capacity(size);
    boxed.read_to_end(&mut data)?;
    if data.len() != size {
        return Err(GitError::InvalidObjectInfo(format!(
            "entry {index}: declared size {size} but inflated {} bytes",
            data.len()
        )));
    }
    Ok(data)
}

/// Discard bytes until the `"PACK"` signature has been consumed.
fn scan_for_signature(reader: &mut impl BufRead) -> Result<(), GitError> {
    let mut window = [0u8; 4];
    reader.read_exact(&mut window).map_err(|_| {
        GitError::InvalidPackHeader("stream ended before a PACK signature".to_string())
    })?;
    let mut skipped = 0usize;
    while &window != b"PACK" {
        let mut byte = [0u8; 1];
        reader.read_exact(&mut byte).map_err(|_| {
            GitError::InvalidPackHeader("stream ended before a PACK signature".to_string())
        })?;
        window.rotate_left(1);
        window[3] = byte[0];
        skipped += 1;
    }
    if skipped > 0 {
        tracing::debug!("skipped {skipped} bytes before the PACK signature");
    }
    Ok(())
}
