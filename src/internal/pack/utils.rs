//! Bit-level readers for pack entry headers.

use std::io::{self, Read};

use crate::internal::object::types::ObjectType;

/// Read the first byte of an entry header: bit 7 is the continuation flag,
/// bits 4-6 the object type tag, bits 0-3 the low size bits.
fn read_type_byte<R: Read>(stream: &mut R) -> io::Result<(u8, u8, bool)> {
    let mut buf = [0u8; 1];
    stream.read_exact(&mut buf)?;
    let byte = buf[0];
    let type_id = (byte >> 4) & 0b0111;
    let low_size = byte & 0b1111;
    let more = byte & 0b1000_0000 != 0;
    Ok((type_id, low_size, more))
}

/// Read an entry's object type and inflated size.
///
/// The size varint is little-endian: the first byte contributes 4 bits, every
/// continuation byte contributes 7 more at increasing shifts. The size must
/// fit a `usize`, so an overlong continuation run is malformed input.
pub fn read_type_and_varint_size<R: Read>(stream: &mut R) -> io::Result<(u8, usize)> {
    let (type_id, low_size, mut more) = read_type_byte(stream)?;
    let mut size = low_size as usize;
    let mut shift = 4u32;
    while more {
        if shift > usize::BITS - 7 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "entry size varint does not fit in a usize",
            ));
        }
        let mut buf = [0u8; 1];
        stream.read_exact(&mut buf)?;
        size |= ((buf[0] & 0x7f) as usize) << shift;
        shift += 7;
        more = buf[0] & 0x80 != 0;
    }
    Ok((type_id, size))
}

/// Same as [`read_type_and_varint_size`] but maps the 3-bit tag to an
/// [`ObjectType`], rejecting the reserved tags 0 and 5.
pub fn read_entry_header<R: Read>(stream: &mut R) -> io::Result<(ObjectType, usize)> {
    let (type_id, size) = read_type_and_varint_size(stream)?;
    let obj_type = ObjectType::from_u8(type_id)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;
    Ok((obj_type, size))
}

/// Consume an offset-delta base offset without interpreting it. The encoding
/// is big-endian 7-bit groups with an msb continuation flag, distinct from the
/// size varint above; it only needs to be skipped so the entry boundary stays
/// intact.
pub fn skip_offset_encoding<R: Read>(stream: &mut R) -> io::Result<()> {
    loop {
        let mut buf = [0u8; 1];
        stream.read_exact(&mut buf)?;
        if buf[0] & 0x80 == 0 {
            return Ok(());
        }
    }
}
