//! Object model definitions for Git blobs, trees, and commits, plus the trait
//! that lets callers create strongly typed values from raw body bytes.
//!
//! Every object has one canonical encoding, `"<kind> <size>\0<body>"`, and its
//! SHA-1 is always the digest of exactly those bytes. The helpers here split and
//! rebuild that record; the per-kind modules handle the body formats.

pub mod blob;
pub mod commit;
pub mod signature;
pub mod tree;
pub mod types;

use std::fmt::Display;

use bstr::ByteSlice;

use crate::{errors::GitError, hash::ObjectHash, internal::object::types::ObjectType};

/// **The Object Trait**
/// Defines the common interface for all Git object types: blobs, trees, and commits.
pub trait ObjectTrait: Send + Sync + Display {
    /// Creates a new object from the body bytes of its canonical record.
    fn from_bytes(data: &[u8], hash: ObjectHash) -> Result<Self, GitError>
    where
        Self: Sized;

    /// Returns the type of the object.
    fn get_type(&self) -> ObjectType;

    fn get_size(&self) -> usize;

    fn to_data(&self) -> Result<Vec<u8>, GitError>;

    /// Computes the object hash from serialized data.
    ///
    /// Default implementation serializes the object and computes the hash from
    /// that data. Override only if you need custom hash computation or caching.
    fn object_hash(&self) -> Result<ObjectHash, GitError> {
        let data = self.to_data()?;
        ObjectHash::from_type_and_data(self.get_type(), &data)
    }
}

/// Build the canonical on-disk record `"<kind> <size>\0<body>"` for a body.
pub fn encode_record(object_type: ObjectType, body: &[u8]) -> Result<Vec<u8>, GitError> {
    let mut record = Vec::with_capacity(body.len() + 16);
    record.extend(object_type.to_bytes()?);
    record.push(b' ');
    record.extend(body.len().to_string().as_bytes());
    record.push(b'\x00');
    record.extend(body);
    Ok(record)
}

/// Split a canonical record into its type, declared size, and body.
///
/// Takes exactly `size` bytes as the body, never "all remaining bytes": a tree
/// body contains raw hash bytes that may themselves contain null or space bytes,
/// so scanning past the declared length would corrupt it. Trailing garbage after
/// the declared size is tolerated but excluded.
pub fn parse_record(data: &[u8]) -> Result<(ObjectType, usize, &[u8]), GitError> {
    let header_end = data.find_byte(0x00).ok_or_else(|| {
        GitError::InvalidObjectInfo("object header missing null terminator".to_string())
    })?;
    let header = &data[..header_end];
    let space = header.find_byte(b' ').ok_or_else(|| {
        GitError::InvalidObjectInfo("object header missing space separator".to_string())
    })?;

    let kind = std::str::from_utf8(&header[..space])
        .map_err(|_| GitError::InvalidObjectInfo("object kind is not utf-8".to_string()))?;
    let object_type = ObjectType::from_string(kind)?;

    let size: usize = std::str::from_utf8(&header[space + 1..])
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| {
            GitError::InvalidObjectInfo("object header size is not a decimal number".to_string())
        })?;

    let body_start = header_end + 1;
    if data.len() - body_start < size {
        return Err(GitError::InvalidObjectInfo(format!(
            "object body truncated: declared {size} bytes, {} remain",
            data.len() - body_start
        )));
    }
    Ok((object_type, size, &data[body_start..body_start + size]))
}

#[cfg(test)]
mod tests {
    use super::{encode_record, parse_record};
    use crate::internal::object::types::ObjectType;

    #[test]
    fn record_round_trip() {
        let record = encode_record(ObjectType::Blob, b"hello\n").unwrap();
        assert_eq!(record, b"blob 6\0hello\n");

        let (kind, size, body) = parse_record(&record).unwrap();
        assert_eq!(kind, ObjectType::Blob);
        assert_eq!(size, 6);
        assert_eq!(body, b"hello\n");
    }

    #[test]
    fn parse_takes_exactly_declared_size() {
        // Concatenated garbage after the body must not leak into it.
        let mut record = encode_record(ObjectType::Blob, b"abc").unwrap();
        record.extend_from_slice(b"trailing");
        let (_, size, body) = parse_record(&record).unwrap();
        assert_eq!(size, 3);
        assert_eq!(body, b"abc");
    }

    #[test]
    fn parse_rejects_missing_terminator() {
        assert!(parse_record(b"blob 3abc").is_err());
    }

    #[test]
    fn parse_rejects_truncated_body() {
        assert!(parse_record(b"blob 10\0abc").is_err());
    }

    #[test]
    fn parse_rejects_unknown_kind() {
        assert!(parse_record(b"bolb 3\0abc").is_err());
    }
}
