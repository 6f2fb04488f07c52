//! Loose object storage: one zlib-compressed canonical record per object,
//! sharded under `objects/` by the first two hex digits of the id.

use std::{
    fs,
    io::{Read, Write},
    path::{Path, PathBuf},
};

use flate2::{Compression, read::ZlibDecoder, write::ZlibEncoder};

use crate::{
    errors::GitError,
    hash::ObjectHash,
    internal::object::{self, types::ObjectType},
};

/// A content-addressed store rooted at an `objects/` directory.
///
/// The hex id is split after two characters into a fan-out directory and a
/// 38-character file name, so `b45ef6...` lands at `objects/b4/5ef6...`.
/// Records are compressed with zlib on disk and verified against their
/// canonical encoding when read back.
#[derive(Debug, Clone)]
pub struct LooseStore {
    root: PathBuf,
}

impl LooseStore {
    /// Open a store over an `objects/` directory. The directory is created on
    /// first write, not here.
    pub fn new(root: impl Into<PathBuf>) -> LooseStore {
        LooseStore { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, hash: &ObjectHash) -> PathBuf {
        let hex = hash._to_string();
        self.root.join(&hex[..2]).join(&hex[2..])
    }

    /// Whether an object with this id is already present.
    pub fn contains(&self, hash: &ObjectHash) -> bool {
        self.object_path(hash).is_file()
    }

    /// Write one object. The id is computed from the canonical record, never
    /// trusted from the caller. Re-storing an existing object is a no-op, so
    /// packs that repeat an object stay idempotent.
    pub fn put(&self, obj_type: ObjectType, body: &[u8]) -> Result<ObjectHash, GitError> {
        let record = object::encode_record(obj_type, body)?;
        let hash = ObjectHash::new(&record);

        let path = self.object_path(&hash);
        if path.is_file() {
            tracing::debug!("object {hash} already stored, skipping");
            return Ok(hash);
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&record)?;
        let compressed = encoder.finish()?;
        fs::write(&path, compressed)?;
        tracing::debug!("stored {obj_type} {hash} ({} bytes)", body.len());
        Ok(hash)
    }

    /// Read one object back, returning its kind and body bytes.
    pub fn get(&self, hash: &ObjectHash) -> Result<(ObjectType, Vec<u8>), GitError> {
        let path = self.object_path(hash);
        let compressed =
            fs::read(&path).map_err(|_| GitError::ObjectNotFound(hash._to_string()))?;

        let mut record = Vec::new();
        ZlibDecoder::new(compressed.as_slice())
            .read_to_end(&mut record)
            .map_err(|e| GitError::InvalidObjectInfo(format!("object {hash}: {e}")))?;

        let (obj_type, _size, body) = object::parse_record(&record)?;
        Ok((obj_type, body.to_vec()))
    }

    /// Read an object and require it to be of `expected` kind. Used where the
    /// graph dictates the kind, e.g. a commit's tree pointer.
    pub fn get_typed(
        &self,
        hash: &ObjectHash,
        expected: ObjectType,
    ) -> Result<Vec<u8>, GitError> {
        let (obj_type, body) = self.get(hash)?;
        if obj_type != expected {
            return Err(GitError::InvalidObjectInfo(format!(
                "object {hash} is a {obj_type}, expected {expected}"
            )));
        }
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::LooseStore;
    use crate::{hash::ObjectHash, internal::object::types::ObjectType};

    #[test]
    fn put_then_get_round_trips() {
        let dir = TempDir::new().unwrap();
        let store = LooseStore::new(dir.path().join("objects"));

        let hash = store.put(ObjectType::Blob, b"Hello, World!").unwrap();
        assert_eq!(
            hash._to_string(),
            "b45ef6fec89518d314f546fd6c3025367b721684"
        );
        assert!(store.contains(&hash));

        let (obj_type, body) = store.get(&hash).unwrap();
        assert_eq!(obj_type, ObjectType::Blob);
        assert_eq!(body, b"Hello, World!");
    }

    #[test]
    fn objects_are_sharded_by_hash_prefix() {
        let dir = TempDir::new().unwrap();
        let store = LooseStore::new(dir.path().join("objects"));

        let hash = store.put(ObjectType::Blob, b"shard me").unwrap();
        let hex = hash._to_string();
        let expected = dir.path().join("objects").join(&hex[..2]).join(&hex[2..]);
        assert!(expected.is_file());
    }

    #[test]
    fn put_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = LooseStore::new(dir.path().join("objects"));

        let first = store.put(ObjectType::Blob, b"same bytes").unwrap();
        let second = store.put(ObjectType::Blob, b"same bytes").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn missing_object_is_reported() {
        let dir = TempDir::new().unwrap();
        let store = LooseStore::new(dir.path().join("objects"));
        let absent = ObjectHash::new(b"never stored");
        assert!(store.get(&absent).is_err());
        assert!(!store.contains(&absent));
    }

    #[test]
    fn get_typed_enforces_kind() {
        let dir = TempDir::new().unwrap();
        let store = LooseStore::new(dir.path().join("objects"));
        let hash = store.put(ObjectType::Blob, b"a blob").unwrap();
        assert!(store.get_typed(&hash, ObjectType::Blob).is_ok());
        assert!(store.get_typed(&hash, ObjectType::Tree).is_err());
    }
}
