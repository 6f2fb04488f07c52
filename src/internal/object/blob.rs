//! The Blob object wraps an opaque byte payload, i.e. the contents of one file.
//! It has no internal structure: the body of the canonical record is the payload
//! verbatim, and the identity of a blob is entirely determined by those bytes.

use std::{fmt::Display, fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    errors::GitError,
    hash::ObjectHash,
    internal::object::{ObjectTrait, types::ObjectType},
};

/// A file's content, addressed by the SHA-1 of `"blob <size>\0<content>"`.
#[derive(Eq, Debug, Clone, Serialize, Deserialize)]
pub struct Blob {
    pub id: ObjectHash,
    pub data: Vec<u8>,
}

impl PartialEq for Blob {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Display for Blob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Type: Blob")?;
        writeln!(f, "Size: {}", self.data.len())
    }
}

impl Blob {
    /// Create a blob from in-memory content, computing its hash eagerly.
    pub fn from_content(content: &str) -> Blob {
        Self::from_content_bytes(content.as_bytes().to_vec())
    }

    /// Create a blob from raw bytes, computing its hash eagerly.
    pub fn from_content_bytes(data: Vec<u8>) -> Blob {
        // Infallible: Blob always has a valid header tag.
        let id = ObjectHash::from_type_and_data(ObjectType::Blob, &data)
            .expect("blob header tag is always encodable");
        Blob { id, data }
    }

    /// Create a blob from a file on disk (the local plumbing path).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Blob, GitError> {
        let data = fs::read(path)?;
        Ok(Self::from_content_bytes(data))
    }
}

impl ObjectTrait for Blob {
    fn from_bytes(data: &[u8], hash: ObjectHash) -> Result<Self, GitError> {
        Ok(Blob {
            id: hash,
            data: data.to_vec(),
        })
    }

    fn get_type(&self) -> ObjectType {
        ObjectType::Blob
    }

    fn get_size(&self) -> usize {
        self.data.len()
    }

    fn to_data(&self) -> Result<Vec<u8>, GitError> {
        Ok(self.data.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use crate::{
        hash::ObjectHash,
        internal::object::{ObjectTrait, blob::Blob},
    };

    #[test]
    fn from_content_computes_known_hash() {
        // `echo -n "Hello, World!" | git hash-object --stdin`
        let blob = Blob::from_content("Hello, World!");
        assert_eq!(
            blob.id,
            ObjectHash::from_str("b45ef6fec89518d314f546fd6c3025367b721684").unwrap()
        );
        assert_eq!(blob.get_size(), 13);
    }

    #[test]
    fn hash_is_stable_across_recomputation() {
        let blob = Blob::from_content("hello\n");
        assert_eq!(blob.object_hash().unwrap(), blob.id);
        assert_eq!(blob.object_hash().unwrap(), blob.object_hash().unwrap());
    }

    #[test]
    fn from_file_matches_in_memory_content() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("data.txt");
        std::fs::write(&path, b"file-backed blob").unwrap();

        let from_file = Blob::from_file(&path).unwrap();
        let from_memory = Blob::from_content("file-backed blob");
        assert_eq!(from_file, from_memory);
    }

    #[test]
    fn from_bytes_round_trip() {
        let blob = Blob::from_content("hello\n");
        let again = Blob::from_bytes(&blob.to_data().unwrap(), blob.id).unwrap();
        assert_eq!(again, blob);
        assert_eq!(again.data, b"hello\n");
    }
}
