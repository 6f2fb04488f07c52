//! Object type enumeration shared across the object, pack, and storage modules.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::errors::GitError;

/// In Git, each object type is assigned a unique integer value, which is used to
/// identify the type of the object inside a pack file.
///
/// * `Commit` (1): records a snapshot with author, committer, and message.
/// * `Tree` (2): represents a directory listing.
/// * `Blob` (3): stores the content of a file.
/// * `Tag` (4): marks a specific point in history; recognized but not handled.
/// * `OffsetDelta` (6): a delta whose base is named by a byte offset into the same
///   pack; recognized but not handled.
/// * `RefDelta` (7): a delta whose base is named by a raw 20-byte hash.
///
/// Only the first three produce stored objects here; tag and offset-delta entries
/// are consumed and skipped so the rest of the pack stays decodable.
#[derive(PartialEq, Eq, Hash, Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectType {
    Commit = 1,
    Tree,
    Blob,
    Tag,
    OffsetDelta = 6,
    RefDelta,
}

const COMMIT_OBJECT_TYPE: &[u8] = b"commit";
const TREE_OBJECT_TYPE: &[u8] = b"tree";
const BLOB_OBJECT_TYPE: &[u8] = b"blob";
const TAG_OBJECT_TYPE: &[u8] = b"tag";

/// Display trait for Git objects type
impl Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ObjectType::Blob => write!(f, "blob"),
            ObjectType::Tree => write!(f, "tree"),
            ObjectType::Commit => write!(f, "commit"),
            ObjectType::Tag => write!(f, "tag"),
            ObjectType::OffsetDelta => write!(f, "OffsetDelta"),
            ObjectType::RefDelta => write!(f, "RefDelta"),
        }
    }
}

impl ObjectType {
    /// The ASCII tag written into a canonical object header. Delta kinds have no
    /// header tag and error out.
    pub fn to_bytes(&self) -> Result<&'static [u8], GitError> {
        match self {
            ObjectType::Commit => Ok(COMMIT_OBJECT_TYPE),
            ObjectType::Tree => Ok(TREE_OBJECT_TYPE),
            ObjectType::Blob => Ok(BLOB_OBJECT_TYPE),
            ObjectType::Tag => Ok(TAG_OBJECT_TYPE),
            _ => Err(GitError::InvalidObjectType(self.to_string())),
        }
    }

    /// Parses a string representation of a Git object type.
    pub fn from_string(s: &str) -> Result<ObjectType, GitError> {
        match s {
            "blob" => Ok(ObjectType::Blob),
            "tree" => Ok(ObjectType::Tree),
            "commit" => Ok(ObjectType::Commit),
            "tag" => Ok(ObjectType::Tag),
            _ => Err(GitError::InvalidObjectType(s.to_string())),
        }
    }

    /// Convert the object type to its 3-bit pack header type id.
    pub fn to_u8(&self) -> u8 {
        match self {
            ObjectType::Commit => 1,
            ObjectType::Tree => 2,
            ObjectType::Blob => 3,
            ObjectType::Tag => 4,
            ObjectType::OffsetDelta => 6,
            ObjectType::RefDelta => 7,
        }
    }

    /// Decode a 3-bit pack header type id to an object type.
    pub fn from_u8(number: u8) -> Result<ObjectType, GitError> {
        match number {
            1 => Ok(ObjectType::Commit),
            2 => Ok(ObjectType::Tree),
            3 => Ok(ObjectType::Blob),
            4 => Ok(ObjectType::Tag),
            6 => Ok(ObjectType::OffsetDelta),
            7 => Ok(ObjectType::RefDelta),
            _ => Err(GitError::InvalidObjectType(format!(
                "Invalid pack object type number: {number}"
            ))),
        }
    }

    /// Whether this type carries a full object body rather than delta instructions.
    pub fn is_base(&self) -> bool {
        match self {
            ObjectType::Commit | ObjectType::Tree | ObjectType::Blob | ObjectType::Tag => true,
            ObjectType::OffsetDelta | ObjectType::RefDelta => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::internal::object::types::ObjectType;

    /// Verify ObjectType::Blob converts to its ASCII byte representation "blob".
    #[test]
    fn test_object_type_to_bytes() {
        assert_eq!(ObjectType::Blob.to_bytes().unwrap(), b"blob");
        assert_eq!(ObjectType::Commit.to_bytes().unwrap(), b"commit");
        assert!(ObjectType::RefDelta.to_bytes().is_err());
    }

    #[test]
    fn test_object_type_from_string() {
        assert_eq!(ObjectType::from_string("blob").unwrap(), ObjectType::Blob);
        assert_eq!(ObjectType::from_string("tree").unwrap(), ObjectType::Tree);
        assert_eq!(
            ObjectType::from_string("commit").unwrap(),
            ObjectType::Commit
        );
        assert_eq!(ObjectType::from_string("tag").unwrap(), ObjectType::Tag);
        assert!(ObjectType::from_string("invalid_type").is_err());
    }

    /// Pack header type ids round-trip through to_u8/from_u8.
    #[test]
    fn test_pack_type_ids() {
        for t in [
            ObjectType::Commit,
            ObjectType::Tree,
            ObjectType::Blob,
            ObjectType::Tag,
            ObjectType::OffsetDelta,
            ObjectType::RefDelta,
        ] {
            assert_eq!(ObjectType::from_u8(t.to_u8()).unwrap(), t);
        }
        assert!(ObjectType::from_u8(0).is_err());
        assert!(ObjectType::from_u8(5).is_err());
    }

    #[test]
    fn test_is_base() {
        assert!(ObjectType::Commit.is_base());
        assert!(ObjectType::Tree.is_base());
        assert!(!ObjectType::RefDelta.is_base());
        assert!(!ObjectType::OffsetDelta.is_base());
    }
}
