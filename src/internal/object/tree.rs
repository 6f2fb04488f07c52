//! The Tree object represents one directory level: an ordered set of entries, each
//! naming a child object by mode, name, and raw 20-byte hash.
//!
//! Entry order is load-bearing. Entries are serialized sorted by name using
//! byte-wise ordering, so two trees holding the same entries in different
//! insertion order produce identical bytes and therefore the same hash. A child
//! hash is plain data (an index into the store), not an owning pointer: children
//! are loaded lazily by hash on demand, which keeps the object graph acyclic in
//! memory.

use std::fmt::Display;

use bstr::ByteSlice;
use serde::{Deserialize, Serialize};

use crate::{
    errors::GitError,
    hash::ObjectHash,
    internal::object::{ObjectTrait, types::ObjectType},
};

/// The file mode of a tree entry, as the decimal string Git writes on the wire.
///
/// Note that directories serialize as `40000`, not the zero-padded `040000` shown
/// by porcelain tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TreeItemMode {
    Blob,
    BlobExecutable,
    Link,
    Tree,
    Commit,
}

impl Display for TreeItemMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let _print = match *self {
            TreeItemMode::Blob => "100644",
            TreeItemMode::BlobExecutable => "100755",
            TreeItemMode::Link => "120000",
            TreeItemMode::Tree => "40000",
            TreeItemMode::Commit => "160000",
        };
        write!(f, "{_print}")
    }
}

impl TreeItemMode {
    pub fn to_bytes(self) -> &'static [u8] {
        match self {
            TreeItemMode::Blob => b"100644",
            TreeItemMode::BlobExecutable => b"100755",
            TreeItemMode::Link => b"120000",
            TreeItemMode::Tree => b"40000",
            TreeItemMode::Commit => b"160000",
        }
    }

    pub fn tree_item_type_from_bytes(mode: &[u8]) -> Result<TreeItemMode, GitError> {
        Ok(match mode {
            b"100644" | b"644" => TreeItemMode::Blob,
            b"100755" | b"755" => TreeItemMode::BlobExecutable,
            b"120000" => TreeItemMode::Link,
            b"40000" | b"040000" => TreeItemMode::Tree,
            b"160000" => TreeItemMode::Commit,
            _ => {
                return Err(GitError::InvalidTreeItem(
                    String::from_utf8_lossy(mode).to_string(),
                ));
            }
        })
    }

    /// The object kind an entry of this mode references: directories point at
    /// trees, submodules at external commits, everything else at blobs.
    pub fn object_type(self) -> ObjectType {
        match self {
            TreeItemMode::Tree => ObjectType::Tree,
            TreeItemMode::Commit => ObjectType::Commit,
            _ => ObjectType::Blob,
        }
    }

    pub fn is_executable(self) -> bool {
        self == TreeItemMode::BlobExecutable
    }
}

/// One entry: `"<mode> <name>\0"` followed by the child's raw 20-byte hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeItem {
    pub mode: TreeItemMode,
    pub id: ObjectHash,
    pub name: String,
}

impl TreeItem {
    pub fn new(mode: TreeItemMode, id: ObjectHash, name: String) -> TreeItem {
        TreeItem { mode, id, name }
    }

    pub fn to_data(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(self.name.len() + 28);
        data.extend_from_slice(self.mode.to_bytes());
        data.push(b' ');
        data.extend_from_slice(self.name.as_bytes());
        data.push(b'\x00');
        data.extend_from_slice(self.id.as_ref());
        data
    }
}

/// A directory listing, addressed by the SHA-1 of `"tree <size>\0<entries>"`.
#[derive(Eq, Debug, Clone, Serialize, Deserialize)]
pub struct Tree {
    pub id: ObjectHash,
    pub tree_items: Vec<TreeItem>,
}

impl PartialEq for Tree {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Display for Tree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Type: Tree: {}", self.id)?;
        for item in &self.tree_items {
            writeln!(f, "{} {} {}", item.mode, item.id, item.name)?;
        }
        Ok(())
    }
}

impl Tree {
    /// Build a tree from entries, sorting them by name bytes so that insertion
    /// order never leaks into the serialized form.
    pub fn from_tree_items(mut tree_items: Vec<TreeItem>) -> Result<Tree, GitError> {
        if tree_items.is_empty() {
            return Err(GitError::InvalidTreeObject(
                "a tree must have at least one entry".to_string(),
            ));
        }
        tree_items.sort_by(|a, b| a.name.as_bytes().cmp(b.name.as_bytes()));

        let mut body = Vec::new();
        for item in &tree_items {
            body.extend(item.to_data());
        }
        let id = ObjectHash::from_type_and_data(ObjectType::Tree, &body)?;
        Ok(Tree { id, tree_items })
    }
}

impl ObjectTrait for Tree {
    /// Parse tree body bytes: each entry is mode, space, name, NUL, then exactly
    /// 20 raw hash bytes. The hash bytes are binary and may contain spaces or
    /// NULs, so the scan is strictly positional.
    fn from_bytes(data: &[u8], hash: ObjectHash) -> Result<Self, GitError> {
        let mut tree_items = Vec::new();
        let mut i = 0;
        while i < data.len() {
            let space = data[i..]
                .find_byte(b' ')
                .map(|p| i + p)
                .ok_or_else(|| GitError::InvalidTreeItem("entry missing mode".to_string()))?;
            let mode = TreeItemMode::tree_item_type_from_bytes(&data[i..space])?;

            let nul = data[space + 1..].find_byte(b'\x00').map(|p| space + 1 + p).ok_or_else(
                || GitError::InvalidTreeItem("entry name missing null terminator".to_string()),
            )?;
            let name = data[space + 1..nul]
                .to_str()
                .map_err(|_| GitError::InvalidTreeItem("entry name is not utf-8".to_string()))?
                .to_string();

            if data.len() < nul + 1 + 20 {
                return Err(GitError::InvalidTreeItem(format!(
                    "entry `{name}` truncated before its hash"
                )));
            }
            let id = ObjectHash::from_bytes(&data[nul + 1..nul + 21])
                .map_err(GitError::InvalidHashValue)?;

            tree_items.push(TreeItem::new(mode, id, name));
            i = nul + 21;
        }

        if tree_items.is_empty() {
            return Err(GitError::InvalidTreeObject(
                "a tree must have at least one entry".to_string(),
            ));
        }

        Ok(Tree {
            id: hash,
            tree_items,
        })
    }

    fn get_type(&self) -> ObjectType {
        ObjectType::Tree
    }

    fn get_size(&self) -> usize {
        self.tree_items
            .iter()
            .map(|item| item.name.len() + item.mode.to_bytes().len() + 22)
            .sum()
    }

    fn to_data(&self) -> Result<Vec<u8>, GitError> {
        let mut data = Vec::new();
        for item in &self.tree_items {
            data.extend(item.to_data());
        }
        Ok(data)
    }
}
