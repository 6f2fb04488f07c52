//! The commit object records one snapshot of the project: the root tree it
//! points at, at most one parent commit, the author and committer identities,
//! and a free-form message.
//!
//! Body layout, in order:
//!
//! ```text
//! tree <40 hex>\n
//! parent <40 hex>\n        (absent on a root commit)
//! author <signature>\n
//! committer <signature>\n
//! \n
//! <message>
//! ```
//!
//! Linear history only: a commit carries zero or one parent, so merge commits
//! with multiple parent lines are rejected at parse time.

use std::fmt::Display;
use std::str::FromStr;

use bstr::ByteSlice;
use serde::{Deserialize, Serialize};

use crate::{
    errors::GitError,
    hash::ObjectHash,
    internal::object::{
        ObjectTrait,
        signature::{Signature, SignatureType},
        types::ObjectType,
    },
};

/// One snapshot in a linear history, addressed by the SHA-1 of its canonical
/// record.
#[derive(Eq, Debug, Clone, Serialize, Deserialize)]
pub struct Commit {
    pub id: ObjectHash,
    pub tree_id: ObjectHash,
    pub parent_id: Option<ObjectHash>,
    pub author: Signature,
    pub committer: Signature,
    pub message: String,
}

impl PartialEq for Commit {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Display for Commit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "tree: {}", self.tree_id)?;
        if let Some(parent) = &self.parent_id {
            writeln!(f, "parent: {parent}")?;
        }
        writeln!(f, "author {}", self.author)?;
        writeln!(f, "committer {}", self.committer)?;
        writeln!(f, "{}", self.message)
    }
}

impl Commit {
    /// Build a commit from its parts, computing the hash over the canonical
    /// encoding. The message gains a trailing newline if it lacks one, so the
    /// stored form is stable regardless of how the caller terminated it.
    pub fn new(
        author: Signature,
        committer: Signature,
        tree_id: ObjectHash,
        parent_id: Option<ObjectHash>,
        message: &str,
    ) -> Result<Commit, GitError> {
        let mut commit = Commit {
            id: ObjectHash::default(),
            tree_id,
            parent_id,
            author,
            committer,
            message: message.to_string(),
        };
        if !commit.message.ends_with('\n') {
            commit.message.push('\n');
        }
        commit.id = ObjectHash::from_type_and_data(ObjectType::Commit, &commit.to_data()?)?;
        Ok(commit)
    }

    /// Convenience constructor with an explicit identity used for both author
    /// and committer, stamped with the current time.
    pub fn from_tree_id(
        tree_id: ObjectHash,
        parent_id: Option<ObjectHash>,
        name: &str,
        email: &str,
        message: &str,
    ) -> Result<Commit, GitError> {
        let author = Signature::new(SignatureType::Author, name.to_string(), email.to_string());
        let committer = Signature::new(
            SignatureType::Committer,
            name.to_string(),
            email.to_string(),
        );
        Commit::new(author, committer, tree_id, parent_id, message)
    }
}

impl ObjectTrait for Commit {
    /// Parse a commit body. Header lines are consumed in their fixed order;
    /// everything after the first blank line is the message, kept verbatim.
    fn from_bytes(data: &[u8], hash: ObjectHash) -> Result<Self, GitError> {
        let invalid =
            |what: &str| GitError::InvalidCommitObject(format!("missing or malformed {what} line"));

        let mut rest = data;
        let mut next_line = |rest: &mut &[u8]| -> Result<Vec<u8>, GitError> {
            let end = rest
                .find_byte(b'\n')
                .ok_or_else(|| GitError::InvalidCommitObject("unterminated header".to_string()))?;
            let line = rest[..end].to_vec();
            *rest = &rest[end + 1..];
            Ok(line)
        };

        let tree_line = next_line(&mut rest)?;
        let tree_id = tree_line
            .strip_prefix(b"tree ")
            .and_then(|hex| hex.to_str().ok())
            .and_then(|hex| ObjectHash::from_str(hex).ok())
            .ok_or_else(|| invalid("tree"))?;

        let mut line = next_line(&mut rest)?;
        let parent_id = if let Some(hex) = line.strip_prefix(b"parent ") {
            let id = hex
                .to_str()
                .ok()
                .and_then(|hex| ObjectHash::from_str(hex).ok())
                .ok_or_else(|| invalid("parent"))?;
            line = next_line(&mut rest)?;
            Some(id)
        } else {
            None
        };
        if line.starts_with(b"parent ") {
            return Err(GitError::InvalidCommitObject(
                "more than one parent line".to_string(),
            ));
        }

        let author = Signature::from_data(line)?;
        if author.signature_type != SignatureType::Author {
            return Err(invalid("author"));
        }
        let committer = Signature::from_data(next_line(&mut rest)?)?;
        if committer.signature_type != SignatureType::Committer {
            return Err(invalid("committer"));
        }

        let blank = next_line(&mut rest)?;
        if !blank.is_empty() {
            return Err(GitError::InvalidCommitObject(
                "headers not followed by a blank line".to_string(),
            ));
        }
        let message = rest
            .to_str()
            .map_err(|_| GitError::InvalidCommitObject("message is not utf-8".to_string()))?
            .to_string();

        Ok(Commit {
            id: hash,
            tree_id,
            parent_id,
            author,
            committer,
            message,
        })
    }

    fn get_type(&self) -> ObjectType {
        ObjectType::Commit
    }

    fn get_size(&self) -> usize {
        self.to_data().map(|d| d.len()).unwrap_or_default()
    }

    fn to_data(&self) -> Result<Vec<u8>, GitError> {
        let mut data = Vec::new();
        data.extend(b"tree ");
        data.extend(self.tree_id._to_string().as_bytes());
        data.push(b'\n');
        if let Some(parent) = &self.parent_id {
            data.extend(b"parent ");
            data.extend(parent._to_string().as_bytes());
            data.push(b'\n');
        }
        data.extend(self.author.to_data()?);
        data.push(b'\n');
        data.extend(self.committer.to_data()?);
        data.push(b'\n');
        data.push(b'\n');
        data.extend(self.message.as_bytes());
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::Commit;
    use crate::{
        hash::ObjectHash,
        internal::object::{ObjectTrait, signature::SignatureType},
    };

    fn sample_body(parent: bool) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend(b"tree 1f7a7a472abf3dd9643fd615f6da379c4acb3e3a\n".as_slice());
        if parent {
            body.extend(b"parent 8ab686eafeb1f44702738c8b0f24f2567c36da6d\n".as_slice());
        }
        body.extend(b"author Eli Ham <eli@example.com> 1678101573 +0800\n".as_slice());
        body.extend(b"committer Eli Ham <eli@example.com> 1678101573 +0800\n".as_slice());
        body.extend(b"\nInitial commit\n".as_slice());
        body
    }

    #[test]
    fn parse_root_commit() {
        let body = sample_body(false);
        let hash = ObjectHash::new(&body);
        let commit = Commit::from_bytes(&body, hash).unwrap();
        assert_eq!(
            commit.tree_id,
            ObjectHash::from_str("1f7a7a472abf3dd9643fd615f6da379c4acb3e3a").unwrap()
        );
        assert!(commit.parent_id.is_none());
        assert_eq!(commit.author.name, "Eli Ham");
        assert_eq!(commit.committer.signature_type, SignatureType::Committer);
        assert_eq!(commit.message, "Initial commit\n");
    }

    #[test]
    fn parse_commit_with_parent() {
        let body = sample_body(true);
        let commit = Commit::from_bytes(&body, ObjectHash::new(&body)).unwrap();
        assert_eq!(
            commit.parent_id,
            Some(ObjectHash::from_str("8ab686eafeb1f44702738c8b0f24f2567c36da6d").unwrap())
        );
    }

    #[test]
    fn encode_round_trips() {
        let body = sample_body(true);
        let commit = Commit::from_bytes(&body, ObjectHash::new(&body)).unwrap();
        assert_eq!(commit.to_data().unwrap(), body);
    }

    #[test]
    fn merge_commits_are_rejected() {
        let mut body = Vec::new();
        body.extend(b"tree 1f7a7a472abf3dd9643fd615f6da379c4acb3e3a\n".as_slice());
        body.extend(b"parent 8ab686eafeb1f44702738c8b0f24f2567c36da6d\n".as_slice());
        body.extend(b"parent 943a702d06f34599aee1f8da8ef9f7296031d699\n".as_slice());
        body.extend(b"author Eli Ham <eli@example.com> 1678101573 +0800\n".as_slice());
        body.extend(b"committer Eli Ham <eli@example.com> 1678101573 +0800\n".as_slice());
        body.extend(b"\nmerge\n".as_slice());
        let err = Commit::from_bytes(&body, ObjectHash::new(&body));
        assert!(err.is_err());
    }

    #[test]
    fn swapped_signature_tags_are_rejected() {
        let mut body = Vec::new();
        body.extend(b"tree 1f7a7a472abf3dd9643fd615f6da379c4acb3e3a\n".as_slice());
        body.extend(b"committer Eli Ham <eli@example.com> 1678101573 +0800\n".as_slice());
        body.extend(b"author Eli Ham <eli@example.com> 1678101573 +0800\n".as_slice());
        body.extend(b"\nnope\n".as_slice());
        assert!(Commit::from_bytes(&body, ObjectHash::new(&body)).is_err());
    }

    #[test]
    fn new_normalizes_message_terminator() {
        let tree_id = ObjectHash::from_str("1f7a7a472abf3dd9643fd615f6da379c4acb3e3a").unwrap();
        let commit = Commit::from_tree_id(tree_id, None, "Eli Ham", "eli@example.com", "no newline")
            .unwrap();
        assert_eq!(commit.message, "no newline\n");

        let reparsed =
            Commit::from_bytes(&commit.to_data().unwrap(), commit.id).unwrap();
        assert_eq!(reparsed, commit);
    }
}
