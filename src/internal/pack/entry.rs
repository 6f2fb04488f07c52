//! Lightweight representation of a decoded Git object coming out of a pack
//! stream.

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::{hash::ObjectHash, internal::object::types::ObjectType};

/// One decoded pack entry: its kind, the raw body, and the id computed over
/// the canonical record while the entry streamed through.
#[derive(Eq, Clone, Debug, Serialize, Deserialize)]
pub struct Entry {
    pub obj_type: ObjectType,
    pub data: Vec<u8>,
    pub hash: ObjectHash,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.obj_type == other.obj_type && self.hash == other.hash
    }
}

impl Hash for Entry {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.obj_type.hash(state);
        self.hash.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::Entry;
    use crate::{hash::ObjectHash, internal::object::types::ObjectType};

    #[test]
    fn identity_is_type_and_hash() {
        let id = ObjectHash::from_type_and_data(ObjectType::Blob, b"same body").unwrap();
        let a = Entry {
            obj_type: ObjectType::Blob,
            data: b"same body".to_vec(),
            hash: id,
        };
        let mut b = a.clone();
        b.data.clear();
        assert_eq!(a, b);

        let c = Entry {
            obj_type: ObjectType::Tree,
            ..a.clone()
        };
        assert_ne!(a, c);
    }
}
