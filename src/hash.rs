//! In Git, the SHA-1 hash algorithm is used to generate unique identifiers for Git
//! objects. Each object corresponds to a unique SHA-1 hash value, which is used to
//! identify the object's location in the loose store and inside tree entries.

use std::{fmt::Display, io, str::FromStr};

use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

use crate::internal::object::types::ObjectType;

/// The [`ObjectHash`] struct, encapsulating a `[u8; 20]` array, represents Git hash
/// IDs: 40-character hexadecimal strings generated via the SHA-1 algorithm. Each
/// object receives a unique hash ID based on its canonical encoded content, serving
/// as its address within the object store. The raw 20-byte form is what gets
/// embedded inside tree entries and pack ref-delta headers.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Deserialize, Serialize,
)]
pub struct ObjectHash(pub [u8; 20]);

impl Display for ObjectHash {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl AsRef<[u8]> for ObjectHash {
    fn as_ref(&self) -> &[u8] {
        self.0.as_slice()
    }
}

/// The input string must be a pre-calculated 40-character hexadecimal string.
impl FromStr for ObjectHash {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 40 {
            return Err("Invalid hash length".to_string());
        }
        let bytes = hex::decode(s).map_err(|e| e.to_string())?;
        let mut h = [0u8; 20];
        h.copy_from_slice(bytes.as_slice());
        Ok(ObjectHash(h))
    }
}

impl ObjectHash {
    /// Calculates the SHA-1 hash of the given data.
    pub fn new(data: &[u8]) -> ObjectHash {
        let digest = Sha1::digest(data);
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(digest.as_ref());
        ObjectHash(bytes)
    }

    /// Create an ObjectHash from an object type and its body, hashing the full
    /// canonical record `"<kind> <size>\0<body>"`.
    pub fn from_type_and_data(object_type: ObjectType, data: &[u8]) -> Result<ObjectHash, crate::errors::GitError> {
        let mut d: Vec<u8> = Vec::with_capacity(data.len() + 16);
        d.extend(object_type.to_bytes()?);
        d.push(b' ');
        d.extend(data.len().to_string().as_bytes());
        d.push(b'\x00');
        d.extend(data);
        Ok(ObjectHash::new(&d))
    }

    /// Create an ObjectHash from a 20-byte slice.
    pub fn from_bytes(bytes: &[u8]) -> Result<ObjectHash, String> {
        if bytes.len() != 20 {
            return Err(format!(
                "Invalid byte length: got {}, expected 20",
                bytes.len()
            ));
        }
        let mut h = [0u8; 20];
        h.copy_from_slice(bytes);
        Ok(ObjectHash(h))
    }

    /// Read a raw 20-byte hash from a stream, as it appears inside tree entries
    /// and pack ref-delta headers.
    pub fn from_stream(data: &mut impl io::Read) -> io::Result<ObjectHash> {
        let mut h = [0u8; 20];
        data.read_exact(&mut h)?;
        Ok(ObjectHash(h))
    }

    /// Export the hash value to a byte vector.
    pub fn to_data(self) -> Vec<u8> {
        self.0.to_vec()
    }

    /// [`core::fmt::Display`] is somewhat expensive,
    /// use this hack to get a string more efficiently.
    pub fn _to_string(&self) -> String {
        hex::encode(self.0)
    }
}
