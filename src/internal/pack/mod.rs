//! Pack container decoding: header parsing, per-entry headers, inflate wiring,
//! and the byte-counting stream wrapper, following the
//! [pack-format spec](https://git-scm.com/docs/pack-format).

pub mod decode;
pub mod entry;
pub mod utils;
pub mod wrapper;

use crate::hash::ObjectHash;

/// Representation of a Git pack stream in memory: what the header declared and,
/// after decoding, the trailer checksum actually observed.
pub struct Pack {
    pub number: usize,
    pub version: u32,
    pub signature: ObjectHash,
}
