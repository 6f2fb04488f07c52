//! Internal building blocks (object model, pack decoding, zlib streams) that power
//! the public APIs.

pub mod object;
pub mod pack;
pub mod zlib;
