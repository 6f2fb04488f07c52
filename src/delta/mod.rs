//! Git-style delta streams: varint helpers and the instruction decoder that
//! rebuilds a target object from a base buffer.

pub mod decode;
pub mod utils;

pub use decode::delta_decode;
