//! Error types for the packfetch crate.
//!
//! This module defines a unified error enumeration used across object parsing,
//! pack decoding, loose storage, and delta reconstruction. It integrates with
//! `thiserror` to provide rich `Display` implementations and error source
//! chaining where applicable.
//!
//! Notes:
//! - Each variant carries contextual details via its message payload.
//! - Transport and pkt-line framing failures live in
//!   [`ProtocolError`](crate::protocol::ProtocolError) instead; it wraps this
//!   type for the storage-level failures a clone can hit.

use thiserror::Error;

#[derive(Error, Debug)]
/// Unified error enumeration for the packfetch library.
///
/// - Used across object parsing, pack decode, loose storage, and deltas.
/// - Implements `std::error::Error` via `thiserror`.
pub enum GitError {
    /// Invalid or unsupported git object type name.
    #[error("The `{0}` is not a valid git object type.")]
    InvalidObjectType(String),

    /// Malformed or unsupported blob object encoding.
    #[error("The `{0}` is not a valid git blob object.")]
    InvalidBlobObject(String),

    /// Malformed tree object.
    #[error("Not a valid git tree object: {0}")]
    InvalidTreeObject(String),

    /// Invalid tree entry (mode/name/hash).
    #[error("The `{0}` is not a valid git tree item.")]
    InvalidTreeItem(String),

    /// Invalid commit signature line.
    #[error("The `{0}` is not a valid git commit signature.")]
    InvalidSignatureType(String),

    /// Malformed commit object.
    #[error("Not a valid git commit object: {0}")]
    InvalidCommitObject(String),

    /// Invalid pack header magic or version.
    #[error("The `{0}` is not a valid pack header.")]
    InvalidPackHeader(String),

    /// Malformed or unsupported pack file.
    #[error("The `{0}` is not a valid pack file.")]
    InvalidPackFile(String),

    /// Invalid decoded object info (header tag, declared size, truncation).
    #[error("Error decode in the Object, info: {0}")]
    InvalidObjectInfo(String),

    /// Delta object reconstruction error (size mismatch, bad instruction).
    #[error("Delta Object Error Info: {0}")]
    DeltaObjectError(String),

    /// Invalid SHA-1 hash formatting or value.
    #[error("The {0} is not a valid Hash value")]
    InvalidHashValue(String),

    /// Object missing from the loose store.
    #[error("Can't find specific object: {0}")]
    ObjectNotFound(String),

    /// Entry kind the decoder recognizes but deliberately does not handle
    /// (tag objects, offset deltas). Reported and skipped, never fatal.
    #[error("Unsupported pack feature: {0}")]
    UnsupportedFeature(String),

    /// I/O error from underlying reader or writer.
    #[error("IO Error: {0}")]
    IOError(#[from] std::io::Error),
}
