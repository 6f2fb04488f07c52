//! Packfetch: a Rust library for Git's internal data layer and the client half
//! of the smart transfer protocol: content-addressed objects, loose storage,
//! pack decoding, and ref-delta reconstruction.
//!
//! Goals
//! - Faithful byte-level encoding/decoding of blob, tree, and commit objects.
//! - A loose object store keyed by SHA-1 with transparent zlib compression.
//! - A blocking smart-HTTP client: ref discovery, want/done negotiation, pack
//!   container parsing, and delta resolution against already-stored bases.
//!
//! Modules
//! - `internal::object`: Blob/Tree/Commit objects, type enum, object trait.
//! - `internal::pack`: pack container decoding, entry types, hashing wrappers.
//! - `internal::zlib`: exact-consumption inflate streams.
//! - `delta`: ref-delta instruction decoding.
//! - `storage`: the loose object store.
//! - `repository`: on-disk repository layout and checkout.
//! - `protocol`: pkt-line codec, transports, and the clone state machine.
//! - `errors`: unified error types.
//! - `hash`: SHA-1 object identifiers.
//!
//! Typical Usage
//! - `FetchClient::new(HttpTransport::default()).clone_into(url, dest)` clones a
//!   remote repository into `dest`, storing every object and checking out the
//!   default branch.
//! - `LooseStore` and the object types can also be used directly for local
//!   plumbing without any network involvement.

pub mod delta;
pub mod errors;
pub mod hash;
pub mod internal;
pub mod protocol;
pub mod repository;
pub mod storage;

// Core types that external users reach for first
pub use errors::GitError;
pub use hash::ObjectHash;
pub use protocol::{FetchClient, HttpTransport, ProtocolError, RemoteTransport, ServiceType};
pub use repository::Repository;
pub use storage::LooseStore;
