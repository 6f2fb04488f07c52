//! Smart HTTP client side of the Git pack protocol: pkt-line framing, ref
//! discovery, want negotiation, and pack unpacking into a local repository.

pub mod fetch;
pub mod http;
pub mod pkt;
pub mod types;

pub use fetch::FetchClient;
pub use http::{HttpTransport, RemoteTransport};
pub use types::{DiscoveredRefs, GitRef, ProtocolError, ServiceType};
