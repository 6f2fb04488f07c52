use std::fmt;
use std::str::FromStr;

use crate::hash::ObjectHash;

/// Protocol error types
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("Invalid service: {0}")]
    InvalidService(String),

    #[error("Invalid pkt-line: {0}")]
    InvalidPktLine(String),

    #[error("Invalid ref discovery: {0}")]
    InvalidRefDiscovery(String),

    #[error("Ref not found: {0}")]
    RefNotFound(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Pack error: {0}")]
    Pack(#[from] crate::errors::GitError),
}

impl ProtocolError {
    pub fn invalid_pkt_line(msg: impl Into<String>) -> Self {
        ProtocolError::InvalidPktLine(msg.into())
    }

    pub fn invalid_discovery(msg: impl Into<String>) -> Self {
        ProtocolError::InvalidRefDiscovery(msg.into())
    }
}

/// Git service types for the smart protocol. Only fetching is spoken here, so
/// `git-receive-pack` is rejected at parse time.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum ServiceType {
    UploadPack,
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ServiceType::UploadPack => write!(f, "git-upload-pack"),
        }
    }
}

impl FromStr for ServiceType {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "git-upload-pack" => Ok(ServiceType::UploadPack),
            _ => Err(ProtocolError::InvalidService(s.to_string())),
        }
    }
}

/// Git reference information
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GitRef {
    pub name: String,
    pub hash: ObjectHash,
}

/// The advertisement a server sends in response to `info/refs`: every ref with
/// its tip, the capability list from the first ref line, and the branch `HEAD`
/// symbolically points at if the server declared one.
#[derive(Debug, Clone, Default)]
pub struct DiscoveredRefs {
    pub refs: Vec<GitRef>,
    pub capabilities: Vec<String>,
    pub head_symref: Option<String>,
}

impl DiscoveredRefs {
    /// Tip hash for a fully qualified ref name.
    pub fn resolve(&self, ref_name: &str) -> Option<ObjectHash> {
        self.refs
            .iter()
            .find(|r| r.name == ref_name)
            .map(|r| r.hash)
    }

    /// The branch to clone: the `symref=HEAD:...` target when advertised,
    /// otherwise the first `refs/heads/` ref in advertisement order.
    pub fn default_branch(&self) -> Option<String> {
        if let Some(target) = &self.head_symref {
            return Some(target.clone());
        }
        self.refs
            .iter()
            .find(|r| r.name.starts_with("refs/heads/"))
            .map(|r| r.name.clone())
    }
}

pub const PKT_LINE_END_MARKER: &[u8; 4] = b"0000";
