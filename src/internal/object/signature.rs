//! Identity lines embedded in commit objects: `author` and `committer`, each
//! carrying a name, an email, a unix timestamp, and a timezone offset.

use std::fmt::Display;

use bstr::ByteSlice;
use serde::{Deserialize, Serialize};

use crate::errors::GitError;

/// Which identity line a signature belongs to. The tag is part of the encoding,
/// so decoding validates it and encoding writes it back out.
#[derive(PartialEq, Eq, Debug, Hash, Ord, PartialOrd, Clone, Copy, Serialize, Deserialize)]
pub enum SignatureType {
    Author,
    Committer,
}

impl Display for SignatureType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            SignatureType::Author => write!(f, "author"),
            SignatureType::Committer => write!(f, "committer"),
        }
    }
}

impl SignatureType {
    pub fn from_data(data: &[u8]) -> Result<SignatureType, GitError> {
        match data {
            b"author" => Ok(SignatureType::Author),
            b"committer" => Ok(SignatureType::Committer),
            _ => Err(GitError::InvalidSignatureType(
                String::from_utf8_lossy(data).to_string(),
            )),
        }
    }
}

/// One identity line: `<tag> <name> <<email>> <unix-seconds> <±HHMM>`.
#[derive(PartialEq, Eq, Debug, Hash, Ord, PartialOrd, Clone, Serialize, Deserialize)]
pub struct Signature {
    pub signature_type: SignatureType,
    pub name: String,
    pub email: String,
    pub timestamp: usize,
    pub timezone: String,
}

impl Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} <{}> {} {}",
            self.name, self.email, self.timestamp, self.timezone
        )
    }
}

impl Signature {
    /// Build a signature with an explicit identity and the current time.
    /// Identity is always passed in by the caller, never read from ambient
    /// process state.
    pub fn new(signature_type: SignatureType, name: String, email: String) -> Signature {
        Signature {
            signature_type,
            name,
            email,
            timestamp: chrono::Utc::now().timestamp() as usize,
            timezone: "+0000".to_string(),
        }
    }

    /// Parse one identity line, e.g.
    /// `author Eli <eli@example.com> 1678101573 +0800`.
    pub fn from_data(data: Vec<u8>) -> Result<Signature, GitError> {
        let invalid = || GitError::InvalidSignatureType(String::from_utf8_lossy(&data).to_string());

        let tag_end = data.find_byte(b' ').ok_or_else(invalid)?;
        let signature_type = SignatureType::from_data(&data[..tag_end])?;
        let rest = &data[tag_end + 1..];

        // The name may itself contain spaces, so anchor on the email brackets.
        let email_start = rest.find_byte(b'<').ok_or_else(invalid)?;
        let email_end = rest.find_byte(b'>').ok_or_else(invalid)?;
        if email_end < email_start || email_start == 0 {
            return Err(invalid());
        }
        let name = rest[..email_start - 1].to_str().map_err(|_| invalid())?;
        let email = rest[email_start + 1..email_end]
            .to_str()
            .map_err(|_| invalid())?;

        let mut tail = rest[email_end + 1..]
            .to_str()
            .map_err(|_| invalid())?
            .split_whitespace();
        let timestamp = tail
            .next()
            .and_then(|t| t.parse::<usize>().ok())
            .ok_or_else(invalid)?;
        let timezone = tail.next().ok_or_else(invalid)?.to_string();

        Ok(Signature {
            signature_type,
            name: name.to_string(),
            email: email.to_string(),
            timestamp,
            timezone,
        })
    }

    pub fn to_data(&self) -> Result<Vec<u8>, GitError> {
        let mut sign = Vec::new();
        sign.extend_from_slice(self.signature_type.to_string().as_bytes());
        sign.extend_from_slice(b" ");
        sign.extend_from_slice(self.name.as_bytes());
        sign.extend_from_slice(b" <");
        sign.extend_from_slice(self.email.as_bytes());
        sign.extend_from_slice(b"> ");
        sign.extend_from_slice(self.timestamp.to_string().as_bytes());
        sign.extend_from_slice(b" ");
        sign.extend_from_slice(self.timezone.as_bytes());
        Ok(sign)
    }
}
