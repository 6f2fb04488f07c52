//! Smart HTTP transport for the pack protocol, over blocking `ureq`.

use std::time::Duration;

use bytes::Bytes;
use ureq::Agent;

use super::types::{ProtocolError, ServiceType};

/// Maximum response body size accepted from a remote, pack included.
const MAX_RESPONSE_BYTES: u64 = 1024 * 1024 * 1024;

const USER_AGENT: &str = concat!("packfetch/", env!("CARGO_PKG_VERSION"));

/// The two wire exchanges a fetch needs. Implementations carry the actual
/// transport; tests substitute canned bytes.
pub trait RemoteTransport {
    /// `GET {repo_url}/info/refs?service=...`, returning the advertisement
    /// body as-is.
    fn info_refs(&self, repo_url: &str, service: ServiceType) -> Result<Bytes, ProtocolError>;

    /// `POST {repo_url}/git-upload-pack` with a want request, returning the
    /// acknowledgement and pack bytes.
    fn upload_pack(&self, repo_url: &str, request: Bytes) -> Result<Bytes, ProtocolError>;
}

/// Smart HTTP client speaking to real servers.
pub struct HttpTransport {
    agent: Agent,
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new(Duration::from_secs(60))
    }
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> HttpTransport {
        let agent: Agent = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .into();
        HttpTransport { agent }
    }

    fn read_body(
        res: &mut ureq::http::Response<ureq::Body>,
        context: &str,
    ) -> Result<Bytes, ProtocolError> {
        if !res.status().is_success() {
            return Err(ProtocolError::Transport(format!(
                "{context} failed with HTTP {}",
                res.status()
            )));
        }
        let body = res
            .body_mut()
            .with_config()
            .limit(MAX_RESPONSE_BYTES)
            .read_to_vec()
            .map_err(|e| ProtocolError::Transport(format!("{context}: {e}")))?;
        Ok(Bytes::from(body))
    }

    fn content_type(res: &ureq::http::Response<ureq::Body>) -> Option<String> {
        res.headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string())
    }
}

impl RemoteTransport for HttpTransport {
    fn info_refs(&self, repo_url: &str, service: ServiceType) -> Result<Bytes, ProtocolError> {
        let url = format!("{}/info/refs?service={service}", repo_url.trim_end_matches('/'));
        tracing::debug!("GET {url}");
        let mut res = self
            .agent
            .get(&url)
            .header("User-Agent", USER_AGENT)
            .call()
            .map_err(|e| ProtocolError::Transport(format!("info/refs: {e}")))?;

        // A dumb-protocol server answers with a plain text listing; only the
        // smart advertisement is parseable here.
        let expected = format!("application/x-{service}-advertisement");
        match Self::content_type(&res) {
            Some(ct) if ct.starts_with(&expected) => {}
            other => {
                return Err(ProtocolError::InvalidService(format!(
                    "server did not speak the smart protocol (content-type {other:?})"
                )));
            }
        }
        Self::read_body(&mut res, "info/refs")
    }

    fn upload_pack(&self, repo_url: &str, request: Bytes) -> Result<Bytes, ProtocolError> {
        let service = ServiceType::UploadPack;
        let url = format!("{}/{service}", repo_url.trim_end_matches('/'));
        tracing::debug!("POST {url} ({} request bytes)", request.len());
        let mut res = self
            .agent
            .post(&url)
            .header("User-Agent", USER_AGENT)
            .header("Content-Type", format!("application/x-{service}-request"))
            .header("Accept", format!("application/x-{service}-result"))
            .send(&request[..])
            .map_err(|e| ProtocolError::Transport(format!("upload-pack: {e}")))?;
        Self::read_body(&mut res, "upload-pack")
    }
}
