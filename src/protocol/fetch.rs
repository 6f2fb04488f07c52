//! The fetch client: drives ref discovery, want negotiation, pack unpacking,
//! and delta resolution into a local repository.

use std::path::Path;

use bstr::ByteSlice;
use bytes::{Bytes, BytesMut};

use super::{
    http::RemoteTransport,
    pkt::{PktLine, add_flush_pkt, add_pkt_line_string, read_pkt_line},
    types::{DiscoveredRefs, GitRef, ProtocolError, ServiceType},
};
use crate::{
    errors::GitError,
    hash::ObjectHash,
    internal::{
        object::types::ObjectType,
        pack::{Pack, decode::PackObject},
    },
    repository::Repository,
    storage::LooseStore,
};

/// What a clone did, for callers that want to report it.
#[derive(Debug)]
pub struct CloneSummary {
    pub branch: String,
    pub head: ObjectHash,
    pub objects_unpacked: usize,
    pub deltas_resolved: usize,
}

/// A pack protocol client over any [`RemoteTransport`].
pub struct FetchClient<T: RemoteTransport> {
    transport: T,
}

impl<T: RemoteTransport> FetchClient<T> {
    pub fn new(transport: T) -> FetchClient<T> {
        FetchClient { transport }
    }

    /// Fetch and parse the server's ref advertisement.
    pub fn discover_refs(&self, repo_url: &str) -> Result<DiscoveredRefs, ProtocolError> {
        let body = self
            .transport
            .info_refs(repo_url, ServiceType::UploadPack)?;
        parse_ref_discovery(body)
    }

    /// Clone `repo_url` into `dest`: discover refs, request the default
    /// branch tip, unpack the response, then write the ref and check out the
    /// working tree.
    pub fn clone_into(&self, repo_url: &str, dest: &Path) -> Result<CloneSummary, ProtocolError> {
        let discovered = self.discover_refs(repo_url)?;
        let branch = discovered.default_branch().ok_or_else(|| {
            ProtocolError::invalid_discovery("remote advertised no branches to clone")
        })?;
        let head = discovered
            .resolve(&branch)
            .ok_or_else(|| ProtocolError::RefNotFound(branch.clone()))?;
        tracing::info!("cloning {branch} ({head}) from {repo_url}");

        let repo = Repository::init(dest, &branch)?;
        let mut wants: Vec<ObjectHash> = Vec::new();
        for git_ref in &discovered.refs {
            if !wants.contains(&git_ref.hash) {
                wants.push(git_ref.hash);
            }
        }
        let request = build_want_request(&wants);
        let response = self.transport.upload_pack(repo_url, request)?;
        let (objects_unpacked, deltas_resolved) = unpack_into(repo.store(), response)?;

        repo.update_ref(&branch, &head)?;
        repo.checkout_commit(&head)?;
        tracing::info!("checked out {branch} into {}", dest.display());

        Ok(CloneSummary {
            branch,
            head,
            objects_unpacked,
            deltas_resolved,
        })
    }
}

/// Parse an `info/refs` advertisement: the service banner, a flush, the first
/// ref line carrying capabilities behind a NUL, further ref lines, and a
/// closing flush.
pub fn parse_ref_discovery(mut body: Bytes) -> Result<DiscoveredRefs, ProtocolError> {
    let banner = match read_pkt_line(&mut body)? {
        PktLine::Data(line) => line,
        PktLine::Flush => {
            return Err(ProtocolError::invalid_discovery(
                "advertisement opened with a flush packet",
            ));
        }
    };
    let banner = banner.trim_with(|c| c == '\n');
    if banner != b"# service=git-upload-pack" {
        return Err(ProtocolError::invalid_discovery(format!(
            "unexpected service banner {:?}",
            String::from_utf8_lossy(banner)
        )));
    }
    if read_pkt_line(&mut body)? != PktLine::Flush {
        return Err(ProtocolError::invalid_discovery(
            "service banner not followed by a flush packet",
        ));
    }

    let mut discovered = DiscoveredRefs::default();
    let mut first_line = true;
    loop {
        let line = match read_pkt_line(&mut body)? {
            PktLine::Data(line) => line,
            PktLine::Flush => break,
        };
        let line = line.trim_with(|c| c == '\n');

        // Only the first ref line carries the capability list.
        let (ref_part, caps) = if first_line {
            match line.find_byte(b'\0') {
                Some(pos) => (&line[..pos], Some(&line[pos + 1..])),
                None => (line, None),
            }
        } else {
            (line, None)
        };

        let space = ref_part.find_byte(b' ').ok_or_else(|| {
            ProtocolError::invalid_discovery(format!(
                "ref line without a separator: {:?}",
                String::from_utf8_lossy(ref_part)
            ))
        })?;
        let hash = ref_part[..space]
            .to_str()
            .ok()
            .and_then(|hex| hex.parse::<ObjectHash>().ok())
            .ok_or_else(|| {
                ProtocolError::invalid_discovery(format!(
                    "ref line with a malformed hash: {:?}",
                    String::from_utf8_lossy(ref_part)
                ))
            })?;
        let name = ref_part[space + 1..]
            .to_str()
            .map_err(|_| ProtocolError::invalid_discovery("ref name is not utf-8"))?
            .to_string();

        if let Some(caps) = caps {
            for cap in caps.split(|&b| b == b' ').filter(|c| !c.is_empty()) {
                let cap = String::from_utf8_lossy(cap).to_string();
                if let Some(target) = cap.strip_prefix("symref=HEAD:") {
                    discovered.head_symref = Some(target.to_string());
                }
                discovered.capabilities.push(cap);
            }
        }
        first_line = false;

        // An empty repository advertises a single placeholder ref.
        if name == "capabilities^{}" {
            continue;
        }
        discovered.refs.push(GitRef { name, hash });
    }

    if discovered.refs.is_empty() {
        return Err(ProtocolError::invalid_discovery(
            "remote repository has no refs",
        ));
    }
    Ok(discovered)
}

/// Build the upload-pack request body for a set of wanted tips: one `want`
/// line per hash, a flush, then `done`. No capabilities are requested, which
/// keeps the response a bare NAK followed by the pack.
pub fn build_want_request(wants: &[ObjectHash]) -> Bytes {
    let mut buf = BytesMut::new();
    for want in wants {
        add_pkt_line_string(&mut buf, format!("want {want}\n"));
    }
    add_flush_pkt(&mut buf);
    add_pkt_line_string(&mut buf, "done\n".to_string());
    buf.freeze()
}

/// Decode an upload-pack response into the store, in stream order. Base
/// objects are written as they arrive; a ref-delta is resolved immediately
/// against its already-stored base. A base that has not been stored yet is a
/// hard error: forward references and thin-pack bases outside the stream both
/// surface as object-not-found rather than being deferred. Returns
/// (objects stored, deltas resolved).
pub fn unpack_into(store: &LooseStore, response: Bytes) -> Result<(usize, usize), ProtocolError> {
    let mut reader = std::io::Cursor::new(response.as_ref());
    let mut stored = 0usize;
    let mut resolved = 0usize;

    Pack::decode(&mut reader, |obj| {
        match obj {
            PackObject::Base(entry) => {
                store.put(entry.obj_type, &entry.data)?;
                stored += 1;
            }
            PackObject::RefDelta { base, data } => {
                resolve_ref_delta(store, &base, &data)?;
                stored += 1;
                resolved += 1;
            }
            PackObject::Unsupported { obj_type } => {
                tracing::warn!(
                    "{}",
                    GitError::UnsupportedFeature(format!("skipping {obj_type} pack entry"))
                );
            }
        }
        Ok(())
    })?;

    Ok((stored, resolved))
}

/// Rebuild one ref-delta: the target inherits the base's object kind, and its
/// id comes from the reassembled canonical record, never the delta bytes.
fn resolve_ref_delta(
    store: &LooseStore,
    base: &ObjectHash,
    delta: &[u8],
) -> Result<ObjectType, GitError> {
    let (base_type, base_body) = store.get(base)?;
    let target = crate::delta::delta_decode(&mut std::io::Cursor::new(delta), &base_body)?;
    store.put(base_type, &target)?;
    Ok(base_type)
}

#[cfg(test)]
mod tests {
    use bytes::{Bytes, BytesMut};

    use super::{build_want_request, parse_ref_discovery};
    use crate::{
        hash::ObjectHash,
        protocol::pkt::{add_flush_pkt, add_pkt_line_string},
    };

    fn advertisement(lines: &[String]) -> Bytes {
        let mut buf = BytesMut::new();
        add_pkt_line_string(&mut buf, "# service=git-upload-pack\n".to_string());
        add_flush_pkt(&mut buf);
        for line in lines {
            add_pkt_line_string(&mut buf, line.clone());
        }
        add_flush_pkt(&mut buf);
        buf.freeze()
    }

    #[test]
    fn discovery_parses_refs_and_symref() {
        let tip = ObjectHash::new(b"tip");
        let dev = ObjectHash::new(b"dev");
        let body = advertisement(&[
            format!("{tip} HEAD\0symref=HEAD:refs/heads/main agent=git/2.43.0\n"),
            format!("{dev} refs/heads/dev\n"),
            format!("{tip} refs/heads/main\n"),
        ]);

        let discovered = parse_ref_discovery(body).unwrap();
        assert_eq!(discovered.head_symref.as_deref(), Some("refs/heads/main"));
        assert_eq!(discovered.default_branch().unwrap(), "refs/heads/main");
        assert_eq!(discovered.resolve("refs/heads/main").unwrap(), tip);
        assert_eq!(discovered.resolve("refs/heads/dev").unwrap(), dev);
        assert!(
            discovered
                .capabilities
                .iter()
                .any(|c| c == "agent=git/2.43.0")
        );
    }

    #[test]
    fn discovery_without_symref_falls_back_to_first_branch() {
        let tip = ObjectHash::new(b"tip");
        let body = advertisement(&[format!("{tip} refs/heads/trunk\n")]);
        let discovered = parse_ref_discovery(body).unwrap();
        assert_eq!(discovered.default_branch().unwrap(), "refs/heads/trunk");
    }

    #[test]
    fn discovery_rejects_wrong_banner() {
        let mut buf = BytesMut::new();
        add_pkt_line_string(&mut buf, "# service=git-receive-pack\n".to_string());
        add_flush_pkt(&mut buf);
        assert!(parse_ref_discovery(buf.freeze()).is_err());
    }

    #[test]
    fn discovery_rejects_empty_repository() {
        let zero = "0000000000000000000000000000000000000000";
        let body = advertisement(&[format!("{zero} capabilities^{{}}\0agent=git/2.43.0\n")]);
        assert!(parse_ref_discovery(body).is_err());
    }

    #[test]
    fn want_request_layout() {
        let want = ObjectHash::new(b"wanted");
        let request = build_want_request(&[want]);
        let expected = format!("0032want {want}\n00000009done\n");
        assert_eq!(request, expected.as_bytes());
    }
}
