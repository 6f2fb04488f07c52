//! pkt-line framing: every payload is prefixed with a 4-digit hex length that
//! counts itself, and `0000` is the flush packet that closes a section.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use super::types::{PKT_LINE_END_MARKER, ProtocolError};

/// One parsed pkt-line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PktLine {
    /// A data line, payload without the length prefix.
    Data(Bytes),
    /// The `0000` flush packet.
    Flush,
}

/// Read one pkt-line off the front of `bytes`.
///
/// Any framing violation is an error: a truncated length prefix, a non-hex
/// prefix, a declared length of 1-3 (the prefix counts itself, so nothing
/// below 4 is encodable), or fewer payload bytes than declared.
pub fn read_pkt_line(bytes: &mut Bytes) -> Result<PktLine, ProtocolError> {
    if bytes.len() < 4 {
        return Err(ProtocolError::invalid_pkt_line(format!(
            "{} bytes left, even a length prefix needs 4",
            bytes.len()
        )));
    }

    let prefix = bytes.copy_to_bytes(4);
    let prefix_str = core::str::from_utf8(&prefix)
        .map_err(|_| ProtocolError::invalid_pkt_line("length prefix is not ascii hex"))?;
    let pkt_length = usize::from_str_radix(prefix_str, 16).map_err(|_| {
        ProtocolError::invalid_pkt_line(format!("length prefix `{prefix_str}` is not hex"))
    })?;

    if pkt_length == 0 {
        return Ok(PktLine::Flush);
    }
    if pkt_length < 4 {
        return Err(ProtocolError::invalid_pkt_line(format!(
            "declared length {pkt_length} is below the 4-byte minimum"
        )));
    }

    let data_length = pkt_length - 4;
    if bytes.len() < data_length {
        return Err(ProtocolError::invalid_pkt_line(format!(
            "declared {data_length} payload bytes, only {} remain",
            bytes.len()
        )));
    }
    Ok(PktLine::Data(bytes.copy_to_bytes(data_length)))
}

/// Append one pkt-line with its length prefix.
pub fn add_pkt_line_string(pkt_line_stream: &mut BytesMut, buf_str: String) {
    let buf_str_length = buf_str.len() + 4;
    pkt_line_stream.put(Bytes::from(format!("{buf_str_length:04x}")));
    pkt_line_stream.put(buf_str.as_bytes());
}

/// Append the flush packet.
pub fn add_flush_pkt(pkt_line_stream: &mut BytesMut) {
    pkt_line_stream.put(&PKT_LINE_END_MARKER[..]);
}

#[cfg(test)]
mod tests {
    use bytes::{Bytes, BytesMut};

    use super::{PktLine, add_flush_pkt, add_pkt_line_string, read_pkt_line};

    #[test]
    fn data_line_round_trip() {
        let mut buf = BytesMut::new();
        add_pkt_line_string(&mut buf, "want deadbeef\n".to_string());
        add_flush_pkt(&mut buf);
        let mut bytes = buf.freeze();

        assert_eq!(
            read_pkt_line(&mut bytes).unwrap(),
            PktLine::Data(Bytes::from_static(b"want deadbeef\n"))
        );
        assert_eq!(read_pkt_line(&mut bytes).unwrap(), PktLine::Flush);
        assert!(bytes.is_empty());
    }

    #[test]
    fn length_prefix_counts_itself() {
        let mut buf = BytesMut::new();
        add_pkt_line_string(&mut buf, "a\n".to_string());
        assert_eq!(&buf[..], b"0006a\n");
    }

    #[test]
    fn short_buffer_is_an_error() {
        let mut bytes = Bytes::from_static(b"00");
        assert!(read_pkt_line(&mut bytes).is_err());
    }

    #[test]
    fn non_hex_prefix_is_an_error() {
        let mut bytes = Bytes::from_static(b"zzzzpayload");
        assert!(read_pkt_line(&mut bytes).is_err());
    }

    #[test]
    fn reserved_lengths_are_an_error() {
        for prefix in [b"0001", b"0002", b"0003"] {
            let mut bytes = Bytes::copy_from_slice(prefix);
            assert!(read_pkt_line(&mut bytes).is_err());
        }
    }

    #[test]
    fn truncated_payload_is_an_error() {
        let mut bytes = Bytes::from_static(b"0010abc");
        assert!(read_pkt_line(&mut bytes).is_err());
    }
}
