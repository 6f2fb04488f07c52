//! Decoder for Git-style delta instruction streams (base size + result size +
//! op codes) that rebuilds target objects from a base buffer.

use std::io::{ErrorKind, Read};

use crate::{delta::utils, errors::GitError};

const COPY_INSTRUCTION_FLAG: u8 = 1 << 7; // msb set => copy from base, otherwise inline data
const COPY_OFFSET_BYTES: u8 = 4;
const COPY_SIZE_BYTES: u8 = 3;
const COPY_ZERO_SIZE: usize = 0x10000;

/// Apply a delta stream to `base_info`, returning the reconstructed target
/// bytes.
///
/// The stream opens with two varints, the expected base size and the result
/// size, followed by instructions until the stream ends:
/// - copy (msb=1): presence bits select up to 4 offset and 3 size bytes,
///   little-endian; a decoded size of 0 means 0x10000
/// - insert (msb=0): the low 7 bits count literal bytes that follow; 0 is
///   reserved and rejected
///
/// Every malformed or truncated instruction is a [`GitError::DeltaObjectError`],
/// as is a result that does not match the declared size. The delta never
/// applies cleanly against the wrong base, because the base size is checked
/// before any instruction runs.
pub fn delta_decode(stream: &mut impl Read, base_info: &[u8]) -> Result<Vec<u8>, GitError> {
    let truncated = |what: &str| GitError::DeltaObjectError(format!("truncated {what}"));

    let base_size = utils::read_size_encoding(stream)
        .map_err(|err| GitError::DeltaObjectError(format!("bad base size header: {err}")))?;
    if base_info.len() != base_size {
        return Err(GitError::DeltaObjectError(format!(
            "base object is {} bytes but the delta expects {base_size}",
            base_info.len()
        )));
    }

    let result_size = utils::read_size_encoding(stream)
        .map_err(|err| GitError::DeltaObjectError(format!("bad result size header: {err}")))?;
    let mut buffer = Vec::with_capacity(result_size);
    loop {
        // The instruction stream ends exactly when the payload does.
        let instruction = match utils::read_bytes(stream) {
            Ok([instruction]) => instruction,
            Err(err) if err.kind() == ErrorKind::UnexpectedEof => break,
            Err(err) => {
                return Err(GitError::DeltaObjectError(format!(
                    "unreadable instruction: {err}"
                )));
            }
        };

        if instruction & COPY_INSTRUCTION_FLAG == 0 {
            // Data instruction; the instruction byte specifies the number of data bytes
            if instruction == 0 {
                // Appending 0 bytes doesn't make sense, so git disallows it
                return Err(GitError::DeltaObjectError(
                    "insert instruction with zero length".to_string(),
                ));
            }

            let mut data = vec![0; instruction as usize];
            stream
                .read_exact(&mut data)
                .map_err(|_| truncated("insert payload"))?;
            buffer.extend_from_slice(&data);
        } else {
            // Copy instruction
            let mut nonzero_bytes = instruction;
            let offset = utils::read_partial_int(stream, COPY_OFFSET_BYTES, &mut nonzero_bytes)
                .map_err(|_| truncated("copy offset"))?;
            let mut size = utils::read_partial_int(stream, COPY_SIZE_BYTES, &mut nonzero_bytes)
                .map_err(|_| truncated("copy size"))?;
            if size == 0 {
                // Copying 0 bytes doesn't make sense, so git assumes a different size
                size = COPY_ZERO_SIZE;
            }
            let base_data = base_info.get(offset..(offset + size)).ok_or_else(|| {
                GitError::DeltaObjectError(format!(
                    "copy of {size} bytes at offset {offset} escapes a {} byte base",
                    base_info.len()
                ))
            })?;
            buffer.extend_from_slice(base_data);
        }
    }

    if buffer.len() != result_size {
        return Err(GitError::DeltaObjectError(format!(
            "rebuilt {} bytes but the delta declared {result_size}",
            buffer.len()
        )));
    }
    Ok(buffer)
}
