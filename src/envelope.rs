//! The version header and the optional compression envelope.
use byteorder::{BigEndian, WriteBytesExt};
use std::io::{ErrorKind, Write};

use crate::compression::Compression;
use crate::reader::Reader;
use crate::tag::{COMPRESSED, FORMAT_VERSION};
use crate::{Error, Result};

/// Length of the marker byte plus the original-size field.
const ENVELOPE_SIZE: usize = 5;

/// The bytes preceding an encoded term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Header {
    Plain,
    Compressed { uncompressed_size: u32 },
}
impl Header {
    pub fn decode(reader: &mut Reader) -> Result<Self> {
        let version = reader.read_u8()?;
        if version != FORMAT_VERSION {
            return Err(Error::BadVersion { version });
        }
        if reader.peek_u8() == Some(COMPRESSED) {
            reader.read_u8()?;
            let uncompressed_size = reader.read_u32()?;
            Ok(Header::Compressed { uncompressed_size })
        } else {
            Ok(Header::Plain)
        }
    }

    pub fn encode<W: Write>(&self, mut writer: W) -> Result<()> {
        writer.write_u8(FORMAT_VERSION)?;
        if let Header::Compressed { uncompressed_size } = *self {
            writer.write_u8(COMPRESSED)?;
            writer.write_u32::<BigEndian>(uncompressed_size)?;
        }
        Ok(())
    }
}

/// Restores the payload of a compressed envelope.
///
/// `data` is everything after the header; its length must decompress to
/// exactly `uncompressed_size` bytes.
pub fn open<C: Compression>(
    compression: &C,
    data: &[u8],
    uncompressed_size: u32,
) -> Result<Vec<u8>> {
    let expected = uncompressed_size as usize;
    let payload = compression.decompress(data, expected).map_err(|e| match e {
        Error::Io(ref io) if io.kind() == ErrorKind::UnexpectedEof => Error::TruncatedInput {
            offset: data.len(),
            wanted: 1,
            available: 0,
        },
        e => e,
    })?;
    if payload.len() != expected {
        return Err(Error::LengthMismatch {
            expected,
            actual: payload.len(),
        });
    }
    debug!(
        "Inflated {} compressed bytes into {} bytes",
        data.len(),
        payload.len()
    );
    Ok(payload)
}

/// Prepends the header to `payload`, compressing it when `level` is non-zero
/// and the result is strictly smaller than the plain form.
pub fn seal<C: Compression>(compression: &C, payload: &[u8], level: u8) -> Result<Vec<u8>> {
    if level > 0 {
        if let Ok(uncompressed_size) = u32::try_from(payload.len()) {
            let compressed = compression.compress(payload, level)?;
            if compressed.len() + ENVELOPE_SIZE < payload.len() {
                let mut buf = Vec::with_capacity(1 + ENVELOPE_SIZE + compressed.len());
                Header::Compressed { uncompressed_size }.encode(&mut buf)?;
                buf.extend_from_slice(&compressed);
                return Ok(buf);
            }
            debug!(
                "Compressed size {} is not smaller than plain size {}; emitting plain form",
                compressed.len() + ENVELOPE_SIZE,
                payload.len()
            );
        } else {
            debug!(
                "Payload of {} bytes exceeds the envelope size field; emitting plain form",
                payload.len()
            );
        }
    }
    let mut buf = Vec::with_capacity(1 + payload.len());
    Header::Plain.encode(&mut buf)?;
    buf.extend_from_slice(payload);
    Ok(buf)
}
