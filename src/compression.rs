//! The compression capability used by the envelope.
use libflate::zlib;
use std::io::{Read, Write};

use crate::{Error, Result};

/// The level used when compression is merely switched on.
pub const DEFAULT_LEVEL: u8 = 6;

/// The highest meaningful compression level.
pub const MAX_LEVEL: u8 = 9;

/// A zlib compressor/decompressor.
pub trait Compression {
    /// Compresses `bytes` into a zlib stream.
    ///
    /// `level` is in `1..=9`.
    fn compress(&self, bytes: &[u8], level: u8) -> Result<Vec<u8>>;

    /// Decompresses a zlib stream.
    ///
    /// Implementations may stop once more than `limit` bytes have been
    /// produced; the caller rejects any output whose length is not exactly
    /// the declared one.
    fn decompress(&self, bytes: &[u8], limit: usize) -> Result<Vec<u8>>;
}
impl<'a, C: Compression + ?Sized> Compression for &'a C {
    fn compress(&self, bytes: &[u8], level: u8) -> Result<Vec<u8>> {
        (**self).compress(bytes, level)
    }
    fn decompress(&self, bytes: &[u8], limit: usize) -> Result<Vec<u8>> {
        (**self).decompress(bytes, limit)
    }
}

/// zlib backed by `libflate`.
///
/// `libflate` does not expose numeric levels: levels up to 3 use fixed
/// Huffman codes, higher levels use dynamic codes.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZlibCompression;
impl Compression for ZlibCompression {
    fn compress(&self, bytes: &[u8], level: u8) -> Result<Vec<u8>> {
        let mut options = zlib::EncodeOptions::new();
        if level <= 3 {
            options = options.fixed_huffman_codes();
        }
        let mut encoder = zlib::Encoder::with_options(Vec::new(), options)?;
        encoder.write_all(bytes)?;
        Ok(encoder.finish().into_result()?)
    }
    fn decompress(&self, bytes: &[u8], limit: usize) -> Result<Vec<u8>> {
        let decoder = zlib::Decoder::new(bytes)?;
        let mut buf = Vec::new();
        decoder
            .take((limit as u64).saturating_add(1))
            .read_to_end(&mut buf)?;
        Ok(buf)
    }
}

/// A capability that is never available.
///
/// Encoding with a non-zero level and decoding a compressed payload both fail
/// with [`Error::CompressionUnavailable`].
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCompression;
impl Compression for NoCompression {
    fn compress(&self, _bytes: &[u8], _level: u8) -> Result<Vec<u8>> {
        Err(Error::CompressionUnavailable)
    }
    fn decompress(&self, _bytes: &[u8], _limit: usize) -> Result<Vec<u8>> {
        Err(Error::CompressionUnavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zlib_round_trip() {
        let data = b"aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa".repeat(8);
        for level in 1..=MAX_LEVEL {
            let compressed = ZlibCompression.compress(&data, level).unwrap();
            assert!(compressed.len() < data.len());
            let restored = ZlibCompression
                .decompress(&compressed, data.len())
                .unwrap();
            assert_eq!(restored, data);
        }
    }

    #[test]
    fn decompression_stops_past_the_limit() {
        let data = vec![0u8; 4096];
        let compressed = ZlibCompression.compress(&data, DEFAULT_LEVEL).unwrap();
        let restored = ZlibCompression.decompress(&compressed, 100).unwrap();
        assert_eq!(restored.len(), 101);
    }

    #[test]
    fn unavailable_capability() {
        assert!(matches!(
            NoCompression.compress(b"abc", DEFAULT_LEVEL),
            Err(Error::CompressionUnavailable)
        ));
        assert!(matches!(
            NoCompression.decompress(b"abc", 3),
            Err(Error::CompressionUnavailable)
        ));
    }
}
