//! Optional compression envelope around the record region.
//!
//! Some clients rotate logs through gzip (`.odlgz`); the header stays
//! uncompressed and everything after it is one DEFLATE stream. Detection
//! peeks the first four bytes following the header. The whole envelope is
//! inflated into memory in one step; log files are bounded in size, and
//! this keeps the record scan identical for both storage forms.

use std::io::Read;

use flate2::read::GzDecoder;

use crate::error::{OdlError, Result};

/// DEFLATE-with-gzip-wrapper magic, as written by the sync client.
pub const GZIP_MAGIC: [u8; 4] = [0x1F, 0x8B, 0x08, 0x00];

/// True if the 8-byte probe after the header starts a gzip envelope.
pub fn is_gzip(probe: &[u8; 8]) -> bool {
    probe[..4] == GZIP_MAGIC
}

/// Inflate the whole envelope. The probe bytes already consumed from the
/// stream are part of the gzip member and are replayed ahead of `rest`.
pub fn inflate<R: Read>(probe: &[u8], rest: R) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    GzDecoder::new(probe.chain(rest))
        .read_to_end(&mut out)
        .map_err(OdlError::DecompressionFailed)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    #[test]
    fn detects_gzip_magic() {
        assert!(is_gzip(&[0x1F, 0x8B, 0x08, 0x00, 0xAA, 0xBB, 0xCC, 0xDD]));
        assert!(!is_gzip(&[0xCC, 0xDD, 0xEE, 0xFF, 0, 0, 0, 0]));
    }

    #[test]
    fn inflates_split_stream() {
        let mut enc = GzEncoder::new(Vec::new(), Compression::default());
        enc.write_all(b"record region goes here").unwrap();
        let compressed = enc.finish().unwrap();

        let inflated = inflate(&compressed[..8], &compressed[8..]).unwrap();
        assert_eq!(inflated, b"record region goes here");
    }

    #[test]
    fn corrupt_stream_is_fatal() {
        let probe = [0x1F, 0x8B, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00];
        let garbage = [0xFFu8; 32];
        let err = inflate(&probe, &garbage[..]).unwrap_err();
        assert!(matches!(err, OdlError::DecompressionFailed(_)));
    }
}
