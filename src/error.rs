//! Error types for ODL decoding.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::container::ScanStatus;

/// Result type for ODL operations
pub type Result<T> = std::result::Result<T, OdlError>;

/// Errors raised while decoding an ODL container.
///
/// The fatal variants (`BadSignature`, `UnsupportedVersion`,
/// `BadContainerSignature`, `DecompressionFailed`) abort before any record
/// is usable. `CorruptRecord` aborts the scan mid-stream; results gathered
/// before it stay valid. Truncation and block-signature mismatches are not
/// errors at all; they end the scan with a partial [`ScanStatus`].
#[derive(Debug, Error)]
pub enum OdlError {
    /// I/O error from the underlying stream
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file does not start with the 8-byte `EBFGONED` signature
    #[error("bad header signature {found:02x?}, expected \"EBFGONED\"")]
    BadSignature {
        /// First 8 bytes of the file
        found: [u8; 8],
    },

    /// The file is shorter than the fixed 256-byte header
    #[error("file too small for a 256-byte odl header")]
    TruncatedHeader,

    /// `odl_version` is neither 2 nor 3
    #[error("unsupported odl_version {0}, only 2 and 3 are recognized")]
    UnsupportedVersion(u32),

    /// The bytes after the header are neither a gzip envelope nor the
    /// record block constant
    #[error("wrong container signature {found:02x?}, did not find 0xCCDDEEFF")]
    BadContainerSignature {
        /// First 8 bytes after the header
        found: [u8; 8],
    },

    /// The gzip envelope could not be inflated
    #[error("envelope decompression failed: {0}")]
    DecompressionFailed(#[source] io::Error),

    /// A record whose length fields do not add up, or whose name fields
    /// are not UTF-8. The scan stops here.
    #[error("corrupt record {index} at offset {offset:#x}: {detail}")]
    CorruptRecord {
        /// Zero-based index of the record within the container
        index: usize,
        /// Byte offset of the record block, in uncompressed coordinates
        offset: u64,
        /// What failed to add up
        detail: String,
    },

    /// Locate-mode scan ended early before any match was found
    #[error("scan ended early: {0}")]
    PartialScan(ScanStatus),

    /// Any of the above, tagged with the offending file
    #[error("{}: {source}", .path.display())]
    InFile {
        /// File the error came from
        path: PathBuf,
        /// The underlying condition
        #[source]
        source: Box<OdlError>,
    },
}

impl OdlError {
    /// Tag this error with the file it came from.
    pub fn in_file(self, path: impl Into<PathBuf>) -> Self {
        OdlError::InFile {
            path: path.into(),
            source: Box::new(self),
        }
    }
}
