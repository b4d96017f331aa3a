use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{self, Read};

use crate::error::{OdlError, Result};

/// File signature at offset 0.
pub const ODL_SIGNATURE: &[u8; 8] = b"EBFGONED";
/// Fixed header size on disk.
pub const HEADER_SIZE: usize = 256;

/// On-disk layout flavour, selected once from `odl_version` and threaded
/// through both block and payload parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatVersion {
    V2,
    V3,
}

impl FormatVersion {
    pub fn from_raw(raw: u32) -> Result<Self> {
        match raw {
            2 => Ok(FormatVersion::V2),
            3 => Ok(FormatVersion::V3),
            other => Err(OdlError::UnsupportedVersion(other)),
        }
    }

    pub fn as_u32(self) -> u32 {
        match self {
            FormatVersion::V2 => 2,
            FormatVersion::V3 => 3,
        }
    }

    /// Fixed record block size for this layout.
    pub fn block_size(self) -> usize {
        match self {
            FormatVersion::V2 => 56,
            FormatVersion::V3 => 32,
        }
    }

    /// Non-variable byte count of the payload header: the two name length
    /// fields and the flags word, plus for V3 the leading guid and two
    /// unknown words.
    pub fn payload_overhead(self) -> usize {
        match self {
            FormatVersion::V2 => 12,
            FormatVersion::V3 => 36,
        }
    }
}

/// Parsed 256-byte file header. The vendor strings are opaque
/// pass-through metadata; only `signature` and `odl_version` gate
/// decoding.
#[derive(Debug, Clone)]
pub struct FileHeader {
    pub version: FormatVersion,
    /// NUL-trimmed contents of the 0x40-byte OneDrive version field.
    pub one_drive_version: String,
    /// NUL-trimmed contents of the 0x40-byte Windows version field.
    pub windows_version: String,
}

impl FileHeader {
    /// Read and validate the fixed header at the start of `reader`.
    pub fn read<R: Read>(mut reader: R) -> Result<Self> {
        let mut buf = [0u8; HEADER_SIZE];
        reader.read_exact(&mut buf).map_err(|e| {
            if e.kind() == io::ErrorKind::UnexpectedEof {
                OdlError::TruncatedHeader
            } else {
                OdlError::Io(e)
            }
        })?;

        let mut cur = &buf[..];
        let mut signature = [0u8; 8];
        cur.read_exact(&mut signature)?;
        if &signature != ODL_SIGNATURE {
            return Err(OdlError::BadSignature { found: signature });
        }

        let version = FormatVersion::from_raw(cur.read_u32::<LittleEndian>()?)?;
        let _unk1 = cur.read_u32::<LittleEndian>()?;
        let _unk2 = cur.read_u64::<LittleEndian>()?;
        let _unk3 = cur.read_u32::<LittleEndian>()?;

        let one_drive_version = read_padded_str(&mut cur, 0x40)?;
        let windows_version = read_padded_str(&mut cur, 0x40)?;
        // reserved[0x64] tail is ignored

        Ok(Self {
            version,
            one_drive_version,
            windows_version,
        })
    }
}

/// Read a fixed-width NUL-padded text field, trimmed at the first NUL.
/// Vendor fields are not validated; undecodable bytes are replaced.
fn read_padded_str<R: Read>(reader: &mut R, width: usize) -> Result<String> {
    let mut field = vec![0u8; width];
    reader.read_exact(&mut field)?;
    let end = field.iter().position(|&b| b == 0).unwrap_or(width);
    Ok(String::from_utf8_lossy(&field[..end]).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_bytes(version: u32) -> Vec<u8> {
        let mut h = Vec::with_capacity(HEADER_SIZE);
        h.extend_from_slice(ODL_SIGNATURE);
        h.extend_from_slice(&version.to_le_bytes());
        h.extend_from_slice(&[0u8; 16]); // unk1 + unk2 + unk3
        let mut odv = [0u8; 0x40];
        odv[..7].copy_from_slice(b"24.091.");
        h.extend_from_slice(&odv);
        let mut wv = [0u8; 0x40];
        wv[..10].copy_from_slice(b"10.0.22631");
        h.extend_from_slice(&wv);
        h.extend_from_slice(&[0u8; 0x64]);
        h
    }

    #[test]
    fn parses_vendor_strings() {
        let header = FileHeader::read(&header_bytes(3)[..]).unwrap();
        assert_eq!(header.version, FormatVersion::V3);
        assert_eq!(header.one_drive_version, "24.091.");
        assert_eq!(header.windows_version, "10.0.22631");
    }

    #[test]
    fn rejects_unknown_version() {
        let err = FileHeader::read(&header_bytes(4)[..]).unwrap_err();
        assert!(matches!(err, OdlError::UnsupportedVersion(4)));
    }

    #[test]
    fn rejects_bad_signature() {
        let mut bytes = header_bytes(2);
        bytes[0] = b'X';
        let err = FileHeader::read(&bytes[..]).unwrap_err();
        assert!(matches!(err, OdlError::BadSignature { .. }));
    }

    #[test]
    fn rejects_short_file() {
        let err = FileHeader::read(&b"EBFGONED"[..]).unwrap_err();
        assert!(matches!(err, OdlError::TruncatedHeader));
    }

    #[test]
    fn version_geometry() {
        assert_eq!(FormatVersion::V2.block_size(), 56);
        assert_eq!(FormatVersion::V3.block_size(), 32);
        assert_eq!(FormatVersion::V2.payload_overhead(), 12);
        assert_eq!(FormatVersion::V3.payload_overhead(), 36);
    }
}
