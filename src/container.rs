//! Streaming container reader: header validation, envelope removal, and
//! a record-at-a-time scan.
//!
//! # Scan model
//!
//! [`ContainerReader::next_record`] is a lazy pull: it reads one framing
//! block and one payload per call and never buffers more than that (the
//! single exception is envelope inflation at open, which materializes the
//! whole record region). Readers are single-use; open a fresh one per
//! scan.
//!
//! # Partial files
//!
//! Truncated containers are common in the wild, since logs are captured
//! mid-rotation. A short block, a short payload or a failed block
//! signature therefore ends the sequence with a partial [`ScanStatus`]
//! instead of an error, and
//! everything decoded before that point stays valid. Only records whose
//! internal lengths contradict themselves abort with
//! [`OdlError::CorruptRecord`].

use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Cursor, Read};
use std::path::Path;

use serde::Serialize;
use tracing::{debug, warn};

use crate::envelope;
use crate::error::{OdlError, Result};
use crate::header::{FileHeader, HEADER_SIZE};
use crate::record::{Record, RecordBlock, BLOCK_SIGNATURE_BYTES};

/// Terminal condition of one scan. `Complete` means the stream ended
/// cleanly at a record boundary; every other variant marks the results
/// gathered so far as partial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScanStatus {
    Complete,
    /// Fewer bytes than one record block remained.
    TruncatedBlock { offset: u64 },
    /// The payload ran short of its declared `data_len`.
    TruncatedPayload { offset: u64, expected: u32, got: u32 },
    /// A block failed its `0xCCDDEEFF` signature check.
    BadBlockSignature { offset: u64 },
    /// A record's length fields did not add up; the scan raised
    /// [`OdlError::CorruptRecord`] alongside this status.
    CorruptRecord { offset: u64 },
}

impl ScanStatus {
    pub fn is_partial(&self) -> bool {
        *self != ScanStatus::Complete
    }
}

impl fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanStatus::Complete => write!(f, "complete"),
            ScanStatus::TruncatedBlock { offset } => {
                write!(f, "stream truncated mid record block at offset {offset:#x}")
            }
            ScanStatus::TruncatedPayload { offset, expected, got } => write!(
                f,
                "payload at offset {offset:#x} truncated: {got} of {expected} byte(s)"
            ),
            ScanStatus::BadBlockSignature { offset } => write!(
                f,
                "record block at offset {offset:#x} did not start with 0xCCDDEEFF"
            ),
            ScanStatus::CorruptRecord { offset } => {
                write!(f, "corrupt record at offset {offset:#x}")
            }
        }
    }
}

/// Byte source for the record region: either the raw stream with the
/// 8 probe bytes replayed, or the inflated envelope.
#[derive(Debug)]
enum Source<R> {
    Plain(io::Chain<Cursor<[u8; 8]>, R>),
    Inflated(Cursor<Vec<u8>>),
}

impl<R: Read> Read for Source<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Source::Plain(chain) => chain.read(buf),
            Source::Inflated(cursor) => cursor.read(buf),
        }
    }
}

/// Decoder context for one container scan.
#[derive(Debug)]
pub struct ContainerReader<R> {
    header: FileHeader,
    src: Source<R>,
    compressed: bool,
    status: ScanStatus,
    done: bool,
    /// Offset of the next record block in uncompressed coordinates
    /// (the record region starts at [`HEADER_SIZE`]).
    offset: u64,
    records: usize,
}

impl ContainerReader<BufReader<File>> {
    /// Open a container on disk. Errors are tagged with the file name.
    pub fn open_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| OdlError::from(e).in_file(path))?;
        Self::open(BufReader::new(file)).map_err(|e| e.in_file(path))
    }
}

impl<R: Read> ContainerReader<R> {
    /// Validate the file header, detect and remove the compression
    /// envelope, and position the scan at the first record block.
    pub fn open(mut reader: R) -> Result<Self> {
        let header = FileHeader::read(&mut reader)?;

        let mut probe = [0u8; 8];
        let got = read_full(&mut reader, &mut probe)?;

        let (src, compressed) = if got >= 4 && envelope::is_gzip(&probe) {
            debug!("gzip envelope detected, inflating record region");
            let data = envelope::inflate(&probe[..got], &mut reader)?;
            if data.len() < 8 || data[..8] != BLOCK_SIGNATURE_BYTES {
                let mut found = [0u8; 8];
                let n = data.len().min(8);
                found[..n].copy_from_slice(&data[..n]);
                return Err(OdlError::BadContainerSignature { found });
            }
            debug!(inflated = data.len(), "envelope removed");
            (Source::Inflated(Cursor::new(data)), true)
        } else if got == probe.len() && probe == BLOCK_SIGNATURE_BYTES {
            (Source::Plain(Cursor::new(probe).chain(reader)), false)
        } else {
            // nothing (or junk) after the header
            return Err(OdlError::BadContainerSignature { found: probe });
        };

        Ok(Self {
            header,
            src,
            compressed,
            status: ScanStatus::Complete,
            done: false,
            offset: HEADER_SIZE as u64,
            records: 0,
        })
    }

    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    /// Whether the record region was stored behind a gzip envelope.
    pub fn is_compressed(&self) -> bool {
        self.compressed
    }

    /// Status of the scan so far; once `next_record` has returned
    /// `Ok(None)`, this is the terminal condition of the whole scan.
    pub fn status(&self) -> ScanStatus {
        self.status
    }

    /// Records decoded so far.
    pub fn records_read(&self) -> usize {
        self.records
    }

    /// Pull the next record. `Ok(None)` ends the sequence; consult
    /// [`status`](Self::status) to tell a clean end from a partial one.
    pub fn next_record(&mut self) -> Result<Option<Record>> {
        if self.done {
            return Ok(None);
        }
        let version = self.header.version;
        let block_size = version.block_size();

        let mut block_buf = vec![0u8; block_size];
        let got = read_full(&mut self.src, &mut block_buf)?;
        if got == 0 {
            self.done = true;
            return Ok(None);
        }
        if got < block_size {
            warn!(offset = self.offset, got, "stream truncated mid record block");
            self.status = ScanStatus::TruncatedBlock { offset: self.offset };
            self.done = true;
            return Ok(None);
        }

        let block = RecordBlock::parse(version, &block_buf);
        if !block.signature_ok() {
            warn!(
                offset = self.offset,
                found = block.signature,
                "record block signature mismatch, ending scan"
            );
            self.status = ScanStatus::BadBlockSignature { offset: self.offset };
            self.done = true;
            return Ok(None);
        }

        let mut payload = vec![0u8; block.data_len as usize];
        let got = read_full(&mut self.src, &mut payload)?;
        if got < payload.len() {
            warn!(
                offset = self.offset,
                expected = block.data_len,
                got,
                "payload truncated"
            );
            self.status = ScanStatus::TruncatedPayload {
                offset: self.offset,
                expected: block.data_len,
                got: got as u32,
            };
            self.done = true;
            return Ok(None);
        }

        let record = Record::decode(version, &block, payload).map_err(|detail| {
            self.status = ScanStatus::CorruptRecord { offset: self.offset };
            self.done = true;
            OdlError::CorruptRecord {
                index: self.records,
                offset: self.offset,
                detail,
            }
        })?;

        self.offset += block_size as u64 + u64::from(block.data_len);
        self.records += 1;
        Ok(Some(record))
    }
}

/// Read until `buf` is full or EOF; returns the bytes read.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
