//! Record blocks and payloads: the repeating unit of the container.
//!
//! Every record is a fixed-size framing block (56 bytes for V2, 32 for V3)
//! followed by `data_len` payload bytes: two length-prefixed UTF-8 names, a
//! flags word and the raw parameter bytes. The parameter length is never
//! stored; it is whatever remains of the payload after the named fields.

use byteorder::{ByteOrder, LittleEndian};
use chrono::{DateTime, Utc};

use crate::header::FormatVersion;

/// Constant leading every record block, interpreted as a little-endian
/// 64-bit word over the bytes `CC DD EE FF 00 00 00 00`.
pub const BLOCK_SIGNATURE: u64 = 0xFFEE_DDCC;
/// The same constant as raw on-disk bytes.
pub const BLOCK_SIGNATURE_BYTES: [u8; 8] = [0xCC, 0xDD, 0xEE, 0xFF, 0, 0, 0, 0];

/// Fixed framing fields preceding each payload.
#[derive(Debug, Clone, Copy)]
pub struct RecordBlock {
    pub signature: u64,
    pub timestamp: u64,
    /// V2 carries the record guid in the block; V3 moves it into the
    /// payload.
    pub guid: Option<[u8; 16]>,
    pub data_len: u32,
}

impl RecordBlock {
    /// Parse one block from a buffer of exactly `version.block_size()`
    /// bytes.
    pub fn parse(version: FormatVersion, buf: &[u8]) -> Self {
        debug_assert_eq!(buf.len(), version.block_size());
        let signature = LittleEndian::read_u64(&buf[0..8]);
        let timestamp = LittleEndian::read_u64(&buf[8..16]);
        match version {
            FormatVersion::V2 => {
                let mut guid = [0u8; 16];
                guid.copy_from_slice(&buf[24..40]);
                RecordBlock {
                    signature,
                    timestamp,
                    guid: Some(guid),
                    data_len: LittleEndian::read_u32(&buf[48..52]),
                }
            }
            FormatVersion::V3 => RecordBlock {
                signature,
                timestamp,
                guid: None,
                data_len: LittleEndian::read_u32(&buf[24..28]),
            },
        }
    }

    pub fn signature_ok(&self) -> bool {
        self.signature == BLOCK_SIGNATURE
    }
}

/// One decoded record. Owns its payload buffer; the parameter bytes are
/// the tail of that buffer and are only copied out by [`into_params`].
///
/// [`into_params`]: Record::into_params
#[derive(Debug, Clone)]
pub struct Record {
    pub code_file: String,
    pub code_function: String,
    pub flags: u32,
    /// Raw 64-bit timestamp from the record block.
    pub timestamp: u64,
    pub guid: [u8; 16],
    payload: Vec<u8>,
    params_start: usize,
}

impl Record {
    /// Decode a payload against its framing block. Returns a detail string
    /// on corruption; the container wraps it with record index and offset.
    pub(crate) fn decode(
        version: FormatVersion,
        block: &RecordBlock,
        payload: Vec<u8>,
    ) -> std::result::Result<Self, String> {
        let mut pos = 0usize;
        let guid = match version {
            FormatVersion::V2 => block.guid.unwrap_or_default(),
            FormatVersion::V3 => {
                // guid + two unknown words precede the names
                if payload.len() < 24 {
                    return Err(format!(
                        "payload of {} byte(s) is too short for the v3 record header",
                        payload.len()
                    ));
                }
                let mut guid = [0u8; 16];
                guid.copy_from_slice(&payload[..16]);
                pos = 24;
                guid
            }
        };

        let code_file = read_name(&payload, &mut pos, "code_file_name")?;
        let flags = read_u32(&payload, &mut pos, "flags")?;
        let code_function = read_name(&payload, &mut pos, "code_function_name")?;

        Ok(Record {
            code_file,
            code_function,
            flags,
            timestamp: block.timestamp,
            guid,
            params_start: pos,
            payload,
        })
    }

    /// Borrow the raw parameter bytes. May be empty.
    pub fn params(&self) -> &[u8] {
        &self.payload[self.params_start..]
    }

    pub fn params_len(&self) -> usize {
        self.payload.len() - self.params_start
    }

    /// Materialize the parameter bytes, consuming the record.
    pub fn into_params(mut self) -> Vec<u8> {
        self.payload.split_off(self.params_start)
    }

    /// Block timestamp as UTC. Observed clients write unix epoch
    /// milliseconds; values that do not fit a date return `None`.
    pub fn timestamp_utc(&self) -> Option<DateTime<Utc>> {
        i64::try_from(self.timestamp)
            .ok()
            .and_then(DateTime::from_timestamp_millis)
    }
}

/// The length-prefixed UTF-8 text primitive shared by both payload shapes.
fn read_name(payload: &[u8], pos: &mut usize, field: &str) -> std::result::Result<String, String> {
    let len = read_u32(payload, pos, field)? as usize;
    let end = pos
        .checked_add(len)
        .filter(|&end| end <= payload.len())
        .ok_or_else(|| format!("{field} length {len} overruns the {} byte payload", payload.len()))?;
    let text = std::str::from_utf8(&payload[*pos..end])
        .map_err(|_| format!("{field} is not valid UTF-8"))?
        .to_owned();
    *pos = end;
    Ok(text)
}

fn read_u32(payload: &[u8], pos: &mut usize, field: &str) -> std::result::Result<u32, String> {
    let end = *pos + 4;
    if end > payload.len() {
        return Err(format!("payload ends inside the {field} field"));
    }
    let value = LittleEndian::read_u32(&payload[*pos..end]);
    *pos = end;
    Ok(value)
}
