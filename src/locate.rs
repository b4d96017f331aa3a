//! Locate mode: first-match parameter extraction.

use std::io::Read;

use tracing::debug;

use crate::container::{ContainerReader, ScanStatus};
use crate::error::{OdlError, Result};

/// Scan until the first record matching the identity and return its raw
/// parameter bytes. Name comparison is case-insensitive, flags exact;
/// scan order is on-disk order and records after the match are never
/// read.
///
/// `Ok(Some(vec![]))` is a real match whose record carries no parameter
/// bytes; `Ok(None)` means the stream ended cleanly without a match. A
/// scan that ends early before any match is surfaced as an error, never
/// as `None`.
pub fn locate<R: Read>(
    reader: &mut ContainerReader<R>,
    code_file: &str,
    code_function: &str,
    flags: u32,
) -> Result<Option<Vec<u8>>> {
    let want_file = code_file.to_lowercase();
    let want_function = code_function.to_lowercase();

    while let Some(record) = reader.next_record()? {
        if record.flags == flags
            && record.code_file.to_lowercase() == want_file
            && record.code_function.to_lowercase() == want_function
        {
            debug!(
                record = reader.records_read() - 1,
                params = record.params_len(),
                "identity matched"
            );
            return Ok(Some(record.into_params()));
        }
    }

    match reader.status() {
        ScanStatus::Complete => Ok(None),
        status => Err(OdlError::PartialScan(status)),
    }
}
