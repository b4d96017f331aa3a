//! Identity catalog: the universe of (code file, function, flags)
//! triples seen in one container scan.

use std::collections::HashMap;
use std::io::Read;

use serde::Serialize;
use tracing::debug;

use crate::container::{ContainerReader, ScanStatus};
use crate::error::{OdlError, Result};
use crate::record::Record;

/// Accumulated identity mappings for one scan.
///
/// Entries are inserted the first time a value is seen and never removed
/// or mutated afterwards. Keys are the literal decoded text,
/// case-sensitive; insertion order is preserved in the value vectors.
#[derive(Debug, Default, Clone, Serialize)]
pub struct Catalog {
    /// Distinct code file names, in first-seen order.
    pub code_files: Vec<String>,
    /// Distinct function names observed under each code file.
    pub functions_by_file: HashMap<String, Vec<String>>,
    /// Distinct flag values observed for each function.
    pub flags_by_function: HashMap<String, Vec<u32>>,
}

impl Catalog {
    /// Record one identity. Duplicates are no-ops by construction.
    pub fn insert(&mut self, record: &Record) {
        if !self.code_files.iter().any(|f| f == &record.code_file) {
            self.code_files.push(record.code_file.clone());
        }
        let functions = self
            .functions_by_file
            .entry(record.code_file.clone())
            .or_default();
        if !functions.iter().any(|f| f == &record.code_function) {
            functions.push(record.code_function.clone());
        }
        let flags = self
            .flags_by_function
            .entry(record.code_function.clone())
            .or_default();
        if !flags.contains(&record.flags) {
            flags.push(record.flags);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.code_files.is_empty()
    }

    /// Code file names sorted case-insensitively, the order consumers
    /// display them in.
    pub fn sorted_code_files(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.code_files.iter().map(String::as_str).collect();
        names.sort_by(|a, b| a.to_lowercase().cmp(&b.to_lowercase()));
        names
    }
}

/// Result of draining a reader in catalog mode: whatever was decoded,
/// plus how the scan ended.
#[derive(Debug, Serialize)]
pub struct CatalogReport {
    pub catalog: Catalog,
    /// Terminal condition of the scan; anything but `Complete` means the
    /// catalog covers only part of the file.
    pub status: ScanStatus,
    /// Records decoded before the scan ended.
    pub records: usize,
}

impl CatalogReport {
    /// Drain `reader` to completion or to its first terminal condition.
    ///
    /// Malformed data never raises: truncation, block signature mismatch
    /// and corrupt records all degrade the report to partial and keep the
    /// entries accumulated so far. Only genuine I/O failures propagate.
    pub fn build<R: Read>(reader: &mut ContainerReader<R>) -> Result<Self> {
        let mut catalog = Catalog::default();
        loop {
            match reader.next_record() {
                Ok(Some(record)) => catalog.insert(&record),
                Ok(None) => break,
                Err(OdlError::CorruptRecord { index, detail, .. }) => {
                    debug!(index, %detail, "catalog scan stopped at corrupt record");
                    break;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(Self {
            status: reader.status(),
            records: reader.records_read(),
            catalog,
        })
    }

    pub fn is_partial(&self) -> bool {
        self.status.is_partial()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::FormatVersion;
    use crate::record::{RecordBlock, BLOCK_SIGNATURE};
    use proptest::prelude::*;

    fn record(code_file: &str, function: &str, flags: u32) -> Record {
        let mut payload = Vec::new();
        payload.extend_from_slice(&(code_file.len() as u32).to_le_bytes());
        payload.extend_from_slice(code_file.as_bytes());
        payload.extend_from_slice(&flags.to_le_bytes());
        payload.extend_from_slice(&(function.len() as u32).to_le_bytes());
        payload.extend_from_slice(function.as_bytes());
        let block = RecordBlock {
            signature: BLOCK_SIGNATURE,
            timestamp: 0,
            guid: Some([0u8; 16]),
            data_len: payload.len() as u32,
        };
        Record::decode(FormatVersion::V2, &block, payload).unwrap()
    }

    #[test]
    fn insert_is_add_once() {
        let mut catalog = Catalog::default();
        catalog.insert(&record("A.cpp", "f", 1));
        catalog.insert(&record("A.cpp", "f", 1));
        catalog.insert(&record("A.cpp", "f", 2));
        catalog.insert(&record("A.cpp", "g", 1));
        catalog.insert(&record("b.cpp", "f", 1));

        assert_eq!(catalog.code_files, vec!["A.cpp", "b.cpp"]);
        assert_eq!(catalog.functions_by_file["A.cpp"], vec!["f", "g"]);
        assert_eq!(catalog.functions_by_file["b.cpp"], vec!["f"]);
        // "f" was seen under both files; flags accumulate per function
        assert_eq!(catalog.flags_by_function["f"], vec![1, 2]);
        assert_eq!(catalog.flags_by_function["g"], vec![1]);
    }

    #[test]
    fn display_sort_is_case_insensitive() {
        let mut catalog = Catalog::default();
        catalog.insert(&record("zeta.cpp", "f", 0));
        catalog.insert(&record("Alpha.cpp", "f", 0));
        catalog.insert(&record("beta.cpp", "f", 0));
        assert_eq!(
            catalog.sorted_code_files(),
            vec!["Alpha.cpp", "beta.cpp", "zeta.cpp"]
        );
    }

    proptest! {
        /// Catalog mappings behave as sets regardless of insertion
        /// pattern: no duplicates, sizes bounded by the record count.
        #[test]
        fn catalog_entries_stay_distinct(
            identities in proptest::collection::vec(
                ("[a-d]{1,4}\\.cpp", "[a-f]{1,6}", 0u32..8),
                1..64,
            )
        ) {
            let mut catalog = Catalog::default();
            for (file, function, flags) in &identities {
                catalog.insert(&record(file, function, *flags));
            }

            prop_assert!(catalog.code_files.len() <= identities.len());
            let mut unique = catalog.code_files.clone();
            unique.sort();
            unique.dedup();
            prop_assert_eq!(unique.len(), catalog.code_files.len());

            for functions in catalog.functions_by_file.values() {
                let mut unique = functions.clone();
                unique.sort();
                unique.dedup();
                prop_assert_eq!(unique.len(), functions.len());
            }
            for flags in catalog.flags_by_function.values() {
                let mut unique = flags.clone();
                unique.sort();
                unique.dedup();
                prop_assert_eq!(unique.len(), flags.len());
            }
        }
    }
}
