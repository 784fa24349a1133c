//! Adapters between ledger exports and the collection pipeline.

mod memory;
mod parser;
mod row;
mod writer;

pub use memory::{MemorySink, MemorySource};
pub use row::LedgerRow;
pub use writer::LedgerCsvSink;

use crate::workflows::collections::pipeline::{DebtSource, SourceError, SourceRow};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// CSV ledger export with a `debtor_id,name,surname,segment,days_past_due,
/// current_amount,status` header. Consumed by the first `fetch`.
pub struct LedgerCsvSource<R> {
    reader: Option<R>,
}

impl LedgerCsvSource<File> {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, SourceError> {
        let file = File::open(path)?;
        Ok(Self::from_reader(file))
    }
}

impl<R: Read> LedgerCsvSource<R> {
    pub fn from_reader(reader: R) -> Self {
        Self {
            reader: Some(reader),
        }
    }
}

impl<R: Read> DebtSource for LedgerCsvSource<R> {
    fn fetch(&mut self) -> Result<Vec<SourceRow>, SourceError> {
        let reader = self
            .reader
            .take()
            .ok_or_else(|| SourceError::Unavailable("ledger export already read".to_string()))?;
        Ok(parser::parse_rows(reader)?)
    }
}
