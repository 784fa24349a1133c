use super::row::LedgerRow;
use crate::workflows::collections::domain::{ClassifiedRecord, DebtRecord};
use crate::workflows::collections::pipeline::{
    ClassificationSink, DebtSource, SinkError, SourceError, SourceRow,
};

/// Source over rows already in memory (request bodies, tests). Drained by `fetch`.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    rows: Vec<SourceRow>,
}

impl MemorySource {
    pub fn new(records: Vec<DebtRecord>) -> Self {
        Self {
            rows: records.into_iter().map(Ok).collect(),
        }
    }

    pub fn from_ledger_rows(rows: Vec<LedgerRow>) -> Self {
        Self {
            rows: rows.into_iter().map(LedgerRow::into_record).collect(),
        }
    }
}

impl DebtSource for MemorySource {
    fn fetch(&mut self) -> Result<Vec<SourceRow>, SourceError> {
        Ok(std::mem::take(&mut self.rows))
    }
}

/// Sink that keeps everything it is given.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    records: Vec<ClassifiedRecord>,
    writes: usize,
}

impl MemorySink {
    pub fn records(&self) -> &[ClassifiedRecord] {
        &self.records
    }

    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl ClassificationSink for MemorySink {
    fn write(&mut self, records: &[ClassifiedRecord]) -> Result<(), SinkError> {
        self.records.extend_from_slice(records);
        self.writes += 1;
        Ok(())
    }
}
