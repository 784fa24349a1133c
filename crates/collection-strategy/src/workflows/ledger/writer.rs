use crate::workflows::collections::domain::ClassifiedRecord;
use crate::workflows::collections::pipeline::{ClassificationSink, SinkError};
use std::fs::File;
use std::io::Write;
use std::path::Path;

const OUTPUT_HEADERS: [&str; 10] = [
    "debtor_id",
    "name",
    "surname",
    "segment",
    "days_past_due",
    "current_amount",
    "status",
    "collection_strategy",
    "executor",
    "assignment_timestamp",
];

/// CSV sink writing one row per classified record, header first.
pub struct LedgerCsvSink<W: Write> {
    writer: csv::Writer<W>,
    header_written: bool,
}

impl LedgerCsvSink<File> {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, SinkError> {
        let file = File::create(path)?;
        Ok(Self::from_writer(file))
    }
}

impl<W: Write> LedgerCsvSink<W> {
    pub fn from_writer(writer: W) -> Self {
        Self {
            writer: csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(writer),
            header_written: false,
        }
    }

    pub fn into_inner(self) -> Result<W, SinkError> {
        self.writer
            .into_inner()
            .map_err(|err| SinkError::Io(err.into_error()))
    }
}

impl<W: Write> ClassificationSink for LedgerCsvSink<W> {
    fn write(&mut self, records: &[ClassifiedRecord]) -> Result<(), SinkError> {
        if !self.header_written {
            self.writer.write_record(OUTPUT_HEADERS)?;
            self.header_written = true;
        }

        for record in records {
            self.writer.serialize(record)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
