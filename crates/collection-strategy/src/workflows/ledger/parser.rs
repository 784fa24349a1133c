use super::row::LedgerRow;
use crate::workflows::collections::normalizer::{MalformedInput, MalformedReason};
use crate::workflows::collections::pipeline::SourceRow;
use std::io::Read;

/// Reads every ledger row. Row-level decode problems become `MalformedInput` tagged
/// with their line; only I/O failures abort.
pub(crate) fn parse_rows<R: Read>(reader: R) -> Result<Vec<SourceRow>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let columns = Columns::from_headers(csv_reader.headers()?);
    let mut record = csv::StringRecord::new();
    let mut rows = Vec::new();

    loop {
        match csv_reader.read_record(&mut record) {
            Ok(true) => {}
            Ok(false) => break,
            Err(err) if err.is_io_error() => return Err(err),
            Err(err) => {
                let line = err.position().map(|position| position.line());
                rows.push(Err(MalformedInput::new(MalformedReason::Undecodable(
                    err.to_string(),
                ))
                .at_line(line)));
                continue;
            }
        }

        let line = record.position().map(|position| position.line());
        let row = columns
            .read(&record)
            .into_record()
            .map_err(|input| input.at_line(line));
        rows.push(row);
    }

    Ok(rows)
}

/// Header positions, resolved once. Cells are read as text so identifiers keep their
/// exact spelling (leading zeros included).
struct Columns {
    debtor_id: Option<usize>,
    name: Option<usize>,
    surname: Option<usize>,
    segment: Option<usize>,
    days_past_due: Option<usize>,
    current_amount: Option<usize>,
    status: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> Self {
        let find = |name: &str| {
            headers.iter().position(|header| {
                header
                    .trim_start_matches('\u{feff}')
                    .trim()
                    .eq_ignore_ascii_case(name)
            })
        };

        Self {
            debtor_id: find("debtor_id"),
            name: find("name"),
            surname: find("surname"),
            segment: find("segment"),
            days_past_due: find("days_past_due"),
            current_amount: find("current_amount"),
            status: find("status"),
        }
    }

    fn read(&self, record: &csv::StringRecord) -> LedgerRow {
        let cell = |index: Option<usize>| {
            index
                .and_then(|index| record.get(index))
                .unwrap_or_default()
                .to_string()
        };

        LedgerRow {
            debtor_id: cell(self.debtor_id),
            name: cell(self.name),
            surname: cell(self.surname),
            segment: cell(self.segment),
            days_past_due: cell(self.days_past_due),
            current_amount: cell(self.current_amount),
            status: cell(self.status),
        }
    }
}

#[cfg(test)]
pub(crate) fn parse_for_tests(input: &str) -> Vec<SourceRow> {
    parse_rows(std::io::Cursor::new(input.to_string())).expect("in-memory csv parses")
}
