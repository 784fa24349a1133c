use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::collections::domain::{ClassifiedRecord, DebtRecord, DebtorId};
use crate::workflows::collections::pipeline::{
    ClassificationSink, DebtSource, SinkError, SourceError, SourceRow,
};
use crate::workflows::ledger::LedgerRow;

pub(super) fn as_of() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 31, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn debt(id: &str, segment: &str, days: i64, amount: f64, status: &str) -> DebtRecord {
    DebtRecord {
        debtor_id: DebtorId(id.to_string()),
        name: "Debtor".to_string(),
        surname: id.to_string(),
        segment: segment.to_string(),
        days_past_due: days,
        current_amount: amount,
        status: status.to_string(),
    }
}

pub(super) fn past_due(id: &str, segment: &str, days: i64, amount: f64) -> DebtRecord {
    debt(id, segment, days, amount, "PAST_DUE")
}

pub(super) fn ledger_row(id: &str, segment: &str, days: &str, amount: &str) -> LedgerRow {
    LedgerRow {
        debtor_id: id.to_string(),
        name: "Debtor".to_string(),
        surname: id.to_string(),
        segment: segment.to_string(),
        days_past_due: days.to_string(),
        current_amount: amount.to_string(),
        status: "PAST_DUE".to_string(),
    }
}

pub(super) fn ids(records: &[ClassifiedRecord]) -> Vec<&str> {
    records
        .iter()
        .map(|record| record.debtor_id.0.as_str())
        .collect()
}

pub(super) struct UnavailableSource;

impl DebtSource for UnavailableSource {
    fn fetch(&mut self) -> Result<Vec<SourceRow>, SourceError> {
        Err(SourceError::Unavailable("ledger database offline".to_string()))
    }
}

pub(super) struct UnavailableSink;

impl ClassificationSink for UnavailableSink {
    fn write(&mut self, _records: &[ClassifiedRecord]) -> Result<(), SinkError> {
        Err(SinkError::Unavailable("assignment table locked".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
