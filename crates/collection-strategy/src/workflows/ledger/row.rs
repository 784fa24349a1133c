use crate::workflows::collections::domain::{DebtRecord, DebtorId};
use crate::workflows::collections::normalizer::{
    parse_amount, parse_days_past_due, MalformedInput, MalformedReason,
};
use serde::{Deserialize, Deserializer, Serialize};

/// Ledger row before any validation. Every column is kept as text so a bad value
/// becomes a counted exclusion instead of a decode failure for the whole batch.
/// JSON payloads may send numbers or strings for any column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerRow {
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub debtor_id: String,
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub name: String,
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub surname: String,
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub segment: String,
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub days_past_due: String,
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub current_amount: String,
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub status: String,
}

impl LedgerRow {
    pub fn into_record(self) -> Result<DebtRecord, MalformedInput> {
        let debtor_id = self.debtor_id.trim().to_string();
        let known_id = (!debtor_id.is_empty()).then(|| DebtorId(debtor_id.clone()));
        let reject =
            |reason: MalformedReason| MalformedInput::new(reason).for_debtor(known_id.clone());

        if debtor_id.is_empty() {
            return Err(reject(MalformedReason::MissingField("debtor_id")));
        }
        let days_past_due = parse_days_past_due(&self.days_past_due).map_err(&reject)?;
        let current_amount = parse_amount(&self.current_amount).map_err(&reject)?;

        Ok(DebtRecord {
            debtor_id: DebtorId(debtor_id),
            name: self.name,
            surname: self.surname,
            segment: self.segment,
            days_past_due,
            current_amount,
            status: self.status,
        })
    }
}

impl From<&DebtRecord> for LedgerRow {
    fn from(record: &DebtRecord) -> Self {
        Self {
            debtor_id: record.debtor_id.0.clone(),
            name: record.name.clone(),
            surname: record.surname.clone(),
            segment: record.segment.clone(),
            days_past_due: record.days_past_due.to_string(),
            current_amount: record.current_amount.to_string(),
            status: record.status.clone(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Bool(bool),
    Integer(i64),
    Unsigned(u64),
    Float(f64),
    Text(String),
}

fn scalar_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Scalar>::deserialize(deserializer)?;
    Ok(match value {
        None => String::new(),
        Some(Scalar::Bool(value)) => value.to_string(),
        Some(Scalar::Integer(value)) => value.to_string(),
        Some(Scalar::Unsigned(value)) => value.to_string(),
        Some(Scalar::Float(value)) => value.to_string(),
        Some(Scalar::Text(value)) => value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_rows_accept_numbers_or_strings() {
        let numeric: LedgerRow = serde_json::from_value(json!({
            "debtor_id": 42,
            "name": "Ana",
            "surname": "Diaz",
            "segment": "premium",
            "days_past_due": 45,
            "current_amount": 1000.5,
            "status": "PAST_DUE"
        }))
        .expect("numeric row");
        assert_eq!(numeric.debtor_id, "42");
        assert_eq!(numeric.days_past_due, "45");
        assert_eq!(numeric.current_amount, "1000.5");

        let textual: LedgerRow = serde_json::from_value(json!({
            "debtor_id": "D-1",
            "days_past_due": " 45 ",
            "current_amount": null
        }))
        .expect("textual row");
        assert_eq!(textual.days_past_due, " 45 ");
        assert_eq!(textual.current_amount, "");
        assert_eq!(textual.status, "");
    }

    #[test]
    fn into_record_parses_numeric_fields() {
        let row = LedgerRow {
            debtor_id: " D-7 ".to_string(),
            name: "Ana".to_string(),
            surname: "Diaz".to_string(),
            segment: "Standard".to_string(),
            days_past_due: "45".to_string(),
            current_amount: "1000".to_string(),
            status: "past_due".to_string(),
        };

        let record = row.into_record().expect("valid row");
        assert_eq!(record.debtor_id, DebtorId("D-7".to_string()));
        assert_eq!(record.days_past_due, 45);
        assert_eq!(record.current_amount, 1000.0);
        assert_eq!(record.segment, "Standard", "normalization happens at screening");
    }

    #[test]
    fn into_record_reports_the_failing_field() {
        let row = LedgerRow {
            debtor_id: "D-8".to_string(),
            days_past_due: "soon".to_string(),
            current_amount: "10".to_string(),
            ..LedgerRow::default()
        };
        let error = row.into_record().expect_err("bad days rejected");
        assert_eq!(error.debtor_id, Some(DebtorId("D-8".to_string())));
        assert_eq!(
            error.reason,
            MalformedReason::UnparseableDays("soon".to_string())
        );

        let row = LedgerRow {
            days_past_due: "10".to_string(),
            current_amount: "10".to_string(),
            ..LedgerRow::default()
        };
        let error = row.into_record().expect_err("missing id rejected");
        assert_eq!(error.reason, MalformedReason::MissingField("debtor_id"));
        assert!(error.debtor_id.is_none());
    }
}
