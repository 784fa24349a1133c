use super::domain::{DebtRecord, DebtorId, NormalizedDebt, PAST_DUE_STATUS};
use std::fmt;
use std::num::NonZeroU32;

/// Outcome of screening a single ledger record.
#[derive(Debug, Clone, PartialEq)]
pub enum Screening {
    InScope(NormalizedDebt),
    OutOfScope(ScopeExclusion),
    Malformed(MalformedInput),
}

/// Reason a well-formed record is not eligible for classification. Not a fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeExclusion {
    StatusNotPastDue { status: String },
    NonPositiveDays(i64),
}

/// Why a ledger row could not be used.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MalformedReason {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error("days_past_due `{0}` is not an integer")]
    UnparseableDays(String),
    #[error("days_past_due {0} is out of range")]
    DaysOutOfRange(i64),
    #[error("current_amount `{0}` is not a number")]
    UnparseableAmount(String),
    #[error("current_amount must be finite")]
    NonFiniteAmount,
    #[error("current_amount {0} is negative")]
    NegativeAmount(f64),
    #[error("row could not be decoded: {0}")]
    Undecodable(String),
}

/// A rejected ledger row, with whatever location detail the source could provide.
#[derive(Debug, Clone, PartialEq)]
pub struct MalformedInput {
    pub line: Option<u64>,
    pub debtor_id: Option<DebtorId>,
    pub reason: MalformedReason,
}

impl MalformedInput {
    pub fn new(reason: MalformedReason) -> Self {
        Self {
            line: None,
            debtor_id: None,
            reason,
        }
    }

    pub fn at_line(mut self, line: Option<u64>) -> Self {
        self.line = line;
        self
    }

    pub fn for_debtor(mut self, debtor_id: Option<DebtorId>) -> Self {
        self.debtor_id = debtor_id;
        self
    }
}

impl fmt::Display for MalformedInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.line, &self.debtor_id) {
            (Some(line), Some(id)) => write!(f, "line {line} (debtor {id}): {}", self.reason),
            (Some(line), None) => write!(f, "line {line}: {}", self.reason),
            (None, Some(id)) => write!(f, "debtor {id}: {}", self.reason),
            (None, None) => write!(f, "{}", self.reason),
        }
    }
}

impl std::error::Error for MalformedInput {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.reason)
    }
}

/// Canonical form of a segment or status value: trimmed and upper-cased.
pub fn normalize_label(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    cleaned.trim().to_ascii_uppercase()
}

pub fn parse_days_past_due(raw: &str) -> Result<i64, MalformedReason> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(MalformedReason::MissingField("days_past_due"));
    }

    trimmed
        .parse::<i64>()
        .map_err(|_| MalformedReason::UnparseableDays(trimmed.to_string()))
}

pub fn parse_amount(raw: &str) -> Result<f64, MalformedReason> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(MalformedReason::MissingField("current_amount"));
    }

    trimmed
        .parse::<f64>()
        .map_err(|_| MalformedReason::UnparseableAmount(trimmed.to_string()))
}

fn validate_amount(amount: f64) -> Result<f64, MalformedReason> {
    if !amount.is_finite() {
        return Err(MalformedReason::NonFiniteAmount);
    }
    if amount < 0.0 {
        return Err(MalformedReason::NegativeAmount(amount));
    }
    Ok(amount)
}

/// Applies the scope filter, then validates what the classifier and reports rely on.
/// Out-of-scope records are not inspected any further.
pub fn screen(record: &DebtRecord) -> Screening {
    let status = normalize_label(&record.status);
    if status != PAST_DUE_STATUS {
        return Screening::OutOfScope(ScopeExclusion::StatusNotPastDue { status });
    }

    if record.days_past_due <= 0 {
        return Screening::OutOfScope(ScopeExclusion::NonPositiveDays(record.days_past_due));
    }

    let debtor_id = record.debtor_id.0.trim();
    if debtor_id.is_empty() {
        return Screening::Malformed(MalformedInput::new(MalformedReason::MissingField(
            "debtor_id",
        )));
    }
    let malformed = |reason| {
        Screening::Malformed(
            MalformedInput::new(reason).for_debtor(Some(DebtorId(debtor_id.to_string()))),
        )
    };

    let days_past_due = match u32::try_from(record.days_past_due)
        .ok()
        .and_then(NonZeroU32::new)
    {
        Some(days) => days,
        None => return malformed(MalformedReason::DaysOutOfRange(record.days_past_due)),
    };

    let current_amount = match validate_amount(record.current_amount) {
        Ok(amount) => amount,
        Err(reason) => return malformed(reason),
    };

    Screening::InScope(NormalizedDebt {
        debtor_id: DebtorId(debtor_id.to_string()),
        name: record.name.trim().to_string(),
        surname: record.surname.trim().to_string(),
        segment: normalize_label(&record.segment),
        days_past_due,
        current_amount,
        status,
    })
}
