use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU32;

/// Opaque debtor key as provided by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DebtorId(pub String);

impl fmt::Display for DebtorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Contact treatment assigned to a past-due case. The labels are a case-sensitive
/// contract with downstream systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CollectionStrategy {
    #[serde(rename = "COURTEOUS CALL")]
    CourteousCall,
    #[serde(rename = "EMAIL + CALL")]
    EmailAndCall,
    #[serde(rename = "SENIOR EXECUTIVE VISIT")]
    SeniorExecutiveVisit,
    #[serde(rename = "AUTOMATED EMAIL")]
    AutomatedEmail,
    #[serde(rename = "STANDARD CALL")]
    StandardCall,
    #[serde(rename = "INTENSIVE COLLECTION")]
    IntensiveCollection,
    #[serde(rename = "MASS SMS")]
    MassSms,
    #[serde(rename = "LEGAL ACTION")]
    LegalAction,
}

impl CollectionStrategy {
    pub const fn ordered() -> [Self; 8] {
        [
            Self::CourteousCall,
            Self::EmailAndCall,
            Self::SeniorExecutiveVisit,
            Self::AutomatedEmail,
            Self::StandardCall,
            Self::IntensiveCollection,
            Self::MassSms,
            Self::LegalAction,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::CourteousCall => "COURTEOUS CALL",
            Self::EmailAndCall => "EMAIL + CALL",
            Self::SeniorExecutiveVisit => "SENIOR EXECUTIVE VISIT",
            Self::AutomatedEmail => "AUTOMATED EMAIL",
            Self::StandardCall => "STANDARD CALL",
            Self::IntensiveCollection => "INTENSIVE COLLECTION",
            Self::MassSms => "MASS SMS",
            Self::LegalAction => "LEGAL ACTION",
        }
    }
}

impl fmt::Display for CollectionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Team or channel responsible for carrying out a strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Executor {
    #[serde(rename = "Regular executive")]
    RegularExecutive,
    #[serde(rename = "Senior executive")]
    SeniorExecutive,
    #[serde(rename = "Account manager")]
    AccountManager,
    #[serde(rename = "System")]
    System,
    #[serde(rename = "Collection team")]
    CollectionTeam,
    #[serde(rename = "Legal department")]
    LegalDepartment,
}

impl Executor {
    pub const fn label(self) -> &'static str {
        match self {
            Self::RegularExecutive => "Regular executive",
            Self::SeniorExecutive => "Senior executive",
            Self::AccountManager => "Account manager",
            Self::System => "System",
            Self::CollectionTeam => "Collection team",
            Self::LegalDepartment => "Legal department",
        }
    }
}

impl fmt::Display for Executor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Canonical status value that places a record in scope for classification.
pub const PAST_DUE_STATUS: &str = "PAST_DUE";

/// Debt and customer fields as read from the ledger. Segment and status are kept raw;
/// the normalizer decides what they mean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtRecord {
    pub debtor_id: DebtorId,
    pub name: String,
    pub surname: String,
    pub segment: String,
    pub days_past_due: i64,
    pub current_amount: f64,
    pub status: String,
}

/// In-scope record after normalization. `days_past_due` cannot be zero, so the
/// classifier never sees a non-positive value.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedDebt {
    pub debtor_id: DebtorId,
    pub name: String,
    pub surname: String,
    pub segment: String,
    pub days_past_due: NonZeroU32,
    pub current_amount: f64,
    pub status: String,
}

/// Output row handed to the sink and consumed by the reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedRecord {
    pub debtor_id: DebtorId,
    pub name: String,
    pub surname: String,
    pub segment: String,
    pub days_past_due: u32,
    pub current_amount: f64,
    pub status: String,
    pub collection_strategy: CollectionStrategy,
    pub executor: Executor,
    pub assignment_timestamp: DateTime<Utc>,
}

impl ClassifiedRecord {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.name, self.surname).trim().to_string()
    }
}
