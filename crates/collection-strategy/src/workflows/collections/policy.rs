use super::domain::{CollectionStrategy, Executor};
use super::normalizer::normalize_label;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Read;
use std::num::NonZeroU32;
use std::path::Path;

/// Strategy and executor pair produced by a matching tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyRule {
    pub strategy: CollectionStrategy,
    pub executor: Executor,
}

/// Bounded tier: applies while `days_past_due <= max_days`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Threshold {
    pub max_days: u32,
    pub rule: PolicyRule,
}

/// Ordered tiers for one segment. Thresholds ascend strictly; `overflow` answers
/// everything past the last bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentPolicy {
    segment: String,
    thresholds: Vec<Threshold>,
    overflow: PolicyRule,
}

impl SegmentPolicy {
    pub fn segment(&self) -> &str {
        &self.segment
    }

    pub fn thresholds(&self) -> &[Threshold] {
        &self.thresholds
    }

    pub fn overflow(&self) -> PolicyRule {
        self.overflow
    }

    /// First tier whose bound covers `days_past_due`, smallest bound first.
    pub fn resolve(&self, days_past_due: NonZeroU32) -> PolicyRule {
        let days = days_past_due.get();
        self.thresholds
            .iter()
            .find(|threshold| days <= threshold.max_days)
            .map(|threshold| threshold.rule)
            .unwrap_or(self.overflow)
    }

    fn from_document(document: SegmentDocument) -> Result<Self, PolicyError> {
        let segment = normalize_label(&document.segment);
        if segment.is_empty() {
            return Err(PolicyError::BlankSegmentName);
        }

        let mut tiers = document.tiers.into_iter().peekable();
        let mut thresholds: Vec<Threshold> = Vec::new();
        let mut overflow = None;

        while let Some(tier) = tiers.next() {
            let rule = PolicyRule {
                strategy: tier.strategy,
                executor: tier.executor,
            };
            match tier.max_days {
                Some(0) => return Err(PolicyError::ZeroThreshold { segment }),
                Some(max_days) => {
                    if let Some(previous) = thresholds.last() {
                        if max_days <= previous.max_days {
                            return Err(PolicyError::UnorderedThresholds {
                                segment,
                                previous: previous.max_days,
                                next: max_days,
                            });
                        }
                    }
                    thresholds.push(Threshold { max_days, rule });
                }
                None if tiers.peek().is_some() => {
                    return Err(PolicyError::UnboundedBeforeEnd { segment });
                }
                None => overflow = Some(rule),
            }
        }

        if thresholds.is_empty() && overflow.is_none() {
            return Err(PolicyError::EmptySegment { segment });
        }
        let overflow = overflow.ok_or_else(|| PolicyError::MissingOverflow {
            segment: segment.clone(),
        })?;

        Ok(Self {
            segment,
            thresholds,
            overflow,
        })
    }

    fn to_document(&self) -> SegmentDocument {
        let mut tiers: Vec<TierDocument> = self
            .thresholds
            .iter()
            .map(|threshold| TierDocument {
                max_days: Some(threshold.max_days),
                strategy: threshold.rule.strategy,
                executor: threshold.rule.executor,
            })
            .collect();
        tiers.push(TierDocument {
            max_days: None,
            strategy: self.overflow.strategy,
            executor: self.overflow.executor,
        });

        SegmentDocument {
            segment: self.segment.clone(),
            tiers,
        }
    }
}

/// Immutable, versioned decision table. Built once at start-up and shared read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyTable {
    version: String,
    segments: Vec<SegmentPolicy>,
    default: SegmentPolicy,
}

impl PolicyTable {
    /// The production collection policy.
    pub fn standard() -> Self {
        use super::domain::CollectionStrategy::*;
        use super::domain::Executor::*;

        let rule = |strategy, executor| PolicyRule { strategy, executor };
        let threshold = |max_days, strategy, executor| Threshold {
            max_days,
            rule: rule(strategy, executor),
        };

        Self {
            version: "standard-v1".to_string(),
            segments: vec![
                SegmentPolicy {
                    segment: "PREMIUM".to_string(),
                    thresholds: vec![
                        threshold(30, CourteousCall, RegularExecutive),
                        threshold(60, EmailAndCall, SeniorExecutive),
                    ],
                    overflow: rule(SeniorExecutiveVisit, AccountManager),
                },
                SegmentPolicy {
                    segment: "STANDARD".to_string(),
                    thresholds: vec![
                        threshold(30, AutomatedEmail, System),
                        threshold(60, StandardCall, RegularExecutive),
                    ],
                    overflow: rule(IntensiveCollection, CollectionTeam),
                },
            ],
            default: SegmentPolicy {
                segment: "BASIC".to_string(),
                thresholds: vec![threshold(60, MassSms, System)],
                overflow: rule(LegalAction, LegalDepartment),
            },
        }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, PolicyError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, PolicyError> {
        let document: PolicyDocument = serde_json::from_reader(reader)?;
        Self::from_document(document)
    }

    pub fn from_document(document: PolicyDocument) -> Result<Self, PolicyError> {
        let default = SegmentPolicy::from_document(document.default)?;

        let mut seen = HashSet::new();
        seen.insert(default.segment.clone());

        let mut segments = Vec::with_capacity(document.segments.len());
        for segment in document.segments {
            let policy = SegmentPolicy::from_document(segment)?;
            if !seen.insert(policy.segment.clone()) {
                return Err(PolicyError::DuplicateSegment(policy.segment));
            }
            segments.push(policy);
        }

        Ok(Self {
            version: document.version,
            segments,
            default,
        })
    }

    pub fn to_document(&self) -> PolicyDocument {
        PolicyDocument {
            version: self.version.clone(),
            segments: self
                .segments
                .iter()
                .map(SegmentPolicy::to_document)
                .collect(),
            default: self.default.to_document(),
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn segments(&self) -> &[SegmentPolicy] {
        &self.segments
    }

    pub fn default_policy(&self) -> &SegmentPolicy {
        &self.default
    }

    /// Policy for a canonical segment name. Unknown segments get the default policy;
    /// the flag reports whether that fallback happened.
    pub fn policy_for(&self, segment: &str) -> (&SegmentPolicy, bool) {
        if let Some(policy) = self.segments.iter().find(|policy| policy.segment == segment) {
            return (policy, false);
        }

        (&self.default, segment != self.default.segment)
    }
}

impl Default for PolicyTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Serialized policy layout. A tier with no `max_days` is the unbounded catch-all and
/// must come last.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyDocument {
    pub version: String,
    pub segments: Vec<SegmentDocument>,
    pub default: SegmentDocument,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentDocument {
    pub segment: String,
    pub tiers: Vec<TierDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierDocument {
    #[serde(default)]
    pub max_days: Option<u32>,
    pub strategy: CollectionStrategy,
    pub executor: Executor,
}

#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("policy segment name must not be blank")]
    BlankSegmentName,
    #[error("segment `{0}` is declared more than once")]
    DuplicateSegment(String),
    #[error("segment `{segment}` has no tiers")]
    EmptySegment { segment: String },
    #[error("segment `{segment}` must end with an unbounded tier")]
    MissingOverflow { segment: String },
    #[error("segment `{segment}` has an unbounded tier before its last tier")]
    UnboundedBeforeEnd { segment: String },
    #[error("segment `{segment}` has a zero-day threshold")]
    ZeroThreshold { segment: String },
    #[error("segment `{segment}` thresholds must ascend ({previous} then {next})")]
    UnorderedThresholds {
        segment: String,
        previous: u32,
        next: u32,
    },
    #[error("failed to read policy file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid policy document: {0}")]
    Parse(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn days(value: u32) -> NonZeroU32 {
        NonZeroU32::new(value).expect("non-zero days")
    }

    fn rows(policy: &SegmentPolicy) -> Vec<(Option<u32>, &'static str, &'static str)> {
        policy
            .to_document()
            .tiers
            .into_iter()
            .map(|tier| (tier.max_days, tier.strategy.label(), tier.executor.label()))
            .collect()
    }

    #[test]
    fn standard_table_reproduces_collection_policy() {
        let table = PolicyTable::standard();

        let (premium, fallback) = table.policy_for("PREMIUM");
        assert!(!fallback);
        assert_eq!(
            rows(premium),
            vec![
                (Some(30), "COURTEOUS CALL", "Regular executive"),
                (Some(60), "EMAIL + CALL", "Senior executive"),
                (None, "SENIOR EXECUTIVE VISIT", "Account manager"),
            ]
        );

        let (standard, _) = table.policy_for("STANDARD");
        assert_eq!(
            rows(standard),
            vec![
                (Some(30), "AUTOMATED EMAIL", "System"),
                (Some(60), "STANDARD CALL", "Regular executive"),
                (None, "INTENSIVE COLLECTION", "Collection team"),
            ]
        );

        assert_eq!(
            rows(table.default_policy()),
            vec![
                (Some(60), "MASS SMS", "System"),
                (None, "LEGAL ACTION", "Legal department"),
            ]
        );
    }

    #[test]
    fn unknown_segments_fall_back_to_default_policy() {
        let table = PolicyTable::standard();

        let (basic, fallback) = table.policy_for("BASIC");
        assert_eq!(basic.segment(), "BASIC");
        assert!(!fallback, "BASIC is the default segment, not a fallback");

        for segment in ["GOLD", "", "123"] {
            let (policy, fallback) = table.policy_for(segment);
            assert_eq!(policy.segment(), "BASIC");
            assert!(fallback);
        }
    }

    #[test]
    fn resolve_uses_inclusive_upper_bounds() {
        let table = PolicyTable::standard();
        let (premium, _) = table.policy_for("PREMIUM");

        assert_eq!(
            premium.resolve(days(1)).strategy,
            CollectionStrategy::CourteousCall
        );
        assert_eq!(
            premium.resolve(days(30)).strategy,
            CollectionStrategy::CourteousCall
        );
        assert_eq!(
            premium.resolve(days(31)).strategy,
            CollectionStrategy::EmailAndCall
        );
        assert_eq!(
            premium.resolve(days(u32::MAX)).strategy,
            CollectionStrategy::SeniorExecutiveVisit
        );
    }

    #[test]
    fn document_round_trip_preserves_table() {
        let table = PolicyTable::standard();
        let json = serde_json::to_string(&table.to_document()).expect("serialize policy");
        let loaded = PolicyTable::from_reader(Cursor::new(json)).expect("load policy");
        assert_eq!(loaded, table);
    }

    #[test]
    fn loader_normalizes_segment_names() {
        let json = r#"{
            "version": "custom",
            "segments": [
                { "segment": " gold ", "tiers": [
                    { "max_days": 15, "strategy": "COURTEOUS CALL", "executor": "Regular executive" },
                    { "strategy": "EMAIL + CALL", "executor": "Senior executive" }
                ] }
            ],
            "default": { "segment": "basic", "tiers": [
                { "strategy": "MASS SMS", "executor": "System" }
            ] }
        }"#;

        let table = PolicyTable::from_reader(Cursor::new(json)).expect("load policy");
        assert_eq!(table.version(), "custom");
        let (gold, fallback) = table.policy_for("GOLD");
        assert!(!fallback);
        assert_eq!(gold.resolve(days(16)).strategy, CollectionStrategy::EmailAndCall);
        assert_eq!(table.default_policy().segment(), "BASIC");
        assert!(table.default_policy().thresholds().is_empty());
    }

    fn segment(name: &str, tiers: &[Option<u32>]) -> SegmentDocument {
        SegmentDocument {
            segment: name.to_string(),
            tiers: tiers
                .iter()
                .map(|max_days| TierDocument {
                    max_days: *max_days,
                    strategy: CollectionStrategy::MassSms,
                    executor: Executor::System,
                })
                .collect(),
        }
    }

    fn document(segments: Vec<SegmentDocument>) -> PolicyDocument {
        PolicyDocument {
            version: "test".to_string(),
            segments,
            default: segment("BASIC", &[Some(60), None]),
        }
    }

    #[test]
    fn loader_rejects_invalid_tier_layouts() {
        let cases = [
            (segment("A", &[]), "no tiers"),
            (segment("A", &[Some(30)]), "unbounded tier"),
            (segment("A", &[None, Some(30)]), "before its last tier"),
            (segment("A", &[Some(60), Some(30), None]), "ascend"),
            (segment("A", &[Some(30), Some(30), None]), "ascend"),
            (segment("A", &[Some(0), None]), "zero-day"),
            (segment("  ", &[None]), "blank"),
        ];

        for (segment, expected) in cases {
            let error = PolicyTable::from_document(document(vec![segment]))
                .expect_err("invalid policy rejected");
            assert!(
                error.to_string().contains(expected),
                "unexpected error `{error}` for {expected}"
            );
        }
    }

    #[test]
    fn loader_rejects_duplicate_segments() {
        let error = PolicyTable::from_document(document(vec![
            segment("premium", &[None]),
            segment("PREMIUM", &[None]),
        ]))
        .expect_err("duplicate rejected");
        assert!(matches!(error, PolicyError::DuplicateSegment(name) if name == "PREMIUM"));

        let error = PolicyTable::from_document(document(vec![segment("basic", &[None])]))
            .expect_err("default segment redeclared");
        assert!(matches!(error, PolicyError::DuplicateSegment(_)));
    }

    #[test]
    fn loader_reports_parse_and_io_failures() {
        assert!(matches!(
            PolicyTable::from_reader(Cursor::new("{ not json")),
            Err(PolicyError::Parse(_))
        ));
        assert!(matches!(
            PolicyTable::from_path("./missing-policy.json"),
            Err(PolicyError::Io(_))
        ));
    }
}
