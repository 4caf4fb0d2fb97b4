//! Contract fields and their candidate values

use crate::confidence::clamp_confidence;
use crate::provenance::{EntityRef, Provenance};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Contract fields the pipeline can propose values for
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldName {
    /// Client / counterparty organization
    Client,
    /// Date the contract takes effect
    StartDate,
    /// Date the contract expires or terminates
    EndDate,
    /// Date the contract renews
    RenewalDate,
    /// Total contract value
    ContractValue,
    /// Contact person name
    ContactName,
    /// Contact email address
    ContactEmail,
    /// Contact phone number
    ContactPhone,
    /// Contract title as written on the document
    ContractTitle,
    /// Contract category (service, purchase, license, nda)
    ContractType,
    /// Opening paragraph summarizing the contract
    Description,
}

impl FieldName {
    /// Every field, in display order
    pub const ALL: [FieldName; 11] = [
        FieldName::Client,
        FieldName::StartDate,
        FieldName::EndDate,
        FieldName::RenewalDate,
        FieldName::ContractValue,
        FieldName::ContactName,
        FieldName::ContactEmail,
        FieldName::ContactPhone,
        FieldName::ContractTitle,
        FieldName::ContractType,
        FieldName::Description,
    ];

    /// Date-valued fields
    pub const DATES: [FieldName; 3] = [FieldName::StartDate, FieldName::EndDate, FieldName::RenewalDate];

    /// Contact fields
    pub const CONTACTS: [FieldName; 3] = [FieldName::ContactName, FieldName::ContactEmail, FieldName::ContactPhone];

    /// Get the field name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldName::Client => "client",
            FieldName::StartDate => "start_date",
            FieldName::EndDate => "end_date",
            FieldName::RenewalDate => "renewal_date",
            FieldName::ContractValue => "contract_value",
            FieldName::ContactName => "contact_name",
            FieldName::ContactEmail => "contact_email",
            FieldName::ContactPhone => "contact_phone",
            FieldName::ContractTitle => "contract_title",
            FieldName::ContractType => "contract_type",
            FieldName::Description => "description",
        }
    }

    /// Parse a field name ("start_date", "start-date", "START_DATE")
    pub fn parse(s: &str) -> Option<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL.into_iter().find(|f| f.as_str() == normalized)
    }

    /// Whether the field holds a calendar date
    pub fn is_date(&self) -> bool {
        Self::DATES.contains(self)
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FieldName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Unknown contract field: {}", s))
    }
}

/// A decimal amount with an optional ISO currency code
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MonetaryAmount {
    /// The amount, as written (no conversion)
    pub amount: Decimal,
    /// ISO 4217 code, when the text carried a symbol or code
    pub currency: Option<String>,
}

impl MonetaryAmount {
    /// Create an amount
    pub fn new(amount: Decimal, currency: Option<&str>) -> Self {
        Self {
            amount,
            currency: currency.map(str::to_string),
        }
    }
}

impl fmt::Display for MonetaryAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.currency {
            Some(code) => write!(f, "{} {}", code, self.amount),
            None => write!(f, "{}", self.amount),
        }
    }
}

/// A normalized, typed field value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    /// Calendar date
    Date(NaiveDate),
    /// Monetary amount
    Money(MonetaryAmount),
    /// Free text (names, emails, phone numbers, titles)
    Text(String),
}

impl FieldValue {
    /// The date, for date values
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(date) => Some(*date),
            _ => None,
        }
    }

    /// The amount, for money values
    pub fn as_money(&self) -> Option<&MonetaryAmount> {
        match self {
            FieldValue::Money(amount) => Some(amount),
            _ => None,
        }
    }

    /// The text, for text values
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            FieldValue::Money(amount) => write!(f, "{}", amount),
            FieldValue::Text(text) => f.write_str(text),
        }
    }
}

/// A proposed value for one contract field, pending human confirmation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldCandidate {
    field: FieldName,
    value: FieldValue,
    confidence: f64,
    provenance: Provenance,
    occurrences: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    paired_with: Option<EntityRef>,
}

impl FieldCandidate {
    /// Create a candidate; the confidence is clamped to [0, 1]
    pub fn new(field: FieldName, value: FieldValue, confidence: f64, provenance: impl Into<Provenance>) -> Self {
        Self {
            field,
            value,
            confidence: clamp_confidence(confidence),
            provenance: provenance.into(),
            occurrences: 1,
            paired_with: None,
        }
    }

    /// Record how many mentions were merged into this candidate
    pub fn with_occurrences(mut self, occurrences: usize) -> Self {
        self.occurrences = occurrences.max(1);
        self
    }

    /// Record the entity this candidate was paired with (contact names)
    pub fn with_pairing(mut self, partner: EntityRef) -> Self {
        self.paired_with = Some(partner);
        self
    }

    /// Return a copy with the confidence multiplied by `factor`, clamped
    pub fn scaled(&self, factor: f64) -> Self {
        let mut scaled = self.clone();
        scaled.confidence = clamp_confidence(self.confidence * factor);
        scaled
    }

    /// The field this candidate is for
    pub fn field(&self) -> FieldName {
        self.field
    }

    /// The normalized value
    pub fn value(&self) -> &FieldValue {
        &self.value
    }

    /// Resolved confidence in [0, 1]
    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Where the value came from
    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    /// Number of mentions merged into this candidate
    pub fn occurrences(&self) -> usize {
        self.occurrences
    }

    /// Entity this candidate was paired with, if any
    pub fn paired_with(&self) -> Option<&EntityRef> {
        self.paired_with.as_ref()
    }
}

/// Sort candidates by confidence, highest first
///
/// The sort is stable, so candidates with equal confidence keep the order in
/// which they were supplied.
pub fn rank_candidates(candidates: &mut [FieldCandidate]) {
    candidates.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
}
