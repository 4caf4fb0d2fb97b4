//! Review boundary between extraction and the contract record
//!
//! A [`ReviewDraft`] holds one extraction while a person decides, field by
//! field, which candidate to keep. Finalizing it yields a
//! [`ConfirmedContract`] that carries only confirmed values, each traceable
//! to the candidate and extraction it came from.

use covenant_domain::{
    DocumentId, ExtractionId, ExtractionResult, ExtractionWarning, FieldCandidate, FieldName, FieldValue, Provenance,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Errors raised by review decisions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReviewError {
    /// The field was not part of the extraction
    #[error("Field {0} was not extracted")]
    UnknownField(FieldName),

    /// No candidate at this rank
    #[error("Field {field} has no candidate at rank {rank}")]
    NoSuchCandidate {
        /// Field under review
        field: FieldName,
        /// Requested rank (0 = top)
        rank: usize,
    },

    /// An override value of the wrong kind
    #[error("Field {field} expects a {expected} value")]
    ValueMismatch {
        /// Field under review
        field: FieldName,
        /// Kind of value the field holds
        expected: &'static str,
    },
}

/// Where a confirmed value came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateProvenance {
    /// Rank of the accepted candidate (0 = top)
    pub rank: usize,
    /// The candidate's confidence
    pub confidence: f64,
    /// Location of the value in the document
    pub source: Provenance,
    /// Extraction that produced the candidate
    pub extraction_id: ExtractionId,
}

/// A value confirmed by the reviewer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmedField {
    /// The confirmed value
    pub value: FieldValue,
    /// The accepted candidate, or `None` for a manual override
    pub provenance: Option<CandidateProvenance>,
}

/// The reviewed contract data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmedContract {
    /// Source document
    pub document_id: DocumentId,
    /// Extraction that was reviewed
    pub extraction_id: ExtractionId,
    /// Confirmed values
    pub fields: BTreeMap<FieldName, ConfirmedField>,
    /// Fields the reviewer rejected
    pub rejected: BTreeSet<FieldName>,
}

impl ConfirmedContract {
    /// The confirmed value of a field
    pub fn value(&self, field: FieldName) -> Option<&FieldValue> {
        self.fields.get(&field).map(|f| &f.value)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Decision {
    Accepted(usize),
    Overridden(FieldValue),
    Rejected,
}

/// An extraction under review
#[derive(Debug, Clone)]
pub struct ReviewDraft {
    fields: BTreeMap<FieldName, Vec<FieldCandidate>>,
    warnings: Vec<ExtractionWarning>,
    document_id: DocumentId,
    extraction_id: ExtractionId,
    decisions: BTreeMap<FieldName, Decision>,
}

impl ReviewDraft {
    /// Start reviewing an extraction
    pub fn new(result: ExtractionResult) -> Self {
        let (fields, warnings, metadata) = result.into_parts();
        Self {
            fields,
            warnings,
            document_id: metadata.document_id,
            extraction_id: metadata.extraction_id,
            decisions: BTreeMap::new(),
        }
    }

    /// Ranked candidates for a field
    pub fn candidates(&self, field: FieldName) -> &[FieldCandidate] {
        self.fields.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Warnings raised by the extraction
    pub fn warnings(&self) -> &[ExtractionWarning] {
        &self.warnings
    }

    /// Fields with no decision yet
    pub fn pending(&self) -> Vec<FieldName> {
        self.fields
            .keys()
            .filter(|field| !self.decisions.contains_key(field))
            .copied()
            .collect()
    }

    /// Accept the candidate at `rank` (0 = top)
    pub fn accept(&mut self, field: FieldName, rank: usize) -> Result<(), ReviewError> {
        let candidates = self.fields.get(&field).ok_or(ReviewError::UnknownField(field))?;
        if rank >= candidates.len() {
            return Err(ReviewError::NoSuchCandidate { field, rank });
        }
        self.decisions.insert(field, Decision::Accepted(rank));
        Ok(())
    }

    /// Replace the extracted value with one entered by the reviewer
    pub fn override_value(&mut self, field: FieldName, value: FieldValue) -> Result<(), ReviewError> {
        if !self.fields.contains_key(&field) {
            return Err(ReviewError::UnknownField(field));
        }
        let expected = expected_kind(field);
        let matches = match &value {
            FieldValue::Date(_) => expected == "date",
            FieldValue::Money(_) => expected == "money",
            FieldValue::Text(_) => expected == "text",
        };
        if !matches {
            return Err(ReviewError::ValueMismatch { field, expected });
        }
        self.decisions.insert(field, Decision::Overridden(value));
        Ok(())
    }

    /// Confirm that the field has no usable value
    pub fn reject(&mut self, field: FieldName) -> Result<(), ReviewError> {
        if !self.fields.contains_key(&field) {
            return Err(ReviewError::UnknownField(field));
        }
        self.decisions.insert(field, Decision::Rejected);
        Ok(())
    }

    /// Accept the top candidate of every undecided field at or above `threshold`
    ///
    /// Returns the number of fields accepted.
    pub fn accept_top_above(&mut self, threshold: f64) -> usize {
        let eligible: Vec<FieldName> = self
            .fields
            .iter()
            .filter(|(field, _)| !self.decisions.contains_key(field))
            .filter(|(_, candidates)| candidates.first().is_some_and(|c| c.confidence() >= threshold))
            .map(|(field, _)| *field)
            .collect();
        for field in &eligible {
            self.decisions.insert(*field, Decision::Accepted(0));
        }
        eligible.len()
    }

    /// Finish the review
    ///
    /// Undecided fields and unaccepted candidates are discarded.
    pub fn finalize(self) -> ConfirmedContract {
        let mut fields = BTreeMap::new();
        let mut rejected = BTreeSet::new();

        for (field, decision) in self.decisions {
            match decision {
                Decision::Accepted(rank) => {
                    let Some(candidate) = self.fields.get(&field).and_then(|c| c.get(rank)) else {
                        continue;
                    };
                    let provenance = CandidateProvenance {
                        rank,
                        confidence: candidate.confidence(),
                        source: *candidate.provenance(),
                        extraction_id: self.extraction_id,
                    };
                    fields.insert(
                        field,
                        ConfirmedField {
                            value: candidate.value().clone(),
                            provenance: Some(provenance),
                        },
                    );
                }
                Decision::Overridden(value) => {
                    fields.insert(field, ConfirmedField { value, provenance: None });
                }
                Decision::Rejected => {
                    rejected.insert(field);
                }
            }
        }

        tracing::info!(
            document = %self.document_id,
            confirmed = fields.len(),
            rejected = rejected.len(),
            "Review finalized"
        );
        ConfirmedContract {
            document_id: self.document_id,
            extraction_id: self.extraction_id,
            fields,
            rejected,
        }
    }
}

fn expected_kind(field: FieldName) -> &'static str {
    if field.is_date() {
        "date"
    } else if field == FieldName::ContractValue {
        "money"
    } else {
        "text"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use covenant_domain::{EntityRef, EntityType, ExtractionMetadata, MonetaryAmount, Span};
    use rust_decimal::Decimal;

    fn candidate(field: FieldName, value: FieldValue, confidence: f64, ordinal: usize) -> FieldCandidate {
        let source = EntityRef {
            ordinal,
            entity_type: EntityType::Org,
            span: Span::new(ordinal * 10, ordinal * 10 + 5),
        };
        FieldCandidate::new(field, value, confidence, source)
    }

    fn draft() -> ReviewDraft {
        let fields = BTreeMap::from([
            (
                FieldName::Client,
                vec![
                    candidate(FieldName::Client, FieldValue::Text("Acme Corp".into()), 0.9, 0),
                    candidate(FieldName::Client, FieldValue::Text("Globex Inc".into()), 0.6, 1),
                ],
            ),
            (
                FieldName::StartDate,
                vec![candidate(
                    FieldName::StartDate,
                    FieldValue::Date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
                    0.5,
                    2,
                )],
            ),
            (FieldName::ContractValue, Vec::new()),
        ]);
        let metadata = ExtractionMetadata {
            extraction_id: ExtractionId::new(),
            document_id: DocumentId::from("msa.pdf"),
            filename: "msa.pdf".into(),
            recognizer: "mock".into(),
            block_count: 3,
            entity_count: 3,
            timestamp: 0,
            processing_time_ms: 5,
        };
        ReviewDraft::new(ExtractionResult::new(fields, vec![ExtractionWarning::NoContractValue], metadata))
    }

    #[test]
    fn test_accept_lower_ranked_candidate() {
        let mut draft = draft();
        draft.accept(FieldName::Client, 1).unwrap();
        let contract = draft.finalize();

        let client = &contract.fields[&FieldName::Client];
        assert_eq!(client.value, FieldValue::Text("Globex Inc".into()));
        let provenance = client.provenance.as_ref().unwrap();
        assert_eq!(provenance.rank, 1);
        assert_eq!(provenance.confidence, 0.6);
        assert_eq!(provenance.source.span(), Span::new(10, 15));
        assert_eq!(provenance.extraction_id, contract.extraction_id);
    }

    #[test]
    fn test_accept_errors() {
        let mut draft = draft();
        assert_eq!(
            draft.accept(FieldName::Client, 2),
            Err(ReviewError::NoSuchCandidate {
                field: FieldName::Client,
                rank: 2
            })
        );
        assert_eq!(
            draft.accept(FieldName::ContactEmail, 0),
            Err(ReviewError::UnknownField(FieldName::ContactEmail))
        );
    }

    #[test]
    fn test_override_checks_value_kind() {
        let mut draft = draft();
        let amount = FieldValue::Money(MonetaryAmount::new(Decimal::new(50_000, 0), Some("USD")));
        draft.override_value(FieldName::ContractValue, amount.clone()).unwrap();

        let err = draft
            .override_value(FieldName::StartDate, FieldValue::Text("soon".into()))
            .unwrap_err();
        assert_eq!(err.to_string(), "Field start_date expects a date value");

        let contract = draft.finalize();
        assert_eq!(contract.value(FieldName::ContractValue), Some(&amount));
        assert!(contract.fields[&FieldName::ContractValue].provenance.is_none());
    }

    #[test]
    fn test_accept_top_above_threshold() {
        let mut draft = draft();
        draft.reject(FieldName::ContractValue).unwrap();
        assert_eq!(draft.accept_top_above(0.7), 1);
        assert_eq!(draft.pending(), vec![FieldName::StartDate]);

        let contract = draft.finalize();
        assert_eq!(contract.value(FieldName::Client), Some(&FieldValue::Text("Acme Corp".into())));
        assert_eq!(contract.value(FieldName::StartDate), None);
        assert_eq!(contract.rejected, BTreeSet::from([FieldName::ContractValue]));
    }

    #[test]
    fn test_later_decision_replaces_earlier() {
        let mut draft = draft();
        draft.accept(FieldName::Client, 0).unwrap();
        draft.reject(FieldName::Client).unwrap();
        let contract = draft.finalize();
        assert!(contract.fields.is_empty());
        assert!(contract.rejected.contains(&FieldName::Client));
    }

    #[test]
    fn test_confirmed_contract_serializes() {
        let mut draft = draft();
        draft.accept(FieldName::Client, 0).unwrap();
        draft.reject(FieldName::ContractValue).unwrap();
        let json = serde_json::to_value(draft.finalize()).unwrap();

        assert_eq!(json["document_id"], "msa.pdf");
        assert_eq!(json["fields"]["client"]["provenance"]["rank"], 0);
        assert_eq!(json["rejected"][0], "contract_value");
    }

    #[test]
    fn test_warnings_carried_into_review() {
        assert_eq!(draft().warnings(), &[ExtractionWarning::NoContractValue]);
    }
}
