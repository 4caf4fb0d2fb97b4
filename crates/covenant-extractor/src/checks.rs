//! Cross-field consistency checks and final candidate filtering

use chrono::NaiveDate;
use covenant_domain::field::rank_candidates;
use covenant_domain::{ExtractionWarning, FieldCandidate, FieldName};
use std::collections::{BTreeMap, BTreeSet};

type Fields = BTreeMap<FieldName, Vec<FieldCandidate>>;

fn top_date(fields: &Fields, field: FieldName) -> Option<NaiveDate> {
    fields.get(&field)?.first()?.value().as_date()
}

/// Penalize an end date that precedes the start date
///
/// Compares the top-ranked candidates of each field. When the end comes
/// first, both are scaled by `penalty` and the fields re-ranked, so a later
/// end-date candidate may take over.
pub(crate) fn check_date_order(fields: &mut Fields, penalty: f64, warnings: &mut Vec<ExtractionWarning>) {
    let (Some(start), Some(end)) = (top_date(fields, FieldName::StartDate), top_date(fields, FieldName::EndDate)) else {
        return;
    };
    if end >= start {
        return;
    }
    tracing::warn!(%start, %end, "End date precedes start date");
    for field in [FieldName::StartDate, FieldName::EndDate] {
        if let Some(candidates) = fields.get_mut(&field) {
            if let Some(top) = candidates.first_mut() {
                *top = top.scaled(penalty);
            }
            rank_candidates(candidates);
        }
    }
    warnings.push(ExtractionWarning::InvertedDateRange);
}

/// Warn when the renewal date comes before the start date
pub(crate) fn check_renewal(fields: &Fields, warnings: &mut Vec<ExtractionWarning>) {
    if let (Some(start), Some(renewal)) = (top_date(fields, FieldName::StartDate), top_date(fields, FieldName::RenewalDate)) {
        if renewal < start {
            tracing::warn!(%start, %renewal, "Renewal date precedes start date");
            warnings.push(ExtractionWarning::RenewalBeforeStart);
        }
    }
}

/// Warn about missing or ambiguous client and contract value
pub(crate) fn check_ambiguity(fields: &Fields, warnings: &mut Vec<ExtractionWarning>) {
    if let Some(clients) = fields.get(&FieldName::Client) {
        match clients.len() {
            0 => warnings.push(ExtractionWarning::NoClient),
            1 => {}
            count => warnings.push(ExtractionWarning::MultipleClients { count }),
        }
    }
    if let Some(values) = fields.get(&FieldName::ContractValue) {
        match values.len() {
            0 => warnings.push(ExtractionWarning::NoContractValue),
            1 => {}
            count => warnings.push(ExtractionWarning::MultipleValues { count }),
        }
    }
}

/// Drop weak candidates, re-rank, and key every requested field
pub(crate) fn finalize_fields(fields: &mut Fields, scope: &BTreeSet<FieldName>, min_confidence: f64) {
    fields.retain(|field, _| scope.contains(field));
    for field in scope {
        let candidates = fields.entry(*field).or_default();
        let before = candidates.len();
        candidates.retain(|c| c.confidence() > 0.0 && c.confidence() >= min_confidence);
        if candidates.len() < before {
            tracing::debug!(field = %field, dropped = before - candidates.len(), "Dropped low-confidence candidates");
        }
        rank_candidates(candidates);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use covenant_domain::{EntityRef, EntityType, FieldValue, Span};

    fn date_candidate(field: FieldName, y: i32, m: u32, d: u32, confidence: f64) -> FieldCandidate {
        let source = EntityRef {
            ordinal: 0,
            entity_type: EntityType::Date,
            span: Span::new(0, 10),
        };
        let value = FieldValue::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap());
        FieldCandidate::new(field, value, confidence, source)
    }

    fn text_candidate(field: FieldName, text: &str, confidence: f64) -> FieldCandidate {
        let source = EntityRef {
            ordinal: 1,
            entity_type: EntityType::Org,
            span: Span::new(0, text.len()),
        };
        FieldCandidate::new(field, FieldValue::Text(text.into()), confidence, source)
    }

    #[test]
    fn test_inverted_dates_are_penalized() {
        let mut fields = Fields::from([
            (FieldName::StartDate, vec![date_candidate(FieldName::StartDate, 2024, 1, 1, 0.9)]),
            (FieldName::EndDate, vec![date_candidate(FieldName::EndDate, 2023, 12, 31, 0.9)]),
        ]);
        let mut warnings = Vec::new();
        check_date_order(&mut fields, 0.5, &mut warnings);

        assert_eq!(warnings, vec![ExtractionWarning::InvertedDateRange]);
        assert!((fields[&FieldName::StartDate][0].confidence() - 0.45).abs() < 1e-9);
        assert!((fields[&FieldName::EndDate][0].confidence() - 0.45).abs() < 1e-9);
    }

    #[test]
    fn test_later_end_candidate_takes_over() {
        let mut fields = Fields::from([
            (FieldName::StartDate, vec![date_candidate(FieldName::StartDate, 2024, 1, 1, 0.9)]),
            (
                FieldName::EndDate,
                vec![
                    date_candidate(FieldName::EndDate, 2023, 6, 1, 0.8),
                    date_candidate(FieldName::EndDate, 2025, 1, 1, 0.6),
                ],
            ),
        ]);
        let mut warnings = Vec::new();
        check_date_order(&mut fields, 0.5, &mut warnings);

        let end = &fields[&FieldName::EndDate];
        assert_eq!(end[0].value().as_date(), NaiveDate::from_ymd_opt(2025, 1, 1));
        assert!((end[1].confidence() - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_ordered_dates_untouched() {
        let mut fields = Fields::from([
            (FieldName::StartDate, vec![date_candidate(FieldName::StartDate, 2024, 1, 1, 0.9)]),
            (FieldName::EndDate, vec![date_candidate(FieldName::EndDate, 2024, 1, 1, 0.9)]),
        ]);
        let mut warnings = Vec::new();
        check_date_order(&mut fields, 0.5, &mut warnings);
        assert!(warnings.is_empty());
        assert_eq!(fields[&FieldName::EndDate][0].confidence(), 0.9);
    }

    #[test]
    fn test_renewal_before_start() {
        let fields = Fields::from([
            (FieldName::StartDate, vec![date_candidate(FieldName::StartDate, 2024, 1, 1, 0.9)]),
            (FieldName::RenewalDate, vec![date_candidate(FieldName::RenewalDate, 2023, 1, 1, 0.9)]),
        ]);
        let mut warnings = Vec::new();
        check_renewal(&fields, &mut warnings);
        assert_eq!(warnings, vec![ExtractionWarning::RenewalBeforeStart]);
    }

    #[test]
    fn test_ambiguity_warnings() {
        let fields = Fields::from([
            (
                FieldName::Client,
                vec![
                    text_candidate(FieldName::Client, "Acme Corp", 0.9),
                    text_candidate(FieldName::Client, "Globex Inc", 0.7),
                ],
            ),
            (FieldName::ContractValue, Vec::new()),
        ]);
        let mut warnings = Vec::new();
        check_ambiguity(&fields, &mut warnings);
        assert_eq!(
            warnings,
            vec![ExtractionWarning::MultipleClients { count: 2 }, ExtractionWarning::NoContractValue]
        );
    }

    #[test]
    fn test_ambiguity_skips_unrequested_fields() {
        let mut warnings = Vec::new();
        check_ambiguity(&Fields::new(), &mut warnings);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_finalize_filters_and_keys() {
        let mut fields = Fields::from([
            (
                FieldName::Client,
                vec![
                    text_candidate(FieldName::Client, "Globex Inc", 0.3),
                    text_candidate(FieldName::Client, "Acme Corp", 0.9),
                ],
            ),
            (FieldName::ContactName, vec![text_candidate(FieldName::ContactName, "Jane Doe", 0.8)]),
        ]);
        let scope = BTreeSet::from([FieldName::Client, FieldName::EndDate]);
        finalize_fields(&mut fields, &scope, 0.5);

        assert_eq!(fields.keys().copied().collect::<Vec<_>>(), vec![FieldName::Client, FieldName::EndDate]);
        assert_eq!(fields[&FieldName::Client].len(), 1);
        assert_eq!(fields[&FieldName::Client][0].value().as_text(), Some("Acme Corp"));
        assert!(fields[&FieldName::EndDate].is_empty());
    }
}
