//! Resolution over entities from the bundled recognizer

use chrono::NaiveDate;
use covenant_domain::{BlockRole, ExtractedText, FieldName, FieldValue, RecognizedEntity};
use covenant_ner::{shared_recognizer, EntityRecognizerAdapter};
use covenant_resolver::{FieldResolver, ResolverConfig};
use std::collections::BTreeSet;

fn recognize(text: &ExtractedText) -> Vec<RecognizedEntity> {
    let adapter = EntityRecognizerAdapter::new(shared_recognizer());
    adapter.recognize(text).collect::<Result<_, _>>().unwrap()
}

fn all_fields() -> BTreeSet<FieldName> {
    FieldName::ALL.into_iter().collect()
}

fn date(y: i32, m: u32, d: u32) -> FieldValue {
    FieldValue::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

#[test]
fn test_frequent_client_ranks_first() {
    let text = ExtractedText::from_blocks([
        (BlockRole::Paragraph, "Acme Corp provides the services. Globex Inc receives them."),
        (BlockRole::Paragraph, "Acme Corp invoices monthly."),
        (BlockRole::Paragraph, "Acme Corp warrants the work."),
    ]);
    let single = ExtractedText::from_blocks([(BlockRole::Paragraph, "Acme Corp provides the services.")]);
    let resolver = FieldResolver::default();

    let repeated = resolver.resolve(&text, &recognize(&text), &all_fields());
    let once = resolver.resolve(&single, &recognize(&single), &all_fields());

    let top = &repeated.fields[&FieldName::Client][0];
    assert_eq!(top.value(), &FieldValue::Text("Acme Corp".into()));
    assert_eq!(top.occurrences(), 3);
    assert!(top.confidence() > once.fields[&FieldName::Client][0].confidence());
    assert!(top.confidence() > repeated.fields[&FieldName::Client][1].confidence());
}

#[test]
fn test_contract_fields_from_plain_text() {
    let text = ExtractedText::from_blocks([
        (BlockRole::Heading, "MASTER SERVICES AGREEMENT"),
        (
            BlockRole::Paragraph,
            "This Agreement is effective January 15, 2024 and expires on 31st December 2025. \
             It renews automatically on January 15, 2026.",
        ),
        (BlockRole::Paragraph, "Client: Initech LLC"),
        (BlockRole::TableCell, "Total Fee"),
        (BlockRole::TableCell, "$120,000"),
        (BlockRole::Paragraph, "For notices contact Ms. Jane Doe at jane.doe@initech.com or (555) 123-4567."),
    ]);
    let resolution = FieldResolver::default().resolve(&text, &recognize(&text), &all_fields());
    let top = |field: FieldName| resolution.fields[&field][0].value().clone();

    assert_eq!(top(FieldName::StartDate), date(2024, 1, 15));
    assert_eq!(top(FieldName::EndDate), date(2025, 12, 31));
    assert_eq!(top(FieldName::RenewalDate), date(2026, 1, 15));
    assert_eq!(top(FieldName::Client), FieldValue::Text("Initech LLC".into()));
    assert_eq!(top(FieldName::ContractValue).to_string(), "USD 120000");
    assert_eq!(top(FieldName::ContactName), FieldValue::Text("Jane Doe".into()));
    assert_eq!(top(FieldName::ContactEmail), FieldValue::Text("jane.doe@initech.com".into()));
    assert_eq!(top(FieldName::ContactPhone), FieldValue::Text("5551234567".into()));
    assert_eq!(top(FieldName::ContractTitle), FieldValue::Text("MASTER SERVICES AGREEMENT".into()));
    assert_eq!(top(FieldName::ContractType), FieldValue::Text("service".into()));
    assert!(resolution.warnings.is_empty());
}

#[test]
fn test_strict_config_lowers_uncued_confidence() {
    let text = ExtractedText::from_blocks([(BlockRole::Paragraph, "Term: 01/01/2024 through 12/31/2024.")]);
    let entities = recognize(&text);
    let scope = BTreeSet::from([FieldName::StartDate]);

    let default = FieldResolver::default().resolve(&text, &entities, &scope);
    let strict = FieldResolver::new(ResolverConfig::strict()).resolve(&text, &entities, &scope);

    let confidence = |r: &covenant_resolver::Resolution| r.fields[&FieldName::StartDate][0].confidence();
    assert!(confidence(&strict) < confidence(&default));
}
