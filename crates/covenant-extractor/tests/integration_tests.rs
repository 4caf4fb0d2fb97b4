//! End-to-end extraction with the bundled recognizer and a directory store

use covenant_domain::{DocumentId, ExtractionResult, ExtractionWarning, FieldName, FieldValue};
use covenant_extractor::{
    ExtractionError, ExtractionOptions, Extractor, ExtractorConfig, FailureClass, FsDocumentStore, ReviewDraft,
};
use covenant_ner::{shared_recognizer, StackedRecognizer};
use docx_rs::{Docx, Paragraph, Run};
use std::io::Cursor;
use std::sync::Arc;
use tempfile::TempDir;

fn docx(paragraphs: &[&str]) -> Vec<u8> {
    let docx = paragraphs.iter().fold(Docx::new(), |docx, text| {
        docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(*text)))
    });
    let mut cursor = Cursor::new(Vec::new());
    docx.build().pack(&mut cursor).unwrap();
    cursor.into_inner()
}

struct Fixture {
    _dir: TempDir,
    extractor: Extractor<FsDocumentStore, StackedRecognizer>,
}

impl Fixture {
    fn new(files: &[(&str, Vec<u8>)]) -> Self {
        let dir = TempDir::new().unwrap();
        for (name, bytes) in files {
            std::fs::write(dir.path().join(name), bytes).unwrap();
        }
        let store = FsDocumentStore::new(dir.path()).unwrap();
        let extractor = Extractor::new(store, shared_recognizer(), ExtractorConfig::default());
        Self { _dir: dir, extractor }
    }

    async fn extract(&self, id: &str) -> Result<ExtractionResult, ExtractionError> {
        self.extractor
            .extract(&DocumentId::from(id), &ExtractionOptions::default())
            .await
    }
}

fn term_clause(end_year: u32) -> Vec<u8> {
    let termination = format!("This Agreement terminates December 31, {}.", end_year);
    docx(&[
        "PROFESSIONAL SERVICES AGREEMENT",
        "Effective January 1, 2024, Acme Corp engages the consultant.",
        &termination,
    ])
}

#[tokio::test]
async fn test_inverted_dates_are_flagged_and_penalized() {
    let fixture = Fixture::new(&[("inverted.docx", term_clause(2023)), ("ordered.docx", term_clause(2024))]);

    let inverted = fixture.extract("inverted.docx").await.unwrap();
    let ordered = fixture.extract("ordered.docx").await.unwrap();

    assert!(inverted.has_warning(&ExtractionWarning::InvertedDateRange));
    assert!(!ordered.has_warning(&ExtractionWarning::InvertedDateRange));

    let end = |result: &ExtractionResult| result.top(FieldName::EndDate).unwrap().confidence();
    assert!(end(&inverted) < end(&ordered));
    assert_eq!(
        inverted.top(FieldName::StartDate).unwrap().value().to_string(),
        "2024-01-01"
    );
}

#[tokio::test]
async fn test_inversion_check_ignores_field_scope() {
    let fixture = Fixture::new(&[("inverted.docx", term_clause(2023))]);
    let id = DocumentId::from("inverted.docx");

    let full = fixture.extract("inverted.docx").await.unwrap();
    let options = ExtractionOptions::default().with_fields([FieldName::EndDate]);
    let narrow = fixture.extractor.extract(&id, &options).await.unwrap();

    assert_eq!(narrow.fields().keys().copied().collect::<Vec<_>>(), vec![FieldName::EndDate]);
    assert!(narrow.has_warning(&ExtractionWarning::InvertedDateRange));
    assert_eq!(
        narrow.top(FieldName::EndDate).unwrap().confidence(),
        full.top(FieldName::EndDate).unwrap().confidence()
    );
}

#[tokio::test]
async fn test_frequent_organization_is_top_client() {
    let fixture = Fixture::new(&[
        (
            "repeated.docx",
            docx(&[
                "Acme Corp provides the services.",
                "Globex Inc receives them.",
                "Acme Corp invoices monthly.",
                "Acme Corp warrants the work.",
            ]),
        ),
        ("single.docx", docx(&["Acme Corp provides the services."])),
    ]);

    let repeated = fixture.extract("repeated.docx").await.unwrap();
    let single = fixture.extract("single.docx").await.unwrap();

    let top = repeated.top(FieldName::Client).unwrap();
    assert_eq!(top.value(), &FieldValue::Text("Acme Corp".into()));
    assert_eq!(top.occurrences(), 3);
    assert!(top.confidence() > single.top(FieldName::Client).unwrap().confidence());
    assert!(repeated.has_warning(&ExtractionWarning::MultipleClients { count: 2 }));
}

#[tokio::test]
async fn test_plain_text_is_unsupported() {
    let fixture = Fixture::new(&[("notes.txt", b"Client: Acme Corp".to_vec())]);
    let err = fixture.extract("notes.txt").await.unwrap_err();

    assert_eq!(err, ExtractionError::UnsupportedFormat("txt".into()));
    assert_eq!(err.class(), FailureClass::UserActionable);
}

#[tokio::test]
async fn test_mislabelled_document_is_corrupt() {
    let fixture = Fixture::new(&[("scan.pdf", docx(&["Not really a PDF"]))]);
    let err = fixture.extract("scan.pdf").await.unwrap_err();
    assert!(matches!(err, ExtractionError::CorruptDocument { .. }));
}

#[tokio::test]
async fn test_paths_outside_store_are_not_found() {
    let fixture = Fixture::new(&[]);
    let err = fixture.extract("../etc/passwd.pdf").await.unwrap_err();
    assert!(matches!(err, ExtractionError::NotFound(_)));
}

#[tokio::test]
async fn test_result_invariants() {
    let fixture = Fixture::new(&[(
        "msa.docx",
        docx(&[
            "MASTER SERVICES AGREEMENT",
            "Client: Initech LLC",
            "This Agreement commences on 03/01/2024 and expires on 28th February 2025.",
            "The total fee is USD 250k, payable to Globex Holdings, Inc. quarterly.",
            "Attn: Peter Gibbons, peter@initech.com, (555) 010-2000",
        ]),
    )]);
    let options = ExtractionOptions::default().with_min_confidence(0.2);
    let result = fixture
        .extractor
        .extract(&DocumentId::from("msa.docx"), &options)
        .await
        .unwrap();

    assert_eq!(result.fields().len(), FieldName::ALL.len());
    for candidates in result.fields().values() {
        assert!(candidates.iter().all(|c| (0.2..=1.0).contains(&c.confidence())));
        assert!(candidates.windows(2).all(|w| w[0].confidence() >= w[1].confidence()));
    }
    assert_eq!(result.top(FieldName::Client).unwrap().value().to_string(), "Initech LLC");
    assert_eq!(result.top(FieldName::StartDate).unwrap().value().to_string(), "2024-03-01");
    assert_eq!(result.top(FieldName::EndDate).unwrap().value().to_string(), "2025-02-28");
    assert_eq!(result.top(FieldName::ContractValue).unwrap().value().to_string(), "USD 250000");
    assert_eq!(result.top(FieldName::ContactName).unwrap().value().to_string(), "Peter Gibbons");
    assert_eq!(result.top(FieldName::ContactPhone).unwrap().value().to_string(), "5550102000");
}

#[tokio::test]
async fn test_review_of_extraction() {
    let fixture = Fixture::new(&[("inverted.docx", term_clause(2023))]);
    let result = fixture.extract("inverted.docx").await.unwrap();
    let extraction_id = result.metadata().extraction_id;

    let mut draft = ReviewDraft::new(result);
    assert!(draft.warnings().contains(&ExtractionWarning::InvertedDateRange));
    draft.accept_top_above(0.7);
    draft
        .override_value(
            FieldName::EndDate,
            FieldValue::Date(chrono::NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()),
        )
        .unwrap();
    let contract = draft.finalize();

    assert_eq!(contract.extraction_id, extraction_id);
    assert_eq!(contract.value(FieldName::EndDate).unwrap().to_string(), "2024-12-31");
    let client = &contract.fields[&FieldName::Client];
    assert_eq!(client.provenance.as_ref().unwrap().rank, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_extractions_agree() {
    let fixture = Arc::new(Fixture::new(&[("ordered.docx", term_clause(2024))]));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let fixture = Arc::clone(&fixture);
            tokio::spawn(async move { fixture.extract("ordered.docx").await })
        })
        .collect();

    let mut results = Vec::new();
    for handle in handles {
        results.push(handle.await.unwrap().unwrap());
    }
    assert!(results.windows(2).all(|w| w[0].fields() == w[1].fields()));
}
