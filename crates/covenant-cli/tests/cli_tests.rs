//! Command execution against a temporary upload directory

use covenant_cli::cli::{ExtractArgs, StoreArgs};
use covenant_cli::commands::extract::extract_report;
use covenant_cli::config::OutputFormat;
use covenant_cli::{CliError, Config, Formatter};
use docx_rs::{Docx, Paragraph, Run};
use std::io::Cursor;
use tempfile::TempDir;

fn upload_dir() -> TempDir {
    let docx = [
        "SOFTWARE LICENSE AGREEMENT",
        "Customer: Initech LLC",
        "This license is effective March 1, 2024 and expires February 28, 2025.",
        "License fee: USD 12,500",
    ]
    .iter()
    .fold(Docx::new(), |docx, text| {
        docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(*text)))
    });
    let mut cursor = Cursor::new(Vec::new());
    docx.build().pack(&mut cursor).unwrap();

    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("license.docx"), cursor.into_inner()).unwrap();
    std::fs::write(dir.path().join("notes.txt"), "not a contract").unwrap();
    dir
}

fn extract_args(dir: &TempDir, document: &str) -> ExtractArgs {
    ExtractArgs {
        document: document.to_string(),
        store: StoreArgs {
            store: Some(dir.path().to_path_buf()),
        },
        timeout: None,
        min_confidence: None,
        fields: Vec::new(),
        all: false,
    }
}

#[tokio::test]
async fn test_extract_json_report() {
    let dir = upload_dir();
    let mut args = extract_args(&dir, "license.docx");
    args.fields = vec!["customer".into()];
    let formatter = Formatter::new(OutputFormat::Json, false);

    let err = extract_report(args, &Config::default(), &formatter).await.unwrap_err();
    assert!(matches!(err, CliError::InvalidInput(_)));

    let mut args = extract_args(&dir, "license.docx");
    args.fields = vec!["client".into(), "end_date".into(), "contract_type".into()];
    let report = extract_report(args, &Config::default(), &formatter).await.unwrap();
    let json: serde_json::Value = serde_json::from_str(&report).unwrap();

    let fields = json["fields"].as_object().unwrap();
    assert_eq!(fields.len(), 3);
    assert_eq!(json["fields"]["client"][0]["value"]["value"], "Initech LLC");
    assert_eq!(json["fields"]["end_date"][0]["value"]["value"], "2025-02-28");
    assert_eq!(json["fields"]["contract_type"][0]["value"]["value"], "license");
}

#[tokio::test]
async fn test_extract_table_report() {
    let dir = upload_dir();
    let formatter = Formatter::new(OutputFormat::Table, false);
    let report = extract_report(extract_args(&dir, "license.docx"), &Config::default(), &formatter)
        .await
        .unwrap();

    assert!(report.contains("Initech LLC"));
    assert!(report.contains("USD 12500"));
    assert!(report.contains("license.docx"));
}

#[tokio::test]
async fn test_unsupported_upload_exit_code() {
    let dir = upload_dir();
    let formatter = Formatter::new(OutputFormat::Table, false);
    let err = extract_report(extract_args(&dir, "notes.txt"), &Config::default(), &formatter)
        .await
        .unwrap_err();

    assert!(matches!(err, CliError::Extraction(_)));
    assert_eq!(err.exit_code(), 2);
}
