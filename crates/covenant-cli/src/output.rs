//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use covenant_domain::{DocumentId, ExtractionResult, FieldCandidate, RecognizedEntity};
use covenant_ner::RecognizerInfo;
use colored::*;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self { format, color_enabled }
    }

    /// Format an extraction result.
    ///
    /// Tables show the top candidate per field unless `all` is set.
    pub fn format_result(&self, result: &ExtractionResult, all: bool) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
            OutputFormat::Table => Ok(self.format_result_table(result, all)),
        }
    }

    fn format_result_table(&self, result: &ExtractionResult, all: bool) -> String {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value", "Confidence", "Seen", "Location"]);

        for (field, candidates) in result.fields() {
            if candidates.is_empty() {
                builder.push_record([field.to_string(), "-".into(), "-".into(), "-".into(), "-".into()]);
                continue;
            }
            let shown = if all { candidates.len() } else { 1 };
            for (rank, candidate) in candidates.iter().take(shown).enumerate() {
                let name = if rank == 0 { field.to_string() } else { String::new() };
                builder.push_record([
                    name,
                    candidate.value().to_string(),
                    self.confidence(candidate.confidence()),
                    candidate.occurrences().to_string(),
                    location(candidate),
                ]);
            }
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        let metadata = result.metadata();
        let mut lines = vec![table.to_string()];
        for warning in result.warnings() {
            lines.push(self.warning(&warning.to_string()));
        }
        lines.push(self.info(&format!(
            "{} · {} blocks · {} entities · {} ms · extraction {}",
            metadata.filename,
            metadata.block_count,
            metadata.entity_count,
            metadata.processing_time_ms,
            metadata.extraction_id
        )));
        lines.join("\n")
    }

    /// Format recognized entities.
    pub fn format_entities(&self, entities: &[RecognizedEntity]) -> Result<String> {
        if self.format == OutputFormat::Json {
            return Ok(serde_json::to_string_pretty(entities)?);
        }
        if entities.is_empty() {
            return Ok(self.colorize("No entities found.", "yellow"));
        }

        let mut builder = Builder::default();
        builder.push_record(["#", "Type", "Text", "Span", "Block", "Confidence"]);
        for entity in entities {
            let span = entity.span();
            builder.push_record([
                entity.ordinal().to_string(),
                entity.entity_type().to_string(),
                entity.text().to_string(),
                format!("{}..{}", span.start, span.end),
                entity.block_index().to_string(),
                self.confidence(entity.base_confidence()),
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        Ok(table.to_string())
    }

    /// Format the recognizer description.
    pub fn format_recognizer(&self, info: &RecognizerInfo) -> Result<String> {
        if self.format == OutputFormat::Json {
            return Ok(serde_json::to_string_pretty(info)?);
        }
        let labels: Vec<String> = info.labels.iter().map(ToString::to_string).collect();
        Ok([
            format!("Recognizer: {} {}", self.colorize(&info.name, "cyan"), info.version),
            format!("  Layers:   {}", info.layers.join(" → ")),
            format!("  Labels:   {}", labels.join(", ")),
            format!("  Overlaps: {:?}", info.strategy),
        ]
        .join("\n"))
    }

    /// Format a document listing.
    pub fn format_documents(&self, documents: &[DocumentId]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(documents)?),
            OutputFormat::Table if documents.is_empty() => Ok(self.colorize("No documents found.", "yellow")),
            OutputFormat::Table => Ok(documents.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n")),
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Confidence with a color band.
    fn confidence(&self, confidence: f64) -> String {
        let text = format!("{:.2}", confidence);
        let color = if confidence >= 0.8 {
            "green"
        } else if confidence >= 0.5 {
            "yellow"
        } else {
            "red"
        };
        self.colorize(&text, color)
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}

fn location(candidate: &FieldCandidate) -> String {
    let span = candidate.provenance().span();
    format!("{}..{}", span.start, span.end)
}
