//! Extract command implementation.

use crate::cli::ExtractArgs;
use crate::commands::build_extractor;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use covenant_domain::{DocumentId, FieldName};

/// Execute the extract command.
pub async fn execute_extract(args: ExtractArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    println!("{}", extract_report(args, config, formatter).await?);
    Ok(())
}

/// Run an extraction and render its result.
pub async fn extract_report(args: ExtractArgs, config: &Config, formatter: &Formatter) -> Result<String> {
    let extractor = build_extractor(&args.store, config)?;

    let mut options = extractor.default_options();
    if let Some(timeout) = args.timeout {
        options = options.with_timeout(timeout);
    }
    if let Some(min_confidence) = args.min_confidence {
        if !(0.0..=1.0).contains(&min_confidence) {
            return Err(CliError::InvalidInput("Confidence must be between 0.0 and 1.0".to_string()));
        }
        options = options.with_min_confidence(min_confidence);
    }
    if !args.fields.is_empty() {
        options = options.with_fields(parse_fields(&args.fields)?);
    }

    let result = extractor.extract(&DocumentId::from(args.document), &options).await?;
    formatter.format_result(&result, args.all)
}

/// Parse field names given on the command line.
fn parse_fields(names: &[String]) -> Result<Vec<FieldName>> {
    names
        .iter()
        .filter(|name| !name.trim().is_empty())
        .map(|name| {
            FieldName::parse(name).ok_or_else(|| {
                let known: Vec<&str> = FieldName::ALL.iter().map(|f| f.as_str()).collect();
                CliError::InvalidInput(format!("Unknown field '{}' (expected one of: {})", name, known.join(", ")))
            })
        })
        .collect()
}
