//! Entities command implementation.

use crate::cli::EntitiesArgs;
use crate::commands::build_extractor;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use covenant_domain::DocumentId;

/// Execute the entities command.
pub async fn execute_entities(args: EntitiesArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let extractor = build_extractor(&args.store, config)?;
    let entities = extractor
        .recognize(&DocumentId::from(args.document), &extractor.default_options())
        .await?;
    println!("{}", formatter.format_entities(&entities)?);
    Ok(())
}
