//! List command implementation.

use crate::cli::StoreArgs;
use crate::commands::open_store;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;

/// Execute the list command.
pub fn execute_list(args: StoreArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let store = open_store(&args, config)?;
    println!("{}", formatter.format_documents(&store.list()?)?);
    Ok(())
}
