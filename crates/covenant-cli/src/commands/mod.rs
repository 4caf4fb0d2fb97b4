//! Command implementations.

pub mod config;
pub mod entities;
pub mod extract;
pub mod list;
pub mod recognizer;

pub use self::config::execute_config;
pub use self::entities::execute_entities;
pub use self::extract::execute_extract;
pub use self::list::execute_list;
pub use self::recognizer::execute_recognizer;

use crate::cli::StoreArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use covenant_extractor::{Extractor, FsDocumentStore};
use covenant_ner::{shared_recognizer, StackedRecognizer};

/// Open the document store named on the command line or in the config.
pub fn open_store(args: &StoreArgs, config: &Config) -> Result<FsDocumentStore> {
    let dir = args
        .store
        .as_ref()
        .or(config.settings.store_dir.as_ref())
        .ok_or_else(|| {
            CliError::Config("No document store configured. Pass --store or set settings.store_dir".into())
        })?;
    Ok(FsDocumentStore::new(dir)?)
}

/// Build an extractor over the selected store with the shared recognizer.
pub fn build_extractor(args: &StoreArgs, config: &Config) -> Result<Extractor<FsDocumentStore, StackedRecognizer>> {
    let store = open_store(args, config)?;
    Ok(Extractor::new(store, shared_recognizer(), config.extractor.clone()))
}
