//! Recognizer command implementation.

use crate::error::Result;
use crate::output::Formatter;
use covenant_ner::shared_recognizer;

/// Execute the recognizer command.
pub fn execute_recognizer(formatter: &Formatter) -> Result<()> {
    let info = shared_recognizer().info();
    println!("{}", formatter.format_recognizer(&info)?);
    Ok(())
}
