//! Config command implementation.

use crate::cli::{ConfigAction, ConfigArgs};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use std::path::Path;

/// Execute the config command.
pub fn execute_config(args: ConfigArgs, config: &Config, path: &Path, formatter: &Formatter) -> Result<()> {
    match args.action {
        ConfigAction::Show => {
            println!("{}", config.to_toml()?);
        }
        ConfigAction::Init { force, preset } => {
            let mut fresh = Config::default();
            if let Some(preset) = preset {
                fresh.extractor = preset.into();
            }
            init_config(&fresh, path, force)?;
            println!("{}", formatter.success(&format!("Wrote {}", path.display())));
        }
        ConfigAction::Path => {
            println!("{}", path.display());
        }
    }
    Ok(())
}

/// Write `config` to `path`, refusing to overwrite unless `force` is set.
pub fn init_config(config: &Config, path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(CliError::Config(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }
    config.save_to(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use covenant_extractor::ExtractorConfig;
    use tempfile::TempDir;

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        init_config(&Config::default(), &path, false).unwrap();
        let err = init_config(&Config::default(), &path, false).unwrap_err();
        assert!(err.to_string().contains("already exists"));

        let mut lenient = Config::default();
        lenient.extractor = ExtractorConfig::lenient();
        init_config(&lenient, &path, true).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().extractor, ExtractorConfig::lenient());
    }
}
