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
            println!("{}", config.to_redacted_toml()?);
        }
        ConfigAction::Path => {
            println!("{}", path.display());
        }
        ConfigAction::Init { force } => {
            if path.exists() && !force {
                return Err(CliError::Config(format!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                )));
            }
            Config::default().save(path)?;
            println!("{}", formatter.success(&format!("Configuration written to {}", path.display())));
            println!(
                "{}",
                formatter.info("Fill in [zotero] library_id/api_key and [chat_completion] token before analyzing")
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let formatter = Formatter::new(false);

        execute_config(ConfigArgs { action: ConfigAction::Init { force: false } }, &Config::default(), &path, &formatter)
            .unwrap();
        assert!(path.exists());

        let again = execute_config(
            ConfigArgs { action: ConfigAction::Init { force: false } },
            &Config::default(),
            &path,
            &formatter,
        );
        assert!(matches!(again, Err(CliError::Config(_))));

        execute_config(ConfigArgs { action: ConfigAction::Init { force: true } }, &Config::default(), &path, &formatter)
            .unwrap();
    }
}
