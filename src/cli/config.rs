//! Config and init commands

use std::path::{Path, PathBuf};

use crate::config::Settings;
use crate::error::{BackupError, BackupResult};

/// Handle the config command: print the resolved settings and paths
pub fn handle_config_command(config_file: &Path, settings: &Settings) -> BackupResult<()> {
    println!("hfs-backup Configuration");
    println!("========================");
    if config_file.exists() {
        println!("Config file:     {}", config_file.display());
    } else {
        println!("Config file:     {} (not found, using defaults)", config_file.display());
    }
    println!();
    println!("Portal:          {}", settings.portal_url);
    println!("Full backup:     {}", settings.full_backup);
    println!("Item list:       {}", display_optional(settings.csv_location.as_deref()));
    println!(
        "Output root:     {}",
        display_optional(settings.download_location.as_deref())
    );
    println!("Ledger file:     {}", settings.ledger_filename);
    println!(
        "Token variable:  {} ({})",
        settings.token_env,
        if settings.token().is_some() { "set" } else { "not set" }
    );
    println!("Request timeout: {}s", settings.request_timeout_secs);

    if let Ok(paths) = settings.backup_paths() {
        println!();
        println!("Ledger:          {}", paths.ledger_file().display());
        println!("Backups:         {}", paths.backups_dir().display());
        println!("Logs:            {}", paths.logs_dir().display());
    }

    Ok(())
}

/// Handle the init command: write a template settings file
///
/// An existing file is left alone unless `force` is set.
pub fn handle_init_command(
    config_file: &Path,
    csv: Option<PathBuf>,
    out: Option<PathBuf>,
    force: bool,
) -> BackupResult<()> {
    if config_file.exists() && !force {
        return Err(BackupError::Config(format!(
            "{} already exists, use --force to overwrite",
            config_file.display()
        )));
    }

    let settings = Settings {
        csv_location: csv,
        download_location: out,
        ..Settings::default()
    };
    settings.save(config_file)?;

    println!("Wrote settings to {}", config_file.display());
    if settings.csv_location.is_none() || settings.download_location.is_none() {
        println!("Set csv_location and download_location before running a backup.");
    }

    Ok(())
}

fn display_optional(path: Option<&Path>) -> String {
    path.map(|p| p.display().to_string())
        .unwrap_or_else(|| "(not set)".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_writes_loadable_settings() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("nested").join("config.json");

        handle_init_command(
            &config_file,
            Some(PathBuf::from("/data/items.csv")),
            Some(PathBuf::from("/data/out")),
            false,
        )
        .unwrap();

        let settings = Settings::load(&config_file).unwrap();
        assert_eq!(settings.csv_location, Some(PathBuf::from("/data/items.csv")));
        assert_eq!(settings.download_location, Some(PathBuf::from("/data/out")));
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.json");
        std::fs::write(&config_file, "{}").unwrap();

        let err = handle_init_command(&config_file, None, None, false).unwrap_err();
        assert!(err.is_config());

        assert!(handle_init_command(&config_file, None, None, true).is_ok());
    }
}
