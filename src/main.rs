use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

use hfs_backup::cli::{
    handle_config_command, handle_init_command, handle_run_command, handle_status_command,
    handle_verify_command, RunArgs,
};
use hfs_backup::config::paths::{resolve_config_file, CONFIG_ENV};
use hfs_backup::config::Settings;

#[derive(Parser)]
#[command(
    name = "hfs-backup",
    author = "Kaylee Beyene",
    version,
    about = "Incremental backups of hosted feature services",
    long_about = "hfs-backup exports each listed hosted feature service to a zipped \
                  file geodatabase, skipping services that have not been edited since \
                  their last successful backup. Run it on a schedule."
)]
struct Cli {
    /// Settings file (defaults to the platform config directory)
    #[arg(short, long, global = true, env = CONFIG_ENV, value_name = "PATH")]
    config: Option<PathBuf>,

    /// More log output (repeat for more detail)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,

    /// Options for the default run
    #[command(flatten)]
    run: RunArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Back up every stale item (the default)
    Run(RunArgs),

    /// Show the ledger with a stale flag per item
    Status,

    /// Check that an archive opens as a zip package
    Verify {
        /// Path to the archive
        path: PathBuf,
    },

    /// Show current configuration and paths
    Config,

    /// Write a template settings file
    Init {
        /// CSV listing the items to back up
        #[arg(long, value_name = "PATH")]
        csv: Option<PathBuf>,
        /// Output root for archives, logs and the ledger
        #[arg(long, value_name = "PATH")]
        out: Option<PathBuf>,
        /// Overwrite an existing settings file
        #[arg(short, long)]
        force: bool,
    },
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        tracing::Level::ERROR
    } else {
        match verbose {
            0 => tracing::Level::INFO,
            1 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    };

    tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let config_file = resolve_config_file(cli.config.as_deref())?;

    match cli.command {
        Some(Commands::Verify { path }) => {
            handle_verify_command(&path)?;
        }
        Some(Commands::Init { csv, out, force }) => {
            handle_init_command(&config_file, csv, out, force)?;
        }
        Some(Commands::Config) => {
            let settings = Settings::load(&config_file)?;
            handle_config_command(&config_file, &settings)?;
        }
        Some(Commands::Status) => {
            let settings = Settings::load(&config_file)?;
            handle_status_command(&settings)?;
        }
        Some(Commands::Run(args)) => run(&config_file, args)?,
        None => run(&config_file, cli.run)?,
    }

    Ok(())
}

fn run(config_file: &Path, args: RunArgs) -> Result<()> {
    let result = Settings::load(config_file).and_then(|settings| handle_run_command(settings, args));

    if let Err(e) = &result {
        if e.is_config() {
            eprintln!("Check the settings in {} ('hfs-backup config' shows them)", config_file.display());
        }
    }

    result?;
    Ok(())
}
