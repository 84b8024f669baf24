//! Command-line interface for COBOL to Java conversion

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use cobol2java_converter::{CodeRepairer, ConverterConfig, ScenarioConverter};
use log::info;
use std::fs;
use std::path::PathBuf;

mod convert_command;
use convert_command::{execute_convert_command, ConvertArgs};

const DEFAULT_CONFIG_FILE: &str = "cobol2java.toml";

#[derive(Parser)]
#[command(name = "cobol2java")]
#[command(about = "COBOL to Java conversion toolchain")]
#[command(version)]
#[command(long_about = "Converts COBOL sources to Java using an optional external text generator, \
falling back to rule-based pattern conversion")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable quiet mode (suppress non-error output)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Set log level
    #[arg(long, global = true, value_enum)]
    log_level: Option<LogLevel>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Clone, Debug)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert COBOL sources to Java
    Convert(ConvertArgs),
    /// Run only the rule-based scanner and show its fragments and log
    Scan {
        /// COBOL source file
        input: PathBuf,
    },
    /// Apply the string-comparison repairs to an existing Java file
    Repair {
        /// Java source file
        input: PathBuf,
        /// Output file (if not specified, prints to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Write the default configuration as TOML
    InitConfig {
        /// Destination (defaults to cobol2java.toml)
        path: Option<PathBuf>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli);

    match cli.command {
        Commands::Convert(args) => execute_convert_command(args),
        Commands::Scan { input } => handle_scan_command(input),
        Commands::Repair { input, output } => handle_repair_command(input, output),
        Commands::InitConfig { path, force } => handle_init_config_command(path, force),
    }
}

fn init_logging(cli: &Cli) {
    let log_level = if cli.quiet {
        log::LevelFilter::Error
    } else if cli.verbose {
        log::LevelFilter::Debug
    } else {
        match &cli.log_level {
            Some(LogLevel::Error) => log::LevelFilter::Error,
            Some(LogLevel::Warn) => log::LevelFilter::Warn,
            Some(LogLevel::Info) => log::LevelFilter::Info,
            Some(LogLevel::Debug) => log::LevelFilter::Debug,
            Some(LogLevel::Trace) => log::LevelFilter::Trace,
            None => log::LevelFilter::Warn,
        }
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .format_timestamp_secs()
        .init();
}

fn handle_scan_command(input: PathBuf) -> Result<()> {
    let source = fs::read_to_string(&input).with_context(|| format!("Failed to read {}", input.display()))?;
    let output = ScenarioConverter::new()?.convert(&source);

    info!(
        "{}: {} declaration(s), {} undeclared identifier(s)",
        input.display(),
        output.declarations.len(),
        output.undeclared.len()
    );

    println!("{}", output.code);
    for entry in output.log.entries() {
        eprintln!("{}", entry);
    }
    Ok(())
}

fn handle_repair_command(input: PathBuf, output: Option<PathBuf>) -> Result<()> {
    let code = fs::read_to_string(&input).with_context(|| format!("Failed to read {}", input.display()))?;
    let repaired = CodeRepairer::new()?.repair(&code);

    match output {
        Some(path) => {
            fs::write(&path, &repaired).with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote repaired code to {}", path.display());
        }
        None => println!("{}", repaired),
    }
    Ok(())
}

fn handle_init_config_command(path: Option<PathBuf>, force: bool) -> Result<()> {
    let path = path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }

    let toml = ConverterConfig::default().to_toml_string()?;
    fs::write(&path, toml).with_context(|| format!("Failed to write {}", path.display()))?;

    println!("✅ Wrote default configuration to {}", path.display());
    Ok(())
}
