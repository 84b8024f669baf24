//! The `convert` command: single files or whole source trees

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use cobol2java_converter::{
    CommandGenerator, ConversionOrchestrator, ConverterConfig, FixedGenerator, TextGenerator, UnavailableGenerator,
};
use cobol2java_core::ConversionResult;
use log::{debug, info, warn};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File extensions picked up when converting a directory
pub const COBOL_EXTENSIONS: &[&str] = &["cbl", "cob", "cobol"];

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Arguments for conversion
#[derive(Debug, Args)]
pub struct ConvertArgs {
    /// COBOL source file, or a directory to search for .cbl/.cob/.cobol files
    pub input: PathBuf,

    /// Output file, or output directory when INPUT is a directory
    /// (if not specified, a single file is printed to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write the conversion log to this file
    #[arg(long)]
    pub log_output: Option<PathBuf>,

    /// Converter configuration (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// External generator program; receives the prompt on stdin
    #[arg(long, conflicts_with = "candidate")]
    pub generator_cmd: Option<PathBuf>,

    /// Extra argument for the generator program (repeatable)
    #[arg(long = "generator-arg", requires = "generator_cmd", allow_hyphen_values = true)]
    pub generator_args: Vec<String>,

    /// Use a saved generator response instead of running a generator
    #[arg(long)]
    pub candidate: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "human")]
    pub format: OutputFormat,
}

/// One converted source, as reported in JSON output
#[derive(Debug, Serialize)]
struct ConvertedFile {
    input: PathBuf,
    output: Option<PathBuf>,
    rule_based_fallback: bool,
    #[serde(flatten)]
    result: ConversionResult,
}

pub fn execute_convert_command(args: ConvertArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => ConverterConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => ConverterConfig::default(),
    };
    let orchestrator = ConversionOrchestrator::with_config(config, build_generator(&args)?)
        .context("Failed to set up the converter")?;

    let converted = if args.input.is_dir() {
        convert_directory(&orchestrator, &args)?
    } else {
        vec![convert_file(&orchestrator, &args.input, args.output.as_deref())?]
    };

    if let Some(log_path) = &args.log_output {
        write_log(log_path, &converted)?;
    }

    match args.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&converted).context("Failed to serialize JSON")?;
            println!("{}", json);
        }
        OutputFormat::Human => print_human(&converted),
    }

    Ok(())
}

fn build_generator(args: &ConvertArgs) -> Result<Box<dyn TextGenerator>> {
    if let Some(path) = &args.candidate {
        let response = fs::read_to_string(path)
            .with_context(|| format!("Failed to read candidate response {}", path.display()))?;
        info!("Using saved generator response from {}", path.display());
        return Ok(Box::new(FixedGenerator::named("recorded", response)));
    }

    if let Some(program) = &args.generator_cmd {
        info!("Using generator command {}", program.display());
        return Ok(Box::new(CommandGenerator::new(program).with_args(args.generator_args.iter().cloned())));
    }

    info!("No generator configured, using rule-based conversion only");
    Ok(Box::new(UnavailableGenerator::default()))
}

fn convert_file(orchestrator: &ConversionOrchestrator, input: &Path, output: Option<&Path>) -> Result<ConvertedFile> {
    let source = fs::read_to_string(input).with_context(|| format!("Failed to read {}", input.display()))?;
    debug!("Converting {} ({} bytes)", input.display(), source.len());

    let run = orchestrator.run(&source);
    if let Some(reason) = run.fallback {
        warn!("{}: used rule-based conversion ({:?})", input.display(), reason);
    }

    if let Some(path) = output {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(path, &run.result.java_code).with_context(|| format!("Failed to write {}", path.display()))?;
    }

    Ok(ConvertedFile {
        input: input.to_path_buf(),
        output: output.map(Path::to_path_buf),
        rule_based_fallback: run.fallback.is_some(),
        result: run.result,
    })
}

fn convert_directory(orchestrator: &ConversionOrchestrator, args: &ConvertArgs) -> Result<Vec<ConvertedFile>> {
    let root = &args.input;
    let out_dir = args.output.as_deref().unwrap_or(root);
    info!("Converting COBOL sources under {} into {}", root.display(), out_dir.display());

    let mut converted = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk {}", root.display()))?;
        if !entry.file_type().is_file() || !is_cobol_source(entry.path()) {
            continue;
        }

        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        let target = out_dir.join(relative).with_extension("java");
        converted.push(convert_file(orchestrator, entry.path(), Some(&target))?);
    }

    if converted.is_empty() {
        bail!("No COBOL sources (.cbl, .cob, .cobol) found under {}", root.display());
    }
    Ok(converted)
}

pub fn is_cobol_source(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| COBOL_EXTENSIONS.iter().any(|known| known.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}

fn write_log(path: &Path, converted: &[ConvertedFile]) -> Result<()> {
    let text = match converted {
        [single] => single.result.log.clone(),
        many => many
            .iter()
            .map(|file| format!("== {} ==\n{}", file.input.display(), file.result.log))
            .collect::<Vec<_>>()
            .join("\n\n"),
    };
    fs::write(path, text).with_context(|| format!("Failed to write log to {}", path.display()))
}

fn print_human(converted: &[ConvertedFile]) {
    for file in converted {
        match &file.output {
            Some(output) => {
                let how = if file.rule_based_fallback { "rule-based" } else { "generator + rules" };
                println!("✅ {} -> {} ({})", file.input.display(), output.display(), how);
            }
            None => {
                println!("{}", file.result.java_code);
                for line in file.result.log_lines() {
                    eprintln!("{}", line);
                }
            }
        }
    }
}
