//! Command-line front end for ranking documents.
//!
//! Loads a ranking document from disk and either reports on it, lists its
//! levels, resolves a level-difference color, or writes it back normalized.
//! Output goes to stdout as JSON; codec warnings are logged to stderr.

use anyhow::{Context, Result, bail};
use rankspec::settings::DEFAULT_LOG_FILTER;
use rankspec::{
    DocumentFormat, FileStore, LevelKey, Settings, is_ranking_document, load_from_store,
    load_specification, parse_document, resolve_levels, save_to_store, validate_document_shape,
};
use serde_json::json;
use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

fn main() {
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let settings = Settings::from_env();
    init_logging(&settings);

    match Command::parse(env::args_os().skip(1))? {
        Command::Check { file } => check(&file),
        Command::Levels { file } => levels(&file),
        Command::Color {
            file,
            expected,
            current,
        } => color(&file, &expected, &current),
        Command::Normalize { file, out, format } => normalize(&settings, &file, out, format),
        Command::Help => {
            print!("{}", usage());
            Ok(())
        }
    }
}

fn init_logging(settings: &Settings) {
    let filter = EnvFilter::try_new(&settings.log_filter)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn check(file: &Path) -> Result<()> {
    let document = read_document(file)?;
    if !is_ranking_document(&document) {
        bail!("{} does not contain any ranking sections", file.display());
    }
    let outcome = load_specification(&document)
        .with_context(|| format!("loading {}", file.display()))?;
    let shape_errors = validate_document_shape(&document)?;

    let spec = &outcome.specification;
    let summary = json!({
        "file": file.display().to_string(),
        "headers": spec.headers.len(),
        "adequacy_columns": spec.adequacy_columns.len(),
        "levels": spec.levels.len(),
        "level_difference_colors": spec.level_difference_colors.len(),
        "guidelines": spec.guidelines.len(),
        "warnings": outcome.warnings,
        "shape_errors": shape_errors,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);

    if !shape_errors.is_empty() {
        bail!(
            "{} failed structural validation ({} problem(s))",
            file.display(),
            shape_errors.len()
        );
    }
    Ok(())
}

fn levels(file: &Path) -> Result<()> {
    let document = read_document(file)?;
    let outcome = load_specification(&document)
        .with_context(|| format!("loading {}", file.display()))?;
    let ordered = outcome.specification.levels_by_rank_desc();
    println!("{}", serde_json::to_string_pretty(&ordered)?);
    Ok(())
}

fn color(file: &Path, expected: &str, current: &str) -> Result<()> {
    let document = read_document(file)?;
    let spec = load_specification(&document)
        .with_context(|| format!("loading {}", file.display()))?
        .specification;
    let Some(result) = resolve_levels(&spec, &LevelKey::from(expected), &LevelKey::from(current))
    else {
        let known: Vec<&str> = spec.levels.keys().map(LevelKey::as_str).collect();
        bail!(
            "unknown level in '{expected}' -> '{current}' (known levels: {})",
            known.join(", ")
        );
    };
    let mut report = serde_json::to_value(&result)?;
    if let (Some(rgb), Some(fields)) = (result.rgb(), report.as_object_mut()) {
        fields.insert("channels".to_string(), json!(rgb));
    }
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn normalize(
    settings: &Settings,
    file: &Path,
    out: Option<PathBuf>,
    format: Option<DocumentFormat>,
) -> Result<()> {
    let source = FileStore::new(file);
    let outcome =
        load_from_store(&source).with_context(|| format!("loading {}", file.display()))?;

    let target_path = out.unwrap_or_else(|| file.to_path_buf());
    let format = format
        .or_else(|| format_from_extension(&target_path))
        .unwrap_or(settings.default_format);
    let target = FileStore::new(&target_path).with_format(format);
    let saved = save_to_store(&target, &outcome.specification, format)
        .with_context(|| format!("writing {}", target_path.display()))?;

    let report = json!({
        "written": target_path.display().to_string(),
        "format": format.as_str(),
        "load_warnings": outcome.warnings,
        "save_warnings": saved.warnings,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn read_document(file: &Path) -> Result<serde_json::Value> {
    if !file.is_file() {
        bail!("input file not found: {}", file.display());
    }
    let bytes = fs::read(file).with_context(|| format!("reading {}", file.display()))?;
    parse_document(&bytes).with_context(|| format!("parsing {}", file.display()))
}

/// Only recognized extensions decide; anything else defers to settings.
fn format_from_extension(path: &Path) -> Option<DocumentFormat> {
    let ext = path.extension()?.to_str()?;
    ext.parse().ok()
}

enum Command {
    Check {
        file: PathBuf,
    },
    Levels {
        file: PathBuf,
    },
    Color {
        file: PathBuf,
        expected: String,
        current: String,
    },
    Normalize {
        file: PathBuf,
        out: Option<PathBuf>,
        format: Option<DocumentFormat>,
    },
    Help,
}

impl Command {
    fn parse(args: impl IntoIterator<Item = OsString>) -> Result<Self> {
        let mut args = args.into_iter();
        let Some(first) = args.next() else {
            bail!("missing subcommand\n{}", usage());
        };
        let subcommand = first
            .into_string()
            .map_err(|_| anyhow::anyhow!("argument is not valid UTF-8"))?;
        if matches!(subcommand.as_str(), "--help" | "-h" | "help") {
            return Ok(Command::Help);
        }

        let mut file: Option<PathBuf> = None;
        let mut out: Option<PathBuf> = None;
        let mut format: Option<DocumentFormat> = None;
        let mut expected: Option<String> = None;
        let mut current: Option<String> = None;

        while let Some(arg_os) = args.next() {
            let arg = arg_os
                .into_string()
                .map_err(|_| anyhow::anyhow!("argument is not valid UTF-8"))?;
            match arg.as_str() {
                "--file" => file = Some(PathBuf::from(next_value(&mut args, "--file")?)),
                "--out" => out = Some(PathBuf::from(next_value(&mut args, "--out")?)),
                "--format" => {
                    let raw = next_value(&mut args, "--format")?;
                    format = Some(raw.parse().map_err(|err: String| anyhow::anyhow!(err))?);
                }
                "--expected" => expected = Some(next_value(&mut args, "--expected")?),
                "--current" => current = Some(next_value(&mut args, "--current")?),
                "--help" | "-h" => return Ok(Command::Help),
                other => bail!("unknown flag for {subcommand}: {other}"),
            }
        }

        let file = file.ok_or_else(|| anyhow::anyhow!("{subcommand} requires --file"))?;
        let command = match subcommand.as_str() {
            "check" => Command::Check { file },
            "levels" => Command::Levels { file },
            "color" => Command::Color {
                file,
                expected: expected
                    .ok_or_else(|| anyhow::anyhow!("color requires --expected"))?,
                current: current.ok_or_else(|| anyhow::anyhow!("color requires --current"))?,
            },
            "normalize" => Command::Normalize { file, out, format },
            other => bail!("unknown subcommand: {other}\n{}", usage()),
        };
        Ok(command)
    }
}

fn next_value(args: &mut impl Iterator<Item = OsString>, flag: &str) -> Result<String> {
    args.next()
        .map(|os| {
            os.into_string()
                .map_err(|_| anyhow::anyhow!("value for {flag} is not valid UTF-8"))
        })
        .transpose()?
        .ok_or_else(|| anyhow::anyhow!("missing value for {flag}"))
}

fn usage() -> &'static str {
    "Usage: ranking-spec <command> --file PATH [options]\n\
Commands:\n  \
check      --file PATH                                  load, report warnings and structural problems\n  \
levels     --file PATH                                  list levels, most important first\n  \
color      --file PATH --expected KEY --current KEY     resolve the level-difference color\n  \
normalize  --file PATH [--out PATH] [--format yaml|json] rewrite the ranking sections in place or to --out\n\
Environment: RANKSPEC_LOG (log filter, default warn), RANKSPEC_FORMAT (yaml|json).\n"
}
