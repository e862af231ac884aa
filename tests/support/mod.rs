#![allow(dead_code)]

use anyhow::{Context, Result, bail};
use serde_json::{Value, json};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::{NamedTempFile, TempDir};

pub const SAMPLE_YAML: &str = r#"# ranking configuration
PIRT:
  Headers:
    fields:
      - Model
      - Scenario
  Adequacy Columns:
    fields:
      Code Verification:
        type: Levels
      Notes:
        type: RichText
  Levels:
    fields:
      Low:
        level: 1
        label: L
      High:
        level: 3
        label: H
      Med:
        level: 2
        label: M
      NA:
        level: 0
        label: Not applicable
  Level Colors:
    fields:
      PosOrZero:
        rgb: "0,255,0"
        explanation: Meets expectation
      OneLevel:
        rgb: "255,255,0"
        explanation: One level short
        range: "-1"
      TwoLevelsOrMore:
        rgb: "255,0,0"
        explanation: Two or more levels short
      NA:
        rgb: "200,200,200"
        explanation: Not applicable
  Guidelines:
    guidelines:
      Code Verification:
        description: Maturity of code verification
        levels:
          High: Full regression suite
          Low: Ad hoc checks
Decision:
  fields:
    owner: someone
"#;

pub fn sample_document() -> Value {
    json!({
        "Levels": {"fields": {
            "Low": {"level": 1, "label": "L"},
            "Med": {"level": 2, "label": "M"},
            "High": {"level": 3, "label": "H"}
        }},
        "Level Colors": {"fields": {
            "PosOrZero": {"rgb": "0,255,0", "explanation": "ok"},
            "OneLevel": {"rgb": "255,255,0", "explanation": "close"},
            "TwoLevelsOrMore": {"rgb": "255,0,0", "explanation": "gap"}
        }}
    })
}

/// Write `contents` into a fresh temp file with the given extension.
pub fn write_fixture(contents: &str, extension: &str) -> Result<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .suffix(&format!(".{extension}"))
        .tempfile()
        .context("failed to create fixture file")?;
    file.write_all(contents.as_bytes())?;
    file.flush()?;
    Ok(file)
}

pub fn fixture_in(dir: &TempDir, name: &str, contents: &str) -> Result<PathBuf> {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

pub fn cli() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_ranking-spec"));
    cmd.env_remove("RANKSPEC_LOG").env_remove("RANKSPEC_FORMAT");
    cmd
}

pub fn run_command(mut cmd: Command) -> Result<Output> {
    let output = cmd
        .output()
        .with_context(|| format!("failed to run command: {:?}", cmd))?;
    if output.status.success() {
        Ok(output)
    } else {
        bail!(
            "command {:?} failed: status {:?}\nstdout: {}\nstderr: {}",
            cmd,
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        )
    }
}

pub fn stdout_json(output: &Output) -> Result<Value> {
    serde_json::from_slice(&output.stdout).context("stdout is not JSON")
}

pub fn path_arg(path: &Path) -> &str {
    path.to_str().unwrap_or_default()
}
