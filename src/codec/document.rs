//! Byte-level document handling: parsing, rendering, and stores.
//!
//! Documents are YAML (JSON parses as YAML too) and are held as an ordered
//! `serde_json::Value` tree so key order survives a load/save cycle.

use crate::codec::{LoadOutcome, SaveOutcome, load, save};
use crate::error::{RankingError, Result};
use crate::spec::Specification;
use serde_json::Value;
use std::cell::RefCell;
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tempfile::NamedTempFile;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum DocumentFormat {
    #[default]
    Yaml,
    Json,
}

impl DocumentFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            DocumentFormat::Yaml => "yaml",
            DocumentFormat::Json => "json",
        }
    }

    /// `.json` files render as JSON; everything else as YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => DocumentFormat::Json,
            _ => DocumentFormat::Yaml,
        }
    }
}

impl FromStr for DocumentFormat {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Ok(DocumentFormat::Yaml),
            "json" => Ok(DocumentFormat::Json),
            other => Err(format!("unknown document format '{other}' (expected yaml or json)")),
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse document bytes. Blank input is an empty (null) document.
pub fn parse_document(bytes: &[u8]) -> Result<Value> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    Ok(serde_yaml::from_slice(bytes)?)
}

pub fn render_document(document: &Value, format: DocumentFormat) -> Result<Vec<u8>> {
    match format {
        DocumentFormat::Yaml => serde_yaml::to_string(document)
            .map(String::into_bytes)
            .map_err(|err| RankingError::Encode(err.to_string())),
        DocumentFormat::Json => {
            let mut bytes = serde_json::to_vec_pretty(document)?;
            bytes.push(b'\n');
            Ok(bytes)
        }
    }
}

/// Where a ranking document lives.
///
/// `read` returns `None` when nothing has been stored yet. `write` receives
/// the complete rendered document and must replace the previous contents in
/// one step.
pub trait DocumentStore {
    fn read(&self) -> Result<Option<Vec<u8>>>;
    fn write(&self, bytes: &[u8]) -> Result<()>;
}

/// Document on disk, replaced through a sibling temp file and rename.
#[derive(Clone, Debug)]
pub struct FileStore {
    path: PathBuf,
    format: DocumentFormat,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let format = DocumentFormat::from_path(&path);
        Self { path, format }
    }

    pub fn with_format(mut self, format: DocumentFormat) -> Self {
        self.format = format;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> DocumentFormat {
        self.format
    }
}

impl DocumentStore for FileStore {
    fn read(&self) -> Result<Option<Vec<u8>>> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn write(&self, bytes: &[u8]) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut staged = NamedTempFile::new_in(dir)?;
        staged.write_all(bytes)?;
        staged.as_file().sync_all()?;
        staged.persist(&self.path).map_err(|err| err.error)?;
        Ok(())
    }
}

/// In-process store; useful for embedding and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    contents: RefCell<Option<Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            contents: RefCell::new(Some(bytes.into())),
        }
    }

    pub fn contents(&self) -> Option<Vec<u8>> {
        self.contents.borrow().clone()
    }
}

impl DocumentStore for MemoryStore {
    fn read(&self) -> Result<Option<Vec<u8>>> {
        Ok(self.contents.borrow().clone())
    }

    fn write(&self, bytes: &[u8]) -> Result<()> {
        *self.contents.borrow_mut() = Some(bytes.to_vec());
        Ok(())
    }
}

/// Load the specification held by `store`. An empty store is an error.
pub fn load_from_store(store: &dyn DocumentStore) -> Result<LoadOutcome> {
    let bytes = store.read()?.ok_or_else(|| {
        RankingError::Io(io::Error::new(
            io::ErrorKind::NotFound,
            "no ranking document has been stored",
        ))
    })?;
    load(&parse_document(&bytes)?)
}

/// Merge `specification` into whatever `store` holds and write it back.
///
/// The whole output is rendered before the store is touched, so a parse or
/// encode failure leaves the stored document as it was.
pub fn save_to_store(
    store: &dyn DocumentStore,
    specification: &Specification,
    format: DocumentFormat,
) -> Result<SaveOutcome> {
    let existing = match store.read()? {
        Some(bytes) => Some(parse_document(&bytes)?),
        None => None,
    };
    let outcome = save(existing.as_ref(), specification);
    let rendered = render_document(&outcome.document, format)?;
    store.write(&rendered)?;
    tracing::debug!(format = %format, bytes = rendered.len(), "ranking document stored");
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    const YAML: &str = "\
PIRT:
  Levels:
    fields:
      Low: {level: 1, label: L}
      High: {level: 3, label: H}
  Notes: keep me
Decision: {fields: {a: 1}}
";

    #[test]
    fn format_from_path_and_name() {
        assert_eq!(DocumentFormat::from_path(Path::new("a/b.JSON")), DocumentFormat::Json);
        assert_eq!(DocumentFormat::from_path(Path::new("a/b.yml")), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::from_path(Path::new("noext")), DocumentFormat::Yaml);
        assert_eq!("YML".parse::<DocumentFormat>().unwrap(), DocumentFormat::Yaml);
        assert!("toml".parse::<DocumentFormat>().is_err());
    }

    #[test]
    fn parses_yaml_json_and_blank_input() {
        let yaml = parse_document(YAML.as_bytes()).unwrap();
        assert_eq!(yaml["PIRT"]["Levels"]["fields"]["High"]["level"], json!(3));
        let json = parse_document(br#"{"Headers": {"fields": ["x"]}}"#).unwrap();
        assert_eq!(json["Headers"]["fields"][0], json!("x"));
        assert_eq!(parse_document(b"  \n").unwrap(), Value::Null);
        assert!(matches!(
            parse_document(b"a: [unclosed").unwrap_err(),
            RankingError::Parse(_)
        ));
    }

    #[test]
    fn yaml_render_keeps_key_order() {
        let doc = parse_document(YAML.as_bytes()).unwrap();
        let text = String::from_utf8(render_document(&doc, DocumentFormat::Yaml).unwrap()).unwrap();
        let low = text.find("Low").unwrap();
        let high = text.find("High").unwrap();
        assert!(low < high);
        assert_eq!(parse_document(text.as_bytes()).unwrap(), doc);
    }

    #[test]
    fn memory_store_merge_keeps_foreign_keys() {
        let store = MemoryStore::with_contents(YAML);
        let spec = load_from_store(&store).unwrap().specification;
        assert_eq!(spec.levels.len(), 2);

        save_to_store(&store, &spec, DocumentFormat::Yaml).unwrap();
        let doc = parse_document(&store.contents().unwrap()).unwrap();
        assert_eq!(doc["PIRT"]["Notes"], json!("keep me"));
        assert_eq!(doc["Decision"]["fields"]["a"], json!(1));
        let order: Vec<&String> = doc["PIRT"]["Levels"]["fields"].as_object().unwrap().keys().collect();
        assert_eq!(order, vec!["High", "Low"]);
    }

    #[test]
    fn empty_store_fails_to_load() {
        let err = load_from_store(&MemoryStore::new()).unwrap_err();
        assert!(matches!(err, RankingError::Io(ref inner) if inner.kind() == io::ErrorKind::NotFound));
    }

    #[test]
    fn unparseable_existing_document_is_not_overwritten() {
        let store = MemoryStore::with_contents("a: [unclosed");
        let err = save_to_store(&store, &Specification::default(), DocumentFormat::Yaml).unwrap_err();
        assert!(matches!(err, RankingError::Parse(_)));
        assert_eq!(store.contents().unwrap(), b"a: [unclosed".to_vec());
    }

    #[test]
    fn file_store_round_trips_on_disk() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("ranking.json"));
        assert_eq!(store.format(), DocumentFormat::Json);
        assert!(store.read().unwrap().is_none());

        let spec = load(&parse_document(YAML.as_bytes()).unwrap()).unwrap().specification;
        save_to_store(&store, &spec, store.format()).unwrap();

        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.trim_start().starts_with('{'));
        assert_eq!(load_from_store(&store).unwrap().specification, spec);
        let leftovers = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }
}
