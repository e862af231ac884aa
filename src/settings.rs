//! Environment-driven settings for the command-line front end.
//!
//! Codec keys and sentinels are constants in [`crate::codec::keys`]; only
//! presentation knobs live here.

use crate::codec::DocumentFormat;
use std::env;

pub const LOG_ENV: &str = "RANKSPEC_LOG";
pub const FORMAT_ENV: &str = "RANKSPEC_FORMAT";
pub const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Settings {
    /// `tracing_subscriber::EnvFilter` directive string.
    pub log_filter: String,
    /// Format used when writing a document whose path does not decide it.
    pub default_format: DocumentFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            default_format: DocumentFormat::Yaml,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Blank values fall back to defaults; an unknown format is ignored with
    /// a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut settings = Settings::default();
        if let Some(filter) = non_blank(lookup(LOG_ENV)) {
            settings.log_filter = filter;
        }
        if let Some(raw) = non_blank(lookup(FORMAT_ENV)) {
            match raw.parse() {
                Ok(format) => settings.default_format = format,
                Err(err) => tracing::warn!(variable = FORMAT_ENV, "{err}"),
            }
        }
        settings
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
