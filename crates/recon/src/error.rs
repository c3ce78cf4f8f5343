use std::fmt;

use crate::model::Source;

/// One MatchKey that occurs more than once within a single table.
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateKey {
    pub source: Source,
    pub key: String,
    /// 1-based data row numbers sharing the key.
    pub lines: Vec<usize>,
}

#[derive(Debug)]
pub enum ReconError {
    /// Input is not readable as a delimited table at all.
    Parse { source: Source, message: String },
    /// Required columns are missing from a table.
    Schema { source: Source, missing: Vec<String> },
    /// A table yielded zero usable rows.
    EmptyInput { source: Source },
    /// Keys repeat within a table while duplicates are rejected.
    DuplicateKeys(Vec<DuplicateKey>),
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (blank label, empty alias list, etc.).
    ConfigValidation(String),
    /// Renderer failed to produce the document.
    Render(String),
    /// IO error (artifact write, file read).
    Io(String),
}

/// User-facing error category, stable across releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    ParseError,
    SchemaError,
    EmptyInputError,
    DuplicateKeyError,
    ConfigError,
    RenderError,
    IoError,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ParseError => "ParseError",
            Self::SchemaError => "SchemaError",
            Self::EmptyInputError => "EmptyInputError",
            Self::DuplicateKeyError => "DuplicateKeyError",
            Self::ConfigError => "ConfigError",
            Self::RenderError => "RenderError",
            Self::IoError => "IoError",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ReconError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Parse { .. } => ErrorCategory::ParseError,
            Self::Schema { .. } => ErrorCategory::SchemaError,
            Self::EmptyInput { .. } => ErrorCategory::EmptyInputError,
            Self::DuplicateKeys(_) => ErrorCategory::DuplicateKeyError,
            Self::ConfigParse(_) | Self::ConfigValidation(_) => ErrorCategory::ConfigError,
            Self::Render(_) => ErrorCategory::RenderError,
            Self::Io(_) => ErrorCategory::IoError,
        }
    }
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse { source, message } => {
                write!(f, "table {source}: cannot read as delimited table: {message}")
            }
            Self::Schema { source, missing } => {
                let names: Vec<String> = missing.iter().map(|c| format!("'{c}'")).collect();
                write!(f, "table {source}: missing required column(s) {}", names.join(", "))
            }
            Self::EmptyInput { source } => {
                write!(f, "table {source}: no usable rows")
            }
            Self::DuplicateKeys(dups) => {
                write!(f, "duplicate contract keys found:")?;
                for dup in dups {
                    let lines: Vec<String> = dup.lines.iter().map(|l| l.to_string()).collect();
                    write!(f, "\n  table {} key {} on rows {}", dup.source, dup.key, lines.join(", "))?;
                }
                Ok(())
            }
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::Render(msg) => write!(f, "render error: {msg}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}
