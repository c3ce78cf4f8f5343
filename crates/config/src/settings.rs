// User settings
// Loaded from ~/.config/provcmp/settings.json

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Document format for the comparison report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Landscape A4 PDF (default)
    #[default]
    Pdf,
    /// Excel workbook
    Xlsx,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Storage
    #[serde(rename = "storage.root")]
    pub storage_root: PathBuf,

    // Report
    #[serde(rename = "report.format")]
    pub report_format: OutputFormat,

    // Logging
    #[serde(rename = "log.level")]
    pub log_level: String,

    // Reconciliation
    #[serde(rename = "recon.config")]
    pub recon_config: Option<PathBuf>,  // None = built-in column layout
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            storage_root: PathBuf::from("output"),
            report_format: OutputFormat::Pdf,
            log_level: "warn".to_string(),
            recon_config: None,
        }
    }
}

const DEFAULT_FILE: &str = r#"{
    // Directory that receives generated reports
    "storage.root": "output",

    // Report format: "pdf" or "xlsx"
    "report.format": "pdf",

    // Log level: "error", "warn", "info", "debug", "trace"
    // RUST_LOG overrides this
    "log.level": "warn",

    // Optional TOML file with column aliases and policies
    "recon.config": null
}
"#;

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("provcmp")
            .join("settings.json")
    }

    /// Load settings from the default location, creating a commented file
    /// on first use.
    ///
    /// Runs before logging is set up, so problems come back as `Err` for
    /// the caller to report; the caller falls back to defaults.
    pub fn try_load() -> Result<Self, String> {
        let path = Self::config_path();
        if !path.exists() {
            Self::create_default_file(&path)?;
            return Ok(Self::default());
        }
        Self::try_load_from(&path)
    }

    /// Load settings from `path`. A missing file gives the defaults.
    pub fn try_load_from(path: &Path) -> Result<Self, String> {
        match fs::read_to_string(path) {
            Ok(contents) => Self::parse(&contents).map_err(|e| format!("{}: {}", path.display(), e)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(format!("{}: {}", path.display(), e)),
        }
    }

    /// Parse settings JSON. Lines starting with `//` are comments.
    pub fn parse(contents: &str) -> Result<Self, String> {
        let cleaned: String = contents
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");
        serde_json::from_str(&cleaned).map_err(|e| e.to_string())
    }

    /// Save settings to `path`
    pub fn save(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;
        fs::write(path, json).map_err(|e| e.to_string())
    }

    /// Relative recon config paths resolve against the settings file's directory.
    pub fn recon_config_path(&self, settings_path: &Path) -> Option<PathBuf> {
        let configured = self.recon_config.as_ref()?;
        if configured.is_absolute() {
            return Some(configured.clone());
        }
        let base = settings_path.parent().unwrap_or_else(|| Path::new("."));
        Some(base.join(configured))
    }

    fn create_default_file(path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| format!("{}: {}", parent.display(), e))?;
        }
        fs::write(path, DEFAULT_FILE).map_err(|e| format!("{}: {}", path.display(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_file_parses_to_defaults() {
        assert_eq!(Settings::parse(DEFAULT_FILE).unwrap(), Settings::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let s = Settings::parse(r#"{ "report.format": "xlsx" }"#).unwrap();
        assert_eq!(s.report_format, OutputFormat::Xlsx);
        assert_eq!(s.storage_root, PathBuf::from("output"));
        assert_eq!(s.log_level, "warn");
    }

    #[test]
    fn comments_are_stripped() {
        let s = Settings::parse("{\n  // where reports go\n  \"storage.root\": \"/srv/reports\"\n}").unwrap();
        assert_eq!(s.storage_root, PathBuf::from("/srv/reports"));
    }

    #[test]
    fn unknown_format_is_an_error() {
        assert!(Settings::parse(r#"{ "report.format": "docx" }"#).is_err());
    }

    #[test]
    fn broken_file_is_an_error_naming_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "report.format": "docx" }"#).unwrap();
        let err = Settings::try_load_from(&path).unwrap_err();
        assert!(err.contains(&path.display().to_string()), "{err}");
        assert!(err.contains("docx"), "{err}");
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Settings::try_load_from(&dir.path().join("missing.json")), Ok(Settings::default()));
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/settings.json");
        let settings = Settings {
            storage_root: PathBuf::from("reports"),
            report_format: OutputFormat::Xlsx,
            log_level: "debug".to_string(),
            recon_config: Some(PathBuf::from("recon.toml")),
        };
        settings.save(&path).unwrap();
        assert_eq!(Settings::try_load_from(&path), Ok(settings.clone()));
        assert_eq!(
            settings.recon_config_path(&path),
            Some(dir.path().join("nested/recon.toml"))
        );
    }
}
