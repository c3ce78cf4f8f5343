use serde::Deserialize;

use crate::error::ReconError;
use crate::model::Source;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Reconciliation config, usually read from a `.recon.toml` file.
/// Every section is optional; `ReconConfig::default()` reproduces the standard run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReconConfig {
    pub name: String,
    /// Field delimiter of both input tables.
    pub delimiter: char,
    pub sources: SourcesConfig,
    pub policy: PolicyConfig,
    pub report: ReportConfig,
    pub columns: ColumnAliases,
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            name: "commission comparison".into(),
            delimiter: ';',
            sources: SourcesConfig::default(),
            policy: PolicyConfig::default(),
            report: ReportConfig::default(),
            columns: ColumnAliases::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourcesConfig {
    pub a: SourceConfig,
    pub b: SourceConfig,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            a: SourceConfig { label: "A".into() },
            b: SourceConfig { label: "B".into() },
        }
    }
}

impl SourcesConfig {
    pub fn label(&self, source: Source) -> &str {
        match source {
            Source::A => &self.a.label,
            Source::B => &self.b.label,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    /// Display name of the partner that produced the table (e.g. "Ennux").
    pub label: String,
}

// ---------------------------------------------------------------------------
// Policies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicyConfig {
    pub ties: TiePolicy,
    pub duplicates: DuplicatePolicy,
}

/// Who wins when both totals are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TiePolicy {
    FavorA,
    #[default]
    FavorB,
    /// Report equal totals as a tie.
    Tie,
}

/// What to do when a MatchKey occurs more than once within one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Fail the run with `ReconError::DuplicateKeys`.
    #[default]
    Reject,
    /// Pair the i-th A row with the i-th B row; surplus rows are dropped.
    PairInOrder,
    /// Pair every A row with every B row of the key.
    Cartesian,
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    /// Heading line; defaults to "Commission comparison <A> vs. <B>".
    pub title: Option<String>,
    pub highlight: HighlightTarget,
    /// Artifact file name stem; a unique suffix is appended per run.
    pub file_stem: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: None,
            highlight: HighlightTarget::default(),
            file_stem: "provisionen_vergleich".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HighlightTarget {
    /// The winner's Commission-A / Commission-B cell.
    #[default]
    WinningCommission,
    /// The Result cell of every row.
    Result,
}

// ---------------------------------------------------------------------------
// Column aliases
// ---------------------------------------------------------------------------

/// Accepted header names per canonical field, in priority order.
/// The first entry is the name reported when the column is missing.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColumnAliases {
    pub provider: Vec<String>,
    pub tariff: Vec<String>,
    pub tariff_id: Vec<String>,
    pub start: Vec<String>,
    #[serde(rename = "type")]
    pub kind: Vec<String>,
    pub consumption_from: Vec<String>,
    pub consumption_to: Vec<String>,
    pub base_commission: Vec<String>,
    pub special_commission: Vec<String>,
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for ColumnAliases {
    fn default() -> Self {
        Self {
            provider: names(&["Versorger"]),
            tariff: names(&["Tarif"]),
            tariff_id: names(&["Tarif-ID", "Tarif_ID"]),
            start: names(&["Starte"]),
            kind: names(&["Typ"]),
            consumption_from: names(&["Verbrauch von", "Verbrauch_von"]),
            consumption_to: names(&["Verbrauch bis", "Verbrauch_bis"]),
            base_commission: names(&["Provision in Euro", "Provision"]),
            special_commission: names(&["Sonderprovision"]),
        }
    }
}

impl ColumnAliases {
    /// (field name, aliases) for every field, required fields first.
    pub fn fields(&self) -> [(&'static str, &[String]); 9] {
        [
            ("provider", self.provider.as_slice()),
            ("tariff", self.tariff.as_slice()),
            ("tariff_id", self.tariff_id.as_slice()),
            ("start", self.start.as_slice()),
            ("type", self.kind.as_slice()),
            ("consumption_from", self.consumption_from.as_slice()),
            ("consumption_to", self.consumption_to.as_slice()),
            ("base_commission", self.base_commission.as_slice()),
            ("special_commission", self.special_commission.as_slice()),
        ]
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if !self.delimiter.is_ascii() || self.delimiter == '"' || self.delimiter == '\n' {
            return Err(ReconError::ConfigValidation(format!(
                "delimiter must be a single ASCII character other than quote or newline, got {:?}",
                self.delimiter
            )));
        }

        for source in [Source::A, Source::B] {
            if self.sources.label(source).trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "sources.{}.label must not be empty",
                    source.as_str().to_lowercase()
                )));
            }
        }
        if self.sources.a.label == self.sources.b.label {
            return Err(ReconError::ConfigValidation(format!(
                "sources.a and sources.b share the label '{}'",
                self.sources.a.label
            )));
        }

        for (field, aliases) in self.columns.fields() {
            if aliases.is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "columns.{field} needs at least one header name"
                )));
            }
            if aliases.iter().any(|a| a.trim().is_empty()) {
                return Err(ReconError::ConfigValidation(format!(
                    "columns.{field} contains an empty header name"
                )));
            }
        }

        if self.report.file_stem.trim().is_empty()
            || self.report.file_stem.contains(|c| c == '/' || c == '\\')
        {
            return Err(ReconError::ConfigValidation(format!(
                "report.file_stem must be a plain file name, got '{}'",
                self.report.file_stem
            )));
        }

        Ok(())
    }

    /// Delimiter as the byte the CSV reader expects. Validated ASCII.
    pub fn delimiter_byte(&self) -> u8 {
        self.delimiter as u8
    }

    pub fn title(&self) -> String {
        match &self.report.title {
            Some(title) => title.clone(),
            None => format!(
                "Commission comparison {} vs. {}",
                self.sources.a.label, self.sources.b.label
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
