//! `provcmp-recon`: commission reconciliation engine.
//!
//! Pure engine crate: receives two uploaded tables as bytes, returns matched
//! records and a highlighted report. Rendering sits behind [`TableRenderer`].

pub mod calculate;
pub mod config;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod matcher;
pub mod model;
pub mod normalize;
pub mod numeric;
pub mod render;
pub mod report;
pub mod table;

pub use config::ReconConfig;
pub use engine::run;
pub use error::{ErrorCategory, ReconError};
pub use model::{CanonicalRecord, MatchKey, MatchedRecord, ReconResult, ReconSummary, Source, Winner};
pub use render::{ReportArtifact, TableRenderer};
pub use report::{Column, Report, ReportRow};
