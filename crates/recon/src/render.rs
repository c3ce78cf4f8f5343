use crate::error::ReconError;
use crate::report::Report;

/// A produced document: opaque bytes plus a suggested file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportArtifact {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Turns a finished report into a paginated document.
/// Implementations must be deterministic: equal reports give equal bytes.
pub trait TableRenderer {
    /// File extension without the dot, e.g. `pdf`.
    fn extension(&self) -> &'static str;

    fn content_type(&self) -> &'static str;

    fn render(&self, report: &Report) -> Result<Vec<u8>, ReconError>;
}
