// Upload-to-document pipeline: two tables in, one report artifact out.

use provcmp_recon::config::ReconConfig;
use provcmp_recon::{ReconError, ReconResult, ReportArtifact, TableRenderer};
use uuid::Uuid;

use crate::pdf::PdfRenderer;

/// Reconcile two uploaded tables with the default column layout and policies,
/// rendered as PDF.
pub fn reconcile(table_a: &[u8], table_b: &[u8]) -> Result<ReportArtifact, ReconError> {
    reconcile_with(table_a, table_b, &ReconConfig::default(), &PdfRenderer::default())
}

pub fn reconcile_with(
    table_a: &[u8],
    table_b: &[u8],
    config: &ReconConfig,
    renderer: &dyn TableRenderer,
) -> Result<ReportArtifact, ReconError> {
    let result = provcmp_recon::run(config, table_a, table_b)?;
    render_artifact(&result, config, renderer)
}

/// Render a finished reconciliation. The file name carries a fresh UUID so
/// concurrent runs never collide.
pub fn render_artifact(
    result: &ReconResult,
    config: &ReconConfig,
    renderer: &dyn TableRenderer,
) -> Result<ReportArtifact, ReconError> {
    let bytes = renderer.render(&result.report)?;
    let file_name = format!(
        "{}-{}.{}",
        config.report.file_stem,
        Uuid::new_v4().simple(),
        renderer.extension()
    );
    log::debug!("rendered {} ({} bytes)", file_name, bytes.len());
    Ok(ReportArtifact {
        file_name,
        content_type: renderer.content_type(),
        bytes,
    })
}
