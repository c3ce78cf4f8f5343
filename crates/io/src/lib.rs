// Report output: document renderers, artifact storage, upload pipeline

pub mod pdf;
pub mod pipeline;
pub mod store;
pub mod xlsx;

pub use pdf::{PageLayout, PdfRenderer};
pub use pipeline::{reconcile, reconcile_with, render_artifact};
pub use store::ArtifactStore;
pub use xlsx::XlsxRenderer;
