//! `provcmp compare` and `provcmp validate`.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use provcmp_config::{OutputFormat, Settings};
use provcmp_io::{render_artifact, ArtifactStore, PdfRenderer, XlsxRenderer};
use provcmp_recon::config::ReconConfig;
use provcmp_recon::{ReconError, ReconResult, TableRenderer};

use crate::CliError;

pub struct CompareArgs {
    pub table_a: PathBuf,
    pub table_b: PathBuf,
    pub config: Option<PathBuf>,
    pub format: Option<OutputFormat>,
    pub out_dir: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub force: bool,
    pub json: bool,
    pub quiet: bool,
}

fn read_input(path: &Path) -> Result<Vec<u8>, CliError> {
    fs::read(path).map_err(|e| CliError::args(format!("cannot read {}: {}", path.display(), e)))
}

fn load_recon_config(path: &Path) -> Result<ReconConfig, CliError> {
    let text = fs::read_to_string(path)
        .map_err(|e| CliError::args(format!("cannot read config {}: {}", path.display(), e)))?;
    ReconConfig::from_toml(&text).map_err(|e| CliError::recon(e).with_hint(format!("in {}", path.display())))
}

fn renderer_for(format: OutputFormat) -> Box<dyn TableRenderer> {
    match format {
        OutputFormat::Pdf => Box::new(PdfRenderer::default()),
        OutputFormat::Xlsx => Box::new(XlsxRenderer),
    }
}

pub fn cmd_compare(args: CompareArgs, settings: &Settings, settings_path: &Path) -> Result<(), CliError> {
    let table_a = read_input(&args.table_a)?;
    let table_b = read_input(&args.table_b)?;

    let config = match args.config.or_else(|| settings.recon_config_path(settings_path)) {
        Some(path) => load_recon_config(&path)?,
        None => ReconConfig::default(),
    };

    let format = args.format.unwrap_or(settings.report_format);
    let renderer = renderer_for(format);

    let result = provcmp_recon::run(&config, &table_a, &table_b).map_err(CliError::recon)?;
    let artifact = render_artifact(&result, &config, renderer.as_ref()).map_err(CliError::recon)?;

    let path = match &args.output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(|e| {
                    CliError::recon(ReconError::Io(format!("cannot create {}: {}", parent.display(), e)))
                })?;
            }
            write_output(path, &artifact.bytes, args.force)?;
            path.clone()
        }
        None => {
            let root = args.out_dir.clone().unwrap_or_else(|| settings.storage_root.clone());
            ArtifactStore::new(root).save(&artifact).map_err(CliError::recon)?
        }
    };

    if args.json {
        let json = serde_json::json!({
            "meta": result.meta,
            "summary": result.summary,
            "artifact": {
                "path": path.display().to_string(),
                "file_name": artifact.file_name,
                "content_type": artifact.content_type,
                "bytes": artifact.bytes.len(),
            },
        });
        let text = serde_json::to_string_pretty(&json)
            .map_err(|e| CliError::general(format!("JSON serialization failed: {}", e)))?;
        println!("{text}");
        return Ok(());
    }

    if !args.quiet {
        print_summary(&result);
    }
    println!("{}", path.display());
    Ok(())
}

/// Without `force` an existing file is left untouched.
fn write_output(path: &Path, bytes: &[u8], force: bool) -> Result<(), CliError> {
    let io_err =
        |e: std::io::Error| CliError::recon(ReconError::Io(format!("cannot write {}: {}", path.display(), e)));
    if force {
        return fs::write(path, bytes).map_err(io_err);
    }
    let mut file = OpenOptions::new().write(true).create_new(true).open(path).map_err(|e| {
        let exists = e.kind() == ErrorKind::AlreadyExists;
        let err = io_err(e);
        if exists {
            err.with_hint("pass --force to replace it")
        } else {
            err
        }
    })?;
    file.write_all(bytes).map_err(io_err)
}

fn print_summary(result: &ReconResult) {
    let s = &result.summary;
    let m = &result.meta;
    eprintln!(
        "{} ({} rows) vs. {} ({} rows): {} matched",
        m.label_a, s.rows_a, m.label_b, s.rows_b, s.matched
    );
    eprintln!("  {} wins: {}  {} wins: {}  ties: {}", m.label_a, s.a_wins, m.label_b, s.b_wins, s.ties);
    if s.only_a_keys > 0 || s.only_b_keys > 0 {
        eprintln!(
            "  not in report: {} key(s) only in {}, {} key(s) only in {}",
            s.only_a_keys, m.label_a, s.only_b_keys, m.label_b
        );
    }
    if s.coerced_cells > 0 {
        eprintln!("  {} unreadable number cell(s) treated as empty or 0", s.coerced_cells);
    }
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = load_recon_config(&config_path)?;
    eprintln!(
        "{}: valid ({} vs. {}, delimiter {:?})",
        config.name, config.sources.a.label, config.sources.b.label, config.delimiter
    );
    Ok(())
}
