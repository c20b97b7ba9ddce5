use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use tracing::info;

use crate::cli::{ExportFormat, ExtractArgs};
use crate::cts::{DEFAULT_URN_PREFIX, Extractor, discover_documents, run_batch};
use crate::model::{BatchOutput, ExtractCounts, ExtractRunManifest};
use crate::util::{create_output_file, now_utc_string, utc_compact_string, write_json_pretty};

use super::{
    write_catalog_json, write_catalog_report, write_cex, write_csv, write_html_report,
    write_oai_dc, write_sqlite,
};

const RUN_MANIFEST_VERSION: u32 = 1;

pub fn run(args: ExtractArgs) -> Result<()> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = format!("run-{}", utc_compact_string(started_ts));

    info!(
        source_dir = %args.corpus.source_dir.display(),
        format = args.format.as_str(),
        run_id = %run_id,
        "starting extraction"
    );

    let extractor = Extractor::new(&args.corpus.default_urn_prefix)?;
    let documents = discover_documents(&args.corpus.source_dir, &args.corpus.excluded_files)?;
    info!(documents = documents.len(), "discovered candidate documents");

    let output = run_batch(&extractor, &documents);

    export(args.format, &args.output, &output, &args.reader_base_url)?;
    info!(
        output = %args.output.display(),
        format = args.format.as_str(),
        catalog_entries = output.catalog.len(),
        segments = output.segments.len(),
        "export written"
    );

    if let Some(report_path) = &args.report_path {
        let manifest = build_run_manifest(&args, &output, run_id, started_at);
        write_json_pretty(report_path, &manifest)?;
        info!(path = %report_path.display(), "wrote run manifest");
    }

    Ok(())
}

/// Writes `output` to `path` in the requested format.
pub(super) fn export(
    format: ExportFormat,
    path: &Path,
    output: &BatchOutput,
    reader_base_url: &str,
) -> Result<()> {
    if format == ExportFormat::Sql {
        let written = write_sqlite(path, &output.catalog)?;
        info!(path = %path.display(), items = written, "wrote OAI-DC database");
        return Ok(());
    }

    let mut writer = create_output_file(path)?;
    match format {
        ExportFormat::Cex => write_cex(&mut writer, output)?,
        ExportFormat::Csv => write_csv(&mut writer, output)?,
        ExportFormat::Json => write_catalog_json(&mut writer, output)?,
        ExportFormat::Xml => write_oai_dc(&mut writer, &output.catalog)?,
        ExportFormat::Html => write_html_report(&mut writer, output, reader_base_url)?,
        ExportFormat::Catalog => write_catalog_report(&mut writer, output, reader_base_url)?,
        ExportFormat::Sql => bail!("sql exports are written through a database connection"),
    }
    writer
        .flush()
        .with_context(|| format!("failed to flush export file: {}", path.display()))?;

    Ok(())
}

pub(super) fn build_run_manifest(
    args: &ExtractArgs,
    output: &BatchOutput,
    run_id: String,
    started_at: String,
) -> ExtractRunManifest {
    ExtractRunManifest {
        manifest_version: RUN_MANIFEST_VERSION,
        run_id,
        status: "completed".to_string(),
        started_at,
        updated_at: now_utc_string(),
        command: render_extract_command(args),
        source_directory: args.corpus.source_dir.display().to_string(),
        output_path: args.output.display().to_string(),
        format: args.format.as_str().to_string(),
        counts: ExtractCounts {
            documents_seen: output.documents_seen,
            documents_extracted: output.documents_extracted,
            documents_unclassified: output.documents_unclassified,
            documents_without_pattern: output.files_without_pattern.len(),
            documents_skipped: output.skipped_files.len(),
            catalog_entries: output.catalog.len(),
            segments: output.segments.len(),
            greek_words: output.totals.greek_words,
            latin_words: output.totals.latin_words,
            arabic_words: output.totals.arabic_words,
        },
        unclassified_patterns: output.unclassified_patterns.clone(),
        files_without_pattern: output.files_without_pattern.clone(),
        skipped_files: output.skipped_files.clone(),
        scheme_usage: output.scheme_usage.clone(),
    }
}

pub(super) fn render_extract_command(args: &ExtractArgs) -> String {
    let mut command = vec![
        "ctsextract".to_string(),
        "extract".to_string(),
        "--source-dir".to_string(),
        args.corpus.source_dir.display().to_string(),
        "--output".to_string(),
        args.output.display().to_string(),
        "--format".to_string(),
        args.format.as_str().to_string(),
    ];

    if args.corpus.default_urn_prefix != DEFAULT_URN_PREFIX {
        command.push("--default-urn-prefix".to_string());
        command.push(args.corpus.default_urn_prefix.clone());
    }
    for name in &args.corpus.excluded_files {
        command.push("--exclude".to_string());
        command.push(name.clone());
    }
    if matches!(args.format, ExportFormat::Html | ExportFormat::Catalog) {
        command.push("--reader-base-url".to_string());
        command.push(args.reader_base_url.clone());
    }
    if let Some(path) = &args.report_path {
        command.push("--report-path".to_string());
        command.push(path.display().to_string());
    }

    command.join(" ")
}
