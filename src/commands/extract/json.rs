use std::io::Write;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::model::BatchOutput;

use super::{reader_link, summarize_entries};

#[derive(Debug, Serialize)]
pub(super) struct CatalogReport {
    #[serde(rename = "nodeCount")]
    pub node_count: usize,
    #[serde(rename = "greekWords")]
    pub greek_words: usize,
    #[serde(rename = "latinWords")]
    pub latin_words: usize,
    #[serde(rename = "arabicwords")]
    pub arabic_words: usize,
    pub catalog: Vec<CatalogReportEntry>,
}

#[derive(Debug, Serialize)]
pub(super) struct CatalogReportEntry {
    pub urn: String,
    pub group_name: String,
    pub work_name: String,
    pub language: String,
    #[serde(rename = "wordcount")]
    pub word_count: usize,
    pub scaife: String,
}

pub(super) fn build_catalog_report(output: &BatchOutput, reader_base_url: &str) -> CatalogReport {
    let catalog = output
        .catalog
        .iter()
        .zip(summarize_entries(output))
        .map(|(entry, summary)| CatalogReportEntry {
            urn: entry.urn.clone(),
            group_name: entry.group_name.clone(),
            work_name: entry.work_title.clone(),
            language: entry.language.clone(),
            word_count: summary.word_count,
            scaife: reader_link(reader_base_url, &summary),
        })
        .collect();

    CatalogReport {
        node_count: output.segments.len(),
        greek_words: output.totals.greek_words,
        latin_words: output.totals.latin_words,
        arabic_words: output.totals.arabic_words,
        catalog,
    }
}

/// Plain array of catalog records.
pub(super) fn write_catalog_json<W: Write>(writer: &mut W, output: &BatchOutput) -> Result<()> {
    serde_json::to_writer(&mut *writer, &output.catalog)
        .context("failed to serialize catalog records")?;
    Ok(())
}

pub(super) fn write_catalog_report<W: Write>(
    writer: &mut W,
    output: &BatchOutput,
    reader_base_url: &str,
) -> Result<()> {
    let report = build_catalog_report(output, reader_base_url);
    serde_json::to_writer(&mut *writer, &report).context("failed to serialize catalog report")?;
    Ok(())
}
