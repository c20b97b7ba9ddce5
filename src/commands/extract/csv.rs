use std::io::Write;

use anyhow::Result;

use crate::model::BatchOutput;

use super::escape_delimited_text;

pub(super) const CSV_HEADER: &str =
    "identifier#text#GreekWords#LatinWords#ArabicWords#Workgroup#Work#WorkVerbose";

/// Splits `urn:cts:<ns>:<group>.<work>...:<passage>` into (workgroup, work, verbose work).
pub(super) fn work_columns(identifier: &str) -> (&str, &str, &str) {
    let verbose = identifier.split(':').nth(3).unwrap_or("");
    match verbose.split_once('.') {
        Some((group, work)) => (group, work, verbose),
        None => (verbose, "", verbose),
    }
}

pub(super) fn write_csv<W: Write>(writer: &mut W, output: &BatchOutput) -> Result<()> {
    writeln!(writer, "{CSV_HEADER}")?;

    for segment in &output.segments {
        let (workgroup, work, verbose) = work_columns(&segment.identifier);
        writeln!(
            writer,
            "{}#{}#{}#{}#{}#{}#{}#{}",
            segment.identifier,
            escape_delimited_text(&segment.text),
            segment.counts.greek_words,
            segment.counts.latin_words,
            segment.counts.arabic_words,
            workgroup,
            work,
            verbose
        )?;
    }

    Ok(())
}
