use std::io::Write;

use anyhow::Result;

use crate::cts::normalize::EXPORT_DELIMITER;
use crate::model::{BatchOutput, CatalogEntry};

pub(super) const CEX_CATALOG_HEADER: &str =
    "urn#citationScheme#groupName#workTitle#versionLabel#exemplarLabel#online#language";

/// Segment text as it may appear in a `#`-delimited data row.
pub(super) fn escape_delimited_text(text: &str) -> String {
    text.replace(EXPORT_DELIMITER, "").replace('"', "\\\"")
}

fn catalog_row(entry: &CatalogEntry) -> String {
    [
        entry.urn.as_str(),
        entry.citation_scheme.as_str(),
        entry.group_name.as_str(),
        entry.work_title.as_str(),
        entry.version_label.as_str(),
        entry.exemplar_label.as_str(),
        entry.online.as_str(),
        entry.language.as_str(),
    ]
    .join("#")
}

pub(super) fn write_cex<W: Write>(writer: &mut W, output: &BatchOutput) -> Result<()> {
    writeln!(writer, "#!cexversion\n\n3.0\n")?;

    writeln!(writer, "#!ctscatalog\n")?;
    writeln!(writer, "{CEX_CATALOG_HEADER}")?;
    for entry in &output.catalog {
        writeln!(writer, "{}", catalog_row(entry))?;
    }
    writeln!(writer)?;

    writeln!(writer, "#!ctsdata\n")?;
    for segment in &output.segments {
        writeln!(
            writer,
            "{}#{}",
            segment.identifier,
            escape_delimited_text(&segment.text)
        )?;
    }

    Ok(())
}
