use std::io::Write;

use anyhow::Result;
use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::model::BatchOutput;

use super::{reader_link, summarize_entries};

fn paragraph<W: Write>(writer: &mut W, label: &str, value: &str) -> Result<()> {
    writeln!(writer, "<p>{label}:{}</p>", encode_text(value))?;
    Ok(())
}

pub(super) fn write_html_report<W: Write>(
    writer: &mut W,
    output: &BatchOutput,
    reader_base_url: &str,
) -> Result<()> {
    writeln!(writer, "<div>")?;
    writeln!(writer, "<p>Greek words:{}</p>", output.totals.greek_words)?;
    writeln!(writer, "<p>Latin words:{}</p>", output.totals.latin_words)?;
    writeln!(writer, "<p>Arabic words:{}</p>", output.totals.arabic_words)?;
    writeln!(writer, "</div>")?;
    writeln!(writer, "<hr>")?;

    for (entry, summary) in output.catalog.iter().zip(summarize_entries(output)) {
        writeln!(writer, "<div>")?;
        writeln!(writer, "<h3>URN:{}</h3>", encode_text(&entry.urn))?;
        paragraph(writer, "CitationScheme", &entry.citation_scheme)?;
        paragraph(writer, "GroupName", &entry.group_name)?;
        paragraph(writer, "WorkTitle", &entry.work_title)?;
        paragraph(writer, "VersionLabel", &entry.version_label)?;
        paragraph(writer, "ExemplarLabel", &entry.exemplar_label)?;
        paragraph(writer, "Language", &entry.language)?;

        if let Some(first) = summary.first_identifier {
            paragraph(writer, "First URN", first)?;
            writeln!(
                writer,
                "<p><a href=\"{}\">Read Online</a></p>",
                encode_double_quoted_attribute(&reader_link(reader_base_url, &summary))
            )?;
        }

        writeln!(writer, "<p>Words:{}</p>", summary.word_count)?;
        writeln!(writer, "</div>")?;
        writeln!(writer, "<hr>")?;
    }

    Ok(())
}
