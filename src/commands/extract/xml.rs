use std::io::Write;

use anyhow::{Context, Result};
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

use crate::model::CatalogEntry;

const OAI_DC_NAMESPACE: &str = "http://www.openarchives.org/OAI/2.0/oai_dc/";
const DC_NAMESPACE: &str = "http://purl.org/dc/elements/1.1/";
const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";
const OAI_DC_SCHEMA_LOCATION: &str =
    "http://www.openarchives.org/OAI/2.0/oai_dc/ http://www.openarchives.org/OAI/2.0/oai_dc.xsd";
const VIEW_URL_BASE: &str = "http://cts.dh.uni-leipzig.de/text/";
const PUBLISHER: &str = "OGLP";

/// Dublin Core description of one catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct OaiDcRecord {
    pub id: usize,
    pub title: String,
    pub creator: String,
    pub subject: String,
    pub description: String,
    pub language: String,
    pub view_url: String,
    pub publisher: String,
}

impl OaiDcRecord {
    pub fn from_entry(id: usize, entry: &CatalogEntry) -> Self {
        let view_url = format!("{VIEW_URL_BASE}{}", entry.urn);
        Self {
            id,
            title: entry.work_title.clone(),
            creator: entry.group_name.clone(),
            subject: entry.urn.clone(),
            description: view_url.clone(),
            language: entry.language.clone(),
            view_url,
            publisher: PUBLISHER.to_string(),
        }
    }

    fn fields(&self) -> [(&'static str, &str); 7] {
        [
            ("dc:title", self.title.as_str()),
            ("dc:creator", self.creator.as_str()),
            ("dc:subject", self.subject.as_str()),
            ("dc:description", self.description.as_str()),
            ("dc:language", self.language.as_str()),
            ("dc:view-url", self.view_url.as_str()),
            ("dc:publisher", self.publisher.as_str()),
        ]
    }
}

fn write_record<W: Write>(writer: &mut Writer<W>, record: &OaiDcRecord) -> Result<()> {
    let id = record.id.to_string();
    let mut start = BytesStart::new("oai_dc:dc");
    start.push_attribute(("xmlns:oai_dc", OAI_DC_NAMESPACE));
    start.push_attribute(("xmlns:dc", DC_NAMESPACE));
    start.push_attribute(("xmlns:xsi", XSI_NAMESPACE));
    start.push_attribute(("xsi:schemaLocation", OAI_DC_SCHEMA_LOCATION));
    start.push_attribute(("id", id.as_str()));
    writer
        .write_event(Event::Start(start))
        .context("failed to write oai_dc:dc start tag")?;

    for (name, value) in record.fields() {
        writer
            .write_event(Event::Start(BytesStart::new(name)))
            .with_context(|| format!("failed to write {name} start tag"))?;
        writer
            .write_event(Event::Text(BytesText::new(value)))
            .with_context(|| format!("failed to write {name} text"))?;
        writer
            .write_event(Event::End(BytesEnd::new(name)))
            .with_context(|| format!("failed to write {name} end tag"))?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("oai_dc:dc")))
        .context("failed to write oai_dc:dc end tag")?;
    Ok(())
}

/// Serializes one record as an indented, standalone XML fragment.
pub(super) fn render_oai_dc_record(record: &OaiDcRecord) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 1);
    write_record(&mut writer, record)?;
    String::from_utf8(writer.into_inner()).context("OAI-DC record is not valid UTF-8")
}

pub(super) fn write_oai_dc<W: Write>(sink: &mut W, catalog: &[CatalogEntry]) -> Result<()> {
    let mut writer = Writer::new_with_indent(sink, b' ', 1);
    for (id, entry) in catalog.iter().enumerate() {
        write_record(&mut writer, &OaiDcRecord::from_entry(id, entry))?;
    }
    writeln!(writer.get_mut()).context("failed to terminate OAI-DC export")?;
    Ok(())
}
