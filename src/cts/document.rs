use anyhow::{Context, Result};
use regex::Regex;

use crate::cts::header::DocumentHeader;
use crate::cts::normalize::TextCleaner;
use crate::cts::scheme::{Classification, SchemeCatalog, SchemeId};
use crate::cts::scripts::ScriptCounter;
use crate::cts::walker::walk_document;
use crate::cts::xml_tree::{XmlElement, parse_document};
use crate::model::{CatalogEntry, ScriptCounts, Segment};

pub const DEFAULT_URN_PREFIX: &str = "urn:cts:greekLit:";

/// One parsed, classified document. Lives only while its segments are produced.
#[derive(Debug)]
pub struct DocumentContext {
    pub file_name: String,
    pub file_identifier_root: String,
    pub raw: String,
    pub root: XmlElement,
    pub header: DocumentHeader,
    pub classification: Classification,
}

/// What a single document contributes to the batch.
#[derive(Debug, Clone)]
pub enum DocumentExtraction {
    NoPattern {
        file_name: String,
    },
    Unclassified {
        entry: CatalogEntry,
        literal: String,
    },
    Extracted {
        entry: CatalogEntry,
        scheme: SchemeId,
        segments: Vec<Segment>,
        counts: ScriptCounts,
    },
}

/// Everything needed to turn raw documents into catalog entries and segments.
#[derive(Debug, Clone)]
pub struct Extractor {
    catalog: SchemeCatalog,
    cleaner: TextCleaner,
    counter: ScriptCounter,
    urn_prefix: Regex,
    default_urn_prefix: String,
}

impl Extractor {
    pub fn new(default_urn_prefix: &str) -> Result<Self> {
        Ok(Self {
            catalog: SchemeCatalog::new()?,
            cleaner: TextCleaner::new()?,
            counter: ScriptCounter::new()?,
            urn_prefix: Regex::new(r"urn:\p{L}+:\p{L}+:")
                .context("failed to compile URN prefix regex")?,
            default_urn_prefix: default_urn_prefix.to_string(),
        })
    }

    /// Parses and classifies a document without walking its body.
    pub fn open_document(&self, file_name: &str, raw: String) -> Result<DocumentContext> {
        let root = parse_document(&raw).with_context(|| format!("unparsable XML in {file_name}"))?;
        let header = DocumentHeader::parse(&root, &raw);
        let classification = self.catalog.classify(&header.patterns);
        let file_identifier_root =
            format!("{}{}", self.urn_prefix_for(&raw), document_stem(file_name));

        Ok(DocumentContext {
            file_name: file_name.to_string(),
            file_identifier_root,
            raw,
            root,
            header,
            classification,
        })
    }

    pub fn extract(&self, file_name: &str, raw: String) -> Result<DocumentExtraction> {
        let context = self.open_document(file_name, raw)?;
        self.extract_from(&context)
    }

    pub fn extract_from(&self, context: &DocumentContext) -> Result<DocumentExtraction> {
        let (plan, literal) = match &context.classification {
            Classification::NoPattern => {
                return Ok(DocumentExtraction::NoPattern {
                    file_name: context.file_name.clone(),
                });
            }
            Classification::Unclassified { literal, .. } => {
                return Ok(DocumentExtraction::Unclassified {
                    entry: self.catalog_entry(context),
                    literal: literal.clone(),
                });
            }
            Classification::Matched { plan, literal, .. } => (plan, literal),
        };

        let leaves = walk_document(&context.root, &context.raw, plan)
            .with_context(|| format!("failed to walk {} as {}", context.file_name, literal))?;

        let mut counts = ScriptCounts::default();
        let segments = leaves
            .iter()
            .map(|leaf| {
                let text = self.cleaner.clean(leaf.inner_xml);
                let segment_counts = self.counter.count(&text);
                counts += segment_counts;
                Segment {
                    identifier: format!(
                        "{}:{}",
                        context.file_identifier_root,
                        leaf.dotted_number()
                    ),
                    text,
                    counts: segment_counts,
                }
            })
            .collect();

        Ok(DocumentExtraction::Extracted {
            entry: self.catalog_entry(context),
            scheme: plan.scheme(),
            segments,
            counts,
        })
    }

    fn catalog_entry(&self, context: &DocumentContext) -> CatalogEntry {
        CatalogEntry {
            urn: context.file_identifier_root.clone(),
            citation_scheme: context.header.citation_scheme_label(),
            group_name: context.header.group_name(&self.cleaner),
            work_title: context.header.work_title(&self.cleaner),
            version_label: String::new(),
            exemplar_label: String::new(),
            online: "True".to_string(),
            language: context.header.language(),
        }
    }

    fn urn_prefix_for<'a>(&'a self, raw: &'a str) -> &'a str {
        self.urn_prefix
            .find(raw)
            .map(|found| found.as_str())
            .unwrap_or(self.default_urn_prefix.as_str())
    }
}

/// File name without its `.xml` extension (any case).
pub fn document_stem(file_name: &str) -> &str {
    let split = file_name.len().saturating_sub(4);
    match (file_name.get(..split), file_name.get(split..)) {
        (Some(stem), Some(extension)) if extension.eq_ignore_ascii_case(".xml") => stem,
        _ => file_name,
    }
}
