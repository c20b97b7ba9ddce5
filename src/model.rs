use std::collections::BTreeMap;
use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferencePattern {
    pub literal_path: String,
    pub kind: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptCounts {
    pub greek_words: usize,
    pub latin_words: usize,
    pub arabic_words: usize,
}

impl ScriptCounts {
    pub fn total(&self) -> usize {
        self.greek_words + self.latin_words + self.arabic_words
    }
}

impl AddAssign for ScriptCounts {
    fn add_assign(&mut self, other: Self) {
        self.greek_words += other.greek_words;
        self.latin_words += other.latin_words;
        self.arabic_words += other.arabic_words;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub identifier: String,
    pub text: String,
    pub counts: ScriptCounts,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub urn: String,
    pub citation_scheme: String,
    pub group_name: String,
    pub work_title: String,
    pub version_label: String,
    pub exemplar_label: String,
    pub online: String,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedFile {
    pub file_name: String,
    pub reason: String,
}

/// Everything a batch run hands to the exporters.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchOutput {
    pub catalog: Vec<CatalogEntry>,
    pub segments: Vec<Segment>,
    pub totals: ScriptCounts,
    pub unclassified_patterns: Vec<String>,
    pub files_without_pattern: Vec<String>,
    pub skipped_files: Vec<SkippedFile>,
    pub scheme_usage: BTreeMap<String, usize>,
    pub documents_seen: usize,
    pub documents_extracted: usize,
    pub documents_unclassified: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryEntry {
    pub filename: String,
    pub sha256: String,
    pub status: String,
    pub scheme_id: Option<String>,
    pub declared_pattern: Option<String>,
    pub canonical_pattern: Option<String>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryManifest {
    pub manifest_version: u32,
    pub generated_at: String,
    pub source_directory: String,
    pub document_count: usize,
    pub scheme_usage: BTreeMap<String, usize>,
    pub documents: Vec<InventoryEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractCounts {
    pub documents_seen: usize,
    pub documents_extracted: usize,
    pub documents_unclassified: usize,
    pub documents_without_pattern: usize,
    pub documents_skipped: usize,
    pub catalog_entries: usize,
    pub segments: usize,
    pub greek_words: usize,
    pub latin_words: usize,
    pub arabic_words: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub status: String,
    pub started_at: String,
    pub updated_at: String,
    pub command: String,
    pub source_directory: String,
    pub output_path: String,
    pub format: String,
    pub counts: ExtractCounts,
    pub unclassified_patterns: Vec<String>,
    pub files_without_pattern: Vec<String>,
    pub skipped_files: Vec<SkippedFile>,
    pub scheme_usage: BTreeMap<String, usize>,
}
