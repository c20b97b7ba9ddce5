use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::cts::document::{DocumentExtraction, Extractor};
use crate::model::{BatchOutput, SkippedFile};

pub const DEFAULT_EXCLUDED_FILES: &[&str] =
    &["__cts__.xml", "build.xml", "expath-pkg.xml", "repo.xml"];

/// Every `.xml` file below `source_dir` whose name is not excluded, in walk order.
pub fn discover_documents(source_dir: &Path, excluded: &[String]) -> Result<Vec<PathBuf>> {
    fs::read_dir(source_dir)
        .with_context(|| format!("failed to read source directory {}", source_dir.display()))?;

    let mut documents = Vec::new();
    for entry in WalkDir::new(source_dir).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(error) => {
                warn!(error = %error, "skipping unreadable directory entry");
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let Some(file_name) = entry.file_name().to_str() else {
            warn!(path = %entry.path().display(), "skipping non UTF-8 file name");
            continue;
        };

        let is_xml = Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("xml"))
            .unwrap_or(false);

        if is_xml && !excluded.iter().any(|name| name == file_name) {
            documents.push(entry.into_path());
        }
    }

    Ok(documents)
}

pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Processes documents one at a time, folding each into the batch output.
pub fn run_batch(extractor: &Extractor, documents: &[PathBuf]) -> BatchOutput {
    let mut output = BatchOutput::default();

    for path in documents {
        output.documents_seen += 1;
        let file_name = file_name_of(path);

        let raw = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(error) => {
                warn!(file = %file_name, error = %error, "skipping unreadable document");
                output.record_skip(&file_name, format!("unreadable: {error}"));
                continue;
            }
        };

        let raw = match String::from_utf8(raw) {
            Ok(text) => text,
            Err(error) => {
                warn!(file = %file_name, error = %error, "skipping document that is not UTF-8");
                output.record_skip(&file_name, format!("unparsable: {error}"));
                continue;
            }
        };

        match extractor.extract(&file_name, raw) {
            Ok(extraction) => output.absorb(extraction),
            Err(error) => {
                warn!(
                    file = %file_name,
                    error = %format!("{error:#}"),
                    "skipping unparsable document"
                );
                output.record_skip(&file_name, format!("unparsable: {error:#}"));
            }
        }
    }

    info!(
        documents = output.documents_seen,
        extracted = output.documents_extracted,
        segments = output.segments.len(),
        greek_words = output.totals.greek_words,
        latin_words = output.totals.latin_words,
        arabic_words = output.totals.arabic_words,
        "batch completed"
    );
    if !output.unclassified_patterns.is_empty() {
        warn!(
            count = output.unclassified_patterns.len(),
            patterns = ?output.unclassified_patterns,
            "reference patterns not in the scheme catalog"
        );
    }
    if !output.files_without_pattern.is_empty() {
        warn!(
            count = output.files_without_pattern.len(),
            files = ?output.files_without_pattern,
            "documents declare no reference pattern"
        );
    }
    for (scheme, documents) in &output.scheme_usage {
        info!(scheme = %scheme, documents = *documents, "scheme usage");
    }

    output
}

impl BatchOutput {
    pub fn absorb(&mut self, extraction: DocumentExtraction) {
        match extraction {
            DocumentExtraction::NoPattern { file_name } => {
                warn!(file = %file_name, "document declares no reference pattern");
                self.files_without_pattern.push(file_name);
            }
            DocumentExtraction::Unclassified { entry, literal } => {
                warn!(urn = %entry.urn, pattern = %literal, "unrecognised citation scheme");
                self.documents_unclassified += 1;
                if !self.unclassified_patterns.contains(&literal) {
                    self.unclassified_patterns.push(literal);
                }
                self.catalog.push(entry);
            }
            DocumentExtraction::Extracted {
                entry,
                scheme,
                segments,
                counts,
            } => {
                debug!(
                    urn = %entry.urn,
                    scheme = %scheme,
                    segments = segments.len(),
                    "document extracted"
                );
                self.documents_extracted += 1;
                *self.scheme_usage.entry(scheme.to_string()).or_insert(0) += 1;
                self.totals += counts;
                self.catalog.push(entry);
                self.segments.extend(segments);
            }
        }
    }

    pub fn record_skip(&mut self, file_name: &str, reason: String) {
        self.skipped_files.push(SkippedFile {
            file_name: file_name.to_string(),
            reason,
        });
    }
}
