use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::Result;
use tracing::{info, warn};

use crate::cli::{CorpusArgs, InventoryArgs};
use crate::cts::{Classification, Extractor, discover_documents, file_name_of};
use crate::model::{InventoryEntry, InventoryManifest};
use crate::util::{now_utc_string, sha256_file, write_json_pretty};

const INVENTORY_FILE_NAME: &str = "ctsextract_inventory.json";

pub fn run(args: InventoryArgs) -> Result<()> {
    let manifest = build_manifest(&args.corpus)?;

    for (scheme, count) in &manifest.scheme_usage {
        info!(scheme = %scheme, documents = count, "scheme usage");
    }

    if args.dry_run {
        info!(
            document_count = manifest.document_count,
            source = %manifest.source_directory,
            "inventory dry-run complete"
        );
        return Ok(());
    }

    let manifest_path = args
        .manifest_path
        .unwrap_or_else(|| args.corpus.source_dir.join(INVENTORY_FILE_NAME));

    write_json_pretty(&manifest_path, &manifest)?;
    info!(path = %manifest_path.display(), "wrote inventory manifest");
    info!(document_count = manifest.document_count, "inventory completed");

    Ok(())
}

pub fn build_manifest(corpus: &CorpusArgs) -> Result<InventoryManifest> {
    let extractor = Extractor::new(&corpus.default_urn_prefix)?;
    let paths = discover_documents(&corpus.source_dir, &corpus.excluded_files)?;

    let mut documents = Vec::with_capacity(paths.len());
    let mut scheme_usage = BTreeMap::new();
    for path in &paths {
        let entry = inventory_entry(&extractor, path);
        if let Some(scheme_id) = &entry.scheme_id {
            *scheme_usage.entry(scheme_id.clone()).or_insert(0) += 1;
        }
        documents.push(entry);
    }

    Ok(InventoryManifest {
        manifest_version: 1,
        generated_at: now_utc_string(),
        source_directory: corpus.source_dir.display().to_string(),
        document_count: documents.len(),
        scheme_usage,
        documents,
    })
}

/// Classifies one document from its header alone.
fn inventory_entry(extractor: &Extractor, path: &Path) -> InventoryEntry {
    let filename = file_name_of(path);
    let mut entry = InventoryEntry {
        filename,
        sha256: String::new(),
        status: "skipped".to_string(),
        scheme_id: None,
        declared_pattern: None,
        canonical_pattern: None,
        reason: None,
    };

    let opened = sha256_file(path).and_then(|sha256| {
        entry.sha256 = sha256;
        let raw = fs::read_to_string(path)?;
        extractor.open_document(&entry.filename, raw)
    });
    let context = match opened {
        Ok(context) => context,
        Err(error) => {
            warn!(file = %entry.filename, error = %error, "skipping document");
            entry.reason = Some(format!("{error:#}"));
            return entry;
        }
    };

    match context.classification {
        Classification::NoPattern => {
            entry.status = "no-pattern".to_string();
            entry.reason = Some("no cRefPattern declared".to_string());
        }
        Classification::Unclassified { literal, canonical } => {
            warn!(file = %entry.filename, pattern = %literal, "unrecognised citation scheme");
            entry.status = "unclassified".to_string();
            entry.declared_pattern = Some(literal);
            entry.canonical_pattern = Some(canonical);
        }
        Classification::Matched {
            plan,
            literal,
            canonical,
        } => {
            entry.status = "classified".to_string();
            entry.scheme_id = Some(plan.scheme().to_string());
            entry.declared_pattern = Some(literal);
            entry.canonical_pattern = Some(canonical);
        }
    }

    entry
}
