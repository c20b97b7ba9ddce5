use std::io::{self, Write};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cts::SchemeCatalog;

#[derive(Debug, Serialize)]
struct SchemeListing {
    id: String,
    capture_depth: usize,
    plan: String,
    spellings: Vec<&'static str>,
}

pub fn run() -> Result<()> {
    let listings = scheme_listings(&SchemeCatalog::new()?);

    let mut output = io::BufWriter::new(io::stdout().lock());
    serde_json::to_writer_pretty(&mut output, &listings)
        .context("failed to serialize scheme catalog")?;
    writeln!(output).context("failed to write scheme catalog")?;
    output.flush().context("failed to flush scheme catalog")?;

    info!(schemes = listings.len(), "scheme catalog validated");
    Ok(())
}

fn scheme_listings(catalog: &SchemeCatalog) -> Vec<SchemeListing> {
    catalog
        .plans()
        .iter()
        .map(|plan| SchemeListing {
            id: plan.scheme().to_string(),
            capture_depth: plan.capture_count(),
            plan: plan.render(),
            spellings: plan.descriptor().spellings.to_vec(),
        })
        .collect()
}
