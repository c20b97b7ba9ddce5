use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, params};

use crate::model::CatalogEntry;
use crate::util::ensure_parent_directory;

use super::{OaiDcRecord, render_oai_dc_record};

fn ensure_schema(connection: &Connection) -> Result<()> {
    connection
        .execute_batch(
            "
            CREATE TABLE IF NOT EXISTS items (
              id INTEGER PRIMARY KEY,
              id_ext TEXT NOT NULL,
              state TEXT NOT NULL,
              timestamp TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS records (
              id INTEGER PRIMARY KEY,
              item_id INTEGER NOT NULL,
              metadata_format_id INTEGER NOT NULL,
              xml TEXT NOT NULL,
              state INTEGER NOT NULL
            );
            ",
        )
        .context("failed to create OAI tables")?;
    Ok(())
}

/// Writes one item and one OAI-DC record per catalog entry that names a creator.
/// Returns the number of items written.
pub(super) fn write_sqlite(path: &Path, catalog: &[CatalogEntry]) -> Result<usize> {
    ensure_parent_directory(path)?;
    let mut connection = Connection::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    ensure_schema(&connection)?;

    let tx = connection.transaction()?;
    let mut written = 0;
    {
        let mut items = tx.prepare(
            "INSERT OR REPLACE INTO items(id, id_ext, state, timestamp)
             VALUES(?1, ?2, 'active', '1970-01-01 00:00:00')",
        )?;
        let mut records = tx.prepare(
            "INSERT OR REPLACE INTO records(id, item_id, metadata_format_id, xml, state)
             VALUES(?1, ?2, 1, ?3, 1)",
        )?;

        for (index, entry) in catalog.iter().enumerate() {
            let record = OaiDcRecord::from_entry(index, entry);
            if record.creator.is_empty() {
                continue;
            }

            let id = i64::try_from(index).context("catalog index exceeds SQLite integer range")?;
            let xml = render_oai_dc_record(&record)?;
            records
                .execute(params![id, id, xml])
                .with_context(|| format!("failed to insert record for {}", entry.urn))?;
            items
                .execute(params![id, &entry.urn])
                .with_context(|| format!("failed to insert item for {}", entry.urn))?;
            written += 1;
        }
    }
    tx.commit()?;

    Ok(written)
}
