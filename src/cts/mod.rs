//! Citation-scheme classification and hierarchical passage extraction for
//! CTS-encoded TEI documents.

pub mod batch;
pub mod document;
pub mod header;
pub mod normalize;
pub mod plan;
pub mod scheme;
pub mod scripts;
pub mod walker;
pub mod xml_tree;

#[cfg(test)]
mod tests;

pub use batch::{DEFAULT_EXCLUDED_FILES, discover_documents, file_name_of, run_batch};
pub use document::{DEFAULT_URN_PREFIX, Extractor};
pub use scheme::{Classification, SchemeCatalog};
