use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::cts::{DEFAULT_EXCLUDED_FILES, DEFAULT_URN_PREFIX};

#[derive(Parser, Debug)]
#[command(
    name = "ctsextract",
    version,
    about = "Extract CTS passages from TEI-XML corpora"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Extract(ExtractArgs),
    Inventory(InventoryArgs),
    Schemes,
}

/// Options shared by every command that reads a corpus.
#[derive(Args, Debug, Clone)]
pub struct CorpusArgs {
    #[arg(long, default_value = ".")]
    pub source_dir: PathBuf,

    #[arg(long, default_value = DEFAULT_URN_PREFIX)]
    pub default_urn_prefix: String,

    #[arg(
        long = "exclude",
        default_values_t = DEFAULT_EXCLUDED_FILES.iter().map(|name| name.to_string())
    )]
    pub excluded_files: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    #[command(flatten)]
    pub corpus: CorpusArgs,

    #[arg(long)]
    pub output: PathBuf,

    #[arg(long, value_enum, default_value_t = ExportFormat::Cex)]
    pub format: ExportFormat,

    #[arg(long, default_value = "https://scaife.perseus.org/reader/")]
    pub reader_base_url: String,

    #[arg(long)]
    pub report_path: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct InventoryArgs {
    #[command(flatten)]
    pub corpus: CorpusArgs,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum ExportFormat {
    Cex,
    Csv,
    Json,
    Xml,
    Sql,
    Html,
    Catalog,
}

impl ExportFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cex => "cex",
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Xml => "xml",
            Self::Sql => "sql",
            Self::Html => "html",
            Self::Catalog => "catalog",
        }
    }
}
