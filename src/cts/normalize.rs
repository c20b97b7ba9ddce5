use anyhow::{Context, Result};
use quick_xml::escape::unescape;
use regex::Regex;

/// Field delimiter of the flat `#`-separated exports; never allowed inside segment text.
pub const EXPORT_DELIMITER: char = '#';

/// Turns raw inner XML into plain, single-spaced text.
#[derive(Debug, Clone)]
pub struct TextCleaner {
    markup: Regex,
    whitespace_run: Regex,
}

impl TextCleaner {
    pub fn new() -> Result<Self> {
        Ok(Self {
            markup: Regex::new(r"</*[^>]*>").context("failed to compile markup regex")?,
            whitespace_run: Regex::new(r"[\s\p{Zs}]{2,}")
                .context("failed to compile whitespace-run regex")?,
        })
    }

    pub fn clean(&self, raw: &str) -> String {
        let flattened = raw.replace('\n', " ").replace(EXPORT_DELIMITER, "");
        let stripped = self.markup.replace_all(&flattened, "");
        self.whitespace_run
            .replace_all(stripped.trim(), " ")
            .into_owned()
    }

    /// Header values (titles, authors) lose newlines and markup, and their entity
    /// references are resolved. Text with an unknown entity is kept as written.
    pub fn clean_header_value(&self, raw: &str) -> String {
        let flattened = raw.replace('\n', " ");
        let stripped = self.markup.replace_all(&flattened, "");
        match unescape(&stripped) {
            Ok(text) => text.trim().to_string(),
            Err(_) => stripped.trim().to_string(),
        }
    }
}
