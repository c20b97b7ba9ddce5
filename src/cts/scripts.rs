use anyhow::{Context, Result};
use regex::Regex;

use crate::model::ScriptCounts;

/// Counts maximal same-script runs; each run is one "word".
#[derive(Debug, Clone)]
pub struct ScriptCounter {
    greek: Regex,
    latin: Regex,
    arabic: Regex,
}

impl ScriptCounter {
    pub fn new() -> Result<Self> {
        Ok(Self {
            greek: Regex::new(r"\p{Greek}+").context("failed to compile Greek script regex")?,
            latin: Regex::new(r"\p{Latin}+").context("failed to compile Latin script regex")?,
            arabic: Regex::new(r"\p{Arabic}+").context("failed to compile Arabic script regex")?,
        })
    }

    pub fn count(&self, text: &str) -> ScriptCounts {
        ScriptCounts {
            greek_words: self.greek.find_iter(text).count(),
            latin_words: self.latin.find_iter(text).count(),
            arabic_words: self.arabic.find_iter(text).count(),
        }
    }
}
