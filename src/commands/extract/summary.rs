use std::collections::HashMap;

use crate::model::BatchOutput;

/// Per catalog entry view of the segments it owns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(super) struct EntrySummary<'a> {
    pub first_identifier: Option<&'a str>,
    pub word_count: usize,
}

/// Summaries aligned with `output.catalog`. A segment is owned by every entry
/// whose urn followed by `:` prefixes its identifier.
pub(super) fn summarize_entries(output: &BatchOutput) -> Vec<EntrySummary<'_>> {
    let mut by_urn: HashMap<&str, Vec<usize>> = HashMap::new();
    for (index, entry) in output.catalog.iter().enumerate() {
        by_urn.entry(entry.urn.as_str()).or_default().push(index);
    }

    let mut summaries = vec![EntrySummary::default(); output.catalog.len()];
    for segment in &output.segments {
        let identifier = segment.identifier.as_str();
        for (position, _) in identifier.match_indices(':') {
            let Some(owners) = by_urn.get(&identifier[..position]) else {
                continue;
            };
            for &index in owners {
                let summary = &mut summaries[index];
                summary.first_identifier.get_or_insert(identifier);
                summary.word_count += segment.counts.total();
            }
        }
    }

    summaries
}

pub(super) fn reader_link(reader_base_url: &str, summary: &EntrySummary<'_>) -> String {
    summary
        .first_identifier
        .map(|identifier| format!("{reader_base_url}{identifier}"))
        .unwrap_or_default()
}
