use crate::error::Result;
use crate::services::namer::{NoteNamer, NOTE_EXTENSION};
use crate::services::partitioner::ContentPartitioner;
use crate::types::{SplitConfiguration, SplitOutcome};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct FragmentPreview {
    pub index: usize,
    pub file_name: String,
    pub lines: usize,
    pub bytes: usize,
    pub content: String,
}

/// What a split would produce, without touching storage.
#[derive(Debug, Clone, Serialize)]
pub struct SplitPreview {
    pub delimiter: String,
    pub had_metadata_block: bool,
    pub fragments: Vec<FragmentPreview>,
}

impl SplitPreview {
    /// The message `split` would show instead of writing anything, if any.
    pub fn notice(&self) -> Option<String> {
        let outcome = if self.delimiter.is_empty() {
            SplitOutcome::NoDelimiter
        } else {
            match self.fragments.len() {
                0 => SplitOutcome::NoContent,
                1 => SplitOutcome::SingleSection,
                _ => return None,
            }
        };
        Some(outcome.message())
    }
}

pub fn preview_split(text: &str, config: &SplitConfiguration, seed: i64) -> Result<SplitPreview> {
    let partitioner = ContentPartitioner::new()?;
    let namer = NoteNamer::new()?;
    let delimiter = ContentPartitioner::normalize_delimiter(&config.delimiter);

    let body = partitioner.strip_leading_metadata_block(text);
    let fragments = if delimiter.is_empty() {
        Vec::new()
    } else {
        ContentPartitioner::partition(body, &delimiter)
    };

    let fragments = fragments
        .iter()
        .map(|fragment| {
            let name = namer.derive_name(fragment, fragment.index, config, seed);
            FragmentPreview {
                index: fragment.index,
                file_name: format!("{}.{}", name, NOTE_EXTENSION),
                lines: fragment.content.lines().count(),
                bytes: fragment.content.len() + config.append_suffix.len(),
                content: fragment.content.clone(),
            }
        })
        .collect();

    Ok(SplitPreview {
        delimiter,
        had_metadata_block: body.len() != text.len(),
        fragments,
    })
}
