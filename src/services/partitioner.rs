use crate::error::Result;
use crate::types::ContentFragment;
use regex::Regex;
use tracing::debug;

/// Splits note text into ordered, trimmed, non-empty fragments.
pub struct ContentPartitioner {
    metadata_block: Regex,
}

impl ContentPartitioner {
    pub fn new() -> Result<Self> {
        // Opening marker at offset 0, closing marker on the next `---` line.
        let metadata_block = Regex::new(r"(?s)\A---[ \t]*\r?\n(?:.*?\r?\n)?---[ \t]*(?:\r?\n|\z)")?;

        Ok(Self { metadata_block })
    }

    /// Replaces every literal `\n` escape with a newline. Not recursive, so
    /// `\\n` becomes a backslash followed by a newline.
    pub fn normalize_delimiter(raw: &str) -> String {
        raw.replace("\\n", "\n")
    }

    /// Removes a leading `---` fenced metadata block, if any.
    pub fn strip_leading_metadata_block<'a>(&self, text: &'a str) -> &'a str {
        match self.metadata_block.find(text) {
            Some(block) => &text[block.end()..],
            None => text,
        }
    }

    /// Splits `text` on every literal occurrence of `delimiter`.
    ///
    /// An empty delimiter yields the whole trimmed text as one fragment;
    /// callers reject empty delimiters before getting here.
    pub fn partition(text: &str, delimiter: &str) -> Vec<ContentFragment> {
        let segments: Vec<&str> = if delimiter.is_empty() {
            vec![text]
        } else {
            text.split(delimiter).collect()
        };

        segments
            .into_iter()
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .enumerate()
            .map(|(index, segment)| ContentFragment {
                index,
                content: segment.to_string(),
            })
            .collect()
    }

    /// Strips the metadata block and partitions what remains.
    pub fn split(&self, text: &str, delimiter: &str) -> Vec<ContentFragment> {
        let body = self.strip_leading_metadata_block(text);
        let fragments = Self::partition(body, delimiter);

        debug!(
            "Partitioned {} bytes into {} fragments",
            body.len(),
            fragments.len()
        );

        fragments
    }
}
