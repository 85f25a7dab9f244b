use crate::error::Result;
use crate::types::{ContentFragment, SplitConfiguration};
use regex::Regex;
use uuid::Uuid;

/// Extension given to every written note.
pub const NOTE_EXTENSION: &str = "md";

/// Longest file name component most file systems accept, in bytes.
pub const MAX_FILE_NAME_BYTES: usize = 255;

/// Derives note names from fragments.
pub struct NoteNamer {
    forbidden_chars: Regex,
    whitespace: Regex,
}

impl NoteNamer {
    pub fn new() -> Result<Self> {
        // File system reserved characters, control characters, and the
        // characters that break wiki links.
        let forbidden_chars = Regex::new(r#"[\\/:*?"<>|#^\[\]\p{Cc}]"#)?;
        let whitespace = Regex::new(r"\s+")?;

        Ok(Self {
            forbidden_chars,
            whitespace,
        })
    }

    /// Picks the first-choice name for `fragment`, without extension.
    ///
    /// `seed` must be captured once per operation; combined with `index` it
    /// keeps synthesized names unique within the operation.
    pub fn derive_name(
        &self,
        fragment: &ContentFragment,
        index: usize,
        config: &SplitConfiguration,
        seed: i64,
    ) -> String {
        if config.use_content_as_title {
            let title = self.sanitize(fragment.first_line());
            if !title.is_empty() {
                return title;
            }
        }

        Self::synthesized_name(seed, index)
    }

    pub fn synthesized_name(seed: i64, index: usize) -> String {
        let marker = seed.saturating_add(i64::try_from(index).unwrap_or(i64::MAX));
        format!("split-note-{}", marker)
    }

    /// Name used for the single retry after a collision.
    pub fn conflict_name() -> String {
        format!("Split conflict {}", Uuid::new_v4())
    }

    /// Makes a single line safe to use as a file name.
    pub fn sanitize(&self, line: &str) -> String {
        // Tabs are control characters; turn them into spaces before stripping.
        let spaced = self.whitespace.replace_all(line, " ");
        let stripped = self.forbidden_chars.replace_all(&spaced, "");
        let collapsed = self.whitespace.replace_all(&stripped, " ");
        let trimmed = collapsed
            .trim()
            .trim_end_matches(|c: char| c == '.' || c.is_whitespace());

        truncate_to_bytes(trimmed, MAX_FILE_NAME_BYTES - NOTE_EXTENSION.len() - 1)
            .trim_end()
            .to_string()
    }
}

fn truncate_to_bytes(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }

    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
