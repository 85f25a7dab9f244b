use serde::{Deserialize, Serialize};

/// Default folder new notes are written to, relative to the vault root.
pub const DEFAULT_DESTINATION: &str = "note-splitter";

/// Default delimiter in its escaped, user-editable form.
pub const DEFAULT_DELIMITER: &str = "\\n";

/// User-editable split settings.
///
/// The serialized key names match the settings record persisted by the
/// host, so existing settings files load unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfiguration {
    /// May contain the two-character escape `\n` for a newline.
    pub delimiter: String,
    /// Empty means "next to the source note".
    #[serde(rename = "saveFolderPath")]
    pub destination_path: String,
    #[serde(rename = "useContentAsTitle")]
    pub use_content_as_title: bool,
    #[serde(rename = "appendToSplitContent")]
    pub append_suffix: String,
    #[serde(rename = "deleteOriginalNote")]
    pub delete_source_on_full_success: bool,
}

impl Default for SplitConfiguration {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER.to_string(),
            destination_path: DEFAULT_DESTINATION.to_string(),
            use_content_as_title: false,
            append_suffix: String::new(),
            delete_source_on_full_success: false,
        }
    }
}

/// Presentation mode of the focused document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewMode {
    Editing,
    ReadOnly,
}

/// The document the user asked to split, as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveDocument {
    /// Vault-relative path of the note.
    pub id: String,
    pub mode: ViewMode,
    /// Containing folder relative to the vault root; `Some("")` is the root.
    pub location: Option<String>,
}

/// A note read once for the duration of one split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    pub id: String,
    pub text: String,
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentFragment {
    /// Zero-based position in the source note.
    pub index: usize,
    pub content: String,
}

impl ContentFragment {
    pub fn first_line(&self) -> &str {
        self.content.lines().next().unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FragmentFailure {
    pub index: usize,
    pub path: String,
    pub reason: String,
}

/// What happened to the source note after all writes were attempted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SourceDisposition {
    Kept,
    Deleted,
    DeleteFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationResult {
    pub fragments_total: usize,
    pub fragments_written: usize,
    pub written_paths: Vec<String>,
    pub failures: Vec<FragmentFailure>,
    pub source: SourceDisposition,
}

impl OperationResult {
    pub fn is_complete(&self) -> bool {
        self.fragments_written == self.fragments_total
    }

    pub fn summary(&self) -> String {
        let plural = if self.fragments_written == 1 { "" } else { "s" };
        format!("Split into {} note{}.", self.fragments_written, plural)
    }
}

/// Terminal state of one split command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitOutcome {
    NoActiveDocument,
    NotEditable,
    NoLocation,
    NoDelimiter,
    NoContent,
    SingleSection,
    Completed(OperationResult),
}

impl SplitOutcome {
    /// The message shown to the user for this outcome.
    pub fn message(&self) -> String {
        match self {
            SplitOutcome::NoActiveDocument => "Please open a markdown file.".to_string(),
            SplitOutcome::NotEditable => {
                "Please switch to editing mode to split the note.".to_string()
            }
            SplitOutcome::NoLocation => "Unable to determine the note's location.".to_string(),
            SplitOutcome::NoDelimiter => {
                "No delimiter set. Please set a delimiter in the settings.".to_string()
            }
            SplitOutcome::NoContent => "No content to split.".to_string(),
            SplitOutcome::SingleSection => {
                "Only one section of content found. Nothing to split.".to_string()
            }
            SplitOutcome::Completed(result) => result.summary(),
        }
    }
}
