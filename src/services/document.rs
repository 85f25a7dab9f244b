use crate::types::{ActiveDocument, ViewMode};
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

/// Reports the document the user is working on.
#[async_trait]
pub trait DocumentProvider: Send + Sync {
    async fn active_document(&self) -> Option<ActiveDocument>;
}

/// Treats a note given on the command line as the focused document.
pub struct FileSystemDocumentProvider {
    vault: PathBuf,
    note: PathBuf,
}

impl FileSystemDocumentProvider {
    pub fn new(vault: impl AsRef<Path>, note: impl AsRef<Path>) -> Self {
        Self {
            vault: vault.as_ref().to_path_buf(),
            note: note.as_ref().to_path_buf(),
        }
    }

    fn is_markdown(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("md"))
            .unwrap_or(false)
    }

    /// Forward-slash path of `path` below `vault`, if it lies inside it.
    fn vault_relative(vault: &Path, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(vault).ok()?;
        let mut segments = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(segment) => segments.push(segment.to_str()?.to_string()),
                _ => return None,
            }
        }
        Some(segments.join("/"))
    }
}

#[async_trait]
impl DocumentProvider for FileSystemDocumentProvider {
    async fn active_document(&self) -> Option<ActiveDocument> {
        if !Self::is_markdown(&self.note) {
            debug!("Not a markdown note: {}", self.note.display());
            return None;
        }

        let metadata = match fs::metadata(&self.note).await {
            Ok(metadata) if metadata.is_file() => metadata,
            Ok(_) => return None,
            Err(e) => {
                warn!("Cannot open note {}: {}", self.note.display(), e);
                return None;
            }
        };

        let mode = if metadata.permissions().readonly() {
            ViewMode::ReadOnly
        } else {
            ViewMode::Editing
        };

        let (vault, note) = match (
            fs::canonicalize(&self.vault).await,
            fs::canonicalize(&self.note).await,
        ) {
            (Ok(vault), Ok(note)) => (vault, note),
            _ => return None,
        };

        let id = Self::vault_relative(&vault, &note);
        let location = note
            .parent()
            .and_then(|parent| Self::vault_relative(&vault, parent));

        Some(ActiveDocument {
            // Notes outside the vault keep their full path and have no location.
            id: id.unwrap_or_else(|| note.to_string_lossy().to_string()),
            mode,
            location,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_note_inside_vault() {
        let vault = tempdir().unwrap();
        std::fs::create_dir_all(vault.path().join("inbox")).unwrap();
        let note = vault.path().join("inbox/today.md");
        std::fs::write(&note, "a\nb").unwrap();

        let provider = FileSystemDocumentProvider::new(vault.path(), &note);
        let document = provider.active_document().await.unwrap();

        assert_eq!(document.id, "inbox/today.md");
        assert_eq!(document.location.as_deref(), Some("inbox"));
        assert_eq!(document.mode, ViewMode::Editing);
    }

    #[tokio::test]
    async fn test_note_at_vault_root() {
        let vault = tempdir().unwrap();
        let note = vault.path().join("root.md");
        std::fs::write(&note, "a").unwrap();

        let provider = FileSystemDocumentProvider::new(vault.path(), &note);
        let document = provider.active_document().await.unwrap();

        assert_eq!(document.id, "root.md");
        assert_eq!(document.location.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn test_missing_or_non_markdown_note() {
        let vault = tempdir().unwrap();
        let text = vault.path().join("notes.txt");
        std::fs::write(&text, "a").unwrap();

        let missing = FileSystemDocumentProvider::new(vault.path(), vault.path().join("nope.md"));
        assert!(missing.active_document().await.is_none());

        let not_markdown = FileSystemDocumentProvider::new(vault.path(), &text);
        assert!(not_markdown.active_document().await.is_none());
    }

    #[tokio::test]
    async fn test_note_outside_vault_has_no_location() {
        let vault = tempdir().unwrap();
        let elsewhere = tempdir().unwrap();
        let note = elsewhere.path().join("stray.md");
        std::fs::write(&note, "a").unwrap();

        let provider = FileSystemDocumentProvider::new(vault.path(), &note);
        let document = provider.active_document().await.unwrap();

        assert!(document.location.is_none());
    }

    #[tokio::test]
    async fn test_read_only_note() {
        let vault = tempdir().unwrap();
        let note = vault.path().join("locked.md");
        std::fs::write(&note, "a").unwrap();
        let mut permissions = std::fs::metadata(&note).unwrap().permissions();
        permissions.set_readonly(true);
        std::fs::set_permissions(&note, permissions).unwrap();

        let provider = FileSystemDocumentProvider::new(vault.path(), &note);
        let document = provider.active_document().await.unwrap();

        assert_eq!(document.mode, ViewMode::ReadOnly);
    }
}
