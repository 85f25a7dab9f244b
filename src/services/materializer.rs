use crate::error::{NoteSplitterError, Result};
use crate::services::namer::{NoteNamer, NOTE_EXTENSION};
use crate::services::storage::{join_path, normalize_path, CreateOutcome, NoteStorage};
use crate::types::{
    ContentFragment, FragmentFailure, OperationResult, SourceDisposition, SourceDocument,
    SplitConfiguration,
};
use tracing::{debug, info, warn};

pub struct NoteMaterializer;

impl NoteMaterializer {
    /// Writes every fragment as a new note and removes the source note when
    /// all writes succeeded and the configuration asks for it.
    ///
    /// Only a destination folder that cannot be created fails the whole
    /// operation; per-fragment failures are recorded in the result.
    pub async fn materialize(
        fragments: &[ContentFragment],
        config: &SplitConfiguration,
        source: &SourceDocument,
        storage: &dyn NoteStorage,
        seed: i64,
    ) -> Result<OperationResult> {
        let namer = NoteNamer::new()?;
        let destination = Self::resolve_destination(config, source);

        info!(
            "Writing {} fragments of '{}' to '{}'",
            fragments.len(),
            source.id,
            if destination.is_empty() { "/" } else { destination.as_str() }
        );

        storage
            .ensure_location_exists(&destination)
            .await
            .map_err(|e| NoteSplitterError::Destination {
                path: destination.clone(),
                reason: e.to_string(),
            })?;

        let mut written_paths = Vec::new();
        let mut failures = Vec::new();

        for (index, fragment) in fragments.iter().enumerate() {
            let body = Self::build_body(fragment, config);
            let name = namer.derive_name(fragment, index, config, seed);

            match Self::write_fragment(storage, &destination, &name, &body).await {
                Ok(path) => {
                    debug!("Wrote fragment {} to {}", index + 1, path);
                    written_paths.push(path);
                }
                Err((path, reason)) => {
                    warn!("Failed to write fragment {} to {}: {}", index + 1, path, reason);
                    failures.push(FragmentFailure {
                        index,
                        path,
                        reason,
                    });
                }
            }
        }

        let mut result = OperationResult {
            fragments_total: fragments.len(),
            fragments_written: written_paths.len(),
            written_paths,
            failures,
            source: SourceDisposition::Kept,
        };

        if result.is_complete() && config.delete_source_on_full_success {
            result.source = match storage.delete(&source.id).await {
                Ok(()) => {
                    info!("Deleted original note '{}'", source.id);
                    SourceDisposition::Deleted
                }
                Err(e) => {
                    warn!("Failed to delete original note '{}': {}", source.id, e);
                    SourceDisposition::DeleteFailed(e.to_string())
                }
            };
        }

        info!(
            "Wrote {}/{} fragments of '{}'",
            result.fragments_written, result.fragments_total, source.id
        );

        Ok(result)
    }

    /// The configured folder, else the source note's folder, else the root.
    ///
    /// `/` or `.` name the root itself; only an empty setting falls back.
    pub fn resolve_destination(config: &SplitConfiguration, source: &SourceDocument) -> String {
        if config.destination_path.trim().is_empty() {
            return normalize_path(&source.location);
        }
        normalize_path(config.destination_path.trim())
    }

    fn build_body(fragment: &ContentFragment, config: &SplitConfiguration) -> String {
        let mut body = fragment.content.clone();
        if !config.append_suffix.is_empty() {
            body.push_str(&config.append_suffix);
        }
        body
    }

    /// Creates `{destination}/{name}.md`, retrying once under a conflict
    /// name if the first choice is taken. Returns the written path, or the
    /// last attempted path and the failure reason.
    async fn write_fragment(
        storage: &dyn NoteStorage,
        destination: &str,
        name: &str,
        body: &str,
    ) -> std::result::Result<String, (String, String)> {
        let path = Self::note_path(destination, name);

        match storage.create_if_absent(&path, body).await {
            CreateOutcome::Created => Ok(path),
            CreateOutcome::Failed(reason) => Err((path, reason)),
            CreateOutcome::AlreadyExists => {
                let retry_path = Self::note_path(destination, &NoteNamer::conflict_name());
                debug!("{} already exists, retrying as {}", path, retry_path);

                match storage.create_if_absent(&retry_path, body).await {
                    CreateOutcome::Created => Ok(retry_path),
                    CreateOutcome::AlreadyExists => {
                        let reason = format!("File already exists: {}", retry_path);
                        Err((retry_path, reason))
                    }
                    CreateOutcome::Failed(reason) => Err((retry_path, reason)),
                }
            }
        }
    }

    fn note_path(destination: &str, name: &str) -> String {
        join_path(destination, &format!("{}.{}", name, NOTE_EXTENSION))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::storage::MemoryStorage;

    const SEED: i64 = 1_000;

    fn fragments(contents: &[&str]) -> Vec<ContentFragment> {
        contents
            .iter()
            .enumerate()
            .map(|(index, content)| ContentFragment {
                index,
                content: content.to_string(),
            })
            .collect()
    }

    fn source() -> SourceDocument {
        SourceDocument {
            id: "inbox/source.md".to_string(),
            text: "A\n---\nB\n---\nC".to_string(),
            location: "inbox".to_string(),
        }
    }

    fn storage_with_source() -> MemoryStorage {
        MemoryStorage::new().with_item("inbox/source.md", "A\n---\nB\n---\nC")
    }

    #[tokio::test]
    async fn test_writes_every_fragment() {
        let storage = storage_with_source();
        let config = SplitConfiguration::default();

        let result = NoteMaterializer::materialize(
            &fragments(&["A", "B", "C"]),
            &config,
            &source(),
            &storage,
            SEED,
        )
        .await
        .unwrap();

        assert_eq!(result.fragments_total, 3);
        assert_eq!(result.fragments_written, 3);
        assert_eq!(result.summary(), "Split into 3 notes.");
        assert_eq!(result.source, SourceDisposition::Kept);
        assert_eq!(
            storage.get("note-splitter/split-note-1000.md").as_deref(),
            Some("A")
        );
        assert_eq!(
            storage.get("note-splitter/split-note-1002.md").as_deref(),
            Some("C")
        );
        assert_eq!(storage.locations(), vec!["note-splitter".to_string()]);
        assert!(storage.get("inbox/source.md").is_some());
    }

    #[tokio::test]
    async fn test_empty_destination_uses_source_folder() {
        let storage = storage_with_source();
        let config = SplitConfiguration {
            destination_path: String::new(),
            append_suffix: "\n#split".to_string(),
            ..SplitConfiguration::default()
        };

        let result =
            NoteMaterializer::materialize(&fragments(&["A", "B"]), &config, &source(), &storage, SEED)
                .await
                .unwrap();

        assert_eq!(
            result.written_paths,
            vec![
                "inbox/split-note-1000.md".to_string(),
                "inbox/split-note-1001.md".to_string()
            ]
        );
        assert_eq!(
            storage.get("inbox/split-note-1001.md").as_deref(),
            Some("B\n#split")
        );
    }

    #[tokio::test]
    async fn test_root_source_without_destination_writes_to_root() {
        let storage = MemoryStorage::new();
        let config = SplitConfiguration {
            destination_path: "/".to_string(),
            ..SplitConfiguration::default()
        };
        let source = SourceDocument {
            id: "source.md".to_string(),
            text: String::new(),
            location: String::new(),
        };

        let result = NoteMaterializer::materialize(&fragments(&["A"]), &config, &source, &storage, SEED)
            .await
            .unwrap();

        assert_eq!(result.written_paths, vec!["split-note-1000.md".to_string()]);
    }

    #[tokio::test]
    async fn test_root_destination_overrides_source_folder() {
        for root in ["/", ".", " / "] {
            let storage = storage_with_source();
            let config = SplitConfiguration {
                destination_path: root.to_string(),
                ..SplitConfiguration::default()
            };

            let result =
                NoteMaterializer::materialize(&fragments(&["A", "B"]), &config, &source(), &storage, 7)
                    .await
                    .unwrap();

            assert_eq!(
                result.written_paths,
                vec!["split-note-7.md".to_string(), "split-note-8.md".to_string()]
            );
        }
    }

    #[tokio::test]
    async fn test_failed_retry_is_recorded_and_later_fragments_written() {
        let storage = storage_with_source()
            .with_item("note-splitter/split-note-1000.md", "old")
            .with_item("note-splitter/split-note-1002.md", "old");
        storage.fail_writes_under("note-splitter/Split conflict ", "read-only folder");
        let config = SplitConfiguration {
            delete_source_on_full_success: true,
            ..SplitConfiguration::default()
        };

        let result = NoteMaterializer::materialize(
            &fragments(&["A", "B", "C"]),
            &config,
            &source(),
            &storage,
            SEED,
        )
        .await
        .unwrap();

        assert_eq!(result.fragments_written, 1);
        assert_eq!(result.written_paths, vec!["note-splitter/split-note-1001.md".to_string()]);
        assert_eq!(
            result.failures.iter().map(|f| f.index).collect::<Vec<_>>(),
            vec![0, 2]
        );
        assert!(result.failures[0].path.starts_with("note-splitter/Split conflict "));
        assert_eq!(result.failures[0].reason, "read-only folder");
        assert_eq!(result.source, SourceDisposition::Kept);
        assert!(storage.deleted().is_empty());
        assert_eq!(
            storage.get("note-splitter/split-note-1000.md").as_deref(),
            Some("old")
        );
    }

    #[tokio::test]
    async fn test_retry_that_also_exists_is_recorded() {
        let storage = storage_with_source().with_item("note-splitter/split-note-1000.md", "old");
        storage.occupy_paths_under("note-splitter/Split conflict ");
        let config = SplitConfiguration::default();

        let result =
            NoteMaterializer::materialize(&fragments(&["A", "B"]), &config, &source(), &storage, SEED)
                .await
                .unwrap();

        assert_eq!(result.fragments_written, 1);
        assert_eq!(result.failures.len(), 1);
        assert!(result.failures[0]
            .reason
            .starts_with("File already exists: note-splitter/Split conflict "));
        assert!(storage.get("note-splitter/split-note-1001.md").is_some());
    }

    #[tokio::test]
    async fn test_collision_retries_with_conflict_name() {
        let storage = storage_with_source().with_item("note-splitter/Existing.md", "old");
        let config = SplitConfiguration {
            use_content_as_title: true,
            ..SplitConfiguration::default()
        };

        let result = NoteMaterializer::materialize(
            &fragments(&["Existing\nnew body", "Fresh"]),
            &config,
            &source(),
            &storage,
            SEED,
        )
        .await
        .unwrap();

        assert_eq!(result.fragments_written, 2);
        assert!(result.failures.is_empty());
        assert_eq!(
            storage.get("note-splitter/Existing.md").as_deref(),
            Some("old")
        );
        let conflict = &result.written_paths[0];
        assert!(conflict.starts_with("note-splitter/Split conflict "));
        assert_eq!(storage.get(conflict).as_deref(), Some("Existing\nnew body"));
        assert_eq!(result.written_paths[1], "note-splitter/Fresh.md");
    }

    #[tokio::test]
    async fn test_failed_fragment_does_not_abort_or_delete() {
        let storage = storage_with_source();
        storage.fail_writes_to("note-splitter/split-note-1001.md", "disk full");
        let config = SplitConfiguration {
            delete_source_on_full_success: true,
            ..SplitConfiguration::default()
        };

        let result = NoteMaterializer::materialize(
            &fragments(&["A", "B", "C"]),
            &config,
            &source(),
            &storage,
            SEED,
        )
        .await
        .unwrap();

        assert_eq!(result.fragments_written, 2);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].index, 1);
        assert_eq!(result.failures[0].reason, "disk full");
        assert_eq!(result.source, SourceDisposition::Kept);
        assert!(storage.deleted().is_empty());
        assert!(storage.get("inbox/source.md").is_some());
        assert!(storage.get("note-splitter/split-note-1002.md").is_some());
    }

    #[tokio::test]
    async fn test_full_success_deletes_source_once() {
        let storage = storage_with_source();
        let config = SplitConfiguration {
            delete_source_on_full_success: true,
            ..SplitConfiguration::default()
        };

        let result = NoteMaterializer::materialize(
            &fragments(&["A", "B", "C"]),
            &config,
            &source(),
            &storage,
            SEED,
        )
        .await
        .unwrap();

        assert_eq!(result.source, SourceDisposition::Deleted);
        assert_eq!(storage.deleted(), vec!["inbox/source.md".to_string()]);
        assert!(storage.get("inbox/source.md").is_none());
    }

    #[tokio::test]
    async fn test_delete_failure_is_reported_not_raised() {
        let storage = MemoryStorage::new();
        let config = SplitConfiguration {
            delete_source_on_full_success: true,
            ..SplitConfiguration::default()
        };

        let result =
            NoteMaterializer::materialize(&fragments(&["A", "B"]), &config, &source(), &storage, SEED)
                .await
                .unwrap();

        assert_eq!(result.fragments_written, 2);
        assert!(matches!(result.source, SourceDisposition::DeleteFailed(_)));
    }

    #[tokio::test]
    async fn test_destination_failure_aborts() {
        let storage = storage_with_source();
        storage.fail_location("note-splitter", "permission denied");
        let config = SplitConfiguration::default();

        let result = NoteMaterializer::materialize(
            &fragments(&["A", "B"]),
            &config,
            &source(),
            &storage,
            SEED,
        )
        .await;

        assert!(matches!(
            result,
            Err(NoteSplitterError::Destination { .. })
        ));
        assert_eq!(storage.paths(), vec!["inbox/source.md".to_string()]);
    }

    #[tokio::test]
    async fn test_same_text_gives_same_bodies() {
        let first = MemoryStorage::new();
        let second = MemoryStorage::new();
        let config = SplitConfiguration::default();
        let parts = fragments(&["A", "B", "C"]);

        NoteMaterializer::materialize(&parts, &config, &source(), &first, 1)
            .await
            .unwrap();
        NoteMaterializer::materialize(&parts, &config, &source(), &second, 99)
            .await
            .unwrap();

        let bodies = |storage: &MemoryStorage| {
            storage
                .paths()
                .iter()
                .filter_map(|p| storage.get(p))
                .collect::<Vec<_>>()
        };
        let mut first_bodies = bodies(&first);
        let mut second_bodies = bodies(&second);
        first_bodies.sort();
        second_bodies.sort();
        assert_eq!(first_bodies, second_bodies);
        assert_eq!(first.paths().len(), 3);
    }
}
