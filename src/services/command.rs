use crate::error::Result;
use crate::services::document::DocumentProvider;
use crate::services::materializer::NoteMaterializer;
use crate::services::notifier::Notifier;
use crate::services::partitioner::ContentPartitioner;
use crate::services::storage::NoteStorage;
use crate::types::{SourceDisposition, SourceDocument, SplitConfiguration, SplitOutcome, ViewMode};
use tracing::{debug, info};

/// The "split note by delimiter" action.
pub struct SplitCommand {
    config: SplitConfiguration,
    partitioner: ContentPartitioner,
}

impl SplitCommand {
    pub fn new(config: SplitConfiguration) -> Result<Self> {
        Ok(Self {
            config,
            partitioner: ContentPartitioner::new()?,
        })
    }

    pub fn config(&self) -> &SplitConfiguration {
        &self.config
    }

    /// Runs the split with a seed taken from the current time.
    pub async fn run(
        &self,
        provider: &dyn DocumentProvider,
        storage: &dyn NoteStorage,
        notifier: &dyn Notifier,
    ) -> Result<SplitOutcome> {
        let seed = chrono::Utc::now().timestamp_millis();
        self.execute(provider, storage, notifier, seed).await
    }

    /// Checks preconditions in order, splits the active note and reports
    /// the outcome. Every early exit leaves storage untouched.
    pub async fn execute(
        &self,
        provider: &dyn DocumentProvider,
        storage: &dyn NoteStorage,
        notifier: &dyn Notifier,
        seed: i64,
    ) -> Result<SplitOutcome> {
        let outcome = self.split_active(provider, storage, notifier, seed).await?;
        notifier.notify(&outcome.message());

        if let SplitOutcome::Completed(result) = &outcome {
            if let SourceDisposition::DeleteFailed(reason) = &result.source {
                notifier.notify(&format!("Failed to delete the original note: {}", reason));
            }
        }

        Ok(outcome)
    }

    async fn split_active(
        &self,
        provider: &dyn DocumentProvider,
        storage: &dyn NoteStorage,
        notifier: &dyn Notifier,
        seed: i64,
    ) -> Result<SplitOutcome> {
        let Some(document) = provider.active_document().await else {
            return Ok(SplitOutcome::NoActiveDocument);
        };
        if document.mode != ViewMode::Editing {
            return Ok(SplitOutcome::NotEditable);
        }
        let Some(location) = document.location else {
            return Ok(SplitOutcome::NoLocation);
        };

        let delimiter = ContentPartitioner::normalize_delimiter(&self.config.delimiter);
        if delimiter.is_empty() {
            return Ok(SplitOutcome::NoDelimiter);
        }

        let text = storage.read_current_content(&document.id).await?;
        let fragments = self.partitioner.split(&text, &delimiter);
        debug!("Found {} fragments in '{}'", fragments.len(), document.id);
        match fragments.len() {
            0 => return Ok(SplitOutcome::NoContent),
            1 => return Ok(SplitOutcome::SingleSection),
            _ => {}
        }

        info!("Splitting '{}' into {} notes", document.id, fragments.len());

        let source = SourceDocument {
            id: document.id,
            text,
            location,
        };
        let result =
            NoteMaterializer::materialize(&fragments, &self.config, &source, storage, seed).await?;

        for failure in &result.failures {
            notifier.notify(&format!("Error creating file: {}", failure.reason));
        }

        Ok(SplitOutcome::Completed(result))
    }
}
