//! # Note Splitter Library
//!
//! Splits one markdown note into several notes on a user-supplied
//! delimiter. A leading `---` metadata block is ignored, each fragment is
//! written as a new note (named after its first line or a synthesized
//! `split-note-*` name), and the original note is removed only when every
//! fragment was written.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use note_splitter::{
//!     ConsoleNotifier, FileSystemDocumentProvider, FileSystemStorage, SplitCommand,
//!     SplitConfiguration,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SplitConfiguration {
//!         delimiter: "---".to_string(),
//!         use_content_as_title: true,
//!         ..SplitConfiguration::default()
//!     };
//!
//!     let provider = FileSystemDocumentProvider::new("vault", "vault/inbox/ideas.md");
//!     let storage = FileSystemStorage::new("vault");
//!
//!     let command = SplitCommand::new(config)?;
//!     let outcome = command.run(&provider, &storage, &ConsoleNotifier).await?;
//!
//!     println!("{}", outcome.message());
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod services;
pub mod settings;
pub mod types;

// Re-export main types and services for easier usage
pub use error::{NoteSplitterError, Result};
pub use services::{
    preview_split, ConsoleNotifier, ContentPartitioner, CreateOutcome, DocumentProvider,
    FileSystemDocumentProvider, FileSystemStorage, MemoryStorage, NoteMaterializer, NoteNamer,
    NoteStorage, Notifier, RecordingNotifier, SplitCommand, StorageError,
};
pub use types::{
    ActiveDocument, ContentFragment, OperationResult, SourceDisposition, SourceDocument,
    SplitConfiguration, SplitOutcome, ViewMode,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
