pub mod command;
pub mod document;
pub mod materializer;
pub mod namer;
pub mod notifier;
pub mod partitioner;
pub mod preview;
pub mod storage;

pub use command::SplitCommand;
pub use document::{DocumentProvider, FileSystemDocumentProvider};
pub use materializer::NoteMaterializer;
pub use namer::NoteNamer;
pub use notifier::{ConsoleNotifier, Notifier, RecordingNotifier};
pub use partitioner::ContentPartitioner;
pub use preview::{preview_split, FragmentPreview, SplitPreview};
pub use storage::{CreateOutcome, FileSystemStorage, MemoryStorage, NoteStorage, StorageError};
