use clap::{Args, Parser, Subcommand};
use note_splitter::SplitConfiguration;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "note-split")]
#[command(about = "A CLI tool for splitting a markdown note into multiple notes by a delimiter")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Vault directory all note paths are relative to
    #[arg(long, global = true, default_value = ".")]
    pub vault: PathBuf,

    /// Settings file (defaults to <VAULT>/.note-splitter.json)
    #[arg(long, global = true, value_name = "FILE")]
    pub settings: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Split a note into multiple notes
    Split(SplitArgs),

    /// Show the notes a split would create without writing anything
    Preview(PreviewArgs),

    /// Show or change the saved settings
    #[command(subcommand)]
    Config(ConfigCommands),
}

/// Settings that can be given on the command line.
#[derive(Args, Default)]
pub struct SettingsArgs {
    /// Delimiter to split on (`\n` stands for a newline)
    #[arg(long, allow_hyphen_values = true)]
    pub delimiter: Option<String>,

    /// Folder for new notes, relative to the vault ("" = next to the note)
    #[arg(long, value_name = "FOLDER")]
    pub destination: Option<String>,

    /// Name new notes after their first line
    #[arg(long, value_name = "BOOL")]
    pub use_content_as_title: Option<bool>,

    /// Text appended to every new note
    #[arg(long, value_name = "TEXT", allow_hyphen_values = true)]
    pub append: Option<String>,

    /// Delete the original note once every new note was written
    #[arg(long, value_name = "BOOL")]
    pub delete_original: Option<bool>,
}

impl SettingsArgs {
    pub fn apply(&self, config: &mut SplitConfiguration) {
        if let Some(delimiter) = &self.delimiter {
            config.delimiter = delimiter.clone();
        }
        if let Some(destination) = &self.destination {
            config.destination_path = destination.clone();
        }
        if let Some(use_title) = self.use_content_as_title {
            config.use_content_as_title = use_title;
        }
        if let Some(append) = &self.append {
            config.append_suffix = append.clone();
        }
        if let Some(delete) = self.delete_original {
            config.delete_source_on_full_success = delete;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.delimiter.is_none()
            && self.destination.is_none()
            && self.use_content_as_title.is_none()
            && self.append.is_none()
            && self.delete_original.is_none()
    }
}

#[derive(Args)]
pub struct SplitArgs {
    /// Note to split
    #[arg(required = true, value_name = "NOTE")]
    pub note: PathBuf,

    /// One-off overrides of the saved settings
    #[command(flatten)]
    pub overrides: SettingsArgs,
}

#[derive(Args)]
pub struct PreviewArgs {
    /// Note to preview
    #[arg(required = true, value_name = "NOTE")]
    pub note: PathBuf,

    #[command(flatten)]
    pub overrides: SettingsArgs,

    /// Print the content of every fragment
    #[arg(long)]
    pub detailed: bool,

    /// Write the preview to a JSON file
    #[arg(long, value_name = "FILE")]
    pub json_output: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the saved settings as JSON
    Show,

    /// Change and save settings
    Set(SettingsArgs),
}
