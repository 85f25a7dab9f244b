mod cli;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Commands, ConfigCommands, PreviewArgs, SettingsArgs, SplitArgs};
use note_splitter::settings::{default_settings_path, load_settings, save_settings};
use note_splitter::{
    preview_split, ConsoleNotifier, FileSystemDocumentProvider, FileSystemStorage, SplitCommand,
    SplitConfiguration, SplitOutcome,
};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    debug!("note-split v{}", note_splitter::VERSION);

    let settings_path = cli
        .settings
        .clone()
        .unwrap_or_else(|| default_settings_path(&cli.vault));

    let result = match &cli.command {
        Commands::Split(args) => handle_split_command(args, &cli.vault, &settings_path).await,
        Commands::Preview(args) => handle_preview_command(args, &cli.vault, &settings_path).await,
        Commands::Config(ConfigCommands::Show) => handle_config_show(&settings_path).await,
        Commands::Config(ConfigCommands::Set(args)) => {
            handle_config_set(args, &settings_path).await
        }
    };

    if let Err(e) = result {
        error!("Operation failed: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

async fn effective_settings(
    settings_path: &Path,
    overrides: &SettingsArgs,
) -> anyhow::Result<SplitConfiguration> {
    let mut config = load_settings(settings_path)
        .await
        .with_context(|| format!("Failed to load settings from {}", settings_path.display()))?;
    overrides.apply(&mut config);
    Ok(config)
}

fn note_path(vault: &Path, note: &Path) -> PathBuf {
    if note.is_absolute() || note.exists() {
        note.to_path_buf()
    } else {
        vault.join(note)
    }
}

async fn handle_split_command(
    args: &SplitArgs,
    vault: &Path,
    settings_path: &Path,
) -> anyhow::Result<()> {
    let config = effective_settings(settings_path, &args.overrides).await?;
    let note = note_path(vault, &args.note);
    info!("Splitting {} in vault {}", note.display(), vault.display());

    let provider = FileSystemDocumentProvider::new(vault, &note);
    let storage = FileSystemStorage::new(vault);
    let command = SplitCommand::new(config)?;
    debug!("Effective settings: {:?}", command.config());

    let outcome = command.run(&provider, &storage, &ConsoleNotifier).await?;

    if let SplitOutcome::Completed(result) = &outcome {
        for path in &result.written_paths {
            info!("  - {}", path);
        }
        for failure in &result.failures {
            error!("  ✗ fragment {}: {}", failure.index + 1, failure.reason);
        }
    }

    Ok(())
}

async fn handle_preview_command(
    args: &PreviewArgs,
    vault: &Path,
    settings_path: &Path,
) -> anyhow::Result<()> {
    let config = effective_settings(settings_path, &args.overrides).await?;
    let note = note_path(vault, &args.note);

    let text = tokio::fs::read_to_string(&note)
        .await
        .with_context(|| format!("Failed to read {}", note.display()))?;
    let seed = chrono::Utc::now().timestamp_millis();
    let preview = preview_split(&text, &config, seed)?;

    println!("\n=== Preview for '{}' ===", note.display());
    println!("Delimiter: {:?}", preview.delimiter);
    println!("Metadata block: {}", if preview.had_metadata_block { "yes" } else { "no" });
    println!("Fragments: {}", preview.fragments.len());
    if let Some(notice) = preview.notice() {
        println!("{}", notice);
    }

    for fragment in &preview.fragments {
        println!(
            "  {}: {} ({} lines, {} bytes)",
            fragment.index + 1,
            fragment.file_name,
            fragment.lines,
            fragment.bytes
        );
        if args.detailed {
            for line in fragment.content.lines() {
                println!("      | {}", line);
            }
        }
    }

    if let Some(json_path) = &args.json_output {
        let json_content = serde_json::to_string_pretty(&preview)
            .context("Failed to serialize preview")?;

        tokio::fs::write(json_path, json_content)
            .await
            .context("Failed to write JSON preview file")?;

        info!("Preview written to: {}", json_path.display());
    }

    Ok(())
}

async fn handle_config_show(settings_path: &Path) -> anyhow::Result<()> {
    let config = effective_settings(settings_path, &SettingsArgs::default()).await?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

async fn handle_config_set(args: &SettingsArgs, settings_path: &Path) -> anyhow::Result<()> {
    if args.is_empty() {
        anyhow::bail!("Nothing to change. Pass at least one setting to update.");
    }

    let config = effective_settings(settings_path, args).await?;
    save_settings(settings_path, &config)
        .await
        .with_context(|| format!("Failed to save settings to {}", settings_path.display()))?;

    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
