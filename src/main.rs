use clap::Parser;
use desktidy::cli::{OrganizeCommand, run_cli_with_config};
use desktidy::output::OutputFormatter;
use std::path::PathBuf;

/// Organize a cluttered directory into category subfolders.
#[derive(Parser)]
#[command(name = "desktidy", version, about)]
struct Cli {
    /// Directory to organize
    #[arg(short, long, default_value = "~/Desktop")]
    source: String,

    /// Show planned moves without touching any files
    #[arg(long)]
    dry_run: bool,

    /// Revert the moves recorded in the sidecar log
    #[arg(long)]
    undo: bool,

    /// Preview the plan; always simulates, regardless of --dry-run
    #[arg(long)]
    preview: bool,

    /// Path to a filter-rules file
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    let source = expand_tilde(&cli.source);

    // Undo wins when combined with the other flags.
    let command = if cli.undo {
        OrganizeCommand::Undo
    } else {
        OrganizeCommand::Organize {
            dry_run: cli.dry_run || cli.preview,
        }
    };

    // Failures are reported, never signaled through the exit code.
    if let Err(e) = run_cli_with_config(command, &source, cli.config.as_deref()) {
        OutputFormatter::error(&e);
    }
}

fn expand_tilde(raw: &str) -> PathBuf {
    if raw == "~"
        && let Ok(home) = std::env::var("HOME")
    {
        return PathBuf::from(home);
    }
    if let Some(rest) = raw.strip_prefix("~/")
        && let Ok(home) = std::env::var("HOME")
    {
        return PathBuf::from(home).join(rest);
    }
    PathBuf::from(raw)
}
