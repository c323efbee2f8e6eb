use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use redline_config::EngineConfig;
use redline_core::{
    DiffAction, DiffController, DispatchOutcome, Document, SuggestionId, TextRange,
};
use redline_mod_history::SnapshotStore;

/// Propose AI rewrites of a span inline, then accept, reject, or close them.
#[derive(Parser, Debug)]
#[command(name = "redline", version, about)]
struct Cli {
    /// Config file (default: platform config dir, or `REDLINE_CONFIG`).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Mount an AI response over a span of a file and optionally resolve it.
    Suggest(SuggestArgs),
    /// Inspect or step through a file's snapshot history.
    History(HistoryArgs),
}

#[derive(Args, Debug)]
struct SuggestArgs {
    /// File to edit.
    file: PathBuf,

    /// Exact text to select in the file.
    #[arg(long)]
    select: String,

    /// Which occurrence of the selected text to use, 1-based.
    #[arg(long, default_value_t = 1)]
    nth: usize,

    /// File holding the raw AI response, or `-` for stdin.
    #[arg(long)]
    response: String,

    /// Accept suggestion N (1-based).
    #[arg(long, conflicts_with_all = ["reject", "close"])]
    accept: Option<usize>,

    /// Reject all suggestions.
    #[arg(long, conflicts_with = "close")]
    reject: bool,

    /// Close the diff without judgment.
    #[arg(long)]
    close: bool,

    /// Write the resolved content back to the file.
    #[arg(long)]
    write: bool,

    /// Print the fragment as JSON instead of text.
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct HistoryArgs {
    /// File whose history to show.
    file: PathBuf,

    /// Step back one snapshot and write it to the file.
    #[arg(long, conflicts_with_all = ["redo", "clear"])]
    undo: bool,

    /// Step forward one snapshot and write it to the file.
    #[arg(long, conflicts_with = "clear")]
    redo: bool,

    /// Delete the stored history for the file.
    #[arg(long)]
    clear: bool,
}

impl SuggestArgs {
    fn action(&self) -> Result<Option<DiffAction>> {
        if let Some(n) = self.accept {
            if n == 0 {
                bail!("suggestions are numbered from 1");
            }
            return Ok(Some(DiffAction::Accept(SuggestionId(n - 1))));
        }
        if self.reject {
            return Ok(Some(DiffAction::Reject));
        }
        if self.close {
            return Ok(Some(DiffAction::Close));
        }
        Ok(None)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(EngineConfig::config_path);
    let config = EngineConfig::load_or_create(&config_path);

    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_filter)),
        )
        .init();

    tracing::debug!("Using config at {}", config_path.display());

    match cli.command {
        Command::Suggest(args) => run_suggest(&config, &args),
        Command::History(args) => run_history(&config, &args),
    }
}

fn open_document(config: &EngineConfig, path: &Path) -> Result<Document> {
    let history = config.history_config();
    let store = SnapshotStore::open(&history.data_dir)
        .with_context(|| format!("failed to open history at {}", history.data_dir.display()))?;
    Document::open_with_store(path, store, &history)
}

fn run_suggest(config: &EngineConfig, args: &SuggestArgs) -> Result<()> {
    let action = args.action()?;
    if args.write && action.is_none() {
        bail!("--write needs --accept, --reject or --close");
    }

    let mut doc = open_document(config, &args.file)?;
    let range = find_occurrence(&doc.text(), &args.select, args.nth)
        .with_context(|| format!("occurrence {} of {:?} not found", args.nth, args.select))?;
    doc.select_range(range)?;

    let response = read_response(&args.response)?;
    let mut controller = DiffController::new(config.diff_options())
        .on_accept(|text, id| tracing::info!(diff_id = %id, "accepted: {text}"))
        .on_reject(|id| tracing::info!(diff_id = %id, "rejected"))
        .on_close(|id| tracing::info!(diff_id = %id, "closed"));

    let id = controller
        .insert_diff_at_selection(&mut doc, &response)
        .context("the response produced no diff")?;

    let Some(action) = action else {
        if args.json {
            let fragment = controller
                .fragment(&id)
                .context("diff session disappeared")?;
            println!("{}", serde_json::to_string_pretty(&fragment)?);
        } else {
            print!("{}", doc.text());
        }
        return Ok(());
    };

    match controller.dispatch(&mut doc, &id, action) {
        DispatchOutcome::Ignored => bail!("no such suggestion"),
        outcome => tracing::debug!(?outcome, "diff resolved"),
    }

    if args.write {
        doc.save()?;
        doc.flush_history()?;
        tracing::info!("Wrote {}", args.file.display());
    } else {
        print!("{}", doc.text());
    }
    Ok(())
}

fn run_history(config: &EngineConfig, args: &HistoryArgs) -> Result<()> {
    let mut doc = open_document(config, &args.file)?;

    if args.clear {
        doc.delete_history()?;
        tracing::info!("Cleared history for {}", args.file.display());
        return Ok(());
    }

    let moved = if args.undo {
        doc.undo()
    } else if args.redo {
        doc.redo()
    } else {
        false
    };
    if (args.undo || args.redo) && !moved {
        bail!("nothing to {}", if args.undo { "undo" } else { "redo" });
    }
    if moved {
        doc.save()?;
    }
    // Also persists the snapshot taken on open if the file changed outside.
    doc.flush_history()?;

    for (i, entry) in doc.history.entries().iter().enumerate() {
        let marker = if i == doc.history.cursor() { '*' } else { ' ' };
        let when = chrono::DateTime::from_timestamp_millis(entry.timestamp)
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());
        let preview = entry.content.lines().next().unwrap_or("");
        println!("{marker} {i:>3}  {when}  {}", truncate(preview, 60));
    }
    Ok(())
}

/// Char range of the `nth` (1-based) occurrence of `needle` in `text`.
fn find_occurrence(text: &str, needle: &str, nth: usize) -> Option<TextRange> {
    if needle.is_empty() || nth == 0 {
        return None;
    }
    let (byte, _) = text.match_indices(needle).nth(nth - 1)?;
    let start = text[..byte].chars().count();
    Some(TextRange::new(start, start + needle.chars().count()))
}

fn read_response(source: &str) -> Result<String> {
    if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read response from stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(source)
            .with_context(|| format!("failed to read response file: {source}"))
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((byte, _)) => format!("{}…", &s[..byte]),
        None => s.to_string(),
    }
}
