use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use foundation::time::{Time, parse_timestamp};
use scene::Editor;
use tools::commands::{self, CropWindow};
use tools::config::EditorConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Edit geospatial feature documents")]
struct Cli {
    /// Maximum undo depth (overrides ATLAS_HISTORY_LIMIT)
    #[arg(long, global = true)]
    history_limit: Option<usize>,

    /// Step used by aligned crops, e.g. 00h30m (overrides ATLAS_STEP)
    #[arg(long, global = true)]
    step: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct Target {
    /// GeoJSON FeatureCollection to edit
    document: PathBuf,

    /// Where to write the result (default: edit in place)
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print counts, bounds and the feature list
    Summary {
        document: PathBuf,
    },

    /// Crop every track to a time window
    Crop {
        #[command(flatten)]
        target: Target,

        /// Window start (RFC 3339)
        #[arg(long, requires = "end", conflicts_with = "at")]
        start: Option<String>,

        /// Window end (RFC 3339)
        #[arg(long, requires = "start")]
        end: Option<String>,

        /// One step starting at this instant, rounded down to the step
        #[arg(long)]
        at: Option<String>,
    },

    /// Add features from clipboard JSON (a Feature, FeatureCollection or array)
    Paste {
        #[command(flatten)]
        target: Target,

        /// Read the payload from this file instead of stdin
        #[arg(long)]
        from: Option<PathBuf>,
    },

    /// Append renamed copies of the listed features
    Duplicate {
        #[command(flatten)]
        target: Target,
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Remove the listed features
    Delete {
        #[command(flatten)]
        target: Target,
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Show exactly the listed features and hide the rest
    Show {
        #[command(flatten)]
        target: Target,
        ids: Vec<String>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = real_main() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main() -> Result<(), String> {
    let cli = Cli::parse();
    let config = EditorConfig::from_env()?.with_overrides(cli.history_limit, cli.step);

    match cli.command {
        Command::Summary { document } => {
            let editor = open(&document, &config)?;
            print!("{}", commands::summary(&editor, &config.step)?);
            Ok(())
        }
        Command::Crop {
            target,
            start,
            end,
            at,
        } => {
            let window = match (start, end, at) {
                (Some(start), Some(end), None) => CropWindow::Between {
                    start: timestamp_arg("--start", &start)?,
                    end: timestamp_arg("--end", &end)?,
                },
                (None, None, Some(at)) => CropWindow::Aligned {
                    at: timestamp_arg("--at", &at)?,
                },
                _ => return Err("crop needs --start and --end, or --at".to_string()),
            };
            edit(&target, &config, |editor| {
                commands::crop(editor, window, &config.step)
            })
        }
        Command::Paste { target, from } => {
            let text = match from {
                Some(path) => fs::read_to_string(&path).map_err(|e| format!("read {path:?}: {e}"))?,
                None => {
                    let mut buf = String::new();
                    std::io::stdin()
                        .read_to_string(&mut buf)
                        .map_err(|e| format!("read stdin: {e}"))?;
                    buf
                }
            };
            edit(&target, &config, |editor| commands::paste(editor, &text))
        }
        Command::Duplicate { target, ids } => {
            edit(&target, &config, |editor| commands::duplicate(editor, ids))
        }
        Command::Delete { target, ids } => {
            edit(&target, &config, |editor| commands::delete(editor, ids))
        }
        Command::Show { target, ids } => {
            edit(&target, &config, |editor| commands::show(editor, ids))
        }
    }
}

fn timestamp_arg(flag: &str, raw: &str) -> Result<Time, String> {
    parse_timestamp(raw).ok_or_else(|| format!("{flag}: not an RFC 3339 timestamp: {raw}"))
}

fn open(path: &Path, config: &EditorConfig) -> Result<Editor, String> {
    let document = formats::load_document(path).map_err(|e| format!("load {path:?}: {e}"))?;
    info!(path = %path.display(), features = document.collection.len(), "loaded document");
    let mut editor = Editor::new(config.history());
    editor.load(document);
    Ok(editor)
}

fn edit(
    target: &Target,
    config: &EditorConfig,
    change: impl FnOnce(&mut Editor) -> Result<String, String>,
) -> Result<(), String> {
    let mut editor = open(&target.document, config)?;
    let description = change(&mut editor)?;

    let out = target.out.as_deref().unwrap_or(target.document.as_path());
    formats::save_document(out, editor.document()).map_err(|e| format!("save {out:?}: {e}"))?;
    info!(path = %out.display(), features = editor.store().features().len(), "saved document");
    println!("{description}");
    Ok(())
}
