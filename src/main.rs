use std::path::PathBuf;
use std::str::FromStr;

use clap::{Parser, Subcommand};
use pagebuilder::config::BuilderConfig;
use pagebuilder::dnd::{self, DropTarget};
use pagebuilder::doc::{Command as DocCommand, DocError, Document, Violation};
use pagebuilder::engine::Builder;
use pagebuilder::factory;
use pagebuilder::persistence::{FileStorage, LayoutStore, PersistenceError};
use pagebuilder::widget::{LeafKind, ShapeError};
use serde::Serialize;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Doc(#[from] DocError),
    #[error(transparent)]
    Shape(#[from] ShapeError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown widget type or column preset: {0}")]
    UnknownPalette(String),
    #[error("layout has no row at index {0}")]
    NoSuchRow(usize),
    #[error("layout {name:?} breaks {count} document invariant(s)")]
    Invariants { name: String, count: usize },
}

#[derive(Parser, Debug)]
#[command(name = "pagebuilder", about = "Compose and inspect saved page layouts")]
struct Cli {
    /// Directory holding the saved layouts.
    #[arg(long, env = "PAGEBUILDER_STORE_DIR")]
    store_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List saved layouts.
    Layouts,
    /// Print a saved layout as JSON.
    Show { name: String },
    /// Save a new layout made of one row per column preset or layout descriptor.
    New {
        name: String,
        #[arg(required = true)]
        layouts: Vec<String>,
    },
    /// Drop a payload onto a saved layout and save it back.
    Drop {
        name: String,
        /// Raw payload JSON, a widget type (`text`, `button`, ...) or a column preset.
        payload: String,
        /// Target row index; omit to drop on the canvas.
        #[arg(long)]
        row: Option<usize>,
        #[arg(long, default_value_t = 0)]
        column: usize,
    },
    /// Print the drag payload of a palette entry.
    Palette { entry: String },
    /// Report invariant violations of a saved layout.
    Check { name: String },
}

fn main() -> Result<(), CliError> {
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();
    let mut config = BuilderConfig::from_env();
    if let Some(dir) = cli.store_dir {
        config.store_dir = dir;
    }
    init_tracing(&config);
    if let Err(e) = dotenv {
        if !e.not_found() {
            warn!(error = %e, "failed to load .env");
        }
    }
    debug!(store_dir = %config.store_dir.display(), key = %config.storage_key, "config loaded");

    match cli.command {
        Command::Layouts => run_layouts(&config),
        Command::Show { name } => run_show(&config, &name),
        Command::New { name, layouts } => run_new(&config, &name, &layouts),
        Command::Drop { name, payload, row, column } => run_drop(&config, &name, &payload, row, column),
        Command::Palette { entry } => {
            println!("{}", palette_payload(&entry)?);
            Ok(())
        }
        Command::Check { name } => run_check(&config, &name),
    }
}

fn init_tracing(config: &BuilderConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn open_store(config: &BuilderConfig) -> Result<LayoutStore<FileStorage>, CliError> {
    Ok(LayoutStore::open_with_key(config.storage(), &config.storage_key)?)
}

fn run_layouts(config: &BuilderConfig) -> Result<(), CliError> {
    let store = open_store(config)?;
    for summary in store.list() {
        println!("{}\t{}", summary.id, summary.name);
    }
    Ok(())
}

fn run_show(config: &BuilderConfig, name: &str) -> Result<(), CliError> {
    let store = open_store(config)?;
    let layout = store
        .get(name)
        .ok_or_else(|| PersistenceError::NotFound(name.to_owned()))?;
    print_json(layout)
}

fn run_new(config: &BuilderConfig, name: &str, layouts: &[String]) -> Result<(), CliError> {
    let mut store = open_store(config)?;
    let mut builder = Builder::new();
    for layout in layouts {
        match factory::find_preset(layout) {
            Some(preset) => builder.add_row(&preset)?,
            None => builder
                .doc
                .apply(DocCommand::InsertRow(factory::create_column_row(layout)?))?,
        };
    }
    let id = builder.save_layout(&mut store, name)?;
    println!("{id}\t{name}");
    Ok(())
}

fn run_drop(config: &BuilderConfig, name: &str, payload: &str, row: Option<usize>, column: usize) -> Result<(), CliError> {
    let mut store = open_store(config)?;
    let mut builder = Builder::new();
    if store.get(name).is_some() {
        builder.load_layout(&store, name)?;
    }
    let target = match row {
        Some(index) => {
            let row = builder.doc.rows().get(index).ok_or(CliError::NoSuchRow(index))?;
            DropTarget::Column { row: row.id.clone(), column }
        }
        None => DropTarget::Canvas,
    };
    let raw = if payload.trim_start().starts_with('{') { payload.to_owned() } else { palette_payload(payload)? };
    let action = builder.drop_payload(&raw, &target)?;
    debug!(?action, "drop applied");
    builder.save_layout(&mut store, name)?;
    print_json(&builder.doc)
}

fn run_check(config: &BuilderConfig, name: &str) -> Result<(), CliError> {
    let store = open_store(config)?;
    let doc: Document = store.load(name)?;
    let mut broken = 0;
    for violation in doc.violations() {
        match violation {
            Violation::WidthGap { id, sum } => println!("width gap\t{id}\tcolumns fill {sum} of 12 units"),
            Violation::DuplicateId(id) => {
                broken += 1;
                println!("duplicate id\t{id}");
            }
            Violation::OutOfOrder { id, y, index } => {
                broken += 1;
                println!("out of order\t{id}\ty={y} at index {index}");
            }
        }
    }
    if broken > 0 {
        return Err(CliError::Invariants { name: name.to_owned(), count: broken });
    }
    println!("ok\t{name}\t{} rows", doc.len());
    Ok(())
}

/// Payload for a widget type name or a column preset key.
fn palette_payload(entry: &str) -> Result<String, CliError> {
    if let Ok(kind) = LeafKind::from_str(entry) {
        return Ok(dnd::palette_leaf(kind)?);
    }
    let preset = factory::find_preset(entry).ok_or_else(|| CliError::UnknownPalette(entry.to_owned()))?;
    Ok(dnd::palette_row(&preset)?)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
