use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};

use crate::config::FilterConfig;
use crate::grid::{FilterGrid, GridColumn, GridHost, GridView};
use crate::localization::{EnglishTranslator, TableTranslator, Translator};
use crate::logging;
use crate::models::{FieldType, JsonRow};
use crate::popup::{Popup, SearchMode};
use crate::presets::{PresetEntry, load_presets, preset_path, save_presets};
use crate::tree::DateTree;
use crate::utils::{read_json_file, sanitize_label};

#[derive(Parser)]
#[command(name = "grid-filter")]
#[command(version = "0.1.0")]
#[command(about = "Excel-style column filters over JSON row files", long_about = None)]
pub struct Cli {
    /// Log verbosity (error, warn, info, debug, trace); RUST_LOG also applies
    #[arg(long, global = true)]
    pub log_level: Option<tracing::Level>,

    /// Config file to use instead of the one in the config directory
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// JSON translation table for popup strings, keyed by tag name
    #[arg(long, global = true)]
    pub locale: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show a column's filter popup: its candidate values and their checkbox state
    Distinct(DistinctArgs),
    /// Apply a saved preset and print the rows that remain visible
    Apply(ApplyArgs),
    /// Uncheck values in a column's popup, apply, and save the resulting preset
    Exclude(ExcludeArgs),
}

#[derive(Args)]
pub struct ColumnArgs {
    /// JSON file holding an array of row objects
    #[arg(long)]
    pub rows: PathBuf,

    #[arg(long)]
    pub field: String,

    /// Column type: text, boolean, enum, integer, real, date_time, date_only, time_of_day, duration
    #[arg(long = "type", default_value = "text")]
    pub field_type: FieldType,

    /// Preset applied before the popup opens: a file path, or the name of a saved preset
    #[arg(long)]
    pub preset: Option<PathBuf>,
}

#[derive(Args)]
pub struct DistinctArgs {
    #[command(flatten)]
    pub column: ColumnArgs,

    /// Popup search text
    #[arg(long)]
    pub search: Option<String>,

    /// Match the search text at the start of labels instead of anywhere
    #[arg(long)]
    pub starts_with: bool,
}

#[derive(Args)]
pub struct ApplyArgs {
    #[arg(long)]
    pub rows: PathBuf,

    /// Preset file path, or the name of a saved preset
    #[arg(long)]
    pub preset: PathBuf,
}

#[derive(Args)]
pub struct ExcludeArgs {
    #[command(flatten)]
    pub column: ColumnArgs,

    /// Popup label to uncheck; repeatable
    #[arg(long = "value", required = true)]
    pub values: Vec<String>,

    /// Where to write the resulting preset; a bare name saves it to the presets directory
    #[arg(long)]
    pub output: PathBuf,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_level)?;

    let config = match &cli.config {
        Some(path) => FilterConfig::load(path)?,
        None => FilterConfig::load_default()?,
    };
    let translator: Arc<dyn Translator> = match &cli.locale {
        Some(path) => Arc::new(TableTranslator::from_file(path).context("Failed to load locale table")?),
        None => Arc::new(EnglishTranslator),
    };
    let setup = Setup { config, translator };

    match &cli.command {
        Some(Commands::Distinct(args)) => {
            show_distinct(args, setup)?;
        }
        Some(Commands::Apply(args)) => {
            apply_preset(args, setup)?;
        }
        Some(Commands::Exclude(args)) => {
            exclude_values(args, setup)?;
        }
        None => {
            println!("Use --help for usage information");
        }
    }

    Ok(())
}

type JsonGrid = FilterGrid<JsonRow>;

/// Settings every command builds its grid with
struct Setup {
    config: FilterConfig,
    translator: Arc<dyn Translator>,
}

/// A preset argument without directory or extension names a preset in the presets directory
fn preset_location(arg: &Path) -> Result<PathBuf> {
    let is_name = arg.extension().is_none() && arg.parent().is_none_or(|p| p.as_os_str().is_empty());
    match arg.to_str() {
        Some(name) if is_name => preset_path(name),
        _ => Ok(arg.to_path_buf()),
    }
}

fn load_rows(path: &Path) -> Result<Vec<JsonRow>> {
    read_json_file(path).context("Failed to load rows file")
}

/// Grid with one column per preset entry plus the requested one
fn build_grid(
    rows: Vec<JsonRow>,
    column: Option<(&str, FieldType)>,
    presets: &[PresetEntry],
    setup: Setup,
) -> JsonGrid {
    let mut columns: Vec<GridColumn> = Vec::new();
    let requested = column.map(|(name, field_type)| GridColumn::new(name, field_type));
    let from_presets = presets.iter().map(|e| GridColumn::new(e.field_name.as_str(), e.field_type));

    for col in requested.into_iter().chain(from_presets) {
        if !columns.iter().any(|c| c.field_name == col.field_name) {
            columns.push(col);
        }
    }

    let view = GridView::new(rows, columns).with_parallel_threshold(setup.config.parallel_sort_threshold);
    FilterGrid::with_translator(view, setup.config, setup.translator)
}

/// Build the grid for a column command, restore its preset and open the column's popup
fn open_column(args: &ColumnArgs, setup: Setup) -> Result<JsonGrid> {
    let rows = load_rows(&args.rows)?;
    let presets = match &args.preset {
        Some(arg) => load_presets(&preset_location(arg)?)?,
        None => Vec::new(),
    };

    let mut grid = build_grid(rows, Some((args.field.as_str(), args.field_type)), &presets, setup);
    grid.restore(&presets)?;
    if !grid.open_popup(&args.field)? {
        bail!("No such column: {}", args.field);
    }
    Ok(grid)
}

fn show_distinct(args: &DistinctArgs, setup: Setup) -> Result<()> {
    let mut grid = open_column(&args.column, setup)?;

    let starts_with = grid.popup().is_some_and(|p| p.search().mode() == SearchMode::StartsWith);
    if args.starts_with && !starts_with {
        grid.toggle_search_mode()?;
    }
    if let Some(search) = &args.search {
        grid.set_search_text(search)?;
    }

    let Some(popup) = grid.popup() else {
        bail!("Filter popup did not open");
    };
    match popup.tree() {
        Some(tree) => print_tree(tree),
        None => print_list(popup),
    }
    if let Some(status) = grid.status_line() {
        println!();
        println!("{}", status);
    }
    Ok(())
}

fn checkbox(state: Option<bool>) -> &'static str {
    match state {
        Some(true) => "[x]",
        Some(false) => "[ ]",
        None => "[-]",
    }
}

fn print_list(popup: &Popup) {
    for item in popup.list().visible_items() {
        println!("{} {}", checkbox(Some(item.is_checked())), sanitize_label(&item.label));
    }
}

fn print_tree(tree: &DateTree) {
    for (depth, id) in tree.walk() {
        let Some(node) = tree.node(id) else {
            continue;
        };
        let indent = "  ".repeat(depth);
        println!("{}{} {}", indent, checkbox(node.is_checked()), sanitize_label(&node.label));
    }
}

fn apply_preset(args: &ApplyArgs, setup: Setup) -> Result<()> {
    let rows = load_rows(&args.rows)?;
    let presets = load_presets(&preset_location(&args.preset)?)?;

    let mut grid = build_grid(rows, None, &presets, setup);
    let restored = grid.restore(&presets)?;

    let view = grid.grid();
    println!("Filters applied: {}", restored);
    println!("Visible rows: {} / {}", view.visible_count(), view.len());
    for row in view.visible_rows() {
        println!("{}", serde_json::to_string(row).context("Failed to serialize row")?);
    }
    Ok(())
}

fn exclude_values(args: &ExcludeArgs, setup: Setup) -> Result<()> {
    let mut grid = open_column(&args.column, setup)?;

    let Some(popup) = grid.popup() else {
        bail!("Filter popup did not open");
    };
    let mut targets = Vec::new();
    for value in &args.values {
        let idx = popup
            .items()
            .iter()
            .position(|item| !item.is_select_all() && &item.label == value)
            .with_context(|| format!("Value not found in column {}: {}", args.column.field, value))?;
        targets.push(idx);
    }

    for idx in targets {
        grid.set_item_checked(idx, false)?;
    }
    grid.apply()?;

    let output = preset_location(&args.output)?;
    let snapshot = grid.snapshot();
    save_presets(&output, &snapshot)?;
    println!(
        "Saved {} filter(s) to {}, {} of {} rows visible",
        snapshot.len(),
        output.display(),
        grid.grid().visible_indices().len(),
        grid.grid().len()
    );
    Ok(())
}
