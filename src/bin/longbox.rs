//! Longbox CLI binary.

use std::fs::File;
use std::path::PathBuf;
use std::process;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;
use longbox::core::catalog::parse_grade_mapping;
use longbox::core::submission::{BookSubmission, Submission};
use longbox::core::types::format_currency;
use longbox::index::inverted::SearchMode;
use longbox::index::totals::grand_total;
use longbox::ordering::series::{SeriesList, SeriesOrder};
use longbox::{Catalog, Config, Result};

/// Longbox - a comic collection catalog
#[derive(Parser, Debug)]
#[command(name = "longbox")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Args {
    /// Data directory; overrides the config file's storage path when given
    #[arg(short, long, env = "LONGBOX_DATA")]
    data_dir: Option<PathBuf>,

    /// JSON config file
    #[arg(short, long, value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Rebuild derived indexes before running the command
    #[arg(long)]
    repair: bool,

    /// Verbosity (-v info, -vv debug). RUST_LOG wins when set.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import a JSON array of comics
    Import { file: PathBuf },

    /// Upload one comic from a JSON submission (form field names)
    Upload { file: PathBuf },

    /// Add a copy to a comic already in the catalog
    #[command(name = "add-book")]
    AddBook {
        series_id: String,
        issue: String,
        cover_id: String,
        grade: String,
        value: String,
        #[arg(long)]
        signed: bool,
    },

    /// Remove every copy of a comic
    #[command(name = "clear-books")]
    ClearBooks { series_id: String, issue: String, cover_id: String },

    /// Delete a comic
    Delete { series_id: String, issue: String, cover_id: String },

    /// Search comic text
    Search {
        #[arg(required = true)]
        terms: Vec<String>,
        /// Match any term instead of all
        #[arg(long)]
        any: bool,
        #[arg(long, value_enum, default_value = "release")]
        order: OrderArg,
    },

    /// List the whole catalog, or one series by the path shown in listings
    Browse {
        series_path: Option<String>,
        #[arg(long, value_enum, default_value = "release")]
        order: OrderArg,
    },

    /// List comics that are not owned
    Missing {
        #[arg(long, value_enum, default_value = "release")]
        order: OrderArg,
    },

    /// Owned count and value per series
    Totals,

    /// Rebuild search, missing and totals indexes
    Reindex,

    /// Rewrite book grades
    #[command(name = "fix-grades")]
    FixGrades {
        #[arg(long, default_value = "GD:FN,VG:VF")]
        mapping: String,
    },

    /// Replace the stop word list (applies from the next open)
    #[command(name = "stop-words")]
    StopWords { words: Vec<String> },

    /// Catalog statistics
    Stats,

    /// Reclaim free space in the database file
    Compact,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum OrderArg {
    Release,
    Chron,
}

impl From<OrderArg> for SeriesOrder {
    fn from(order: OrderArg) -> Self {
        match order {
            OrderArg::Release => SeriesOrder::Release,
            OrderArg::Chron => SeriesOrder::Chronology,
        }
    }
}

fn main() {
    let args = Args::parse();

    let default_level = match args.verbose {
        0 => "longbox=warn",
        1 => "longbox=info",
        _ => "longbox=debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(args) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(dir) = &args.data_dir {
        config.storage_path = dir.clone();
    }
    config.repair_on_open |= args.repair;
    Ok(config)
}

fn run(args: Args) -> Result<()> {
    let config = load_config(&args)?;
    let mut catalog = Catalog::open(&config)?;

    match args.command {
        Command::Import { file } => {
            let count = catalog.import_json(File::open(file)?)?;
            println!("imported {} comics", count);
        }
        Command::Upload { file } => {
            let submission: Submission = serde_json::from_reader(File::open(file)?)?;
            match catalog.upload(&submission) {
                Ok(comic) => println!("comic uploaded successfully: {}", comic.key()),
                Err(e) => println!("{}", e.status()),
            }
        }
        Command::AddBook { series_id, issue, cover_id, grade, value, signed } => {
            let submission = BookSubmission { series_id, issue, cover_id, grade, value, signed };
            match catalog.add_book(&submission) {
                Ok(comic) => println!("{} now has {} copies", comic.key(), comic.books.len()),
                Err(e) => println!("{}", e.status()),
            }
        }
        Command::ClearBooks { series_id, issue, cover_id } => {
            let comic = catalog.clear_books(&series_id, &issue, &cover_id)?;
            println!("cleared copies of {}", comic.key());
        }
        Command::Delete { series_id, issue, cover_id } => {
            if catalog.delete(&series_id, &issue, &cover_id)? {
                println!("deleted");
            } else {
                println!("no such comic");
            }
        }
        Command::Search { terms, any, order } => {
            let mode = if any { SearchMode::Any } else { SearchMode::All };
            print_series(catalog.search_with(&terms.join(" "), mode)?, order.into());
        }
        Command::Browse { series_path, order } => {
            let list = match series_path {
                Some(path) => catalog.series(&path)?,
                None => catalog.browse()?,
            };
            print_series(list, order.into());
        }
        Command::Missing { order } => print_series(catalog.missing()?, order.into()),
        Command::Totals => {
            let totals = catalog.totals()?;
            for total in &totals {
                println!("{:<40} {:>6} {:>12}", total.series_id, total.count, total.format_value());
            }
            let (count, value) = grand_total(&totals);
            println!("{:<40} {:>6} {:>12}", "TOTAL", count, format_currency(value));
        }
        Command::Reindex => {
            let report = catalog.repair()?;
            println!(
                "reindexed {} comics: {} tokens, {} missing, {} series",
                report.comics, report.tokens, report.missing, report.series
            );
        }
        Command::FixGrades { mapping } => {
            let mapping = parse_grade_mapping(&mapping)?;
            println!("updated {} books", catalog.remap_grades(&mapping)?);
        }
        Command::StopWords { words } => {
            catalog.store_stop_words(&words)?;
            println!("stored {} stop words; run reindex to apply them to existing comics", words.len());
        }
        Command::Stats => {
            println!("{}", serde_json::to_string_pretty(&catalog.stats()?)?);
        }
        Command::Compact => {
            if catalog.compact()? {
                println!("compacted");
            } else {
                println!("nothing to compact");
            }
        }
    }
    Ok(())
}

fn print_series(list: SeriesList, order: SeriesOrder) {
    for bundle in list.bundles(order) {
        println!("{} ({}) [{}]", bundle.display_name, bundle.publisher, bundle.path);
        for comic in &bundle.comics {
            let owned = match comic.best() {
                Some(book) => format!("{} {}", book.grade, book.format_value()),
                None => "missing".to_string(),
            };
            println!(
                "  #{:<6} {:<10} {}  {}  [{}]",
                comic.format_issue(),
                comic.cover_id,
                comic.format_date(),
                comic.title,
                owned
            );
        }
    }
}
