//! Command-line shell for the drug name matcher.
//!
//! Usage:
//!   dawaa match orders.xlsx --column "Item" --format xlsx
//!   dawaa search "panadol extra" --limit 10
//!   dawaa headers orders.csv
//!   dawaa --database data/druglist.json fields

use clap::{Parser, Subcommand};
use std::fs::{self, File};
use std::path::PathBuf;
use std::process::ExitCode;
use chrono::Local;
use env_logger::Builder;
use log::{info, error, LevelFilter};

use dawaa::{
    DawaaConfig, DrugNameParser, LiveSearch, MatchRequest, MatchingPipeline, OutputFormat,
    ProgressBarObserver, ReferenceStore, SheetSelector, TabularReader,
};
use dawaa::config::fields::FieldLabels;
use dawaa::types::{field_text, value_text};

/// Reference fields added to match output by default, when the label file lists them.
const DEFAULT_REFERENCE_FIELDS: &[&str] = &["price_retail", "barcode_primary", "active_ingredients"];

const DEFAULT_CONFIG: &str = "dawaa.ini";

#[derive(Parser)]
#[command(name = "dawaa")]
#[command(about = "Match drug names against a bilingual reference database")]
struct Args {
    /// INI configuration file (defaults to dawaa.ini when present)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Reference database, overriding [files] database_path
    #[arg(short = 'd', long)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Match every row of an input file and write matched_output_<timestamp>
    Match {
        input: PathBuf,

        /// Input column holding the drug name
        #[arg(long)]
        column: String,

        /// Input columns to keep (default: all)
        #[arg(long = "keep")]
        keep: Vec<String>,

        /// Reference fields to add from the matched record
        #[arg(long = "add")]
        add: Vec<String>,

        /// Output format: xlsx or json
        #[arg(short = 'f', long, default_value = "json")]
        format: String,

        /// Worksheet name or zero-based index
        #[arg(long)]
        sheet: Option<String>,
    },
    /// Interactive-style search, printed as tab-separated rows
    Search {
        query: String,

        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Reference fields to print (default: label file keys or all columns)
        #[arg(long = "columns")]
        columns: Vec<String>,
    },
    /// Print the column names of an input file
    Headers {
        input: PathBuf,

        #[arg(long)]
        sheet: Option<String>,
    },
    /// Print the worksheet names of a workbook
    Sheets {
        input: PathBuf,
    },
    /// Print the reference fields available for display
    Fields,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let mut config = match load_config(args.config.as_ref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(database) = &args.database {
        config.files.database_path = database.clone();
    }

    if let Err(e) = init_logging(&config) {
        eprintln!("Could not set up logging: {}", e);
        return ExitCode::FAILURE;
    }

    match run(args.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> dawaa::Result<DawaaConfig> {
    match path {
        Some(path) if !path.exists() => Err(dawaa::Error::MissingFile(path.clone())),
        Some(path) => DawaaConfig::from_ini(path),
        None => DawaaConfig::from_ini_or_default(DEFAULT_CONFIG),
    }
}

fn init_logging(config: &DawaaConfig) -> std::io::Result<()> {
    let log_level = config.logging.get_log_level();
    let mut builder = Builder::new();
    builder.filter(None, log_level);

    if config.logging.log_to_file {
        let timestamp = Local::now().format("%m_%d_%H_%M");
        fs::create_dir_all("logs")?;
        let log_file = File::create(format!("logs/dawaa_{}.log", timestamp))?;
        builder.target(env_logger::Target::Pipe(Box::new(log_file)));
    }
    builder.init();

    if log_level != LevelFilter::Off {
        info!("Starting dawaa with log level: {:?}", log_level);
    }
    Ok(())
}

fn run(command: Command, config: &DawaaConfig) -> dawaa::Result<()> {
    let reader = TabularReader::new(config.reader.clone());

    match command {
        Command::Match { input, column, keep, add, format, sheet } => {
            let store = open_store(config)?;
            let sheet = sheet.and_then(|s| s.parse::<SheetSelector>().ok());

            let keep_input_fields = if keep.is_empty() {
                reader.sheet_headers(&input, sheet.clone())?
            } else {
                keep
            };
            let keep_reference_fields = if add.is_empty() {
                default_reference_fields(config)
            } else {
                add
            };

            let request = MatchRequest {
                input_path: input,
                search_column: column,
                keep_input_fields,
                keep_reference_fields,
                output_format: format.parse::<OutputFormat>().unwrap_or_default(),
                sheet,
            };

            let observer = ProgressBarObserver::new();
            let pipeline = MatchingPipeline::new(&store, reader, config.matcher.clone());
            let outcome = pipeline.run(&request, &observer)?;
            observer.finish("Done");

            let summary = outcome.summary;
            println!("Results saved to: {}", outcome.output_path.display());
            println!(
                "{} rows: {} matched ({} by fallback), {} not found, {} empty",
                summary.rows, summary.matched, summary.matched_by_fallback, summary.no_match, summary.empty_queries
            );
        },
        Command::Search { query, limit, columns } => {
            let store = open_store(config)?;
            let reference = store.load()?;
            println!("Database Loaded: {} records", reference.len());

            let columns = if columns.is_empty() {
                FieldLabels::load(&config.files.field_labels_path).display_keys(reference.columns())
            } else {
                columns
            };
            let search = LiveSearch::new(&store, &config.matcher);
            let results = search.search(&query, limit.unwrap_or(config.matcher.live_limit));

            let mut header: Vec<&str> = columns.iter().map(String::as_str).collect();
            header.push("score");
            println!("{}", header.join("\t"));
            for result in results {
                let mut cells: Vec<String> = columns.iter().map(|c| field_text(&result.record, c)).collect();
                cells.push(format!("{:.2}", result.score));
                println!("{}", cells.join("\t"));
            }
        },
        Command::Headers { input, sheet } => {
            let sheet = sheet.and_then(|s| s.parse::<SheetSelector>().ok());
            for header in reader.sheet_headers(&input, sheet)? {
                println!("{}", header);
            }
        },
        Command::Sheets { input } => {
            for name in reader.sheet_names(&input) {
                println!("{}", name);
            }
        },
        Command::Fields => {
            let labels = FieldLabels::load(&config.files.field_labels_path);
            let store = open_store(config)?;
            let reference = store.load()?;
            for key in labels.display_keys(reference.columns()) {
                let sample = reference
                    .records()
                    .first()
                    .and_then(|r| r.get(&key))
                    .map(value_text)
                    .unwrap_or_default();
                println!("{}\t{}\t{}", key, labels.label_for(&key), sample);
            }
        },
    }
    Ok(())
}

fn open_store(config: &DawaaConfig) -> dawaa::Result<ReferenceStore> {
    let parser = DrugNameParser::with_stop_words_file(config.files.stop_words_file.as_ref())?;
    Ok(ReferenceStore::new(config.files.database_path.clone(), parser))
}

fn default_reference_fields(config: &DawaaConfig) -> Vec<String> {
    FieldLabels::load(&config.files.field_labels_path)
        .keys()
        .into_iter()
        .filter(|key| DEFAULT_REFERENCE_FIELDS.contains(&key.as_str()))
        .collect()
}
