//! kb-entity-index: builds the entity label indexes from a dump directory.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Parse CLI flags
//!   3. Load config, apply env + flag overrides
//!   4. Init logger at configured level
//!   5. Load chunks → build indexes → save artifacts
//!
//! ```text
//! kb-entity-index [--config <path>] [--load <dir>] [--save <dir>]
//! ```

use std::process;

use tracing::info;

use kb_entity_index::builder::IndexBuilder;
use kb_entity_index::config::{self, expand_home};
use kb_entity_index::error::AppError;
use kb_entity_index::lexicon::Lexicon;
use kb_entity_index::{logger, store};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

// ── CLI arg parsing ────────────────────────────────────────────────────────

#[derive(Default)]
struct Args {
    config: Option<String>,
    load: Option<String>,
    save: Option<String>,
}

fn parse_args() -> Result<Args, AppError> {
    let mut args = Args::default();
    let mut iter = std::env::args().skip(1);

    while let Some(arg) = iter.next() {
        let slot = match arg.as_str() {
            "--config" | "-c" => &mut args.config,
            "--load" | "-l" => &mut args.load,
            "--save" | "-s" => &mut args.save,
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            other => return Err(AppError::Config(format!("unknown argument: {other}"))),
        };
        match iter.next() {
            Some(value) => *slot = Some(value),
            None => return Err(AppError::Config(format!("{arg} needs a value"))),
        }
    }

    Ok(args)
}

fn print_help() {
    eprintln!("usage: kb-entity-index [--config <path>] [--load <dir>] [--save <dir>]");
    eprintln!();
    eprintln!("flags:");
    eprintln!("  --config, -c <path>   config file (default: config/default.toml)");
    eprintln!("  --load,   -l <dir>    directory of dump chunks");
    eprintln!("  --save,   -s <dir>    directory to write the indexes to");
    eprintln!("  --help,   -h          print this help");
    eprintln!();
    eprintln!("env overrides: KB_INDEX_LOAD_PATH, KB_INDEX_SAVE_PATH, KB_INDEX_LOG_LEVEL");
}

fn run() -> Result<(), AppError> {
    // .env is optional.
    let _ = dotenvy::dotenv();

    let args = parse_args()?;
    let mut config = config::load(args.config.as_deref())?;
    if let Some(load) = args.load.as_deref() {
        config.load_path = expand_home(load);
    }
    if let Some(save) = args.save.as_deref() {
        config.save_path = expand_home(save);
    }

    logger::init(&config.log_level)?;

    info!(
        load_path = %config.load_path.display(),
        save_path = %config.save_path.display(),
        log_level = %config.log_level,
        "config loaded"
    );

    let lexicon = match &config.stopwords_path {
        Some(path) => Lexicon::russian().with_stopwords_file(path)?,
        None => Lexicon::russian(),
    };

    let entities = store::load_entities(&config.load_path)?;
    let indexes = IndexBuilder::new(lexicon).build(&entities);
    let saved = store::save_indexes(&config.save_path, &config.artifacts, &indexes)?;

    println!(
        "✓ Indexed {} entities: {} words → {}",
        indexes.stats.entities,
        indexes.stats.words,
        saved.word_index.display()
    );
    Ok(())
}
