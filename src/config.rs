//! Configuration loading with env-var overrides.
//!
//! Reads `config/default.toml` (or an explicit path), then applies
//! `KB_INDEX_LOAD_PATH`, `KB_INDEX_SAVE_PATH` and `KB_INDEX_LOG_LEVEL`.
//! Every section is optional; a missing default file falls back to built-in
//! values.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::error::AppError;
use crate::logger;
use crate::store::{
    ArtifactNames, DEFAULT_DESCR_INDEX_FILE, DEFAULT_RANKING_INDEX_FILE, DEFAULT_WORD_INDEX_FILE,
};

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";
const DEFAULT_DATA_DIR: &str = "~/.kb-entity-index/wikidata_rus";

/// Fully-resolved configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the dump chunks (already expanded, no `~`).
    pub load_path: PathBuf,
    /// Directory the artifacts are written to (already expanded, no `~`).
    pub save_path: PathBuf,
    pub artifacts: ArtifactNames,
    /// Word-per-line stopword list replacing the built-in one.
    pub stopwords_path: Option<PathBuf>,
    pub log_level: String,
}

/// Values that beat the TOML file. Tests build this directly instead of
/// mutating env vars.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub load_path: Option<String>,
    pub save_path: Option<String>,
    pub log_level: Option<String>,
}

impl Overrides {
    pub fn from_env() -> Self {
        Self {
            load_path: env::var("KB_INDEX_LOAD_PATH").ok(),
            save_path: env::var("KB_INDEX_SAVE_PATH").ok(),
            log_level: env::var("KB_INDEX_LOG_LEVEL").ok(),
        }
    }
}

/// Raw TOML shape, the `serde` target before resolution.
#[derive(Deserialize, Default)]
struct RawConfig {
    #[serde(default)]
    paths: RawPaths,
    #[serde(default)]
    artifacts: RawArtifacts,
    #[serde(default)]
    lexicon: RawLexicon,
    #[serde(default)]
    logging: RawLogging,
}

#[derive(Deserialize)]
struct RawPaths {
    #[serde(default = "default_data_dir")]
    load_path: String,
    #[serde(default = "default_data_dir")]
    save_path: String,
}

impl Default for RawPaths {
    fn default() -> Self {
        Self { load_path: default_data_dir(), save_path: default_data_dir() }
    }
}

#[derive(Deserialize)]
struct RawArtifacts {
    #[serde(default = "default_word_index")]
    word_index: String,
    #[serde(default = "default_ranking_index")]
    ranking_index: String,
    #[serde(default = "default_descr_index")]
    descr_index: String,
}

impl Default for RawArtifacts {
    fn default() -> Self {
        Self {
            word_index: default_word_index(),
            ranking_index: default_ranking_index(),
            descr_index: default_descr_index(),
        }
    }
}

#[derive(Deserialize, Default)]
struct RawLexicon {
    stopwords_path: Option<String>,
}

#[derive(Deserialize)]
struct RawLogging {
    #[serde(default = "default_log_level")]
    log_level: String,
}

impl Default for RawLogging {
    fn default() -> Self {
        Self { log_level: default_log_level() }
    }
}

fn default_data_dir() -> String { DEFAULT_DATA_DIR.to_string() }
fn default_word_index() -> String { DEFAULT_WORD_INDEX_FILE.to_string() }
fn default_ranking_index() -> String { DEFAULT_RANKING_INDEX_FILE.to_string() }
fn default_descr_index() -> String { DEFAULT_DESCR_INDEX_FILE.to_string() }
fn default_log_level() -> String { "info".to_string() }

/// Load config from `config_path`, or `config/default.toml` when it exists,
/// then apply env-var overrides.
pub fn load(config_path: Option<&str>) -> Result<Config, AppError> {
    let overrides = Overrides::from_env();
    if let Some(path) = config_path {
        return load_from(Path::new(path), &overrides);
    }
    let default_path = Path::new(DEFAULT_CONFIG_PATH);
    if default_path.exists() {
        load_from(default_path, &overrides)
    } else {
        resolve(RawConfig::default(), &overrides)
    }
}

/// Internal loader; accepts an explicit path and overrides.
pub fn load_from(path: &Path, overrides: &Overrides) -> Result<Config, AppError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;

    let parsed: RawConfig = toml::from_str(&raw)
        .map_err(|e| AppError::Config(format!("parse error in {}: {e}", path.display())))?;

    resolve(parsed, overrides)
}

/// Apply overrides and check the log level. A bad level is a config error,
/// reported before the logger exists.
fn resolve(parsed: RawConfig, overrides: &Overrides) -> Result<Config, AppError> {
    let load_path = overrides.load_path.as_deref().unwrap_or(&parsed.paths.load_path);
    let save_path = overrides.save_path.as_deref().unwrap_or(&parsed.paths.save_path);
    let log_level = overrides.log_level.as_deref().unwrap_or(&parsed.logging.log_level);
    logger::parse_level(log_level)
        .map_err(|_| AppError::Config(format!("unrecognised log level: '{log_level}'")))?;

    Ok(Config {
        load_path: expand_home(load_path),
        save_path: expand_home(save_path),
        artifacts: ArtifactNames {
            word_index: parsed.artifacts.word_index,
            ranking_index: parsed.artifacts.ranking_index,
            descr_index: parsed.artifacts.descr_index,
        },
        stopwords_path: parsed.lexicon.stopwords_path.as_deref().map(expand_home),
        log_level: log_level.to_string(),
    })
}

/// Expand a leading `~` to the user's home directory.
/// Absolute or relative paths without `~` are returned unchanged.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}
