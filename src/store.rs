//! Dump loading and artifact persistence.
//!
//! ## Layout
//! ```text
//! {load_path}/                  # every regular file is one dump chunk
//! ├── chunk_000.json
//! └── chunk_001.json
//!
//! {save_path}/
//! ├── word_to_idlist_rus.json           # WordIndex
//! ├── entities_ranking_dict_rus.json    # RankingIndex
//! └── q_to_descr_ru.json                # DescriptionIndex
//! ```
//!
//! Chunks are read in file-name order and merged; a later chunk overwrites an
//! earlier one on entity-ID collision. The label index is never written.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::builder::{DescriptionIndex, EntityIndexes, RankingIndex, WordIndex};
use crate::error::AppError;
use crate::record::{EntityMap, EntityRecord};

pub const DEFAULT_WORD_INDEX_FILE: &str = "word_to_idlist_rus.json";
pub const DEFAULT_RANKING_INDEX_FILE: &str = "entities_ranking_dict_rus.json";
pub const DEFAULT_DESCR_INDEX_FILE: &str = "q_to_descr_ru.json";

/// File names of the three persisted artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactNames {
    pub word_index: String,
    pub ranking_index: String,
    pub descr_index: String,
}

impl Default for ArtifactNames {
    fn default() -> Self {
        Self {
            word_index: DEFAULT_WORD_INDEX_FILE.to_string(),
            ranking_index: DEFAULT_RANKING_INDEX_FILE.to_string(),
            descr_index: DEFAULT_DESCR_INDEX_FILE.to_string(),
        }
    }
}

/// Paths the artifacts were written to.
#[derive(Debug, Clone)]
pub struct SavedArtifacts {
    pub word_index: PathBuf,
    pub ranking_index: PathBuf,
    pub descr_index: PathBuf,
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Read every chunk under `dir` and merge them into one map.
pub fn load_entities(dir: &Path) -> Result<EntityMap, AppError> {
    let entries = fs::read_dir(dir)
        .map_err(|e| AppError::Load(format!("cannot list {}: {e}", dir.display())))?;

    let mut chunk_paths = Vec::new();
    for entry in entries {
        let entry =
            entry.map_err(|e| AppError::Load(format!("cannot list {}: {e}", dir.display())))?;
        let path = entry.path();
        if path.is_file() {
            chunk_paths.push(path);
        } else {
            warn!(path = %path.display(), "skipping non-file entry in dump dir");
        }
    }
    chunk_paths.sort();

    let mut entities = EntityMap::new();
    for path in &chunk_paths {
        let chunk = load_chunk(path)?;
        debug!(path = %path.display(), entities = chunk.len(), "chunk loaded");
        entities.extend(chunk);
    }

    info!(
        dir = %dir.display(),
        chunks = chunk_paths.len(),
        entities = entities.len(),
        "entities loaded"
    );
    Ok(entities)
}

/// Parse one dump chunk.
pub fn load_chunk(path: &Path) -> Result<BTreeMap<String, EntityRecord>, AppError> {
    read_json(path)
}

pub fn load_word_index(path: &Path) -> Result<WordIndex, AppError> {
    read_json(path)
}

pub fn load_ranking_index(path: &Path) -> Result<RankingIndex, AppError> {
    read_json(path)
}

pub fn load_description_index(path: &Path) -> Result<DescriptionIndex, AppError> {
    read_json(path)
}

// ── Saving ────────────────────────────────────────────────────────────────────

/// Write the word, ranking and description indexes under `dir`, creating it
/// if needed. Existing artifacts are overwritten.
pub fn save_indexes(
    dir: &Path,
    names: &ArtifactNames,
    indexes: &EntityIndexes,
) -> Result<SavedArtifacts, AppError> {
    fs::create_dir_all(dir)
        .map_err(|e| AppError::Save(format!("cannot create {}: {e}", dir.display())))?;

    let saved = SavedArtifacts {
        word_index: dir.join(&names.word_index),
        ranking_index: dir.join(&names.ranking_index),
        descr_index: dir.join(&names.descr_index),
    };
    write_json(&saved.word_index, &indexes.words)?;
    write_json(&saved.ranking_index, &indexes.ranking)?;
    write_json(&saved.descr_index, &indexes.descriptions)?;

    info!(
        dir = %dir.display(),
        words = indexes.words.len(),
        ranked = indexes.ranking.len(),
        descriptions = indexes.descriptions.len(),
        "indexes saved"
    );
    Ok(saved)
}

// ── internals ────────────────────────────────────────────────────────────────

/// Stream-parse `path`; the raw text of a chunk is never held in memory.
fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::Load(format!("cannot read {}: {e}", path.display())))?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| AppError::Load(format!("parse error in {}: {e}", path.display())))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), AppError> {
    let json = serde_json::to_string(value)
        .map_err(|e| AppError::Save(format!("serialize {}: {e}", path.display())))?;
    fs::write(path, json)
        .map_err(|e| AppError::Save(format!("cannot write {}: {e}", path.display())))
}
