//! Index builder: entity records → label, ranking, description and word maps.
//!
//! The build runs three passes over the entity map:
//!
//! 1. **Labels + ranking**: every non-empty name and alias is appended to the
//!    label index; every entity gets its relation count.
//! 2. **Descriptions**: the record's own `descr`, or a label derived from its
//!    `P31` (instance of) / `P106` (occupation) triplets.
//! 3. **Words**: each label is screened against the lexicon, split on single
//!    spaces, and every significant word is mapped to
//!    `(entity_id, num_words)` for every entity holding the label.
//!
//! Nothing here fails: absent fields read as empty and unusable labels are
//! skipped. The label index is never persisted; the other three are what
//! [`store::save_indexes`](crate::store::save_indexes) persists.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::lexicon::Lexicon;
use crate::record::{EntityMap, Triplet};

/// "instance of"
pub const INSTANCE_OF: &str = "P31";
/// "occupation"
pub const OCCUPATION: &str = "P106";
/// "human", too generic to serve as a description.
pub const HUMAN: &str = "Q5";

/// Label (case preserved) → IDs of entities holding it, in build order.
pub type LabelIndex = BTreeMap<String, Vec<String>>;
/// Entity ID → number of relations.
pub type RankingIndex = BTreeMap<String, u64>;
/// Entity ID → short description. Never holds empty strings.
pub type DescriptionIndex = BTreeMap<String, String>;

/// `(entity_id, num_words)`: the entity reached through a label that had
/// `num_words` significant words. Serialised as a two-element array.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WordEntry(pub String, pub usize);

/// Sanitized lowercase word → set of [`WordEntry`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WordIndex {
    words: BTreeMap<String, BTreeSet<WordEntry>>,
}

impl WordIndex {
    /// Add `entry` under `word`. Returns `false` when the pair was already there.
    pub fn insert(&mut self, word: &str, entry: WordEntry) -> bool {
        match self.words.get_mut(word) {
            Some(entries) => entries.insert(entry),
            None => {
                self.words.insert(word.to_string(), BTreeSet::from([entry]));
                true
            }
        }
    }

    pub fn get(&self, word: &str) -> Option<&BTreeSet<WordEntry>> {
        self.words.get(word)
    }

    /// `true` if `word` maps to `(entity_id, num_words)`.
    pub fn contains(&self, word: &str, entity_id: &str, num_words: usize) -> bool {
        self.words
            .get(word)
            .is_some_and(|entries| entries.contains(&WordEntry(entity_id.to_string(), num_words)))
    }

    /// Number of distinct words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<WordEntry>)> {
        self.words.iter().map(|(w, e)| (w.as_str(), e))
    }
}

/// What happened to one label in the word pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelOutcome {
    /// Indexed under this many significant words.
    Indexed(usize),
    /// Held a character outside the full alphabet.
    BadSymbols,
    /// No word survived sanitizing, length and stopword checks.
    NoSignificantWords,
}

/// Counters reported after a build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub entities: usize,
    pub labels: usize,
    pub labels_indexed: usize,
    pub labels_bad_symbols: usize,
    pub labels_no_words: usize,
    pub descriptions: usize,
    pub derived_descriptions: usize,
    pub words: usize,
}

/// Everything one build produces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityIndexes {
    pub labels: LabelIndex,
    pub ranking: RankingIndex,
    pub descriptions: DescriptionIndex,
    pub words: WordIndex,
    pub stats: BuildStats,
}

/// Builds [`EntityIndexes`] from a fully loaded [`EntityMap`].
#[derive(Debug, Clone, Default)]
pub struct IndexBuilder {
    lexicon: Lexicon,
}

impl IndexBuilder {
    pub fn new(lexicon: Lexicon) -> Self {
        Self { lexicon }
    }

    /// Run all three passes. Deterministic: the same input always yields the
    /// same indexes.
    pub fn build(&self, entities: &EntityMap) -> EntityIndexes {
        let mut out = EntityIndexes::default();
        out.stats.entities = entities.len();

        // ── Pass 1: labels + ranking ──────────────────────────────────────
        for (entity_id, record) in entities {
            for label in record.labels() {
                out.labels
                    .entry(label.to_string())
                    .or_default()
                    .push(entity_id.clone());
            }
            out.ranking.insert(entity_id.clone(), record.number_of_relations);
        }
        debug!(labels = out.labels.len(), "label index built");

        // ── Pass 2: descriptions ──────────────────────────────────────────
        for (entity_id, record) in entities {
            let descr = match record.descr() {
                "" => match find_description(&record.triplets, entities) {
                    Some(derived) => {
                        out.stats.derived_descriptions += 1;
                        derived
                    }
                    None => continue,
                },
                own => own,
            };
            out.descriptions.insert(entity_id.clone(), descr.to_string());
        }
        out.stats.descriptions = out.descriptions.len();

        // ── Pass 3: words ─────────────────────────────────────────────────
        for (label, entity_ids) in &out.labels {
            out.stats.labels += 1;
            match add_label(&mut out.words, &self.lexicon, label, entity_ids) {
                LabelOutcome::Indexed(_) => out.stats.labels_indexed += 1,
                LabelOutcome::BadSymbols => out.stats.labels_bad_symbols += 1,
                LabelOutcome::NoSignificantWords => out.stats.labels_no_words += 1,
            }
        }
        out.stats.words = out.words.len();

        info!(
            entities = out.stats.entities,
            labels = out.stats.labels,
            labels_indexed = out.stats.labels_indexed,
            labels_bad_symbols = out.stats.labels_bad_symbols,
            labels_no_words = out.stats.labels_no_words,
            descriptions = out.stats.descriptions,
            derived_descriptions = out.stats.derived_descriptions,
            words = out.stats.words,
            "indexes built"
        );
        out
    }
}

/// Index one label for `entity_ids`.
///
/// Every significant word of the label is paired with the label-level word
/// count, so a three-word label files all its entities as `(id, 3)` under each
/// of its words even when some other token in it was dropped.
pub fn add_label(
    words: &mut WordIndex,
    lexicon: &Lexicon,
    label: &str,
    entity_ids: &[String],
) -> LabelOutcome {
    let label = label.to_lowercase();
    if !lexicon.accepts_label(&label) {
        return LabelOutcome::BadSymbols;
    }

    let significant: Vec<String> = label
        .split(' ')
        .map(|token| lexicon.sanitize(token))
        .filter(|word| lexicon.is_significant(word))
        .collect();
    let num_words = significant.len();
    if num_words == 0 {
        return LabelOutcome::NoSignificantWords;
    }

    for word in &significant {
        for entity_id in entity_ids {
            words.insert(word, WordEntry(entity_id.clone(), num_words));
        }
    }
    LabelOutcome::Indexed(num_words)
}

/// Derive a description from `P31` / `P106` triplets.
///
/// Triplets are scanned in record order and the first one that yields a
/// non-empty object name wins, whichever of the two relations it is. `P31`
/// skips [`HUMAN`]; `P106` only looks at its first object.
pub fn find_description<'a>(triplets: &[Triplet], entities: &'a EntityMap) -> Option<&'a str> {
    let name_of = |id: &str| {
        entities
            .get(id)
            .map(|rec| rec.name())
            .filter(|name| !name.is_empty())
    };

    for triplet in triplets {
        let found = match triplet.relation.as_str() {
            INSTANCE_OF => triplet
                .objects
                .iter()
                .filter(|obj| obj.as_str() != HUMAN)
                .find_map(|obj| name_of(obj.as_str())),
            OCCUPATION => triplet.objects.first().and_then(|obj| name_of(obj.as_str())),
            _ => None,
        };
        if found.is_some() {
            return found;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::EntityRecord;

    fn named(name: &str) -> EntityRecord {
        EntityRecord {
            name: Some(name.to_string()),
            ..EntityRecord::default()
        }
    }

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn name_and_aliases_land_in_label_index() {
        let mut entities = EntityMap::new();
        entities.insert(
            "Q649".into(),
            EntityRecord {
                name: Some("Москва".into()),
                aliases: vec!["Moscow".into(), "Москва".into()],
                number_of_relations: 412,
                ..EntityRecord::default()
            },
        );
        entities.insert("Q1".into(), named("Москва"));

        let idx = IndexBuilder::default().build(&entities);
        assert_eq!(idx.labels["Москва"], ids(&["Q1", "Q649", "Q649"]));
        assert_eq!(idx.labels["Moscow"], ids(&["Q649"]));
        assert_eq!(idx.ranking["Q649"], 412);
        assert_eq!(idx.ranking["Q1"], 0);
    }

    #[test]
    fn entity_without_labels_still_ranked() {
        let mut entities = EntityMap::new();
        entities.insert("Q7".into(), EntityRecord { number_of_relations: 3, ..Default::default() });
        let idx = IndexBuilder::default().build(&entities);
        assert!(idx.labels.is_empty());
        assert_eq!(idx.ranking["Q7"], 3);
    }

    #[test]
    fn new_york_pairs_both_words_with_label_count() {
        let mut words = WordIndex::default();
        let outcome = add_label(&mut words, &Lexicon::russian(), "New York", &ids(&["E"]));
        assert_eq!(outcome, LabelOutcome::Indexed(2));
        assert!(words.contains("new", "E", 2));
        assert!(words.contains("york", "E", 2));
    }

    #[test]
    fn insignificant_token_does_not_change_label_count() {
        let mut words = WordIndex::default();
        // "и" is a stopword and "a" is a single letter; two words count.
        let outcome =
            add_label(&mut words, &Lexicon::russian(), "Кирилл и Мефодий a", &ids(&["Q1", "Q2"]));
        assert_eq!(outcome, LabelOutcome::Indexed(2));
        for id in ["Q1", "Q2"] {
            assert!(words.contains("кирилл", id, 2));
            assert!(words.contains("мефодий", id, 2));
        }
        assert!(words.get("и").is_none());
        assert!(words.get("a").is_none());
        assert_eq!(words.len(), 2);
    }

    #[test]
    fn stopword_only_label_skipped() {
        let mut words = WordIndex::default();
        let outcome = add_label(&mut words, &Lexicon::russian(), "и для тоже", &ids(&["Q1"]));
        assert_eq!(outcome, LabelOutcome::NoSignificantWords);
        assert!(words.is_empty());
    }

    #[test]
    fn single_letter_label_skipped() {
        let mut words = WordIndex::default();
        let outcome = add_label(&mut words, &Lexicon::russian(), "A B (c)", &ids(&["Q1"]));
        assert_eq!(outcome, LabelOutcome::NoSignificantWords);
        assert!(words.is_empty());
    }

    #[test]
    fn bad_symbol_drops_whole_label() {
        let mut words = WordIndex::default();
        let outcome = add_label(&mut words, &Lexicon::russian(), "Café Paris", &ids(&["Q1"]));
        assert_eq!(outcome, LabelOutcome::BadSymbols);
        assert!(words.get("paris").is_none());
    }

    #[test]
    fn punctuation_stripped_from_words() {
        let mut words = WordIndex::default();
        add_label(&mut words, &Lexicon::russian(), "Ростов-на-Дону (город)", &ids(&["Q908"]));
        assert!(words.contains("ростов-на-дону", "Q908", 2));
        assert!(words.contains("город", "Q908", 2));
    }

    #[test]
    fn double_space_yields_empty_token() {
        let mut words = WordIndex::default();
        // Split on single spaces: the empty middle token is simply insignificant.
        let outcome = add_label(&mut words, &Lexicon::russian(), "big  apple", &ids(&["Q60"]));
        assert_eq!(outcome, LabelOutcome::Indexed(2));
        assert!(words.contains("apple", "Q60", 2));
    }

    #[test]
    fn readding_pair_is_noop() {
        let mut words = WordIndex::default();
        let lex = Lexicon::russian();
        add_label(&mut words, &lex, "New York", &ids(&["E"]));
        add_label(&mut words, &lex, "new york", &ids(&["E"]));
        assert_eq!(words.get("new").map(|e| e.len()), Some(1));
        assert!(!words.insert("york", WordEntry("E".into(), 2)));
        assert_eq!(words.get("york").map(|e| e.len()), Some(1));
    }

    #[test]
    fn same_entity_different_counts_are_distinct() {
        let mut words = WordIndex::default();
        let lex = Lexicon::russian();
        add_label(&mut words, &lex, "York", &ids(&["E"]));
        add_label(&mut words, &lex, "New York", &ids(&["E"]));
        let york = words.get("york").unwrap();
        assert_eq!(york.len(), 2);
        assert!(york.contains(&WordEntry("E".into(), 1)));
        assert!(york.contains(&WordEntry("E".into(), 2)));
    }

    #[test]
    fn own_descr_wins() {
        let mut entities = EntityMap::new();
        entities.insert("Q515".into(), named("город"));
        entities.insert(
            "Q1".into(),
            EntityRecord {
                descr: Some("столица России".into()),
                triplets: vec![Triplet::new(INSTANCE_OF, &["Q515"])],
                ..named("Москва")
            },
        );
        let idx = IndexBuilder::default().build(&entities);
        assert_eq!(idx.descriptions["Q1"], "столица России");
        assert_eq!(idx.stats.derived_descriptions, 0);
    }

    #[test]
    fn instance_of_skips_human() {
        let mut entities = EntityMap::new();
        entities.insert("Q5".into(), named("человек"));
        entities.insert("Q123".into(), named("settlement"));
        let triplets = vec![Triplet::new(INSTANCE_OF, &[HUMAN, "Q123"])];
        assert_eq!(find_description(&triplets, &entities), Some("settlement"));
    }

    #[test]
    fn instance_of_skips_unnamed_objects() {
        let mut entities = EntityMap::new();
        entities.insert("Q10".into(), EntityRecord::default());
        entities.insert("Q11".into(), named("река"));
        let triplets = vec![Triplet::new(INSTANCE_OF, &["Q404", "Q10", "Q11"])];
        assert_eq!(find_description(&triplets, &entities), Some("река"));
    }

    #[test]
    fn occupation_uses_first_object_only() {
        let mut entities = EntityMap::new();
        entities.insert("Q36180".into(), named("писатель"));
        let skipped = vec![Triplet::new(OCCUPATION, &["Q404", "Q36180"])];
        assert_eq!(find_description(&skipped, &entities), None);
        let hit = vec![Triplet::new(OCCUPATION, &["Q36180"])];
        assert_eq!(find_description(&hit, &entities), Some("писатель"));
    }

    #[test]
    fn first_matching_triplet_wins() {
        let mut entities = EntityMap::new();
        entities.insert("Q36180".into(), named("писатель"));
        entities.insert("Q515".into(), named("город"));
        let triplets = vec![
            Triplet::new("P17", &["Q159"]),
            Triplet::new(OCCUPATION, &["Q36180"]),
            Triplet::new(INSTANCE_OF, &["Q515"]),
        ];
        assert_eq!(find_description(&triplets, &entities), Some("писатель"));
    }

    #[test]
    fn occupation_without_objects_yields_nothing() {
        let entities = EntityMap::new();
        let triplets = vec![Triplet::new(OCCUPATION, &[])];
        assert_eq!(find_description(&triplets, &entities), None);
    }

    #[test]
    fn no_triplets_means_no_description_key() {
        let mut entities = EntityMap::new();
        entities.insert(
            "Q1".into(),
            EntityRecord { descr: Some(String::new()), ..named("Москва") },
        );
        let idx = IndexBuilder::default().build(&entities);
        assert!(!idx.descriptions.contains_key("Q1"));
    }

    #[test]
    fn aliases_contribute_words() {
        let mut entities = EntityMap::new();
        entities.insert(
            "Q649".into(),
            EntityRecord { aliases: vec!["Moscow City".into()], ..named("Москва") },
        );
        let idx = IndexBuilder::default().build(&entities);
        assert!(idx.words.contains("москва", "Q649", 1));
        assert!(idx.words.contains("moscow", "Q649", 2));
        assert!(idx.words.contains("city", "Q649", 2));
    }

    #[test]
    fn stats_track_label_outcomes() {
        let mut entities = EntityMap::new();
        entities.insert("Q1".into(), named("New York"));
        entities.insert("Q2".into(), named("и"));
        entities.insert("Q3".into(), named("Zürich"));
        let idx = IndexBuilder::default().build(&entities);
        assert_eq!(idx.stats.entities, 3);
        assert_eq!(idx.stats.labels, 3);
        assert_eq!(idx.stats.labels_indexed, 1);
        assert_eq!(idx.stats.labels_no_words, 1);
        assert_eq!(idx.stats.labels_bad_symbols, 1);
        assert_eq!(idx.stats.words, 2);
    }

    #[test]
    fn build_is_idempotent() {
        let mut entities = EntityMap::new();
        entities.insert("Q5".into(), named("человек"));
        entities.insert("Q515".into(), named("город"));
        entities.insert(
            "Q649".into(),
            EntityRecord {
                aliases: vec!["Moscow".into()],
                number_of_relations: 9,
                triplets: vec![Triplet::new(INSTANCE_OF, &["Q515"])],
                ..named("Москва")
            },
        );
        let builder = IndexBuilder::default();
        assert_eq!(builder.build(&entities), builder.build(&entities));
    }

    #[test]
    fn word_index_serialises_as_sorted_pairs() {
        let mut words = WordIndex::default();
        words.insert("york", WordEntry("Q60".into(), 2));
        words.insert("york", WordEntry("Q1384".into(), 2));
        let json = serde_json::to_string(&words).unwrap();
        assert_eq!(json, r#"{"york":[["Q1384",2],["Q60",2]]}"#);
    }
}
