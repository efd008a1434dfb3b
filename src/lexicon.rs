//! Alphabets and stopwords used to screen labels and sanitize label words.
//!
//! Two alphabets are involved:
//! - the **full alphabet** decides whether a lowercased label is indexed at all;
//!   a single character outside it drops the whole label;
//! - the **word alphabet** is what survives inside a word once punctuation is
//!   stripped (letters, digits, hyphen).

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::error::AppError;

const LATIN: &str = "abcdefghijklmnopqrstuvwxyz";
const CYRILLIC: &str = "абвгдеёжзийклмнопрстуфхцчшщъыьэюя";
const DIGITS: &str = "0123456789";
const PUNCTUATION: &str = " `.,?!@#$%^&*()-+=\\/№;:<>_–|\"'";

/// NLTK Russian stopword list.
const RUSSIAN_STOPWORDS: &[&str] = &[
    "и", "в", "во", "не", "что", "он", "на", "я", "с", "со", "как", "а", "то", "все", "она",
    "так", "его", "но", "да", "ты", "к", "у", "же", "вы", "за", "бы", "по", "только", "ее",
    "мне", "было", "вот", "от", "меня", "еще", "нет", "о", "из", "ему", "теперь", "когда",
    "даже", "ну", "вдруг", "ли", "если", "уже", "или", "ни", "быть", "был", "него", "до",
    "вас", "нибудь", "опять", "уж", "вам", "ведь", "там", "потом", "себя", "ничего", "ей",
    "может", "они", "тут", "где", "есть", "надо", "ней", "для", "мы", "тебя", "их", "чем",
    "была", "сам", "чтоб", "без", "будто", "чего", "раз", "тоже", "себе", "под", "будет", "ж",
    "тогда", "кто", "этот", "того", "потому", "этого", "какой", "совсем", "ним", "здесь",
    "этом", "один", "почти", "мой", "тем", "чтобы", "нее", "сейчас", "были", "куда", "зачем",
    "всех", "никогда", "можно", "при", "наконец", "два", "об", "другой", "хоть", "после",
    "над", "больше", "тот", "через", "эти", "нас", "про", "всего", "них", "какая", "много",
    "разве", "три", "эту", "моя", "впрочем", "хорошо", "свою", "этой", "перед", "иногда",
    "лучше", "чуть", "том", "нельзя", "такой", "им", "более", "всегда", "конечно", "всю",
    "между",
];

/// Character sets and stopwords for one label language.
#[derive(Debug, Clone)]
pub struct Lexicon {
    full_alphabet: HashSet<char>,
    word_alphabet: HashSet<char>,
    stopwords: HashSet<String>,
}

impl Lexicon {
    pub fn new(
        full_alphabet: impl IntoIterator<Item = char>,
        word_alphabet: impl IntoIterator<Item = char>,
        stopwords: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            full_alphabet: full_alphabet.into_iter().collect(),
            word_alphabet: word_alphabet.into_iter().collect(),
            stopwords: stopwords.into_iter().collect(),
        }
    }

    /// Russian + Latin alphabets with the NLTK Russian stopwords.
    pub fn russian() -> Self {
        let letters_digits = || LATIN.chars().chain(CYRILLIC.chars()).chain(DIGITS.chars());
        Self::new(
            letters_digits().chain(PUNCTUATION.chars()),
            letters_digits().chain(std::iter::once('-')),
            RUSSIAN_STOPWORDS.iter().map(|w| w.to_string()),
        )
    }

    /// Replace the stopword set with the contents of a word-per-line file.
    /// Blank lines and `#` comments are ignored; words are lowercased.
    pub fn with_stopwords_file(mut self, path: &Path) -> Result<Self, AppError> {
        let raw = fs::read_to_string(path).map_err(|e| {
            AppError::Load(format!("cannot read stopwords {}: {e}", path.display()))
        })?;
        self.stopwords = raw
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_lowercase)
            .collect();
        Ok(self)
    }

    /// `true` when every character of an already-lowercased label is in the
    /// full alphabet.
    pub fn accepts_label(&self, label: &str) -> bool {
        label.chars().all(|c| self.full_alphabet.contains(&c))
    }

    /// Drop every character outside the word alphabet.
    pub fn sanitize(&self, word: &str) -> String {
        word.chars().filter(|c| self.word_alphabet.contains(c)).collect()
    }

    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(word)
    }

    /// A sanitized word counts when it is longer than one character and is
    /// not a stopword.
    pub fn is_significant(&self, sanitized: &str) -> bool {
        sanitized.chars().count() > 1 && !self.is_stopword(sanitized)
    }

    pub fn stopword_count(&self) -> usize {
        self.stopwords.len()
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::russian()
    }
}
