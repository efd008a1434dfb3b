//! Entity records as they appear in a knowledge-base dump.
//!
//! A dump chunk is a JSON object keyed by entity ID:
//!
//! ```json
//! {
//!   "Q649": {
//!     "name": "Москва",
//!     "aliases": ["Moscow"],
//!     "number_of_relations": 412,
//!     "triplets": [["P31", "Q5119", "Q515"]]
//!   }
//! }
//! ```
//!
//! Every field is optional; absent fields read as empty / zero.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Entity ID → record. Ordered so that every pass over the map visits
/// entities in the same sequence.
pub type EntityMap = BTreeMap<String, EntityRecord>;

/// One entity of the knowledge base.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub aliases: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub number_of_relations: u64,
    #[serde(default)]
    pub descr: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub triplets: Vec<Triplet>,
}

/// Read an explicit `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl EntityRecord {
    /// Canonical name, or `""` when absent.
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    /// Own description, or `""` when absent.
    pub fn descr(&self) -> &str {
        self.descr.as_deref().unwrap_or("")
    }

    /// Every non-empty label the entity is known by: the name first, then
    /// aliases in record order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name())
            .chain(self.aliases.iter().map(String::as_str))
            .filter(|label| !label.is_empty())
    }
}

/// A `(relation, objects...)` fact. Serialised flat: `["P31", "Q5", "Q515"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Triplet {
    pub relation: String,
    pub objects: Vec<String>,
}

impl Triplet {
    pub fn new(relation: impl Into<String>, objects: &[&str]) -> Self {
        Self {
            relation: relation.into(),
            objects: objects.iter().map(|o| o.to_string()).collect(),
        }
    }
}

impl TryFrom<Vec<String>> for Triplet {
    type Error = String;

    fn try_from(mut parts: Vec<String>) -> Result<Self, Self::Error> {
        if parts.is_empty() {
            return Err("triplet must start with a relation id".to_string());
        }
        let relation = parts.remove(0);
        Ok(Self { relation, objects: parts })
    }
}

impl From<Triplet> for Vec<String> {
    fn from(t: Triplet) -> Self {
        let mut parts = Vec::with_capacity(t.objects.len() + 1);
        parts.push(t.relation);
        parts.extend(t.objects);
        parts
    }
}
