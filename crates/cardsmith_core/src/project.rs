//! Project files
//!
//! A project is JSON holding card records, either as a bare array or as an
//! object with a `cards` array next to arbitrary other keys. Recompute runs
//! the card adapter over every card and writes back the same shape.

use crate::card::{apply_traits_batch, CardRecord};
use crate::config::StudioConfig;
use crate::error::{CardError, Result};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info};

pub const CARDS_KEY: &str = "cards";

#[derive(Debug, Clone, PartialEq)]
pub struct CardProject {
    pub cards: Vec<CardRecord>,
    /// Non-card keys of an object-shaped project; `None` for a bare array
    envelope: Option<CardRecord>,
}

/// Recompute statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RecomputeSummary {
    pub total_cards: usize,
    pub cards_with_traits: usize,
    pub total_traits: usize,
}

impl CardProject {
    pub fn new(cards: Vec<CardRecord>) -> Self {
        Self { cards, envelope: None }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading project");
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Array(items) => Ok(Self { cards: into_cards(items)?, envelope: None }),
            Value::Object(mut map) => {
                let cards = match map.remove(CARDS_KEY) {
                    Some(Value::Array(items)) => into_cards(items)?,
                    Some(_) => {
                        return Err(CardError::InvalidProject(format!(
                            "'{}' must be an array",
                            CARDS_KEY
                        )))
                    }
                    None => {
                        return Err(CardError::InvalidProject(format!(
                            "missing '{}' array",
                            CARDS_KEY
                        )))
                    }
                };
                Ok(Self { cards, envelope: Some(map) })
            }
            _ => Err(CardError::InvalidProject(
                "project must be an array of cards or an object with a 'cards' array".into(),
            )),
        }
    }

    pub fn to_value(&self) -> Value {
        let cards = Value::Array(self.cards.iter().cloned().map(Value::Object).collect());
        match &self.envelope {
            None => cards,
            Some(envelope) => {
                let mut map = envelope.clone();
                map.insert(CARDS_KEY.to_string(), cards);
                Value::Object(map)
            }
        }
    }

    /// Re-run the trait engine over every card in place
    pub fn recompute(&mut self, config: &StudioConfig) -> RecomputeSummary {
        let outcomes = apply_traits_batch(&self.cards, config.parallel_threshold);

        let mut summary = RecomputeSummary { total_cards: outcomes.len(), ..Default::default() };
        self.cards = outcomes
            .into_iter()
            .map(|outcome| {
                if !outcome.result.base_traits.is_empty() {
                    summary.cards_with_traits += 1;
                }
                summary.total_traits += outcome.result.all_traits.len();
                outcome.next_data
            })
            .collect();

        info!(
            cards = summary.total_cards,
            with_traits = summary.cards_with_traits,
            "project recomputed"
        );
        summary
    }

    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let value = self.to_value();
        let json = if pretty {
            serde_json::to_string_pretty(&value)?
        } else {
            serde_json::to_string(&value)?
        };
        Ok(json)
    }

    /// Writes a sibling temp file and renames it over `path`; on failure the
    /// previous file is left intact.
    pub fn save<P: AsRef<Path>>(&self, path: P, pretty: bool) -> Result<()> {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let json = self.to_json(pretty)?;
        let mut file = NamedTempFile::new_in(dir)?;
        file.write_all(json.as_bytes())?;
        file.as_file().sync_all()?;
        file.persist(path).map_err(|e| CardError::Io(e.error))?;
        debug!(path = %path.display(), cards = self.cards.len(), "project saved");
        Ok(())
    }
}

fn into_cards(items: Vec<Value>) -> Result<Vec<CardRecord>> {
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Object(map) => Ok(map),
            _ => Err(CardError::InvalidProject(format!("card {} is not an object", i))),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bare_array_round_trip_shape() {
        let mut project =
            CardProject::from_json(r#"[{"baseTraits": "human", "attack": 5, "defense": 5}]"#)
                .unwrap();
        let summary = project.recompute(&StudioConfig::default());

        assert_eq!(
            summary,
            RecomputeSummary { total_cards: 1, cards_with_traits: 1, total_traits: 2 }
        );
        let value = project.to_value();
        assert!(value.is_array());
        assert_eq!(value[0]["defense"], json!(6));
    }

    #[test]
    fn test_envelope_keys_preserved() {
        let mut project = CardProject::from_value(json!({
            "name": "Set One",
            "version": 3,
            "cards": [
                { "traitsBase": ["animal", "swordsman"], "baseAttack": 3, "baseDefense": 2 },
                { "title": "blank" }
            ]
        }))
        .unwrap();
        let summary = project.recompute(&StudioConfig::default());
        assert_eq!(summary.total_cards, 2);
        assert_eq!(summary.cards_with_traits, 1);
        assert_eq!(summary.total_traits, 4);

        let value = project.to_value();
        assert_eq!(value["name"], json!("Set One"));
        assert_eq!(value["version"], json!(3));
        assert_eq!(value["cards"][0]["attack"], json!(6));
        assert_eq!(value["cards"][1]["title"], json!("blank"));
        assert_eq!(value["cards"][1]["traitsAdvanced"], json!([]));
    }

    #[test]
    fn test_invalid_projects() {
        let err = CardProject::from_json(r#"[{"ok": 1}, 7]"#).unwrap_err();
        assert_eq!(err.to_string(), "Invalid project: card 1 is not an object");

        assert!(matches!(
            CardProject::from_json(r#"{"cards": {}}"#),
            Err(CardError::InvalidProject(_))
        ));
        assert!(matches!(
            CardProject::from_json(r#"{"name": "x"}"#),
            Err(CardError::InvalidProject(_))
        ));
        assert!(matches!(CardProject::from_json("12"), Err(CardError::InvalidProject(_))));
        assert!(matches!(CardProject::from_json("{"), Err(CardError::Json(_))));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("project.json");

        let mut project = CardProject::from_value(json!({
            "cards": [{ "baseTrait": "human", "attack": 4, "defense": 4 }]
        }))
        .unwrap();
        project.recompute(&StudioConfig::default());
        project.save(&path, false).unwrap();

        let loaded = CardProject::load(&path).unwrap();
        assert_eq!(loaded, project);
        assert_eq!(loaded.cards[0]["defense"], json!(5));
    }

    #[test]
    fn test_save_replaces_existing_file_without_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("project.json");
        fs::write(&path, r#"[{"baseTraits": "animal", "attack": 1}]"#).unwrap();

        let mut project = CardProject::load(&path).unwrap();
        project.recompute(&StudioConfig::default());
        project.save(&path, true).unwrap();

        let loaded = CardProject::load(&path).unwrap();
        assert_eq!(loaded.cards[0]["attack"], json!(3));
        let entries = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn test_failed_save_keeps_original() {
        let dir = tempfile::tempdir().unwrap();
        // a directory in the target's place makes the final rename fail
        let path = dir.path().join("project.json");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep.txt"), "original").unwrap();

        let project = CardProject::new(vec![CardRecord::new()]);
        assert!(matches!(project.save(&path, false), Err(CardError::Io(_))));
        assert_eq!(fs::read_to_string(path.join("keep.txt")).unwrap(), "original");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
