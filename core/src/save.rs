use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// JSON-facing persistence schema. The core only encodes and decodes it;
/// reading and writing the actual file belongs to the embedding layer.
///
/// High-score entries are float seconds and simply absent when no win has
/// been recorded for that difficulty.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SaveData {
    #[serde(default)]
    pub high_scores: BTreeMap<String, f64>,
    #[serde(default)]
    pub achievements: BTreeMap<String, bool>,
    #[serde(default)]
    pub power_up_charges: BTreeMap<String, u32>,
    #[serde(default)]
    pub themes_tried: BTreeSet<usize>,
}

impl SaveData {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Best-effort decode: every field that is missing or malformed falls
    /// back to its default, and a wholly unreadable document decodes as
    /// `SaveData::default()`. Loading never fails.
    pub fn from_json(text: &str) -> Self {
        let value: Value = match serde_json::from_str(text) {
            Ok(value) => value,
            Err(err) => {
                log::warn!("unreadable save data, using defaults: {err}");
                return Self::default();
            }
        };
        let Value::Object(root) = value else {
            log::warn!("save data is not an object, using defaults");
            return Self::default();
        };

        let mut data = Self::default();

        if let Some(scores) = field_object(&root, "high_scores") {
            for (key, entry) in scores {
                match entry.as_f64() {
                    Some(secs) => {
                        data.high_scores.insert(key.clone(), secs);
                    }
                    None => log::warn!("malformed high score for {key}, skipped"),
                }
            }
        }

        if let Some(achievements) = field_object(&root, "achievements") {
            for (key, entry) in achievements {
                match entry.as_bool() {
                    Some(unlocked) => {
                        data.achievements.insert(key.clone(), unlocked);
                    }
                    None => log::warn!("malformed achievement flag for {key}, skipped"),
                }
            }
        }

        if let Some(charges) = field_object(&root, "power_up_charges") {
            for (key, entry) in charges {
                match entry.as_u64() {
                    Some(count) => {
                        data.power_up_charges
                            .insert(key.clone(), count.min(u64::from(u32::MAX)) as u32);
                    }
                    None => log::warn!("malformed charge count for {key}, skipped"),
                }
            }
        }

        match root.get("themes_tried") {
            Some(Value::Array(themes)) => {
                for entry in themes {
                    match entry.as_u64() {
                        Some(index) => {
                            data.themes_tried.insert(index as usize);
                        }
                        None => log::warn!("malformed theme index, skipped"),
                    }
                }
            }
            Some(_) => log::warn!("malformed themes_tried field, using defaults"),
            None => {}
        }

        data
    }
}

fn field_object<'a>(
    root: &'a serde_json::Map<String, Value>,
    name: &str,
) -> Option<&'a serde_json::Map<String, Value>> {
    match root.get(name) {
        Some(Value::Object(map)) => Some(map),
        Some(_) => {
            log::warn!("malformed {name} field, using defaults");
            None
        }
        None => None,
    }
}
