use std::{collections::BTreeMap, fs, path::Path};

use engine::analytics::AlertKind;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Client-side state kept between runs.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct LocalState {
    pub onboarding_completed: bool,
    /// Survey answers, question id -> chosen option.
    pub preferences: BTreeMap<u32, String>,
    /// Alert thresholds already notified and not yet recovered.
    pub active_alerts: Vec<AlertKind>,
}

impl LocalState {
    pub fn load(path: &str) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(err) => return Err(err.into()),
        };
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let parent = Path::new(path).parent();
        if let Some(parent) = parent {
            fs::create_dir_all(parent)?;
        }
        let payload = serde_json::to_string_pretty(self)?;
        fs::write(path, payload)?;
        Ok(())
    }

    pub fn complete_onboarding(&mut self, answers: BTreeMap<u32, String>) {
        self.preferences = answers;
        self.onboarding_completed = true;
    }
}
