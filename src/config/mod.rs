//! Formset configuration, read once at initialization.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{FormsetError, FormsetResult};
use crate::roles::Role;

const TMP_SUFFIX: &str = "tmp";

/// Init-time inputs of the formset: naming, size floor, initial count, the
/// role pool, and the role-lock capability flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormsetConfig {
    /// Token embedded in every field identifier (`<prefix>-<i>-<key>`).
    pub prefix: String,
    /// Human label used in per-entry headers (`"<label> N"`, 1-based).
    pub entry_label: String,
    /// Floor enforced on every removal; also the group granularity.
    pub min_participants: usize,
    /// Number of entries present after initial load.
    pub initial_count: usize,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub roles_locked: bool,
}

impl Default for FormsetConfig {
    fn default() -> Self {
        Self {
            prefix: "athlete".into(),
            entry_label: "Athlete".into(),
            min_participants: 1,
            initial_count: 1,
            roles: Vec::new(),
            roles_locked: false,
        }
    }
}

impl FormsetConfig {
    pub fn validate(&self) -> FormsetResult<()> {
        if self.prefix.trim().is_empty() {
            return Err(FormsetError::InvalidConfig("prefix must not be empty".into()));
        }
        if self.min_participants < 1 {
            return Err(FormsetError::InvalidConfig(
                "min_participants must be at least 1".into(),
            ));
        }
        if self.initial_count < 1 {
            return Err(FormsetError::InvalidConfig(
                "initial_count must be at least 1".into(),
            ));
        }
        if self.initial_count < self.min_participants {
            return Err(FormsetError::InvalidConfig(format!(
                "initial_count {} does not cover min_participants {}",
                self.initial_count, self.min_participants
            )));
        }
        Ok(())
    }

    pub fn load(path: &Path) -> FormsetResult<Self> {
        let data = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> FormsetResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        let tmp = path.with_extension(TMP_SUFFIX);
        fs::write(&tmp, json)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}
