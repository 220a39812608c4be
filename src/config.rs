use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::FocusError;
use crate::focus::DEFAULT_BATCH_SIZE;

/// What `complete` does with a task that is already completed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionPolicy {
    /// Succeed and return the task unchanged.
    #[default]
    Idempotent,
    /// Fail with `ALREADY_COMPLETED`.
    Reject,
}

impl CompletionPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idempotent => "idempotent",
            Self::Reject => "reject",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "idempotent" => Some(Self::Idempotent),
            "reject" => Some(Self::Reject),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub batch_size: usize,
    pub completion_policy: CompletionPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            completion_policy: CompletionPolicy::default(),
        }
    }
}

impl Config {
    /// Read `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, FocusError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            FocusError::validation(format!("Invalid config at {}: {e}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), FocusError> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| FocusError::storage(e.to_string()))?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), FocusError> {
        validate_batch_size(self.batch_size)
    }
}

pub fn validate_batch_size(size: usize) -> Result<(), FocusError> {
    if size == 0 {
        return Err(FocusError::validation("Batch size must be at least 1"));
    }
    Ok(())
}
