use crate::error::{DuelError, DuelResult};
use crate::types::TimeMs;
use serde::{Deserialize, Serialize};

/// Engine settings shared by the batch runner and the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuelConfig {
    /// Max gap between a kill and a death for them to be the same event.
    #[serde(default = "default_tolerance_ms")]
    pub tolerance_ms: TimeMs,
    /// Opponents met in fewer matches than this are pruned from aggregation.
    #[serde(default = "default_min_encounters")]
    pub min_encounters: u32,
    /// Rows shown per ranking table.
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

fn default_tolerance_ms() -> TimeMs {
    5
}

fn default_min_encounters() -> u32 {
    1
}

fn default_top_n() -> usize {
    10
}

impl Default for DuelConfig {
    fn default() -> Self {
        Self {
            tolerance_ms: default_tolerance_ms(),
            min_encounters: default_min_encounters(),
            top_n: default_top_n(),
        }
    }
}

impl DuelConfig {
    /// Load from a JSON file. Missing keys take their defaults.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: DuelConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings no caller can mean.
    pub fn validate(&self) -> DuelResult<()> {
        if self.tolerance_ms < 0 {
            return Err(DuelError::InvalidConfig {
                field: "tolerance_ms".into(),
                reason: format!("must be >= 0, got {}", self.tolerance_ms),
            });
        }
        if self.top_n == 0 {
            return Err(DuelError::InvalidConfig {
                field: "top_n".into(),
                reason: "must be > 0".into(),
            });
        }
        Ok(())
    }
}
