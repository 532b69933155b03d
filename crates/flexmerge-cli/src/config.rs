use flexmerge::MergeSettings;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub merge: MergeSettings,
    #[serde(default)]
    pub output: OutputSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputSettings {
    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            pretty: default_pretty(),
        }
    }
}

fn default_pretty() -> bool {
    true
}

impl Settings {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&content)?;
        Ok(settings)
    }

    /// Command-line flags win over the file.
    pub fn apply_overrides(&mut self, sequences: Option<&str>, mappings: Option<&str>) {
        if let Some(name) = sequences {
            self.merge.sequences = name.to_string();
        }
        if let Some(name) = mappings {
            self.merge.mappings = name.to_string();
        }
    }
}
