use serde::{Deserialize, Serialize};

use crate::error::MergeResult;
use crate::merger::Merger;

/// Strategy selection as it appears in settings files.
///
/// Names are resolved against the built-in tables when the merger is built,
/// so an unknown name surfaces as an error there rather than at parse time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeSettings {
    #[serde(default = "default_sequences")]
    pub sequences: String,
    #[serde(default = "default_mappings")]
    pub mappings: String,
}

impl Default for MergeSettings {
    fn default() -> Self {
        Self {
            sequences: default_sequences(),
            mappings: default_mappings(),
        }
    }
}

fn default_sequences() -> String {
    "append".into()
}
fn default_mappings() -> String {
    "deep".into()
}

impl MergeSettings {
    pub fn build(&self) -> MergeResult<Merger> {
        Merger::new()
            .sequences(self.sequences.as_str())?
            .mappings(self.mappings.as_str())
    }
}
