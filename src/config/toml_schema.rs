//! TOML schema definitions for inimerge.toml

use serde::{Deserialize, Serialize};

use crate::document::MergePolicy;
use crate::serialize::LineEnding;

/// Root structure for inimerge.toml
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct InimergeToml {
    /// Merge settings
    #[serde(default)]
    pub merge: MergeSection,
}

/// `[merge]` section in inimerge.toml
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MergeSection {
    /// How repeated keys are resolved (default: replace-in-place)
    pub policy: Option<MergePolicy>,

    /// Line terminator written back (default: lf)
    pub line_ending: Option<LineEnding>,

    /// Bytes read per chunk (default: 32768)
    pub chunk_size: Option<usize>,
}
