//! Configuration merging logic
//!
//! Priority: CLI args > inimerge.toml > .editorconfig > defaults

use crate::document::MergePolicy;
use crate::scanner::DEFAULT_CHUNK_SIZE;
use crate::serialize::LineEnding;

use super::toml_schema::MergeSection;

/// Resolved settings for processing files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeConfig {
    pub policy: MergePolicy,
    pub line_ending: LineEnding,
    pub chunk_size: usize,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            policy: MergePolicy::default(),
            line_ending: LineEnding::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// CLI options that can override config file settings.
///
/// `None` means the flag was not given.
#[derive(Debug, Default)]
pub struct CliMergeOptions {
    pub policy: Option<MergePolicy>,
    pub line_ending: Option<LineEnding>,
    pub chunk_size: Option<usize>,
}

/// Merge settings from the CLI, inimerge.toml, the `.editorconfig` line
/// ending and the defaults.
pub fn merge_config(
    cli: &CliMergeOptions,
    toml: Option<&MergeSection>,
    editorconfig_line_ending: Option<LineEnding>,
) -> MergeConfig {
    let defaults = MergeConfig::default();

    MergeConfig {
        policy: cli
            .policy
            .or_else(|| toml.and_then(|t| t.policy))
            .unwrap_or(defaults.policy),
        line_ending: cli
            .line_ending
            .or_else(|| toml.and_then(|t| t.line_ending))
            .or(editorconfig_line_ending)
            .unwrap_or(defaults.line_ending),
        chunk_size: cli
            .chunk_size
            .or_else(|| toml.and_then(|t| t.chunk_size))
            .filter(|&size| size > 0)
            .unwrap_or(defaults.chunk_size),
    }
}
