//! Configuration for inimerge.
//!
//! This module provides:
//! - Loading settings from `inimerge.toml`
//! - Config file discovery (search upward from current directory)
//! - Merging CLI args, config file, `.editorconfig` and defaults
//! - Template generation with `--init`

mod editorconfig;
mod file;
mod init;
mod merge;
mod toml_schema;

pub use editorconfig::{editorconfig_line_ending, find_editorconfig};
pub use file::{find_config_file, find_file_upward, load_config, ConfigError, CONFIG_FILE_NAME};
pub use init::{generate_init_file, generate_init_file_in, INIMERGE_TOML_TEMPLATE};
pub use merge::{merge_config, CliMergeOptions, MergeConfig};
pub use toml_schema::{InimergeToml, MergeSection};
