//! Section/property merge engine.
//!
//! [`DocumentBuilder`] folds classified lines into a [`Document`]: repeated
//! sections collapse into their first occurrence and repeated keys inside a
//! section are resolved by a [`MergePolicy`]. Names and keys compare
//! case-insensitively and keep the casing they were first seen with.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::line::Line;

/// Name of the implicit section holding lines before the first header
pub const GLOBAL_SECTION: &str = "Global";

/// What happens when a key repeats inside a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergePolicy {
    /// The first occurrence wins outright; later ones are dropped.
    KeepFirst,
    /// The earlier occurrence is removed and the new one is appended.
    KeepLast,
    /// The first occurrence keeps its position but takes the newer value.
    #[default]
    ReplaceInPlace,
}

impl MergePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MergePolicy::KeepFirst => "keep-first",
            MergePolicy::KeepLast => "keep-last",
            MergePolicy::ReplaceInPlace => "replace-in-place",
        }
    }
}

impl fmt::Display for MergePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MergePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "keep-first" | "first" => Ok(MergePolicy::KeepFirst),
            "keep-last" | "last" => Ok(MergePolicy::KeepLast),
            "replace-in-place" | "replace" => Ok(MergePolicy::ReplaceInPlace),
            _ => Err(format!(
                "unknown merge policy '{s}' (expected keep-first, keep-last or replace-in-place)"
            )),
        }
    }
}

/// Case-insensitive comparison used for section names and keys
pub fn names_match(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

fn fold(name: &str) -> String {
    name.chars().flat_map(char::to_lowercase).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    name: String,
    lines: Vec<Line>,
}

impl Section {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lines in output order, including this section's header (if it has one)
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn properties(&self) -> impl Iterator<Item = (&str, &str)> {
        self.lines.iter().filter_map(|line| match line {
            Line::Property { key, value } => Some((key.as_str(), value.as_str())),
            _ => None,
        })
    }

    /// Value of `key`, compared case-insensitively
    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties()
            .find(|(k, _)| names_match(k, key))
            .map(|(_, v)| v)
    }

    fn property_index(&self, key: &str) -> Option<usize> {
        self.lines
            .iter()
            .position(|line| matches!(line, Line::Property { key: k, .. } if names_match(k, key)))
    }
}

/// How much folding happened while building a document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Section headers that switched back to an earlier section
    pub repeated_sections: usize,
    /// Properties whose key was already present in their section
    pub repeated_keys: usize,
}

impl MergeStats {
    pub fn is_empty(&self) -> bool {
        self.repeated_sections == 0 && self.repeated_keys == 0
    }
}

/// Sections in order of first appearance; [`GLOBAL_SECTION`] is always first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    sections: Vec<Section>,
    stats: MergeStats,
}

impl Document {
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn stats(&self) -> MergeStats {
        self.stats
    }

    pub fn global(&self) -> &Section {
        &self.sections[0]
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| names_match(&s.name, name))
    }

    /// Every line of every section, in output order
    pub fn lines(&self) -> impl Iterator<Item = &Line> {
        self.sections.iter().flat_map(|s| s.lines.iter())
    }
}

impl Default for Document {
    fn default() -> Self {
        Self {
            sections: vec![Section {
                name: GLOBAL_SECTION.to_string(),
                lines: vec![],
            }],
            stats: MergeStats::default(),
        }
    }
}

/// Builds a [`Document`] from classified lines, one at a time.
#[derive(Debug)]
pub struct DocumentBuilder {
    document: Document,
    // folded name -> index into document.sections
    index: HashMap<String, usize>,
    current: usize,
    policy: MergePolicy,
}

impl DocumentBuilder {
    pub fn new(policy: MergePolicy) -> Self {
        Self {
            document: Document::default(),
            index: HashMap::from([(fold(GLOBAL_SECTION), 0)]),
            current: 0,
            policy,
        }
    }

    pub fn policy(&self) -> MergePolicy {
        self.policy
    }

    /// Name of the section lines are currently going into
    pub fn current_section(&self) -> &str {
        &self.document.sections[self.current].name
    }

    pub fn push(&mut self, line: Line) {
        match line {
            Line::Section { name } => self.enter_section(name),
            Line::Property { key, value } => self.merge_property(key, value),
            other => self.document.sections[self.current].lines.push(other),
        }
    }

    pub fn finish(self) -> Document {
        self.document
    }

    fn enter_section(&mut self, name: String) {
        let folded = fold(&name);
        if let Some(&existing) = self.index.get(&folded) {
            self.current = existing;
            self.document.stats.repeated_sections += 1;
            return;
        }

        let sections = &mut self.document.sections;
        self.current = sections.len();
        self.index.insert(folded, self.current);
        sections.push(Section {
            lines: vec![Line::Section { name: name.clone() }],
            name,
        });
    }

    fn merge_property(&mut self, key: String, value: String) {
        let section = &mut self.document.sections[self.current];
        let Some(i) = section.property_index(&key) else {
            section.lines.push(Line::Property { key, value });
            return;
        };

        self.document.stats.repeated_keys += 1;
        match self.policy {
            MergePolicy::KeepFirst => {}
            MergePolicy::ReplaceInPlace => {
                if let Line::Property { value: existing, .. } = &mut section.lines[i] {
                    *existing = value;
                }
            }
            MergePolicy::KeepLast => {
                // The stored key keeps its first-seen casing.
                if let Line::Property { key: first_key, .. } = section.lines.remove(i) {
                    section.lines.push(Line::Property {
                        key: first_key,
                        value,
                    });
                }
            }
        }
    }
}

impl Default for DocumentBuilder {
    fn default() -> Self {
        Self::new(MergePolicy::default())
    }
}

impl Extend<Line> for DocumentBuilder {
    fn extend<T: IntoIterator<Item = Line>>(&mut self, iter: T) {
        for line in iter {
            self.push(line);
        }
    }
}
