use std::io::{self, IsTerminal};

const RESET: &str = "\x1b[0m";

/// ANSI escape codes for console output, all empty when colors are off
#[derive(Clone, Copy)]
pub struct Colors {
    pub error: &'static str,
    pub warning: &'static str,
    pub success: &'static str,
    pub info: &'static str,
    pub removed: &'static str,
    pub added: &'static str,
    enabled: bool,
}

impl Colors {
    pub fn new(enabled: bool) -> Self {
        if !enabled {
            return Self {
                error: "",
                warning: "",
                success: "",
                info: "",
                removed: "",
                added: "",
                enabled: false,
            };
        }

        Self {
            error: "\x1b[31m",   // Red
            warning: "\x1b[33m", // Yellow
            success: "\x1b[32m", // Green
            info: "\x1b[36m",    // Cyan
            removed: "\x1b[31m",
            added: "\x1b[32m",
            enabled: true,
        }
    }

    pub fn reset(&self) -> &'static str {
        if self.enabled {
            RESET
        } else {
            ""
        }
    }

    /// Wrap `text` in `color` and a reset
    pub fn paint(&self, color: &str, text: &str) -> String {
        format!("{color}{text}{}", self.reset())
    }
}

/// Priority: --no-color > --color > NO_COLOR env > TTY detection
pub fn should_use_colors(force_color: bool, no_color: bool) -> bool {
    if no_color {
        return false;
    }
    if force_color {
        return true;
    }
    if std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty()) {
        return false;
    }
    io::stdout().is_terminal()
}
