use crate::colors::Colors;
use crate::config::MergeConfig;
use crate::document::MergeStats;
use crate::error::Error;
use similar::{ChangeTag, TextDiff};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    Normal,
    Quiet,
    Diff,
}

pub struct Config {
    pub check_only: bool,
    pub output_mode: OutputMode,
    pub merge: MergeConfig,
}

pub struct OutputContext {
    pub mode: OutputMode,
    pub colors: Colors,
    pub verbose: bool,
    pub show_progress: bool,
}

impl OutputContext {
    pub fn new(mode: OutputMode, use_colors: bool, verbose: bool, show_progress: bool) -> Self {
        Self {
            mode,
            colors: Colors::new(use_colors),
            verbose,
            show_progress,
        }
    }
}

#[derive(Debug, Default)]
pub struct RunResult {
    pub files_changed: usize,
    pub files_with_problems: usize,
    pub files_failed: usize,
    pub cancelled: bool,
}

impl RunResult {
    pub fn has_problems(&self) -> bool {
        self.files_with_problems > 0 || self.files_failed > 0
    }
}

fn describe_stats(stats: &MergeStats) -> Vec<String> {
    let mut lines = vec![];
    if stats.repeated_sections > 0 {
        lines.push(format!(
            "{} repeated section header(s) folded",
            stats.repeated_sections
        ));
    }
    if stats.repeated_keys > 0 {
        lines.push(format!("{} repeated key(s) merged", stats.repeated_keys));
    }
    if lines.is_empty() {
        lines.push("whitespace or line endings normalized".to_string());
    }
    lines
}

pub fn print_check_result(
    path: &Path,
    original: &str,
    merged: &str,
    stats: &MergeStats,
    ctx: &OutputContext,
) {
    match ctx.mode {
        OutputMode::Quiet => println!("{}", path.display()),
        OutputMode::Diff => print_diff(&path.display().to_string(), original, merged, ctx),
        OutputMode::Normal => {
            println!(
                "{}Would change:{} {}",
                ctx.colors.error,
                ctx.colors.reset(),
                path.display()
            );
            for line in describe_stats(stats) {
                println!("  - {line}");
            }
        }
    }
}

pub fn print_fix_result(
    path: &Path,
    original: &str,
    merged: &str,
    stats: &MergeStats,
    ctx: &OutputContext,
) {
    match ctx.mode {
        OutputMode::Quiet => println!("{}", path.display()),
        OutputMode::Diff => print_diff(&path.display().to_string(), original, merged, ctx),
        OutputMode::Normal => {
            println!(
                "{}Fixed:{} {}",
                ctx.colors.success,
                ctx.colors.reset(),
                path.display()
            );
            if ctx.verbose {
                for line in describe_stats(stats) {
                    println!("  - {line}");
                }
            }
        }
    }
}

pub fn print_checked(path: &Path, ctx: &OutputContext) {
    if ctx.mode == OutputMode::Quiet {
        return;
    }
    println!(
        "{}Checked:{} {}",
        ctx.colors.info,
        ctx.colors.reset(),
        path.display()
    );
}

pub fn print_skipped(path: &Path, reason: &str, ctx: &OutputContext) {
    if ctx.mode == OutputMode::Quiet {
        return;
    }
    println!(
        "{}Skipping {}: {}{}",
        ctx.colors.info,
        reason,
        ctx.colors.reset(),
        path.display()
    );
}

pub fn format_failure(path: &Path, error: &Error, ctx: &OutputContext) -> String {
    format!(
        "{}Error:{} {}: {error}",
        ctx.colors.error,
        ctx.colors.reset(),
        path.display()
    )
}

pub fn print_diff(label: &str, original: &str, merged: &str, ctx: &OutputContext) {
    let diff = TextDiff::from_lines(original, merged);

    println!("--- {label}");
    println!("+++ {label}");

    for (idx, group) in diff.grouped_ops(3).iter().enumerate() {
        if idx > 0 {
            println!();
        }

        for op in group {
            for change in diff.iter_changes(op) {
                let (sign, color) = match change.tag() {
                    ChangeTag::Delete => ('-', ctx.colors.removed),
                    ChangeTag::Insert => ('+', ctx.colors.added),
                    ChangeTag::Equal => (' ', ""),
                };
                print!("{color}{sign}{change}{}", ctx.colors.reset());
                if change.missing_newline() {
                    println!();
                }
            }
        }
    }
}

pub fn print_summary(result: &RunResult, config: &Config, ctx: &OutputContext) {
    if ctx.mode == OutputMode::Quiet {
        return;
    }

    let mut parts = vec![];
    if config.check_only && result.files_with_problems > 0 {
        parts.push(ctx.colors.paint(
            ctx.colors.error,
            &format!("{} files would change", result.files_with_problems),
        ));
    }
    if result.files_changed > 0 {
        parts.push(ctx.colors.paint(
            ctx.colors.success,
            &format!("{} files fixed", result.files_changed),
        ));
    }
    if result.files_failed > 0 {
        parts.push(ctx.colors.paint(
            ctx.colors.error,
            &format!("{} files failed", result.files_failed),
        ));
    }
    if result.cancelled {
        parts.push(ctx.colors.paint(ctx.colors.warning, "cancelled"));
    }

    if !parts.is_empty() {
        println!();
        println!("{}", parts.join(", "));
    }
}
