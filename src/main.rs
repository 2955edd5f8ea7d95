use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use inimerge::{
    editorconfig_line_ending, find_config_file, find_editorconfig, generate_init_file,
    load_config, merge_config, run, should_use_colors, CancelToken, CliMergeOptions, Config,
    InimergeToml, LineEnding, MergePolicy, OutputContext, OutputMode,
};
use tracing_subscriber::EnvFilter;

const EXIT_CANCELLED: u8 = 130;

#[derive(Parser)]
#[command(name = "inimerge")]
#[command(
    version,
    about = "Merge repeated sections and keys in INI-style files (.editorconfig, *.ini)"
)]
struct Cli {
    /// Target files or directories
    #[arg(required_unless_present = "init")]
    paths: Vec<String>,

    /// Check only (no modifications), exit 1 if any file would change
    #[arg(short, long)]
    check: bool,

    /// Show changes in diff format
    #[arg(short, long)]
    diff: bool,

    /// Output only changed file names
    #[arg(short, long)]
    quiet: bool,

    /// Also report unchanged and skipped files
    #[arg(short, long)]
    verbose: bool,

    /// How repeated keys are resolved: keep-first, keep-last or replace-in-place
    #[arg(long, value_name = "POLICY")]
    policy: Option<MergePolicy>,

    /// Line terminator for rewritten files: lf or crlf
    #[arg(long, value_name = "EOL")]
    line_ending: Option<LineEnding>,

    /// Bytes read per chunk
    #[arg(long, value_name = "BYTES")]
    chunk_size: Option<usize>,

    /// Generate a template inimerge.toml configuration file
    #[arg(long)]
    init: bool,

    /// Specify config file path (overrides auto-discovery)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Always use colors
    #[arg(long, conflicts_with = "no_color")]
    color: bool,

    /// Never use colors
    #[arg(long)]
    no_color: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    if cli.init {
        return handle_init();
    }

    let toml_config = load_configuration(&cli.config, cli.quiet);

    let cli_options = CliMergeOptions {
        policy: cli.policy,
        line_ending: cli.line_ending,
        chunk_size: cli.chunk_size,
    };

    // Priority: CLI > TOML > .editorconfig > defaults
    let merge = merge_config(
        &cli_options,
        toml_config.as_ref().map(|c| &c.merge),
        discover_line_ending(),
    );
    tracing::debug!(
        policy = %merge.policy,
        line_ending = %merge.line_ending,
        chunk_size = merge.chunk_size,
        "resolved settings"
    );

    let output_mode = if cli.quiet {
        OutputMode::Quiet
    } else if cli.diff {
        OutputMode::Diff
    } else {
        OutputMode::Normal
    };

    let config = Config {
        check_only: cli.check,
        output_mode,
        merge,
    };

    let ctx = OutputContext::new(
        output_mode,
        should_use_colors(cli.color, cli.no_color),
        cli.verbose,
        !cli.quiet && io::stderr().is_terminal(),
    );

    let cancel = install_cancel_handler();

    match run(&cli.paths, &config, &ctx, &cancel) {
        Ok(result) if result.cancelled => ExitCode::from(EXIT_CANCELLED),
        Ok(result) if result.has_problems() => ExitCode::from(1),
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "inimerge=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn install_cancel_handler() -> CancelToken {
    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        if !handler_token.is_cancelled() {
            eprintln!("\nInterrupted, abandoning the current file...");
        }
        handler_token.cancel();
    }) {
        tracing::warn!("failed to install Ctrl-C handler: {e}");
    }
    cancel
}

fn handle_init() -> ExitCode {
    match generate_init_file() {
        Ok(path) => {
            println!("Created {}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

fn load_configuration(explicit_path: &Option<PathBuf>, quiet: bool) -> Option<InimergeToml> {
    let config_path = explicit_path.clone().or_else(|| {
        std::env::current_dir()
            .ok()
            .and_then(|d| find_config_file(&d))
    });

    config_path.and_then(|p| match load_config(&p) {
        Ok(config) => {
            if !quiet {
                eprintln!("Using config: {}", p.display());
            }
            Some(config)
        }
        Err(e) => {
            eprintln!("Warning: Failed to load {}: {}", p.display(), e);
            None
        }
    })
}

fn discover_line_ending() -> Option<LineEnding> {
    let path = std::env::current_dir()
        .ok()
        .and_then(|d| find_editorconfig(&d))?;

    match editorconfig_line_ending(&path) {
        Ok(ending) => ending,
        Err(e) => {
            tracing::warn!("ignoring {}: {e}", path.display());
            None
        }
    }
}
