// SPDX-License-Identifier: PMPL-1.0-or-later
//! Contrastbot CLI - WCAG colour contrast linter for CSS
//!
//! Part of the gitbot-fleet ecosystem.

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use contrastbot::config::{default_config_path, load_config, Config};
use contrastbot::report::{generate_report, OutputFormat};
use contrastbot::{color_map, parse, prune_color_declarations, scanner, WcagLevel};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// WCAG colour contrast linter for CSS stylesheets
#[derive(Parser)]
#[command(name = "contrastbot")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lint every stylesheet under a directory
    Check {
        /// Directory to scan
        dir: PathBuf,

        /// WCAG conformance level (overrides the config file)
        #[arg(long)]
        level: Option<WcagLevelArg>,

        /// Output format
        #[arg(long, default_value = "text")]
        format: FormatArg,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Enable verbose logging
        #[arg(long, short)]
        verbose: bool,
    },

    /// Lint a single stylesheet
    Lint {
        /// Stylesheet to lint
        file: PathBuf,

        /// WCAG conformance level (overrides the config file)
        #[arg(long)]
        level: Option<WcagLevelArg>,

        /// Output format
        #[arg(long, default_value = "text")]
        format: FormatArg,

        /// Configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Enable verbose logging
        #[arg(long, short)]
        verbose: bool,
    },

    /// Print the stylesheet reduced to its colour declarations
    Prune {
        /// Stylesheet to prune
        file: PathBuf,

        /// Print the pruned document tree as JSON instead of CSS
        #[arg(long)]
        json: bool,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Enable verbose logging
        #[arg(long, short)]
        verbose: bool,
    },

    /// Print the effective foreground/background of each selector as JSON
    Colors {
        /// Stylesheet to inspect
        file: PathBuf,

        /// Enable verbose logging
        #[arg(long, short)]
        verbose: bool,
    },
}

/// WCAG conformance level CLI argument
#[derive(Debug, Clone, Copy, ValueEnum)]
enum WcagLevelArg {
    /// Level AA - 4.5:1
    Aa,
    /// Level AAA - 7:1
    Aaa,
}

impl From<WcagLevelArg> for WcagLevel {
    fn from(arg: WcagLevelArg) -> Self {
        match arg {
            WcagLevelArg::Aa => WcagLevel::AA,
            WcagLevelArg::Aaa => WcagLevel::AAA,
        }
    }
}

/// Output format CLI argument
#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    /// Human-readable text
    Text,
    /// Structured JSON
    Json,
    /// SARIF for IDE/CI
    Sarif,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Json => OutputFormat::Json,
            FormatArg::Sarif => OutputFormat::Sarif,
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("contrastbot=debug")
    } else {
        EnvFilter::new("contrastbot=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Load the config file and apply a CLI level override
fn resolve_config(path: Option<&Path>, level: Option<WcagLevelArg>) -> anyhow::Result<Config> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    let mut config = load_config(&path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    if let Some(level) = level {
        config.lint.level = level.into();
        config.lint.min_ratio = None;
    }
    Ok(config)
}

fn read_stylesheet(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check { dir, level, format, output, config, verbose } => {
            init_logging(verbose);
            let config = resolve_config(config.as_deref(), level)?;
            let files = scanner::scan_directory(&dir, &config)?;
            let report = generate_report(&files, format.into());
            write_output(&report, output.as_deref())?;

            if files.iter().any(|f| f.has_errors()) {
                std::process::exit(1);
            }
        }

        Commands::Lint { file, level, format, config, verbose } => {
            init_logging(verbose);
            let config = resolve_config(config.as_deref(), level)?;
            let result = scanner::scan_file(&file, &config.lint)?;
            let report = generate_report(std::slice::from_ref(&result), format.into());
            println!("{}", report);

            if result.has_errors() {
                std::process::exit(1);
            }
        }

        Commands::Prune { file, json, output, verbose } => {
            init_logging(verbose);
            let css = read_stylesheet(&file)?;
            let doc = parse(&css).with_context(|| format!("Error parsing {}", file.display()))?;
            let pruned = prune_color_declarations(&doc);
            let rendered = if json {
                serde_json::to_string_pretty(&pruned)?
            } else {
                pruned.to_string()
            };
            write_output(&rendered, output.as_deref())?;
        }

        Commands::Colors { file, verbose } => {
            init_logging(verbose);
            let css = read_stylesheet(&file)?;
            let doc = parse(&css).with_context(|| format!("Error parsing {}", file.display()))?;
            match color_map(&doc) {
                Some(map) => println!("{}", serde_json::to_string_pretty(&map)?),
                None => println!("null"),
            }
        }
    }

    Ok(())
}

/// Write output to file or stdout
fn write_output(content: &str, path: Option<&Path>) -> anyhow::Result<()> {
    match path {
        Some(p) => {
            std::fs::write(p, content)?;
            eprintln!("Output written to {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
