//! statusfmt - render status text to safe HTML

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{debug, warn};

use statusfmt_core::{ContentUnit, Directory, Formatter, FormatterConfig, Reference};
use statusfmt_renderer::{Renderer, Theme};

const DEFAULT_DOMAIN: &str = "localhost";

#[derive(Parser)]
#[command(name = "statusfmt")]
#[command(version, about = "Render status text to safe HTML", long_about = None)]
#[command(after_help = "EXAMPLES:
    statusfmt post.txt                        Format a local status
    statusfmt --mention alice post.txt        Link @alice from the directory
    statusfmt --remote --plaintext post.html  Strip a remote status to text
    statusfmt --finalize --page post.txt      Highlighted standalone preview")]
struct Cli {
    /// Input file; reads stdin when omitted
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Formatter config (TOML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Treat the input as HTML rendered by another server
    #[arg(long)]
    remote: bool,

    /// Format as a profile note
    #[arg(long, conflicts_with = "plaintext")]
    note: bool,

    /// Print plain text instead of HTML
    #[arg(long)]
    plaintext: bool,

    /// Account mentioned by the status (repeatable)
    #[arg(long = "mention", value_name = "ACCT")]
    mentions: Vec<String>,

    /// Highlight code and drop empty paragraphs
    #[arg(long)]
    finalize: bool,

    /// Wrap the output in a standalone HTML page
    #[arg(long)]
    page: bool,

    /// Color theme for highlighting and the page stylesheet
    #[arg(long, value_enum, default_value_t = ThemeArg::Auto)]
    theme: ThemeArg,

    /// More log output (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, ValueEnum)]
enum ThemeArg {
    Auto,
    Light,
    Dark,
}

impl From<ThemeArg> for Theme {
    fn from(theme: ThemeArg) -> Self {
        match theme {
            ThemeArg::Auto => Theme::Auto,
            ThemeArg::Light => Theme::Light,
            ThemeArg::Dark => Theme::Dark,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn run(cli: &Cli) -> Result<String> {
    let source = read_input(cli.input.as_deref())?;
    let config = match &cli.config {
        Some(path) => FormatterConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => FormatterConfig::new(DEFAULT_DOMAIN),
    };
    debug!("local domain {}", config.local_domain);

    let unit = if cli.remote {
        ContentUnit::remote(source)
    } else {
        let references = select_references(&config, &cli.mentions);
        ContentUnit::local(source).with_references(references)
    };
    let formatter = Formatter::new(config);

    if cli.plaintext {
        return Ok(formatter.plaintext(&unit));
    }

    let html = if cli.note {
        formatter.format_note(&unit)
    } else {
        formatter.format(&unit).context("failed to format status")?
    };

    let renderer = Renderer::new(cli.theme.into());
    let mut html = html.into_string();
    if cli.finalize {
        html = renderer.finalize(&html);
    }
    if cli.page {
        html = renderer.embed_html(&html, true);
    }
    Ok(html)
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read stdin")?;
            Ok(buffer)
        }
    }
}

/// Directory entries matching the accounts given with `--mention`.
fn select_references(config: &FormatterConfig, accts: &[String]) -> Vec<Reference> {
    let directory = config.build_directory();
    accts
        .iter()
        .filter_map(|acct| {
            let found = config
                .directory
                .iter()
                .find(|reference| directory.same_handle(&reference.acct(), acct))
                .cloned();
            if found.is_none() {
                warn!("ignoring --mention {acct}: not in the directory");
            }
            found
        })
        .collect()
}
