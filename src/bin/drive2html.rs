#![forbid(unsafe_code)]

//! Prints the direct stream links behind a Google Drive video link.

use anyhow::{Context, Result, bail};
use clap::error::ErrorKind;
use clap::{ArgAction, Parser};
use drive2html::config::{DEFAULT_CONFIG_PATH, RuntimeSettings, load_settings_from};
use drive2html::fetch::{Fetcher, HttpPageSource};
use drive2html::report::{OutputMode, render};
use drive2html::{Error, extract_streams, logging};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

/// Exit code for command lines clap cannot make sense of (BSD `EX_USAGE`).
const USAGE_EXIT_CODE: u8 = 64;

#[derive(Parser, Debug)]
#[command(version, about = "Extract direct video links from a Google Drive file page.")]
struct Cli {
    #[arg(value_name = "LINK", help = "Google Drive link")]
    link: Option<String>,
    #[arg(
        value_name = "JSON",
        allow_hyphen_values = true,
        help = "Output to json format (any value enables it)"
    )]
    json_marker: Option<String>,
    #[arg(
        value_name = "EXTRA",
        allow_hyphen_values = true,
        num_args = 0..,
        hide = true
    )]
    extra: Vec<String>,
    #[arg(long = "json", help = "Output to json format")]
    json: bool,
    #[arg(long = "config", value_name = "PATH", default_value = DEFAULT_CONFIG_PATH, help = "Path to the config file")]
    config: PathBuf,
    #[arg(
        long = "max-attempts",
        value_name = "N",
        help = "Maximum page fetch attempts before giving up"
    )]
    max_attempts: Option<u32>,
    #[arg(
        long = "drive-host",
        value_name = "HOST",
        help = "Host used to build the view page URL"
    )]
    drive_host: Option<String>,
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, help = "Log more (repeat for debug)")]
    verbose: u8,
}

impl Cli {
    /// JSON when `--json` is given or exactly one argument follows LINK.
    /// More trailing arguments fall back to text.
    fn output_mode(&self) -> OutputMode {
        let marker = self.json_marker.is_some() && self.extra.is_empty();
        OutputMode::from_json_flag(self.json || marker)
    }

    fn apply_overrides(&self, mut settings: RuntimeSettings) -> Result<RuntimeSettings> {
        if let Some(attempts) = self.max_attempts {
            if attempts == 0 {
                bail!("--max-attempts must be at least 1");
            }
            settings.retry.max_attempts = attempts;
        }
        if let Some(host) = &self.drive_host {
            settings.drive_host = host.clone();
        }
        settings.log_level = logging::level_for_verbosity(&settings.log_level, self.verbose);
        Ok(settings)
    }
}

fn usage() -> String {
    let name = env!("CARGO_PKG_NAME");
    format!(
        "{name} {}\nUsage: {name} LINK [JSON]\n\tLINK - Google Drive link\n\tJSON - Output to json format\n",
        env!("CARGO_PKG_VERSION")
    )
}

fn usage_error_code(err: &clap::Error) -> u8 {
    match err.kind() {
        ErrorKind::DisplayHelp
        | ErrorKind::DisplayVersion
        | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => 0,
        _ => USAGE_EXIT_CODE,
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return ExitCode::from(usage_error_code(&err));
        }
    };
    let Some(link) = cli.link.as_deref() else {
        println!("{}", usage());
        return ExitCode::SUCCESS;
    };

    match run(&cli, link) {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{}", diagnostic(&err));
            ExitCode::from(exit_code(&err))
        }
    }
}

fn run(cli: &Cli, link: &str) -> Result<String> {
    let settings = load_settings_from(&cli.config)
        .and_then(|settings| cli.apply_overrides(settings))
        .context("loading configuration")?;
    logging::init(&settings.log_level);
    debug!(?settings, "settings loaded");

    let source = HttpPageSource::new(settings.timeout, &settings.user_agent);
    let fetcher = Fetcher::new(source, settings.retry);
    let streams = extract_streams(link, &settings.drive_host, &fetcher)?;

    let mode = cli.output_mode();
    let mut output = render(&streams, mode).context("rendering streams")?;
    if mode == OutputMode::Json {
        output.push('\n');
    }
    Ok(output)
}

fn diagnostic(err: &anyhow::Error) -> String {
    match err.downcast_ref::<Error>() {
        Some(Error::ManifestNotFound) => {
            "Error while parsing Google Drive response: stream manifest not found (page format may have changed)".to_string()
        }
        Some(inner) => inner.to_string(),
        None => format!("{err:#}"),
    }
}

fn exit_code(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<Error>().map(Error::exit_code).unwrap_or(1)
}
