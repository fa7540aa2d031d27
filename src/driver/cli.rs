use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use crossterm::style::Stylize;
use thiserror::Error;

use crate::description::{NumericField, RegisterDescription, SectionSpec};
use crate::error::RegartError;
use crate::logging::{LogLevel, Logger, LoggingError, json_kv};
use crate::render::{RegisterRenderer, RendererSettings};
use crate::sections::ResolveMode;

const LOG_TARGET: &str = "regart::driver";

pub type DriverResult<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Render(#[from] RegartError),
    #[error("invalid section syntax `{0}`, expected name@from:to or name@bit")]
    InvalidSectionSyntax(String),
    #[error("could not read `{path}`: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid register description: {0}")]
    Json(#[from] serde_json::Error),
    #[error("logging error: {0}")]
    Logging(#[from] LoggingError),
}

const LONG_ABOUT: &str = "\
The responsive register drawing tool.

Every option is optional. Without any, an 8 bit register named REG is drawn.
The section row only appears when sections are defined, and sections must
fill the whole register unless --forgive is given.

Example:

  $ regart -n REGA -a 0x123 -s STATUS@7:5 -s CARRY@4 -s ENABLE@3 -s SUM@2:0
  /*---------------------------------------#
  | REGA                             0x123 |
  #----------------------------------------#
  | STATUS    | CARRY | ENABLE | SUM       |
  #----------------------------------------#
  | 7 | 6 | 5 | 4     | 3      | 2 | 1 | 0 |
  #---------------------------------------*/

Addresses and widths accept decimal or 0x-prefixed hexadecimal values.";

/// Command-line arguments for the `regart` binary.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "regart", version, about = "Draw ASCII register diagrams", long_about = LONG_ABOUT)]
pub struct CliArgs {
    /// Name of the register. Default: REG.
    #[arg(short, long)]
    pub name: Option<String>,

    /// Register address, decimal or 0x-prefixed hex. Not shown by default.
    #[arg(short, long)]
    pub address: Option<String>,

    /// Register width in bits. Default: 8.
    #[arg(short, long)]
    pub width: Option<String>,

    /// Section definition: "name@from:to" (either order, inclusive) or "name@bit".
    #[arg(short = 's', long = "section", value_name = "NAME@FROM[:TO]")]
    pub sections: Vec<String>,

    /// Drop overlapping sections and fill gaps instead of failing.
    #[arg(short, long)]
    pub forgive: bool,

    /// Load a register description from a JSON file; flags override it.
    #[arg(short, long, value_name = "FILE")]
    pub json: Option<PathBuf>,

    /// Append structured JSON-lines logs to FILE.
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

/// Driver configuration knobs.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Optional structured logger; the driver is silent without one.
    pub logger: Option<Logger>,
    /// Colour error reports.
    pub color: bool,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            logger: None,
            color: true,
        }
    }
}

/// Parse a `name@from:to` or `name@bit` section string.
pub fn parse_section(raw: &str) -> DriverResult<(String, SectionSpec)> {
    let invalid = || CliError::InvalidSectionSyntax(raw.to_string());
    let (name, range) = raw.split_once('@').ok_or_else(invalid)?;
    if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return Err(invalid());
    }

    let bit = |text: &str| -> DriverResult<u64> {
        if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        text.parse().map_err(|_| invalid())
    };

    let (position, size) = match range.split_once(':') {
        Some((from, to)) => {
            let (a, b) = (bit(from)?, bit(to)?);
            let size = a.abs_diff(b).checked_add(1).ok_or_else(invalid)?;
            (a.min(b), size)
        }
        None => (bit(range)?, 1),
    };

    Ok((name.to_string(), SectionSpec::new(position, size)))
}

/// Runs one render request from parsed arguments to printed output.
#[derive(Debug, Clone, Default)]
pub struct CliDriver {
    config: DriverConfig,
}

impl CliDriver {
    pub fn new(config: DriverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Merge the optional JSON file with the command-line flags.
    pub fn build_description(&self, args: &CliArgs) -> DriverResult<RegisterDescription> {
        let mut description = match &args.json {
            Some(path) => {
                let text = fs::read_to_string(path).map_err(|source| CliError::Read {
                    path: path.clone(),
                    source,
                })?;
                serde_json::from_str(&text)?
            }
            None => RegisterDescription::new(),
        };

        if let Some(name) = &args.name {
            description.name = Some(name.clone());
        }
        if let Some(address) = &args.address {
            description.address = Some(NumericField::from(address.as_str()));
        }
        if let Some(width) = &args.width {
            description.width = Some(NumericField::from(width.as_str()));
        }
        if !args.sections.is_empty() {
            let sections = description.sections.get_or_insert_with(Default::default);
            for raw in &args.sections {
                let (name, spec) = parse_section(raw)?;
                sections.insert(name, spec);
            }
        }

        Ok(description)
    }

    /// Render the register described by `args` into `out`.
    pub fn run(&self, args: &CliArgs, out: &mut impl Write) -> DriverResult<()> {
        let result = self.run_inner(args, out);
        if let Err(err) = &result {
            // The render error is what gets reported, even if the sink fails too.
            self.log(LogLevel::Error, "render_failed", vec![json_kv(
                "error",
                err.to_string(),
            )])
            .ok();
        }
        result
    }

    fn run_inner(&self, args: &CliArgs, out: &mut impl Write) -> DriverResult<()> {
        let description = self.build_description(args)?;
        let mode = ResolveMode::from_forgiveness(args.forgive);
        let started = self.log(LogLevel::Debug, "render_started", vec![
            json_kv("forgive", args.forgive),
            json_kv("flag_sections", args.sections.len()),
        ]);

        let diagram = RegisterRenderer::new(RendererSettings { mode }).prepare(&description)?;
        started?;
        let text = diagram.draw();
        out.write_all(text.as_bytes())?;
        out.flush()?;

        self.log(LogLevel::Info, "render_completed", vec![
            json_kv("name", diagram.register.name.as_str()),
            json_kv("width", diagram.register.width),
            json_kv("sections", diagram.sections.len()),
            json_kv("columns", diagram.layout.global_width),
            json_kv("lines", text.lines().count()),
        ])?;
        Ok(())
    }

    /// Write the one-line error report, red when colour is enabled.
    pub fn report_error(&self, err: &CliError, out: &mut impl Write) -> io::Result<()> {
        let message = err.to_string();
        if self.config.color {
            writeln!(out, "{}", message.red())
        } else {
            writeln!(out, "{message}")
        }
    }

    fn log(
        &self,
        level: LogLevel,
        message: &str,
        fields: Vec<(String, serde_json::Value)>,
    ) -> DriverResult<()> {
        if let Some(logger) = &self.config.logger {
            logger.log_with_fields(level, LOG_TARGET, message, fields.into_iter().collect())?;
        }
        Ok(())
    }
}
