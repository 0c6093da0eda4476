// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;

use subshift::app_config::{Config, LogLevel};
use subshift::app_controller::{parse_offset, Controller, EditCommand, RunOptions};
use subshift::frame::ReorderKey;
use subshift::subtitle_processor::LineRange;
use subshift::timeline::SubtitleFormat;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

/// CLI Wrapper for SubtitleFormat to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliSubtitleFormat {
    Srt,
    Vtt,
    Sbv,
}

impl From<CliSubtitleFormat> for SubtitleFormat {
    fn from(cli_format: CliSubtitleFormat) -> Self {
        match cli_format {
            CliSubtitleFormat::Srt => SubtitleFormat::Srt,
            CliSubtitleFormat::Vtt => SubtitleFormat::Vtt,
            CliSubtitleFormat::Sbv => SubtitleFormat::Sbv,
        }
    }
}

/// CLI Wrapper for ReorderKey to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliReorderKey {
    Sequence,
    Time,
}

impl From<CliReorderKey> for ReorderKey {
    fn from(cli_key: CliReorderKey) -> Self {
        match cli_key {
            CliReorderKey::Sequence => ReorderKey::Sequence,
            CliReorderKey::Time => ReorderKey::Time,
        }
    }
}

/// Flags shared by every editing command
#[derive(Args, Debug)]
struct CommonArgs {
    /// Subtitle file, or directory processed recursively
    #[arg(value_name = "PATH")]
    input_path: PathBuf,

    /// Output file (or directory when PATH is a directory); defaults to editing in place
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Limit the command to lines START-END (1-based, inclusive, repeatable)
    #[arg(long = "lines", value_name = "START-END")]
    lines: Vec<LineRange>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Shift every time by an offset
    Shift {
        #[command(flatten)]
        common: CommonArgs,

        /// Offset as a time (-00:00:02,500) or in seconds (-2.5)
        #[arg(long, allow_hyphen_values = true)]
        offset: String,
    },

    /// Fix drift with two reference points
    Correct {
        #[command(flatten)]
        common: CommonArgs,

        /// First reference "old -> new", or only the new time of the first cue
        #[arg(long, allow_hyphen_values = true)]
        first: String,

        /// Second reference "old -> new", or only the new time of the last cue
        #[arg(long, allow_hyphen_values = true)]
        second: String,
    },

    /// Rewrite timing lines in another format's conventions
    Convert {
        #[command(flatten)]
        common: CommonArgs,

        /// Target format
        #[arg(long, value_enum)]
        to: CliSubtitleFormat,
    },

    /// Number cue blocks 1..n in document order
    Renumber {
        #[command(flatten)]
        common: CommonArgs,
    },

    /// Sort cue blocks
    Reorder {
        #[command(flatten)]
        common: CommonArgs,

        /// Sort key (defaults to the configured one)
        #[arg(long, value_enum)]
        by: Option<CliReorderKey>,
    },

    /// Translate cue text with the configured Ollama server
    Translate {
        #[command(flatten)]
        common: CommonArgs,

        /// Source language code (e.g., 'en', 'es', 'fr')
        #[arg(short, long)]
        source_language: Option<String>,

        /// Target language code (e.g., 'en', 'es', 'fr')
        #[arg(short, long)]
        target_language: Option<String>,

        /// Model name to use for translation
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Generate shell completions for subshift
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Commands {
    fn common(&self) -> Option<&CommonArgs> {
        match self {
            Self::Shift { common, .. }
            | Self::Correct { common, .. }
            | Self::Convert { common, .. }
            | Self::Renumber { common }
            | Self::Reorder { common, .. }
            | Self::Translate { common, .. } => Some(common),
            Self::Completions { .. } => None,
        }
    }

    // @applies: Command-line overrides of the configuration
    fn apply_overrides(&self, config: &mut Config) {
        if let Self::Translate {
            source_language,
            target_language,
            model,
            ..
        } = self
        {
            if let Some(source_language) = source_language {
                config.source_language = source_language.clone();
            }
            if let Some(target_language) = target_language {
                config.target_language = target_language.clone();
            }
            if let Some(model) = model {
                config.translation.model = model.clone();
            }
        }
    }

    fn to_edit_command(&self, config: &Config) -> Result<EditCommand> {
        Ok(match self {
            Self::Shift { offset, .. } => EditCommand::Shift {
                offset: parse_offset(offset)?,
            },
            Self::Correct { first, second, .. } => EditCommand::Correct {
                first: first.clone(),
                second: second.clone(),
            },
            Self::Convert { to, .. } => EditCommand::Convert { format: (*to).into() },
            Self::Renumber { .. } => EditCommand::Renumber,
            Self::Reorder { by, .. } => EditCommand::Reorder {
                key: by.map_or(config.editing.default_reorder, Into::into),
            },
            Self::Translate { .. } => EditCommand::Translate,
            Self::Completions { .. } => return Err(anyhow!("Completions are not an editing command")),
        })
    }
}

/// subshift - subtitle timing editor
///
/// Shifts, corrects, converts, renumbers, reorders and translates SRT, VTT
/// and SBV subtitle files.
#[derive(Parser, Debug)]
#[command(name = "subshift")]
#[command(version)]
#[command(about = "Subtitle timing editor")]
#[command(long_about = "subshift rewrites the timestamps of SRT, VTT and SBV subtitle files.

EXAMPLES:
    subshift shift movie.srt --offset -00:00:02,500        # Show subtitles 2.5s earlier
    subshift shift movie.srt --offset 1.2 --lines 10-40    # Only lines 10 to 40
    subshift correct movie.srt --first 00:00:12,000 --second 01:31:02,500
    subshift correct movie.srt --first \"00:00:10,000 -> 00:00:12,000\" --second \"01:30:00,000 -> 01:31:02,500\"
    subshift convert movie.srt --to vtt -o movie.vtt
    subshift reorder movie.srt --by time
    subshift translate -t es movie.srt                     # Writes movie.es.srt
    subshift renumber /series/                             # Every subtitle file in place
    subshift completions bash > subshift.bash

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,
}

// @struct: Custom logger implementation, filtered by the global max level
struct CustomLogger;

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI colour and emoji for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("\x1B[1;31m", "❌ "),
            Level::Warn => ("\x1B[1;33m", "🚧 "),
            Level::Info => ("\x1B[1;32m", " "),
            Level::Debug => ("\x1B[1;36m", "🔍 "),
            Level::Trace => ("\x1B[1;35m", "📋 "),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (colour, emoji) = Self::style_for_level(record.level());
            let _ = writeln!(std::io::stderr(), "{}{} {} {}\x1B[0m", colour, now, emoji, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // The max level is raised or lowered once the config is known
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "subshift", &mut std::io::stdout());
        return Ok(());
    }

    run_command(cli.command).await
}

async fn run_command(command: Commands) -> Result<()> {
    let common = command
        .common()
        .ok_or_else(|| anyhow!("Missing subtitle path"))?;

    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = common.log_level {
        log::set_max_level(LogLevel::from(cmd_log_level).into());
    }

    let mut config = Config::load_or_create(&common.config_path)?;
    command.apply_overrides(&mut config);
    if let Some(log_level) = common.log_level {
        config.log_level = log_level.into();
    }

    config.validate().context("Configuration validation failed")?;

    // If log level was not set via command line, update it from config now
    if common.log_level.is_none() {
        log::set_max_level(config.log_level.into());
    }

    let edit_command = command.to_edit_command(&config)?;
    let options = RunOptions {
        output: common.output.clone(),
        force_overwrite: common.force_overwrite,
        selections: common.lines.clone(),
    };

    let controller = Controller::with_config(config)?;
    let summary = controller.run(&common.input_path, &edit_command, &options).await?;

    if summary.failed > 0 {
        return Err(anyhow!("{} file(s) failed", summary.failed));
    }
    if summary.written == 0 && summary.unchanged > 0 {
        info!("Nothing to write, every file was already up to date");
    }
    Ok(())
}
