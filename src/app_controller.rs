use anyhow::{anyhow, Context, Result};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use crate::app_config::Config;
use crate::correction::{LinearCorrection, TimeMapping};
use crate::errors::{AppError, SubtitleError};
use crate::file_utils::FileManager;
use crate::frame::ReorderKey;
use crate::language_utils;
use crate::providers::ollama::Ollama;
use crate::providers::Provider;
use crate::subtitle_processor::{LineEdit, LineRange, SubtitleDocument};
use crate::time::Time;
use crate::timeline::SubtitleFormat;
use crate::translation::BatchTranslator;

// @module: Application controller running one command over files

/// Command applied to every processed document
#[derive(Debug, Clone, PartialEq)]
pub enum EditCommand {
    /// Move every time by a signed number of seconds
    Shift { offset: f64 },
    /// Two-point linear correction; each mapping is `old -> new` or a bare
    /// new time for the first/last cue
    Correct { first: String, second: String },
    /// Rewrite timing lines in another format's conventions
    Convert { format: SubtitleFormat },
    /// Number cue blocks 1..n
    Renumber,
    /// Sort cue blocks
    Reorder { key: ReorderKey },
    /// Translate cue text with the configured languages
    Translate,
}

impl EditCommand {
    fn uses_selection(&self) -> bool {
        !matches!(self, Self::Renumber | Self::Reorder { .. })
    }
}

/// Parse a shift offset, either as a time (`-00:00:02,500`) or as seconds (`-2.5`)
pub fn parse_offset(text: &str) -> Result<f64, SubtitleError> {
    Time::try_parse(text)
        .map(|time| time.value)
        .or_else(|| text.trim().parse::<f64>().ok().filter(|seconds| seconds.is_finite()))
        .ok_or_else(|| SubtitleError::InvalidTime(text.to_string()))
}

/// Where and how results are written
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    // @field: Output file, or output directory in folder mode
    pub output: Option<PathBuf>,

    // @field: Overwrite existing output files
    pub force_overwrite: bool,

    // @field: Line ranges the command is limited to; empty means all lines
    pub selections: Vec<LineRange>,
}

/// Outcome counts of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub written: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Main application controller for subtitle editing
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: Translator over the configured provider
    translator: BatchTranslator,
}

impl Controller {
    // @method: Create a controller talking to the configured Ollama server
    pub fn with_config(config: Config) -> Result<Self> {
        let translation = &config.translation;
        let provider = Ollama::new(&translation.endpoint, &translation.model, translation.timeout_secs)
            .with_temperature(translation.temperature)
            .with_system_prompt(&translation.system_prompt)
            .with_retries(translation.retry_count, translation.retry_backoff_ms);

        Ok(Self::with_provider(config, Arc::new(provider)))
    }

    // @method: Create a controller over any provider
    pub fn with_provider(config: Config, provider: Arc<dyn Provider>) -> Self {
        let translator = BatchTranslator::new(
            provider,
            config.translation.max_chars_per_request,
            config.translation.concurrent_requests,
        )
        .with_retry_individual_lines(config.translation.retry_individual_lines);

        Self { config, translator }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run `command` on one document and return the edited document
    pub async fn process_document(
        &self,
        document: SubtitleDocument,
        command: &EditCommand,
        selections: &[LineRange],
    ) -> Result<SubtitleDocument, AppError> {
        if !selections.is_empty() && !command.uses_selection() {
            warn!("Line selection is ignored by {:?}, it works on whole cue blocks", command);
        }

        let edits: Vec<LineEdit> = match command {
            EditCommand::Shift { offset } => document.shift_edits(*offset, selections),
            EditCommand::Correct { first, second } => {
                let first = TimeMapping::parse_with_default(first, document.first_timeline().map(|line| line.start_time))?;
                let second = TimeMapping::parse_with_default(second, document.last_timeline().map(|line| line.start_time))?;
                info!("Correcting with {} and {}", first, second);
                let correction = LinearCorrection::new(first, second)?;
                document.correction_edits(&correction, selections)
            }
            EditCommand::Convert { format } => document.convert_edits(*format, selections),
            EditCommand::Renumber => document.renumber_edits(),
            EditCommand::Reorder { key } => return Ok(document.reordered(*key)),
            EditCommand::Translate => {
                let source = &self.config.source_language;
                let target = &self.config.target_language;
                if language_utils::language_codes_match(source, target) {
                    warn!("Source and target languages are the same ({})", target);
                }
                debug!("Translating from {} to {}", language_label(source), language_label(target));
                self.translator
                    .translate_document(&document, selections, source, target)
                    .await?
            }
        };

        debug!("{} line edits", edits.len());
        Ok(document.with_edits(&edits)?)
    }

    /// Path a translated copy of `input` is written to, `movie.srt` -> `movie.fr.srt`
    pub fn translation_output_path(&self, input: &Path) -> PathBuf {
        let language = language_utils::normalize_to_part1_or_part2t(&self.config.target_language)
            .unwrap_or_else(|_| self.config.target_language.to_lowercase());
        let extension = input
            .extension()
            .map(|ext| ext.to_string_lossy().to_string())
            .unwrap_or_else(|| SubtitleFormat::default().extension().to_string());
        let directory = input.parent().unwrap_or(Path::new(""));

        FileManager::generate_output_path(input, directory, &language, &extension)
    }

    /// Read `input`, run `command`, and write the result to `output`.
    /// Returns false when nothing changed and nothing was written.
    pub async fn process_file(
        &self,
        input: &Path,
        output: &Path,
        command: &EditCommand,
        selections: &[LineRange],
    ) -> Result<bool> {
        if let EditCommand::Convert { format } = command {
            if let Some(existing) = FileManager::format_for(output).filter(|existing| existing != format) {
                warn!("Writing {} timings to {:?}, which is named as {}", format, output, existing);
            }
        }

        let content = FileManager::read_to_string(input)?;
        let document = SubtitleDocument::parse(&content);
        let updated = self
            .process_document(document, command, selections)
            .await
            .with_context(|| format!("Failed to process {:?}", input))?
            .to_string();

        if updated == content && input == output {
            info!("No lines changed in {:?}", input);
            return Ok(false);
        }

        FileManager::write_to_file(output, &updated)?;
        info!("Success: {:?}", output);
        Ok(true)
    }

    /// Run `command` on a file or on every subtitle file under a directory
    pub async fn run(&self, input: &Path, command: &EditCommand, options: &RunOptions) -> Result<RunSummary> {
        let start_time = Instant::now();

        if *command == EditCommand::Translate {
            if let Err(e) = self.translator.test_connection().await {
                warn!("Translation provider is not reachable ({}), requests may fail", e);
            }
        }

        let summary = if FileManager::file_exists(input) {
            let output = match &options.output {
                Some(output) => output.clone(),
                None => self.default_output(input, command),
            };
            let mut summary = RunSummary::default();
            self.run_one(input, &output, command, options, &mut summary).await?;
            summary
        } else if FileManager::dir_exists(input) {
            self.run_folder(input, command, options).await?
        } else {
            return Err(anyhow!("Input path does not exist: {:?}", input));
        };

        debug!("Finished in {:?}: {:?}", start_time.elapsed(), summary);
        Ok(summary)
    }

    fn default_output(&self, input: &Path, command: &EditCommand) -> PathBuf {
        match command {
            EditCommand::Translate => self.translation_output_path(input),
            _ => input.to_path_buf(),
        }
    }

    async fn run_one(
        &self,
        input: &Path,
        output: &Path,
        command: &EditCommand,
        options: &RunOptions,
        summary: &mut RunSummary,
    ) -> Result<()> {
        if output != input && output.exists() && !options.force_overwrite {
            warn!("Skipping {:?}, output already exists (use -f to force overwrite)", output);
            summary.skipped += 1;
            return Ok(());
        }

        if self.process_file(input, output, command, &options.selections).await? {
            summary.written += 1;
        } else {
            summary.unchanged += 1;
        }
        Ok(())
    }

    async fn run_folder(&self, input_dir: &Path, command: &EditCommand, options: &RunOptions) -> Result<RunSummary> {
        let mut files = FileManager::find_subtitle_files(input_dir, &self.config.editing.extensions)?;

        // Skip translations written by an earlier run
        if *command == EditCommand::Translate {
            files.retain(|file| !self.is_translation_output(file));
        }

        if files.is_empty() {
            return Err(anyhow!("No subtitle files found in directory: {:?}", input_dir));
        }
        info!("Processing {} files in {:?}", files.len(), input_dir);

        let mut summary = RunSummary::default();
        for file in &files {
            let mut output = match &options.output {
                Some(output_dir) => output_dir.join(file.strip_prefix(input_dir).unwrap_or(file)),
                None => file.clone(),
            };
            if *command == EditCommand::Translate {
                output = self.translation_output_path(&output);
            }

            if let Err(e) = self.run_one(file, &output, command, options, &mut summary).await {
                error!("Error processing file {:?}: {:#}", file, e);
                summary.failed += 1;
            }
        }

        info!(
            "Finished: {} written, {} unchanged, {} skipped, {} failed",
            summary.written, summary.unchanged, summary.skipped, summary.failed
        );
        Ok(summary)
    }

    /// Whether a file name already carries the target language tag
    fn is_translation_output(&self, file: &Path) -> bool {
        let Some(stem) = file.file_stem().map(|stem| stem.to_string_lossy().to_string()) else {
            return false;
        };
        stem.rsplit_once('.')
            .is_some_and(|(_, tag)| language_utils::language_codes_match(tag, &self.config.target_language))
    }
}

/// English name of a language code, or the code itself when unknown
fn language_label(code: &str) -> String {
    language_utils::get_language_name(code).unwrap_or_else(|_| code.to_string())
}
