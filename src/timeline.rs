/*!
 * Cue timing lines: a start/end pair plus its decoration.
 *
 * `TimeLine::parse` is how the rest of the crate tells timing lines apart
 * from cue text: anything that does not parse is treated as text.
 */

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::SubtitleError;
use crate::time::{clock_candidates, Cursor, Time};

/// Separator written between SRT/VTT start and end times
pub const ARROW_SEPARATOR: &str = " --> ";

/// Separator written between SBV start and end times
pub const COMMA_SEPARATOR: &str = ",";

/// Start/end timing of one cue
#[derive(Debug, Clone, PartialEq)]
pub struct TimeLine {
    /// Cue start
    pub start_time: Time,

    /// Cue end
    pub end_time: Time,

    // @field: Literal text between the two times
    separator: String,

    // @field: Trailing cue settings, with one leading space when present
    extra_data: String,
}

impl TimeLine {
    /// Create an SRT-style timing line without trailing settings
    pub fn new(start_time: Time, end_time: Time) -> Self {
        Self {
            start_time,
            end_time,
            separator: ARROW_SEPARATOR.to_string(),
            extra_data: String::new(),
        }
    }

    /// Parse a cue timing line; `None` when the line is anything else
    pub fn parse(line: &str) -> Option<Self> {
        let cursor = Cursor::new(line).skip_whitespace();

        for (start, after_start) in clock_candidates(cursor) {
            let after_start = after_start.skip_whitespace();
            let (separator, after_separator) = if let Some(next) = after_start.eat("-->") {
                (ARROW_SEPARATOR, next)
            } else if let Some(next) = after_start.eat(",") {
                (COMMA_SEPARATOR, next)
            } else {
                continue;
            };

            // Whatever follows the end time is cue settings, so the first
            // reading of the end time always wins.
            let Some((end, rest)) = clock_candidates(after_separator.skip_whitespace())
                .into_iter()
                .next()
            else {
                continue;
            };

            let extra = rest.rest().trim();
            return Some(Self {
                start_time: start.to_time(),
                end_time: end.to_time(),
                separator: separator.to_string(),
                extra_data: if extra.is_empty() {
                    String::new()
                } else {
                    format!(" {}", extra)
                },
            });
        }

        None
    }

    /// Separator text as it will be written
    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Trailing cue settings without the leading space
    pub fn extra_data(&self) -> &str {
        self.extra_data.trim_start()
    }

    /// Render the line back to text
    pub fn format(&self) -> String {
        self.to_string()
    }

    /// Move both times by `offset` seconds
    #[must_use]
    pub fn shift(self, offset: f64) -> Self {
        Self {
            start_time: self.start_time.shift(offset),
            end_time: self.end_time.shift(offset),
            ..self
        }
    }

    /// Remap both times through the same two-point correction
    #[must_use]
    pub fn apply_linear_correction(self, original: &TimeLine, updated: &TimeLine) -> Self {
        Self {
            start_time: self.start_time.apply_linear_correction(original, updated),
            end_time: self.end_time.apply_linear_correction(original, updated),
            ..self
        }
    }

    /// Rewrite separator and time presentation, keeping the values
    #[must_use]
    pub fn convert(self, time_separator: &str, millis_separator: char, short_millis: bool) -> Self {
        Self {
            start_time: self.start_time.convert(millis_separator, short_millis),
            end_time: self.end_time.convert(millis_separator, short_millis),
            separator: time_separator.to_string(),
            ..self
        }
    }

    /// Rewrite the line in the conventions of `format`
    #[must_use]
    pub fn convert_to(self, format: SubtitleFormat) -> Self {
        self.convert(format.time_separator(), format.millis_separator(), format.short_millis())
    }

    /// Canonical SRT presentation
    #[must_use]
    pub fn normalize(self) -> Self {
        self.convert_to(SubtitleFormat::Srt)
    }
}

impl fmt::Display for TimeLine {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}{}{}", self.start_time, self.separator, self.end_time, self.extra_data)
    }
}

/// Timing conventions of the supported subtitle formats
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SubtitleFormat {
    /// SubRip: `00:00:01,000 --> 00:00:02,000`
    #[default]
    Srt,
    /// WebVTT: `00:00:01.000 --> 00:00:02.000`
    Vtt,
    /// YouTube SubViewer: `00:00:01.00,00:00:02.00`
    Sbv,
}

impl SubtitleFormat {
    pub fn time_separator(&self) -> &'static str {
        match self {
            Self::Srt | Self::Vtt => ARROW_SEPARATOR,
            Self::Sbv => COMMA_SEPARATOR,
        }
    }

    pub fn millis_separator(&self) -> char {
        match self {
            Self::Srt => ',',
            Self::Vtt | Self::Sbv => '.',
        }
    }

    pub fn short_millis(&self) -> bool {
        matches!(self, Self::Sbv)
    }

    /// File extension without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Srt => "srt",
            Self::Vtt => "vtt",
            Self::Sbv => "sbv",
        }
    }
}

impl fmt::Display for SubtitleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl FromStr for SubtitleFormat {
    type Err = SubtitleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_start_matches('.').to_lowercase().as_str() {
            "srt" => Ok(Self::Srt),
            "vtt" => Ok(Self::Vtt),
            "sbv" => Ok(Self::Sbv),
            _ => Err(SubtitleError::UnknownFormat(s.to_string())),
        }
    }
}
