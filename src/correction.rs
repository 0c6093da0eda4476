/*!
 * Two-point linear drift correction.
 *
 * The user names two cues by their current time and the time they should
 * really appear at (`old -> new`). Every other time is remapped through the
 * straight line passing through both points, which fixes both a constant
 * offset and a frame-rate drift in one pass.
 */

use std::fmt;
use std::str::FromStr;

use log::debug;

use crate::errors::SubtitleError;
use crate::time::Time;
use crate::timeline::TimeLine;

/// Token between the old and the new time of a mapping
const MAPPING_ARROW: &str = "->";

/// One reference point: the time a cue has now, and the time it should have
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeMapping {
    pub old: Time,
    pub new: Time,
}

impl TimeMapping {
    pub fn new(old: Time, new: Time) -> Self {
        Self { old, new }
    }

    /// Parse `old -> new`, or a bare `new` when a default old time is known
    /// (the user only types where the cue should be).
    pub fn parse_with_default(text: &str, default_old: Option<Time>) -> Result<Self, SubtitleError> {
        if text.contains(MAPPING_ARROW) {
            return text.parse();
        }
        match (default_old, Time::try_parse(text)) {
            (Some(old), Some(new)) => Ok(Self::new(old, new)),
            _ => Err(SubtitleError::InvalidMapping(text.to_string())),
        }
    }
}

impl FromStr for TimeMapping {
    type Err = SubtitleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SubtitleError::InvalidMapping(s.to_string());
        let (old, new) = s.split_once(MAPPING_ARROW).ok_or_else(invalid)?;
        let old = Time::try_parse(old).ok_or_else(invalid)?;
        let new = Time::try_parse(new).ok_or_else(invalid)?;
        Ok(Self::new(old, new))
    }
}

impl fmt::Display for TimeMapping {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {} {}", self.old, MAPPING_ARROW, self.new)
    }
}

/// Validated pair of reference lines for `Time::apply_linear_correction`
#[derive(Debug, Clone, PartialEq)]
pub struct LinearCorrection {
    original: TimeLine,
    updated: TimeLine,
}

impl LinearCorrection {
    /// Build a correction from two reference points.
    ///
    /// Fails when both points share their old time, since no line passes
    /// through them.
    pub fn new(first: TimeMapping, second: TimeMapping) -> Result<Self, SubtitleError> {
        if first.old.value == second.old.value || !(second.old.value - first.old.value).is_finite() {
            return Err(SubtitleError::DegenerateInterval(first.old.normalize().format()));
        }

        let correction = Self {
            original: TimeLine::new(first.old, second.old),
            updated: TimeLine::new(first.new, second.new),
        };
        debug!(
            "Linear correction: factor {:.6}, offset {:.3}s",
            correction.factor(),
            correction.apply_to_time(Time::from_seconds(0.0)).value
        );
        Ok(correction)
    }

    /// Ratio between new and old reference spans
    pub fn factor(&self) -> f64 {
        (self.updated.end_time.value - self.updated.start_time.value)
            / (self.original.end_time.value - self.original.start_time.value)
    }

    pub fn apply_to_time(&self, time: Time) -> Time {
        time.apply_linear_correction(&self.original, &self.updated)
    }

    pub fn apply_to_line(&self, timeline: TimeLine) -> TimeLine {
        timeline.apply_linear_correction(&self.original, &self.updated)
    }
}
