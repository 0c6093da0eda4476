/*!
 * Single timestamp parsing, formatting and arithmetic.
 *
 * A `Time` remembers how it was written (decimal separator and fraction
 * width) so that re-rendering a line keeps the style of the source file:
 * - `12:34:56,789` (SRT)
 * - `12:34:56.789` (VTT)
 * - `12:34:56.78` (SBV)
 * - `34:56,789` (hours omitted, rendered back with `00:` hours)
 */

use std::borrow::Cow;
use std::fmt;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::timeline::TimeLine;

// @const: Inline time tag inside cue text, e.g. `<00:01:02,500>`
static TIME_TAG_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<([+\-]?(?:[0-9]+:)?[0-9]{2}:[0-9]{2}(?:[,.][0-9]+)?)>").unwrap()
});

/// Separator used when the source text had no fraction
pub const DEFAULT_SEPARATOR: char = ',';

/// Fraction digits beyond this count are dropped when parsing
const MAX_FRACTION_DIGITS: usize = 3;

/// A single signed instant, in seconds, with its presentation style
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Time {
    /// Signed seconds; negative values are legal
    pub value: f64,

    /// Character between seconds and fraction (`,` or `.`)
    pub separator: char,

    /// Fraction was written with two digits (centiseconds)
    pub short_millis: bool,
}

impl Default for Time {
    fn default() -> Self {
        Self::from_seconds(0.0)
    }
}

impl Time {
    /// Create a time in canonical SRT presentation
    pub fn from_seconds(value: f64) -> Self {
        Self {
            value,
            separator: DEFAULT_SEPARATOR,
            short_millis: false,
        }
    }

    /// Parse a timestamp, falling back to the zero time when the text
    /// is not a timestamp.
    pub fn parse(text: &str) -> Self {
        Self::try_parse(text).unwrap_or_default()
    }

    /// Parse a timestamp, returning `None` when the whole text (minus
    /// surrounding whitespace) is not a timestamp.
    pub fn try_parse(text: &str) -> Option<Self> {
        let cursor = Cursor::new(text).skip_whitespace();
        clock_candidates(cursor)
            .into_iter()
            .find(|(_, rest)| rest.skip_whitespace().is_at_end())
            .map(|(clock, _)| clock.to_time())
    }

    /// Render as `[-]HH:MM:SS<sep>fff` (or `ff` for short fractions)
    pub fn format(&self) -> String {
        self.to_string()
    }

    /// Move by `offset` seconds
    #[must_use]
    pub fn shift(self, offset: f64) -> Self {
        Self {
            value: self.value + offset,
            ..self
        }
    }

    /// Remap through the affine transform that sends `original` onto `updated`.
    ///
    /// The reference interval of `original` must not be empty: a zero-length
    /// interval produces a non-finite value.
    #[must_use]
    pub fn apply_linear_correction(self, original: &TimeLine, updated: &TimeLine) -> Self {
        let factor = (updated.end_time.value - updated.start_time.value)
            / (original.end_time.value - original.start_time.value);
        Self {
            value: (self.value - original.start_time.value) * factor + updated.start_time.value,
            ..self
        }
    }

    /// Switch to canonical SRT presentation
    #[must_use]
    pub fn normalize(self) -> Self {
        self.convert(DEFAULT_SEPARATOR, false)
    }

    /// Change presentation only; the value is untouched
    #[must_use]
    pub fn convert(self, millis_separator: char, short_millis: bool) -> Self {
        Self {
            separator: millis_separator,
            short_millis,
            ..self
        }
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let (units, width) = if self.short_millis { (100u64, 2usize) } else { (1000u64, 3usize) };

        // Rounding the whole value carries 999.6ms into the next second
        let total = (self.value.abs() * units as f64).round() as u64;
        let fraction = total % units;
        let seconds = total / units;

        write!(
            f,
            "{}{:02}:{:02}:{:02}{}{:0width$}",
            if self.value < 0.0 { "-" } else { "" },
            seconds / 3600,
            seconds / 60 % 60,
            seconds % 60,
            self.separator,
            fraction,
            width = width
        )
    }
}

/// Rewrite every inline time tag (`<HH:MM:SS,mmm>`) of a cue text line.
///
/// Lines without tags are returned borrowed.
pub fn map_time_tags(line: &str, transform: impl Fn(Time) -> Time) -> Cow<'_, str> {
    TIME_TAG_REGEX.replace_all(line, |caps: &Captures| {
        format!("<{}>", transform(Time::parse(&caps[1])))
    })
}

/// Check whether a line carries at least one inline time tag
pub fn has_time_tags(line: &str) -> bool {
    TIME_TAG_REGEX.is_match(line)
}

/// Recognized pieces of one timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ClockMatch<'a> {
    pub negative: bool,
    pub hours: Option<&'a str>,
    pub minutes: &'a str,
    pub seconds: &'a str,
    pub fraction: Option<(char, &'a str)>,
}

impl ClockMatch<'_> {
    pub(crate) fn to_time(self) -> Time {
        let number = |digits: &str| digits.parse::<f64>().unwrap_or_default();

        let fraction = match self.fraction {
            Some((_, digits)) => {
                let kept = &digits[..digits.len().min(MAX_FRACTION_DIGITS)];
                number(kept) / 10f64.powi(kept.len() as i32)
            }
            None => 0.0,
        };

        let magnitude = self.hours.map_or(0.0, number) * 3600.0
            + number(self.minutes) * 60.0
            + number(self.seconds)
            + fraction;

        Time {
            value: if self.negative { -magnitude } else { magnitude },
            separator: self.fraction.map_or(DEFAULT_SEPARATOR, |(separator, _)| separator),
            short_millis: self.fraction.is_some_and(|(_, digits)| digits.len() == 2),
        }
    }
}

/// Read position inside a line. Copying a cursor is how the recognizer
/// backtracks.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    pub(crate) fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.pos == self.text.len()
    }

    pub(crate) fn skip_whitespace(mut self) -> Self {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
        self
    }

    pub(crate) fn eat(mut self, token: &str) -> Option<Self> {
        if self.rest().starts_with(token) {
            self.pos += token.len();
            Some(self)
        } else {
            None
        }
    }

    fn eat_one_of(mut self, chars: &[char]) -> Option<(char, Self)> {
        let c = self.rest().chars().next().filter(|c| chars.contains(c))?;
        self.pos += c.len_utf8();
        Some((c, self))
    }

    /// A run of ASCII digits: all of them, or exactly `count`
    fn digits(mut self, count: Option<usize>) -> Option<(&'a str, Self)> {
        let rest = self.rest();
        let run = rest.bytes().take_while(u8::is_ascii_digit).count();
        let len = match count {
            Some(count) if run >= count => count,
            None if run > 0 => run,
            _ => return None,
        };
        self.pos += len;
        Some((&rest[..len], self))
    }
}

/// Every way a timestamp can be read at `cursor`, most greedy first:
/// hours present before hours absent, fraction present before absent.
pub(crate) fn clock_candidates(cursor: Cursor<'_>) -> Vec<(ClockMatch<'_>, Cursor<'_>)> {
    let (negative, cursor) = match cursor.eat_one_of(&['+', '-']) {
        Some((sign, next)) => (sign == '-', next),
        None => (false, cursor),
    };

    let with_hours = cursor
        .digits(None)
        .and_then(|(hours, next)| next.eat(":").map(|next| (Some(hours), next)));

    let mut candidates = Vec::new();
    for (hours, cursor) in with_hours.into_iter().chain(std::iter::once((None, cursor))) {
        let Some((minutes, cursor)) = cursor.digits(Some(2)) else { continue };
        let Some(cursor) = cursor.eat(":") else { continue };
        let Some((seconds, cursor)) = cursor.digits(Some(2)) else { continue };

        let clock = ClockMatch {
            negative,
            hours,
            minutes,
            seconds,
            fraction: None,
        };

        if let Some((separator, after)) = cursor.eat_one_of(&[',', '.']) {
            if let Some((digits, after)) = after.digits(None) {
                candidates.push((
                    ClockMatch {
                        fraction: Some((separator, digits)),
                        ..clock
                    },
                    after,
                ));
            }
        }
        candidates.push((clock, cursor));
    }
    candidates
}
