use std::fmt;
use std::str::FromStr;

use log::debug;

use crate::correction::LinearCorrection;
use crate::errors::SubtitleError;
use crate::frame::{Frame, ReorderKey};
use crate::time::{has_time_tags, map_time_tags, Time};
use crate::timeline::{SubtitleFormat, TimeLine};

const BYTE_ORDER_MARK: char = '\u{feff}';

// @module: Subtitle documents and the editing commands run over them

// @enum: Line terminator detected in the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
        }
    }
}

/// Inclusive range of zero-based line indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

impl LineRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start: start.min(end),
            end: start.max(end),
        }
    }

    pub fn contains(&self, line_index: usize) -> bool {
        (self.start..=self.end).contains(&line_index)
    }
}

/// Parses the 1-based `START-END` or `LINE` notation used on the command line
impl FromStr for LineRange {
    type Err = SubtitleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SubtitleError::InvalidLineRange(s.to_string());
        let one_based = |text: &str| match text.trim().parse::<usize>() {
            Ok(line) if line > 0 => Ok(line - 1),
            _ => Err(invalid()),
        };

        match s.split_once('-') {
            Some((start, end)) => Ok(Self::new(one_based(start)?, one_based(end)?)),
            None => {
                let line = one_based(s)?;
                Ok(Self::new(line, line))
            }
        }
    }
}

/// Replacement text for one line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineEdit {
    pub line_index: usize,
    pub text: String,
}

impl LineEdit {
    pub fn new(line_index: usize, text: impl Into<String>) -> Self {
        Self {
            line_index,
            text: text.into(),
        }
    }
}

/// Text of a subtitle file, split into lines
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubtitleDocument {
    // @field: Lines without terminators
    lines: Vec<String>,

    // @field: Terminator used when writing back
    line_ending: LineEnding,

    // @field: Whether the last line was terminated
    trailing_newline: bool,

    // @field: Whether the content started with a UTF-8 byte order mark
    byte_order_mark: bool,
}

impl SubtitleDocument {
    /// Split file content into lines, remembering how it was terminated.
    /// A leading byte order mark is kept aside so the first line parses.
    pub fn parse(content: &str) -> Self {
        let (content, byte_order_mark) = match content.strip_prefix(BYTE_ORDER_MARK) {
            Some(rest) => (rest, true),
            None => (content, false),
        };

        let line_ending = if content.contains("\r\n") {
            LineEnding::CrLf
        } else {
            LineEnding::Lf
        };

        Self {
            lines: content.lines().map(str::to_string).collect(),
            line_ending,
            trailing_newline: content.ends_with('\n'),
            byte_order_mark,
        }
    }

    /// Build a document from bare lines, newline-terminated
    pub fn from_lines<S: Into<String>>(lines: impl IntoIterator<Item = S>) -> Self {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            line_ending: LineEnding::Lf,
            trailing_newline: true,
            byte_order_mark: false,
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    /// Indices of the selected lines in document order; no selection means
    /// the whole document.
    pub fn selected_lines(&self, selections: &[LineRange]) -> Vec<usize> {
        (0..self.lines.len())
            .filter(|index| selections.is_empty() || selections.iter().any(|range| range.contains(*index)))
            .collect()
    }

    /// Blocks of contiguous non-blank lines
    pub fn frames(&self) -> Vec<Frame> {
        let mut frames = Vec::new();
        let mut start = 0;
        let mut block: Vec<String> = Vec::new();

        for (index, line) in self.lines.iter().enumerate() {
            if line.trim().is_empty() {
                if !block.is_empty() {
                    frames.push(Frame::from_lines(start, std::mem::take(&mut block)));
                }
                continue;
            }
            if block.is_empty() {
                start = index;
            }
            block.push(line.clone());
        }
        if !block.is_empty() {
            frames.push(Frame::from_lines(start, block));
        }

        frames
    }

    /// First timing line of the document
    pub fn first_timeline(&self) -> Option<TimeLine> {
        self.lines.iter().find_map(|line| TimeLine::parse(line))
    }

    /// Last timing line of the document
    pub fn last_timeline(&self) -> Option<TimeLine> {
        self.lines.iter().rev().find_map(|line| TimeLine::parse(line))
    }

    /// Rewrite timing lines with `on_timeline` and inline tags of other
    /// lines with `on_tag`, inside the selections. Only changed lines
    /// produce an edit.
    fn retime(
        &self,
        selections: &[LineRange],
        on_timeline: impl Fn(TimeLine) -> TimeLine,
        on_tag: impl Fn(Time) -> Time,
    ) -> Vec<LineEdit> {
        let mut edits = Vec::new();

        for index in self.selected_lines(selections) {
            let line = &self.lines[index];
            let updated = match TimeLine::parse(line) {
                Some(timeline) => on_timeline(timeline).format(),
                None if has_time_tags(line) => map_time_tags(line, &on_tag).into_owned(),
                None => continue,
            };

            if &updated != line {
                debug!("Line {}: '{}' -> '{}'", index + 1, line, updated);
                edits.push(LineEdit::new(index, updated));
            }
        }

        edits
    }

    /// Shift every time inside the selections by `offset` seconds
    pub fn shift_edits(&self, offset: f64, selections: &[LineRange]) -> Vec<LineEdit> {
        self.retime(selections, |timeline| timeline.shift(offset), |time| time.shift(offset))
    }

    /// Remap every time inside the selections through a two-point correction
    pub fn correction_edits(&self, correction: &LinearCorrection, selections: &[LineRange]) -> Vec<LineEdit> {
        self.retime(
            selections,
            |timeline| correction.apply_to_line(timeline),
            |time| correction.apply_to_time(time),
        )
    }

    /// Rewrite timing lines inside the selections in the conventions of `format`
    pub fn convert_edits(&self, format: SubtitleFormat, selections: &[LineRange]) -> Vec<LineEdit> {
        self.selected_lines(selections)
            .into_iter()
            .filter_map(|index| {
                let line = &self.lines[index];
                let converted = TimeLine::parse(line)?.convert_to(format).format();
                (&converted != line).then(|| LineEdit::new(index, converted))
            })
            .collect()
    }

    /// Number the blocks that carry a sequence line 1..n in document order
    pub fn renumber_edits(&self) -> Vec<LineEdit> {
        self.frames()
            .iter()
            .filter(|frame| frame.sequence.is_some())
            .zip(1u64..)
            .filter(|(frame, number)| frame.sequence != Some(*number) || frame.lines[0] != number.to_string())
            .map(|(frame, number)| LineEdit::new(frame.line_index, number.to_string()))
            .collect()
    }

    /// Sort blocks by `key` and join them with one blank line
    pub fn reordered(&self, key: ReorderKey) -> Self {
        let mut frames = self.frames();
        frames.sort_by(|a, b| a.cmp_by(b, key));

        let mut lines = Vec::with_capacity(self.lines.len());
        for (position, frame) in frames.into_iter().enumerate() {
            if position > 0 {
                lines.push(String::new());
            }
            lines.extend(frame.lines);
        }

        Self {
            lines,
            line_ending: self.line_ending,
            trailing_newline: self.trailing_newline,
            byte_order_mark: self.byte_order_mark,
        }
    }

    /// Cue text lines (the lines after each timing line) inside the selections
    pub fn translatable_lines(&self, selections: &[LineRange]) -> Vec<(usize, String)> {
        let selected = |index: usize| selections.is_empty() || selections.iter().any(|range| range.contains(index));

        self.frames()
            .iter()
            .filter_map(|frame| frame.timeline_offset().map(|offset| (frame, offset)))
            .flat_map(|(frame, offset)| {
                frame.lines[offset + 1..]
                    .iter()
                    .enumerate()
                    .map(move |(position, line)| (frame.line_index + offset + 1 + position, line.clone()))
            })
            .filter(|(index, _)| selected(*index))
            .collect()
    }

    /// Apply line replacements; fails without changing anything when an
    /// edit addresses a missing line
    pub fn apply(&mut self, edits: &[LineEdit]) -> Result<(), SubtitleError> {
        if let Some(edit) = edits.iter().find(|edit| edit.line_index >= self.lines.len()) {
            return Err(SubtitleError::LineOutOfRange {
                line_index: edit.line_index,
                line_count: self.lines.len(),
            });
        }

        for edit in edits {
            self.lines[edit.line_index] = edit.text.clone();
        }
        Ok(())
    }

    /// Consume the document and return it with `edits` applied
    pub fn with_edits(mut self, edits: &[LineEdit]) -> Result<Self, SubtitleError> {
        self.apply(edits)?;
        Ok(self)
    }
}

impl fmt::Display for SubtitleDocument {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let ending = self.line_ending.as_str();
        if self.byte_order_mark {
            write!(f, "{}", BYTE_ORDER_MARK)?;
        }
        for (index, line) in self.lines.iter().enumerate() {
            if index > 0 {
                f.write_str(ending)?;
            }
            f.write_str(line)?;
        }
        if self.trailing_newline && !self.lines.is_empty() {
            f.write_str(ending)?;
        }
        Ok(())
    }
}
