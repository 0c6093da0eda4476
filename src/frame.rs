use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::timeline::TimeLine;

// @module: Cue blocks and their ordering

/// Ordering used when reordering cue blocks
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReorderKey {
    /// Sequence number first, then position in the document
    Sequence,
    /// Start time, end time, then sequence
    #[default]
    Time,
}

// @struct: One block of contiguous non-blank lines
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    // @field: Index of the first line in the document
    pub line_index: usize,

    // @field: Leading integer line, if any
    pub sequence: Option<u64>,

    // @field: Block lines
    pub lines: Vec<String>,

    // @field: First line of the block that is a timing line
    pub timeline: Option<TimeLine>,
}

impl Frame {
    /// Build a frame from the lines of one block
    pub fn from_lines(line_index: usize, lines: Vec<String>) -> Self {
        let sequence = lines.first().and_then(|line| line.trim().parse::<u64>().ok());
        let timeline = lines.iter().find_map(|line| TimeLine::parse(line));
        Self {
            line_index,
            sequence,
            lines,
            timeline,
        }
    }

    /// Position of the timing line inside `lines`
    pub fn timeline_offset(&self) -> Option<usize> {
        self.timeline.as_ref()?;
        self.lines.iter().position(|line| TimeLine::parse(line).is_some())
    }

    /// Lines following the timing line
    pub fn text_lines(&self) -> &[String] {
        match self.timeline_offset() {
            Some(offset) => &self.lines[offset + 1..],
            None => &[],
        }
    }

    /// Compare by sequence number; blocks without one come first.
    /// Ties keep document order.
    pub fn cmp_by_sequence(&self, other: &Self) -> Ordering {
        // `None < Some(_)` for options
        self.sequence
            .cmp(&other.sequence)
            .then_with(|| self.line_index.cmp(&other.line_index))
    }

    /// Compare by start time, then end time, then sequence. Blocks without
    /// a timing line come first.
    pub fn cmp_by_time(&self, other: &Self) -> Ordering {
        match (&self.timeline, &other.timeline) {
            (None, None) => self.cmp_by_sequence(other),
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(a), Some(b)) => a
                .start_time
                .value
                .total_cmp(&b.start_time.value)
                .then_with(|| a.end_time.value.total_cmp(&b.end_time.value))
                .then_with(|| self.cmp_by_sequence(other)),
        }
    }

    pub fn cmp_by(&self, other: &Self, key: ReorderKey) -> Ordering {
        match key {
            ReorderKey::Sequence => self.cmp_by_sequence(other),
            ReorderKey::Time => self.cmp_by_time(other),
        }
    }
}
