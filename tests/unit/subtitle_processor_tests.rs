/*!
 * Tests for subtitle documents and editing commands
 */

use subshift::frame::ReorderKey;
use subshift::subtitle_processor::{LineEdit, LineRange, SubtitleDocument};
use subshift::timeline::SubtitleFormat;

use crate::common::{SAMPLE_SRT, SAMPLE_VTT};

/// Test that frames are detected with their sequence and timing line
#[test]
fn test_frames_withSrtContent_shouldSplitOnBlankLines() {
    let document = SubtitleDocument::parse(SAMPLE_SRT);
    let frames = document.frames();

    assert_eq!(frames.len(), 3);
    assert_eq!(frames[1].line_index, 4);
    assert_eq!(frames[1].sequence, Some(2));
    assert_eq!(frames[1].timeline.as_ref().unwrap().start_time.value, 5.0);
    assert_eq!(frames[2].text_lines(), ["For testing purposes.".to_string()]);
}

/// Test that a VTT header is a frame without timing
#[test]
fn test_frames_withVttHeader_shouldHaveUntimedFirstFrame() {
    let frames = SubtitleDocument::parse(SAMPLE_VTT).frames();
    assert_eq!(frames.len(), 3);
    assert!(frames[0].timeline.is_none());
    assert_eq!(frames[1].timeline.as_ref().unwrap().extra_data(), "align:start");
}

/// Test shifting a VTT file keeps its separator, settings and tags consistent
#[test]
fn test_shiftEdits_withVtt_shouldKeepStyleAndSettings() {
    let document = SubtitleDocument::parse(SAMPLE_VTT);
    let edits = document.shift_edits(2.0, &[]);

    assert_eq!(
        edits,
        vec![
            LineEdit::new(2, "00:00:03.000 --> 00:00:06.000 align:start"),
            LineEdit::new(5, "00:00:07.000 --> 00:00:11.000"),
            LineEdit::new(6, "<00:00:08.500>Second cue"),
        ]
    );
}

/// Test that a zero shift produces no edits
#[test]
fn test_shiftEdits_withZeroOffset_shouldReportNoChanges() {
    let document = SubtitleDocument::parse(SAMPLE_SRT);
    assert!(document.shift_edits(0.0, &[]).is_empty());
}

/// Test that several selections combine
#[test]
fn test_shiftEdits_withTwoSelections_shouldTouchBoth() {
    let document = SubtitleDocument::parse(SAMPLE_SRT);
    let selections = vec!["1-2".parse::<LineRange>().unwrap(), "10".parse::<LineRange>().unwrap()];
    let edits = document.shift_edits(1.0, &selections);

    let touched: Vec<usize> = edits.iter().map(|edit| edit.line_index).collect();
    assert_eq!(touched, vec![1, 9]);
}

/// Test converting SRT timing lines to SBV
#[test]
fn test_convertEdits_toSbv_shouldUseCommaAndCentiseconds() {
    let document = SubtitleDocument::parse(SAMPLE_SRT);
    let converted = document.clone().with_edits(&document.convert_edits(SubtitleFormat::Sbv, &[])).unwrap();
    assert_eq!(converted.lines()[1], "00:00:01.00,00:00:04.00");
    assert_eq!(converted.lines()[2], "This is a test subtitle.");
}

/// Test that an already numbered file needs no renumbering
#[test]
fn test_renumberEdits_withOrderedFile_shouldBeEmpty() {
    assert!(SubtitleDocument::parse(SAMPLE_SRT).renumber_edits().is_empty());
}

/// Test reordering out-of-order cues by time, then renumbering
#[test]
fn test_reordered_thenRenumbered_shouldProduceCleanFile() {
    let content = "1\n00:00:10,000 --> 00:00:11,000\nThird\n\n2\n00:00:01,000 --> 00:00:02,000\nFirst\n\n3\n00:00:05,000 --> 00:00:06,000\nSecond\n";
    let reordered = SubtitleDocument::parse(content).reordered(ReorderKey::Time);
    let renumbered = reordered.clone().with_edits(&reordered.renumber_edits()).unwrap();

    assert_eq!(
        renumbered.to_string(),
        "1\n00:00:01,000 --> 00:00:02,000\nFirst\n\n2\n00:00:05,000 --> 00:00:06,000\nSecond\n\n3\n00:00:10,000 --> 00:00:11,000\nThird\n"
    );
}

/// Test that CRLF files stay CRLF after editing
#[test]
fn test_display_afterEdits_shouldKeepCrLf() {
    let content = SAMPLE_SRT.replace('\n', "\r\n");
    let document = SubtitleDocument::parse(&content);
    let shifted = document.clone().with_edits(&document.shift_edits(1.0, &[])).unwrap();

    let output = shifted.to_string();
    assert!(output.starts_with("1\r\n00:00:02,000 --> 00:00:05,000\r\n"));
    assert!(output.ends_with("For testing purposes.\r\n"));
    assert!(!output.replace("\r\n", "").contains('\n'));
}

/// Test that invalid line ranges are rejected
#[test]
fn test_lineRange_fromStr_withInvalidText_shouldFail() {
    for text in ["", "-", "0", "3-", "x", "1-2-3"] {
        assert!(text.parse::<LineRange>().is_err(), "{:?} should not parse", text);
    }
}
