/*!
 * Integration tests for running commands over subtitle files
 */

use anyhow::Result;
use std::fs;
use std::sync::Arc;

use subshift::app_config::Config;
use subshift::app_controller::{Controller, EditCommand, RunOptions, RunSummary};
use subshift::frame::ReorderKey;
use subshift::providers::mock::MockProvider;
use subshift::subtitle_processor::LineRange;
use subshift::timeline::SubtitleFormat;

use crate::common;

/// Test shifting a file in place
#[tokio::test]
async fn test_run_withShift_shouldRewriteFileInPlace() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_subtitle(temp_dir.path(), "movie.srt")?;
    let controller = common::mock_controller(Config::default());

    let summary = controller
        .run(&path, &EditCommand::Shift { offset: -0.5 }, &RunOptions::default())
        .await?;

    assert_eq!(summary.written, 1);
    let content = fs::read_to_string(&path)?;
    assert!(content.contains("00:00:00,500 --> 00:00:03,500"));
    assert!(content.contains("00:00:09,500 --> 00:00:13,500"));
    assert!(content.contains("For testing purposes."));
    Ok(())
}

/// Test writing to a separate output and refusing to overwrite it
#[tokio::test]
async fn test_run_withExistingOutput_shouldSkipUnlessForced() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "movie.srt")?;
    let output = common::create_test_file(temp_dir.path(), "movie.vtt", "old")?;
    let controller = common::mock_controller(Config::default());
    let command = EditCommand::Convert {
        format: SubtitleFormat::Vtt,
    };

    let mut options = RunOptions {
        output: Some(output.clone()),
        ..RunOptions::default()
    };
    let summary = controller.run(&input, &command, &options).await?;
    assert_eq!(summary.skipped, 1);
    assert_eq!(fs::read_to_string(&output)?, "old");

    options.force_overwrite = true;
    let summary = controller.run(&input, &command, &options).await?;
    assert_eq!(summary.written, 1);
    assert!(fs::read_to_string(&output)?.contains("00:00:01.000 --> 00:00:04.000"));
    // Source left untouched
    assert_eq!(fs::read_to_string(&input)?, common::SAMPLE_SRT);
    Ok(())
}

/// Test that an unchanged file is not rewritten
#[tokio::test]
async fn test_run_withNoChanges_shouldReportUnchanged() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_subtitle(temp_dir.path(), "movie.srt")?;
    let controller = common::mock_controller(Config::default());

    let summary = controller.run(&path, &EditCommand::Renumber, &RunOptions::default()).await?;
    assert_eq!(
        summary,
        RunSummary {
            unchanged: 1,
            ..RunSummary::default()
        }
    );
    Ok(())
}

/// Test correcting drift with bare new times for the first and last cue
#[tokio::test]
async fn test_run_withCorrection_shouldStretchTimings() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_subtitle(temp_dir.path(), "movie.srt")?;
    let controller = common::mock_controller(Config::default());
    let command = EditCommand::Correct {
        first: "00:00:02,000".to_string(),
        second: "00:00:20,000".to_string(),
    };

    controller.run(&path, &command, &RunOptions::default()).await?;

    // Starts 1s and 10s map to 2s and 20s: factor 2, offset 0
    let content = fs::read_to_string(&path)?;
    assert!(content.contains("00:00:02,000 --> 00:00:08,000"));
    assert!(content.contains("00:00:10,000 --> 00:00:18,000"));
    assert!(content.contains("00:00:20,000 --> 00:00:28,000"));
    Ok(())
}

/// Test a line selection limits the edit
#[tokio::test]
async fn test_run_withLineSelection_shouldOnlyShiftSelectedCue() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_subtitle(temp_dir.path(), "movie.srt")?;
    let controller = common::mock_controller(Config::default());
    let options = RunOptions {
        selections: vec!["5-7".parse::<LineRange>()?],
        ..RunOptions::default()
    };

    controller.run(&path, &EditCommand::Shift { offset: 60.0 }, &options).await?;

    let content = fs::read_to_string(&path)?;
    assert!(content.contains("00:00:01,000 --> 00:00:04,000"));
    assert!(content.contains("00:01:05,000 --> 00:01:09,000"));
    assert!(content.contains("00:00:10,000 --> 00:00:14,000"));
    Ok(())
}

/// Test translating a file writes a language-tagged sibling
#[tokio::test]
async fn test_run_withTranslate_shouldWriteTaggedCopy() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_subtitle(temp_dir.path(), "movie.srt")?;
    let config = Config {
        target_language: "spa".to_string(),
        ..Config::default()
    };
    let controller = common::mock_controller(config);

    controller.run(&path, &EditCommand::Translate, &RunOptions::default()).await?;

    let translated_path = temp_dir.path().join("movie.es.srt");
    let translated = fs::read_to_string(&translated_path)?;
    assert!(translated.contains("[spa] It contains multiple entries."));
    assert!(translated.contains("00:00:05,000 --> 00:00:09,000"));
    assert_eq!(fs::read_to_string(&path)?, common::SAMPLE_SRT);
    Ok(())
}

/// Test that translation failures leave no output behind
#[tokio::test]
async fn test_run_withFailingProvider_shouldNotWriteOutput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_subtitle(temp_dir.path(), "movie.srt")?;
    let controller = Controller::with_provider(Config::default(), Arc::new(MockProvider::failing()));

    let result = controller.run(&path, &EditCommand::Translate, &RunOptions::default()).await;

    assert!(result.is_err());
    assert!(!temp_dir.path().join("movie.fr.srt").exists());
    Ok(())
}

/// Test processing a folder, including nested files and translations from earlier runs
#[tokio::test]
async fn test_run_withFolder_shouldProcessEverySubtitleFile() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    common::create_test_subtitle(root, "a.srt")?;
    common::create_test_file(root, "season1/b.vtt", common::SAMPLE_VTT)?;
    common::create_test_file(root, "readme.txt", "00:00:01,000 --> 00:00:02,000")?;
    let controller = common::mock_controller(Config::default());

    let summary = controller
        .run(root, &EditCommand::Shift { offset: 1.0 }, &RunOptions::default())
        .await?;
    assert_eq!(summary.written, 2);
    assert!(fs::read_to_string(root.join("a.srt"))?.contains("00:00:02,000 --> 00:00:05,000"));
    assert!(fs::read_to_string(root.join("season1/b.vtt"))?.contains("00:00:02.000 --> 00:00:05.000 align:start"));
    assert_eq!(fs::read_to_string(root.join("readme.txt"))?, "00:00:01,000 --> 00:00:02,000");

    // Second translation run must not translate its own outputs
    controller.run(root, &EditCommand::Translate, &RunOptions::default()).await?;
    let summary = controller
        .run(
            root,
            &EditCommand::Translate,
            &RunOptions {
                force_overwrite: true,
                ..RunOptions::default()
            },
        )
        .await?;
    assert_eq!(summary.written, 2);
    assert!(root.join("a.fr.srt").exists());
    assert!(root.join("season1/b.fr.vtt").exists());
    assert!(!root.join("a.fr.fr.srt").exists());
    Ok(())
}

/// Test folder output mirrors the input tree
#[tokio::test]
async fn test_run_withFolderAndOutputDir_shouldMirrorTree() -> Result<()> {
    let input_dir = common::create_temp_dir()?;
    let output_dir = common::create_temp_dir()?;
    common::create_test_file(input_dir.path(), "season1/b.srt", "2\n00:00:01,000 --> 00:00:02,000\nB\n\n1\n00:00:00,000 --> 00:00:01,000\nA\n")?;
    let controller = common::mock_controller(Config::default());
    let options = RunOptions {
        output: Some(output_dir.path().to_path_buf()),
        ..RunOptions::default()
    };

    controller
        .run(
            input_dir.path(),
            &EditCommand::Reorder {
                key: ReorderKey::Sequence,
            },
            &options,
        )
        .await?;

    let reordered = fs::read_to_string(output_dir.path().join("season1/b.srt"))?;
    assert!(reordered.starts_with("1\n00:00:00,000 --> 00:00:01,000\nA\n\n2\n"));
    Ok(())
}

/// Test a missing input path
#[tokio::test]
async fn test_run_withMissingPath_shouldFail() {
    let controller = common::mock_controller(Config::default());
    let result = controller
        .run(
            std::path::Path::new("/no/such/subtitle.srt"),
            &EditCommand::Renumber,
            &RunOptions::default(),
        )
        .await;
    assert!(result.is_err());
}
