/*!
 * Tests for file and directory utilities
 */

use anyhow::Result;
use std::path::PathBuf;

use subshift::file_utils::FileManager;
use subshift::timeline::SubtitleFormat;

use crate::common;

/// Test output path generation with a language tag
#[test]
fn test_generate_output_path_withLanguage_shouldInsertTag() {
    let output = FileManager::generate_output_path("/videos/movie.srt", "/out", "fr", "srt");
    assert_eq!(output, PathBuf::from("/out/movie.fr.srt"));

    let dotted = FileManager::generate_output_path("episode.vtt", "", "de", ".vtt");
    assert_eq!(dotted, PathBuf::from("episode.de.vtt"));
}

/// Test format detection from extensions
#[test]
fn test_format_for_withKnownExtensions_shouldDetectFormat() {
    assert_eq!(FileManager::format_for("a.srt"), Some(SubtitleFormat::Srt));
    assert_eq!(FileManager::format_for("a.VTT"), Some(SubtitleFormat::Vtt));
    assert_eq!(FileManager::format_for("a.sbv"), Some(SubtitleFormat::Sbv));
    assert_eq!(FileManager::format_for("a.txt"), None);
    assert_eq!(FileManager::format_for("noext"), None);
}

/// Test recursive search for subtitle files
#[test]
fn test_find_subtitle_files_withNestedFolders_shouldFindAllSorted() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    common::create_test_subtitle(root, "b.srt")?;
    common::create_test_subtitle(root, "season1/a.SRT")?;
    common::create_test_file(root, "season1/c.vtt", common::SAMPLE_VTT)?;
    common::create_test_file(root, "notes.txt", "not a subtitle")?;

    let extensions = vec!["srt".to_string(), ".vtt".to_string()];
    let files = FileManager::find_subtitle_files(root, &extensions)?;

    let names: Vec<String> = files
        .iter()
        .map(|file| file.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
        .collect();
    assert_eq!(names, vec!["b.srt", "season1/a.SRT", "season1/c.vtt"]);
    Ok(())
}

/// Test writing creates missing parent directories
#[test]
fn test_write_to_file_withMissingParent_shouldCreateIt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("nested/dir/out.srt");

    FileManager::write_to_file(&path, "content")?;
    assert!(FileManager::file_exists(&path));
    assert!(FileManager::dir_exists(temp_dir.path().join("nested/dir")));
    assert_eq!(FileManager::read_to_string(&path)?, "content");
    Ok(())
}

/// Test reading a missing file reports the path
#[test]
fn test_read_to_string_withMissingFile_shouldFailWithContext() {
    let error = FileManager::read_to_string("/definitely/not/here.srt").unwrap_err();
    assert!(error.to_string().contains("Failed to read file"));
}
