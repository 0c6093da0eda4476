/*!
 * Common test utilities for the subshift test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

use subshift::app_config::Config;
use subshift::app_controller::Controller;
use subshift::providers::mock::MockProvider;

/// Sample SRT file with three cues
pub const SAMPLE_SRT: &str = "1
00:00:01,000 --> 00:00:04,000
This is a test subtitle.

2
00:00:05,000 --> 00:00:09,000
It contains multiple entries.

3
00:00:10,000 --> 00:00:14,000
For testing purposes.
";

/// Sample VTT file with a header and an inline time tag
pub const SAMPLE_VTT: &str = "WEBVTT

00:01.000 --> 00:04.000 align:start
First cue

00:05.000 --> 00:09.000
<00:06.500>Second cue
";

/// Route library logs to the test output, once per test binary
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Creates a sample subtitle file for testing
pub fn create_test_subtitle(dir: &Path, filename: &str) -> Result<PathBuf> {
    create_test_file(dir, filename, SAMPLE_SRT)
}

/// Controller backed by a mock provider that always succeeds
pub fn mock_controller(config: Config) -> Controller {
    init_test_logging();
    Controller::with_provider(config, Arc::new(MockProvider::working()))
}
