/*!
 * Common test utilities for the transguard test suite
 */

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use tempfile::TempDir;

use transguard::TranslationService;
use transguard::providers::mock::MockCapability;
use transguard::workflow::{TranslationState, WorkflowGraph, WorkflowSettings};

/// Route library logs through env_logger, once per test binary
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    std::fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Standard graph over a scripted capability
pub fn standard_graph(mock: &MockCapability) -> WorkflowGraph {
    WorkflowGraph::standard(Arc::new(mock.clone()), WorkflowSettings::default())
        .expect("standard graph should compile")
}

/// Service over a scripted capability with the given retry budget
pub fn service_with(mock: &MockCapability, max_retry_count: u32) -> TranslationService {
    TranslationService::new(standard_graph(mock), max_retry_count)
}

/// Run the standard graph once
pub async fn run_workflow(mock: &MockCapability, state: TranslationState) -> TranslationState {
    init_logging();
    standard_graph(mock)
        .run(state)
        .await
        .expect("workflow run should succeed")
}
