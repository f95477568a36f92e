//! Error types for form rendering

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Font loading error: {0}")]
    Font(String),

    #[error("Compilation failed: {}", .0.join("; "))]
    Compile(Vec<String>),

    #[error("PDF export failed: {0}")]
    Export(String),

    #[error("Rendering timeout after {0}ms")]
    Timeout(u64),

    #[error("Rendering task failed: {0}")]
    Task(String),
}
