//! Error handling for the skill matcher

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SkillMatcherError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("File format not supported: {0}")]
    UnsupportedFormat(String),

    #[error("PDF extraction error: {0}")]
    PdfExtraction(String),

    #[error("DOCX extraction error: {0}")]
    DocxExtraction(String),

    #[error("Embedding generation error: {0}")]
    Embedding(String),

    #[error("Model loading error: {0}")]
    ModelLoading(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Skill catalog error: {0}")]
    Catalog(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Output formatting error: {0}")]
    OutputFormatting(String),
}

pub type Result<T> = std::result::Result<T, SkillMatcherError>;

/// The Model2Vec loader reports through anyhow
impl From<anyhow::Error> for SkillMatcherError {
    fn from(err: anyhow::Error) -> Self {
        SkillMatcherError::ModelLoading(format!("{:#}", err))
    }
}

impl SkillMatcherError {
    /// True when the failure came from the embedding collaborator and the
    /// caller may fall back to structured-only scoring.
    pub fn is_embedding_failure(&self) -> bool {
        matches!(
            self,
            SkillMatcherError::Embedding(_) | SkillMatcherError::ModelLoading(_)
        )
    }
}
