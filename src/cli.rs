//! CLI interface for the skill matcher

use crate::config::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "skill-matcher")]
#[command(about = "Score how well a resume covers the skills a job asks for")]
#[command(long_about = "Extract technical skills from a resume and a job description, then combine weighted catalog matching with embedding similarity into a single fit score with prioritized skill gaps")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Match a resume against a job description
    Match {
        /// Path to resume file (PDF, DOCX, TXT, MD)
        #[arg(short, long)]
        resume: PathBuf,

        /// Path to job description file (PDF, DOCX, TXT, MD)
        #[arg(short, long, conflicts_with = "job_text", required_unless_present = "job_text")]
        job: Option<PathBuf>,

        /// Job description given inline
        #[arg(long)]
        job_text: Option<String>,

        /// Structured matching only
        #[arg(long)]
        no_semantic: bool,

        /// Model2Vec model to use (HuggingFace repo id or local folder)
        #[arg(short, long)]
        embedding: Option<String>,

        /// Skill catalog TOML file replacing the built-in catalog
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Output detailed analysis
        #[arg(short, long)]
        detailed: bool,

        /// Output format: console, json, markdown (defaults to the configured format)
        #[arg(short, long)]
        output: Option<String>,

        /// Save output to file
        #[arg(short, long)]
        save: Option<PathBuf>,
    },

    /// List the catalog skills found in a document
    Extract {
        /// Document to scan (PDF, DOCX, TXT, MD)
        #[arg(conflicts_with = "text", required_unless_present = "text")]
        file: Option<PathBuf>,

        /// Text to scan instead of a file
        #[arg(short, long)]
        text: Option<String>,

        /// Skill catalog TOML file replacing the built-in catalog
        #[arg(long)]
        catalog: Option<PathBuf>,
    },

    /// Show the skill catalog
    Catalog {
        /// Only show one category
        #[arg(long)]
        category: Option<String>,

        /// Skill catalog TOML file to show instead of the configured one
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,

    /// Print the configuration file location
    Path,
}

/// Parse and validate output format
pub fn parse_output_format(format: &str) -> Result<OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" => Ok(OutputFormat::Console),
        "json" => Ok(OutputFormat::Json),
        "markdown" | "md" => Ok(OutputFormat::Markdown),
        _ => Err(format!("Invalid output format: {}. Supported: console, json, markdown", format)),
    }
}

/// Validate file extension
pub fn validate_file_extension(path: &Path, allowed_extensions: &[&str]) -> Result<(), String> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => {
            if allowed_extensions.contains(&ext.to_lowercase().as_str()) {
                Ok(())
            } else {
                Err(format!(
                    "Unsupported file extension: .{}. Allowed: {}",
                    ext,
                    allowed_extensions.join(", ")
                ))
            }
        }
        None => Err("File has no extension".to_string()),
    }
}
