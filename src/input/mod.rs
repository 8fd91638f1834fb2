//! Document input: file detection and text extraction for the CLI

pub mod file_detector;
pub mod text_extractor;
pub mod manager;

pub use manager::InputManager;
