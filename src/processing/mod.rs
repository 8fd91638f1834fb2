//! Skill extraction, scoring and matching

pub mod normalizer;
pub mod catalog;
pub mod extractor;
pub mod scorer;
pub mod semantic;
pub mod embeddings;
pub mod analyzer;
