//! Match engine combining structured extraction, semantic matching and gap analysis

use crate::config::Config;
use crate::error::Result;
use crate::processing::catalog::SkillCatalog;
use crate::processing::extractor::{ExtractedSkills, SkillExtractor};
use crate::processing::scorer::{
    category_coverage, find_gaps, structured_score, FitVerdict, FusionWeights, GapReport, SeverityTable,
};
use crate::processing::semantic::{EmbeddingModel, SemanticMatch, SemanticMatcher, SimilarityMatrix};
use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Instant;

/// Coordinates every scoring stage for one resume / requirement pair.
///
/// The engine is immutable after construction and can serve many requests;
/// the embedding model is shared, never rebuilt per request.
pub struct MatchEngine {
    catalog: Arc<SkillCatalog>,
    extractor: SkillExtractor,
    semantic: SemanticMatcher,
    model: Option<Arc<dyn EmbeddingModel>>,
    fusion: FusionWeights,
    severity: SeverityTable,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchReport {
    /// Hybrid score in [0, 100]
    pub final_score: f64,
    pub structured_score: f64,
    /// None when semantic matching was not performed
    pub semantic_score: Option<f64>,
    pub verdict: FitVerdict,

    /// Union of structured and semantic matches
    pub matched_skills: Vec<String>,
    pub structured_matches: Vec<String>,
    pub semantic_matches: Vec<String>,

    pub gaps: GapReport,
    pub category_coverage: BTreeMap<String, f64>,

    pub resume_skills: ExtractedSkills,
    pub requirement_skills: ExtractedSkills,
    pub similarity: Option<SimilarityMatrix>,

    pub embedding_model: Option<String>,
    pub processing_time_ms: u64,
    pub generated_at: DateTime<Utc>,
}

impl MatchEngine {
    /// Engine over a catalog with standard thresholds and no embedding model
    pub fn new(catalog: SkillCatalog) -> Result<Self> {
        let catalog = Arc::new(catalog);
        let extractor = SkillExtractor::new(Arc::clone(&catalog))?;

        Ok(Self {
            catalog,
            extractor,
            semantic: SemanticMatcher::default(),
            model: None,
            fusion: FusionWeights::default(),
            severity: SeverityTable::default(),
        })
    }

    /// Engine configured from settings. The catalog keeps its own fallback
    /// weight unless the matching section overrides it.
    pub fn from_config(catalog: SkillCatalog, config: &Config) -> Result<Self> {
        let catalog = match config.matching.default_category_weight {
            Some(weight) => catalog.with_default_weight(weight),
            None => catalog,
        };
        let catalog = Arc::new(catalog);
        let extractor = SkillExtractor::with_fuzzy_cutoff(Arc::clone(&catalog), config.matching.fuzzy_cutoff)?;

        Ok(Self {
            catalog,
            extractor,
            semantic: SemanticMatcher::new(config.matching.semantic_threshold),
            model: None,
            fusion: FusionWeights {
                structured: config.scoring.structured_weight,
                semantic: config.scoring.semantic_weight,
            },
            severity: SeverityTable::new(config.scoring.critical_threshold, config.scoring.medium_threshold),
        })
    }

    pub fn with_embedding_model(mut self, model: Arc<dyn EmbeddingModel>) -> Self {
        self.model = Some(model);
        self
    }

    pub fn without_embedding_model(mut self) -> Self {
        self.model = None;
        self
    }

    pub fn has_embedding_model(&self) -> bool {
        self.model.is_some()
    }

    pub fn catalog(&self) -> &SkillCatalog {
        &self.catalog
    }

    pub fn extractor(&self) -> &SkillExtractor {
        &self.extractor
    }

    pub fn extract(&self, text: &str) -> ExtractedSkills {
        self.extractor.extract(text)
    }

    /// Full analysis from raw texts
    pub fn analyze(&self, resume_text: &str, job_text: &str) -> Result<MatchReport> {
        let resume = self.extract(resume_text);
        let requirement = self.extract(job_text);
        self.analyze_skills(resume, requirement)
    }

    /// Full analysis from already extracted skills. Embedding failures are
    /// returned to the caller, which may retry with `analyze_structured`.
    pub fn analyze_skills(&self, resume: ExtractedSkills, requirement: ExtractedSkills) -> Result<MatchReport> {
        let start_time = Instant::now();

        let semantic = match &self.model {
            Some(model) => Some((
                self.semantic
                    .match_skills(model.as_ref(), &resume.flatten(), &requirement.flatten())?,
                model.name().to_string(),
            )),
            None => None,
        };

        Ok(self.build_report(resume, requirement, semantic, start_time))
    }

    /// Structured-only analysis; the semantic score is omitted and counts as 0.0
    pub fn analyze_structured(&self, resume: ExtractedSkills, requirement: ExtractedSkills) -> MatchReport {
        self.build_report(resume, requirement, None, Instant::now())
    }

    fn build_report(
        &self,
        resume: ExtractedSkills,
        requirement: ExtractedSkills,
        semantic: Option<(SemanticMatch, String)>,
        start_time: Instant,
    ) -> MatchReport {
        if resume.is_empty() {
            warn!("No skills detected in the resume; scores will be 0");
        }
        if requirement.is_empty() {
            warn!("No skills detected in the job description; scores will be 0");
        }

        let structured = structured_score(&self.catalog, &resume, &requirement);
        let semantic_score = semantic.as_ref().map(|(result, _)| result.score);
        let final_score = self.fusion.fuse(structured.score, semantic_score.unwrap_or(0.0));

        let semantic_matches: BTreeSet<String> = semantic
            .as_ref()
            .map(|(result, _)| result.matched.clone())
            .unwrap_or_default();
        let matched_skills: BTreeSet<&String> = structured.matched.iter().chain(&semantic_matches).collect();

        let gaps = find_gaps(&self.catalog, &self.severity, &resume, &requirement);
        let coverage = category_coverage(&resume, &requirement);

        info!(
            "Match complete: final {:.2}% (structured {:.2}%, semantic {})",
            final_score,
            structured.score,
            semantic_score.map_or_else(|| "off".to_string(), |s| format!("{:.2}%", s))
        );

        let (similarity, embedding_model) = match semantic {
            Some((result, model_name)) => (Some(result.similarity), Some(model_name)),
            None => (None, None),
        };

        MatchReport {
            final_score,
            structured_score: structured.score,
            semantic_score,
            verdict: FitVerdict::from_score(final_score),
            matched_skills: matched_skills.into_iter().cloned().collect(),
            structured_matches: structured.matched.into_iter().collect(),
            semantic_matches: semantic_matches.into_iter().collect(),
            gaps,
            category_coverage: coverage,
            resume_skills: resume,
            requirement_skills: requirement,
            similarity,
            embedding_model,
            processing_time_ms: start_time.elapsed().as_millis() as u64,
            generated_at: Utc::now(),
        }
    }
}
