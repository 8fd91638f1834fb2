//! Embedding-based matching for skills that are related but spelled differently

use crate::error::{Result, SkillMatcherError};
use crate::processing::scorer::round2;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const DEFAULT_SEMANTIC_THRESHOLD: f64 = 0.65;

/// Anything that turns phrases into fixed-length vectors.
///
/// Implementations must return one vector per input, all of the same
/// dimension, and are shared read-only across match runs.
pub trait EmbeddingModel: Send + Sync {
    fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    fn name(&self) -> &str {
        "embedding-model"
    }
}

/// Cosine similarity, 0.0 when either vector has zero norm
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f64> {
    if a.len() != b.len() {
        return Err(SkillMatcherError::Embedding(format!(
            "Embedding dimensions don't match: {} vs {}",
            a.len(),
            b.len()
        )));
    }

    let (dot, norm_a, norm_b) = a.iter().zip(b).fold((0.0f64, 0.0f64, 0.0f64), |(dot, na, nb), (x, y)| {
        let (x, y) = (f64::from(*x), f64::from(*y));
        (dot + x * y, na + x * x, nb + y * y)
    });

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }

    Ok(dot / (norm_a.sqrt() * norm_b.sqrt()))
}

/// Requirement skills (rows) against resume skills (columns)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityMatrix {
    pub rows: Vec<String>,
    pub columns: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl SimilarityMatrix {
    pub fn get(&self, row: usize, column: usize) -> Option<f64> {
        self.values.get(row).and_then(|r| r.get(column)).copied()
    }

    /// Best resume-side similarity for one requirement skill
    pub fn row_max(&self, row: usize) -> Option<f64> {
        self.values
            .get(row)?
            .iter()
            .copied()
            .max_by(|a, b| a.total_cmp(b))
    }

    /// Index of the closest resume skill for one requirement skill
    pub fn best_column(&self, row: usize) -> Option<usize> {
        self.values
            .get(row)?
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(idx, _)| idx)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticMatch {
    pub matched: BTreeSet<String>,
    /// Percentage of requirement skills with a close enough resume skill
    pub score: f64,
    pub similarity: SimilarityMatrix,
}

impl SemanticMatch {
    fn empty(resume_skills: &[String], requirement_skills: &[String]) -> Self {
        Self {
            matched: BTreeSet::new(),
            score: 0.0,
            similarity: SimilarityMatrix {
                rows: requirement_skills.to_vec(),
                columns: resume_skills.to_vec(),
                values: Vec::new(),
            },
        }
    }
}

pub struct SemanticMatcher {
    threshold: f64,
}

impl Default for SemanticMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_SEMANTIC_THRESHOLD)
    }
}

impl SemanticMatcher {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Match flattened skill lists through one batched encode call.
    ///
    /// A requirement skill is satisfied when its best cosine similarity to any
    /// resume skill reaches the threshold (inclusive). Empty input on either
    /// side yields an empty match with score 0.0.
    pub fn match_skills(
        &self,
        model: &dyn EmbeddingModel,
        resume_skills: &[String],
        requirement_skills: &[String],
    ) -> Result<SemanticMatch> {
        if resume_skills.is_empty() || requirement_skills.is_empty() {
            debug!("Skipping semantic matching: one side has no skills");
            return Ok(SemanticMatch::empty(resume_skills, requirement_skills));
        }

        let similarity = self.similarity_matrix(model, resume_skills, requirement_skills)?;

        let matched: BTreeSet<String> = similarity
            .rows
            .iter()
            .enumerate()
            .filter(|(row, _)| similarity.row_max(*row).is_some_and(|best| best >= self.threshold))
            .map(|(_, skill)| skill.clone())
            .collect();

        let score = round2(100.0 * matched.len() as f64 / requirement_skills.len() as f64);

        debug!(
            "Semantic matching satisfied {}/{} requirement skills with {}",
            matched.len(),
            requirement_skills.len(),
            model.name()
        );

        Ok(SemanticMatch {
            matched,
            score,
            similarity,
        })
    }

    /// Pairwise cosine similarities without thresholding
    pub fn similarity_matrix(
        &self,
        model: &dyn EmbeddingModel,
        resume_skills: &[String],
        requirement_skills: &[String],
    ) -> Result<SimilarityMatrix> {
        let texts: Vec<String> = resume_skills
            .iter()
            .chain(requirement_skills)
            .cloned()
            .collect();

        let embeddings = model.encode(&texts)?;
        if embeddings.len() != texts.len() {
            return Err(SkillMatcherError::Embedding(format!(
                "{} returned {} vectors for {} inputs",
                model.name(),
                embeddings.len(),
                texts.len()
            )));
        }

        let (resume_vectors, requirement_vectors) = embeddings.split_at(resume_skills.len());

        let values = requirement_vectors
            .iter()
            .map(|requirement| {
                resume_vectors
                    .iter()
                    .map(|resume| cosine_similarity(requirement, resume))
                    .collect::<Result<Vec<f64>>>()
            })
            .collect::<Result<Vec<Vec<f64>>>>()?;

        Ok(SimilarityMatrix {
            rows: requirement_skills.to_vec(),
            columns: resume_skills.to_vec(),
            values,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct LookupModel {
        vectors: HashMap<String, Vec<f32>>,
        calls: AtomicUsize,
    }

    impl LookupModel {
        fn new(entries: &[(&str, Vec<f32>)]) -> Self {
            Self {
                vectors: entries
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.clone()))
                    .collect(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl EmbeddingModel for LookupModel {
        fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            texts
                .iter()
                .map(|t| {
                    self.vectors
                        .get(t)
                        .cloned()
                        .ok_or_else(|| SkillMatcherError::Embedding(format!("no vector for {}", t)))
                })
                .collect()
        }
    }

    struct ShortModel;

    impl EmbeddingModel for ShortModel {
        fn encode(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(vec![vec![1.0, 0.0]])
        }
    }

    fn list(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_cosine_similarity() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]).unwrap(), 1.0);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).unwrap(), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[-2.0, 0.0]).unwrap(), -1.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]).unwrap(), 0.0);
        assert!(cosine_similarity(&[1.0], &[1.0, 0.0]).is_err());
    }

    #[test]
    fn test_threshold_is_inclusive() {
        // cos = 13 / 20 = 0.65 exactly
        let model = LookupModel::new(&[
            ("pytorch", vec![1.0, 0.0, 0.0, 0.0, 0.0]),
            ("tensorflow", vec![13.0, 11.0, 10.0, 3.0, 1.0]),
        ]);
        let matcher = SemanticMatcher::default();

        let result = matcher
            .match_skills(&model, &list(&["pytorch"]), &list(&["tensorflow"]))
            .unwrap();

        assert_eq!(result.similarity.get(0, 0), Some(0.65));
        assert!(result.matched.contains("tensorflow"));
        assert_eq!(result.score, 100.0);
    }

    #[test]
    fn test_below_threshold_is_not_matched() {
        let model = LookupModel::new(&[
            ("git", vec![1.0, 0.0]),
            ("react", vec![0.6, 0.8]),
        ]);
        let result = SemanticMatcher::default()
            .match_skills(&model, &list(&["git"]), &list(&["react"]))
            .unwrap();

        assert!(result.matched.is_empty());
        assert_eq!(result.score, 0.0);
    }

    #[test]
    fn test_score_uses_best_resume_skill() {
        let model = LookupModel::new(&[
            ("pytorch", vec![1.0, 0.0, 0.0]),
            ("linux", vec![0.0, 0.0, 1.0]),
            ("tensorflow", vec![0.9, 0.1, 0.0]),
            ("deep learning", vec![0.8, 0.2, 0.1]),
            ("css", vec![0.0, 1.0, 0.0]),
        ]);
        let matcher = SemanticMatcher::default();

        let result = matcher
            .match_skills(
                &model,
                &list(&["pytorch", "linux"]),
                &list(&["tensorflow", "deep learning", "css"]),
            )
            .unwrap();

        assert_eq!(result.matched.len(), 2);
        assert!(result.matched.contains("tensorflow"));
        assert!(result.matched.contains("deep learning"));
        assert_eq!(result.score, 66.67);
        assert_eq!(result.similarity.rows.len(), 3);
        assert_eq!(result.similarity.columns, list(&["pytorch", "linux"]));
        assert_eq!(result.similarity.best_column(0), Some(0));
        assert_eq!(model.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_empty_side_short_circuits() {
        let model = LookupModel::new(&[]);
        let matcher = SemanticMatcher::default();

        let result = matcher.match_skills(&model, &[], &list(&["python"])).unwrap();
        assert!(result.matched.is_empty());
        assert_eq!(result.score, 0.0);

        let result = matcher.match_skills(&model, &list(&["python"]), &[]).unwrap();
        assert_eq!(result.score, 0.0);
        assert!(result.similarity.is_empty());
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_model_errors_propagate() {
        let model = LookupModel::new(&[("python", vec![1.0])]);
        let result = SemanticMatcher::default().match_skills(&model, &list(&["python"]), &list(&["rust"]));
        assert!(matches!(result, Err(SkillMatcherError::Embedding(_))));
    }

    #[test]
    fn test_wrong_vector_count_is_an_error() {
        let result = SemanticMatcher::default().match_skills(&ShortModel, &list(&["a"]), &list(&["b"]));
        assert!(matches!(result, Err(SkillMatcherError::Embedding(_))));
    }

    #[test]
    fn test_row_max() {
        let matrix = SimilarityMatrix {
            rows: list(&["a"]),
            columns: list(&["x", "y"]),
            values: vec![vec![0.2, 0.7]],
        };
        assert_eq!(matrix.row_max(0), Some(0.7));
        assert_eq!(matrix.row_max(1), None);
        assert_eq!(matrix.get(0, 1), Some(0.7));
    }
}
