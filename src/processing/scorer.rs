//! Structured scoring, hybrid fusion and severity-weighted gap analysis

use crate::processing::catalog::SkillCatalog;
use crate::processing::extractor::ExtractedSkills;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Round to two decimal places, ties to even (3.125 becomes 3.12)
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredScore {
    /// Weighted coverage in [0, 100]
    pub score: f64,
    /// Requirement skills found verbatim (after extraction) in the resume
    pub matched: BTreeSet<String>,
}

fn category_weight(catalog: &SkillCatalog, category: &str) -> f64 {
    match catalog.weight(category) {
        Some(weight) => weight,
        None => {
            debug!(
                "Category '{}' has no configured weight, using fallback {}",
                category,
                catalog.default_weight()
            );
            catalog.default_weight()
        }
    }
}

/// Weighted coverage of the requirement's skills by the resume's skills.
///
/// Each requirement category contributes its weight times the fraction of its
/// skills present in the same resume category. Requirement categories with no
/// skills take no part in the weighting.
pub fn structured_score(
    catalog: &SkillCatalog,
    resume: &ExtractedSkills,
    requirement: &ExtractedSkills,
) -> StructuredScore {
    let mut total_weight = 0.0;
    let mut earned_weight = 0.0;
    let mut matched = BTreeSet::new();

    for (category, required) in requirement.categories() {
        if required.is_empty() {
            continue;
        }

        let weight = category_weight(catalog, category);
        let common: Vec<&String> = required.intersection(resume.skills(category)).collect();
        let coverage = common.len() as f64 / required.len() as f64;

        total_weight += weight;
        earned_weight += weight * coverage;
        matched.extend(common.into_iter().cloned());
    }

    if total_weight == 0.0 {
        return StructuredScore {
            score: 0.0,
            matched: BTreeSet::new(),
        };
    }

    StructuredScore {
        score: round2(100.0 * earned_weight / total_weight),
        matched,
    }
}

/// Percentage of each non-empty requirement category found in the resume
pub fn category_coverage(resume: &ExtractedSkills, requirement: &ExtractedSkills) -> BTreeMap<String, f64> {
    requirement
        .categories()
        .filter(|(_, required)| !required.is_empty())
        .map(|(category, required)| {
            let common = required.intersection(resume.skills(category)).count();
            let coverage = 100.0 * common as f64 / required.len() as f64;
            (category.to_string(), round2(coverage))
        })
        .collect()
}

/// Fixed blend of structured and semantic scores
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FusionWeights {
    pub structured: f64,
    pub semantic: f64,
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self {
            structured: 0.6,
            semantic: 0.4,
        }
    }
}

impl FusionWeights {
    pub fn fuse(&self, structured_score: f64, semantic_score: f64) -> f64 {
        round2(self.structured * structured_score + self.semantic * semantic_score)
    }
}

/// Fuse with the standard 0.6 / 0.4 weights
pub fn fuse(structured_score: f64, semantic_score: f64) -> f64 {
    FusionWeights::default().fuse(structured_score, semantic_score)
}

/// Priority bucket for a missing skill. Ordered from most to least severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Medium,
    Low,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Critical => write!(f, "critical"),
            Severity::Medium => write!(f, "medium"),
            Severity::Low => write!(f, "low"),
        }
    }
}

/// Ordered (minimum weight, tier) table; weights below every entry are low
#[derive(Debug, Clone, PartialEq)]
pub struct SeverityTable {
    tiers: Vec<(f64, Severity)>,
}

impl Default for SeverityTable {
    fn default() -> Self {
        Self::new(0.30, 0.15)
    }
}

impl SeverityTable {
    pub fn new(critical_threshold: f64, medium_threshold: f64) -> Self {
        Self {
            tiers: vec![
                (critical_threshold, Severity::Critical),
                (medium_threshold, Severity::Medium),
            ],
        }
    }

    pub fn classify(&self, weight: f64) -> Severity {
        self.tiers
            .iter()
            .find(|(minimum, _)| weight >= *minimum)
            .map(|(_, severity)| *severity)
            .unwrap_or(Severity::Low)
    }

    pub fn threshold(&self, severity: Severity) -> Option<f64> {
        self.tiers
            .iter()
            .find(|(_, tier)| *tier == severity)
            .map(|(minimum, _)| *minimum)
    }
}

/// Missing requirement skills split into disjoint severity tiers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GapReport {
    pub critical: BTreeSet<String>,
    pub medium: BTreeSet<String>,
    pub low: BTreeSet<String>,
}

impl GapReport {
    pub fn tier(&self, severity: Severity) -> &BTreeSet<String> {
        match severity {
            Severity::Critical => &self.critical,
            Severity::Medium => &self.medium,
            Severity::Low => &self.low,
        }
    }

    fn tier_mut(&mut self, severity: Severity) -> &mut BTreeSet<String> {
        match severity {
            Severity::Critical => &mut self.critical,
            Severity::Medium => &mut self.medium,
            Severity::Low => &mut self.low,
        }
    }

    pub fn all_missing(&self) -> BTreeSet<String> {
        self.critical
            .iter()
            .chain(&self.medium)
            .chain(&self.low)
            .cloned()
            .collect()
    }

    pub fn total(&self) -> usize {
        self.critical.len() + self.medium.len() + self.low.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Classify every missing requirement skill by its category weight.
///
/// If the same skill is listed under several requirement categories it lands
/// in the most severe tier only.
pub fn find_gaps(
    catalog: &SkillCatalog,
    table: &SeverityTable,
    resume: &ExtractedSkills,
    requirement: &ExtractedSkills,
) -> GapReport {
    let mut placement: BTreeMap<&str, Severity> = BTreeMap::new();

    for (category, required) in requirement.categories() {
        let severity = table.classify(category_weight(catalog, category));
        for skill in required.difference(resume.skills(category)) {
            placement
                .entry(skill.as_str())
                .and_modify(|current| *current = (*current).min(severity))
                .or_insert(severity);
        }
    }

    let mut gaps = GapReport::default();
    for (skill, severity) in placement {
        gaps.tier_mut(severity).insert(skill.to_string());
    }
    gaps
}

/// Overall verdict on the final score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitVerdict {
    Strong,
    Partial,
    Weak,
}

impl FitVerdict {
    pub fn from_score(final_score: f64) -> Self {
        if final_score >= 75.0 {
            FitVerdict::Strong
        } else if final_score >= 50.0 {
            FitVerdict::Partial
        } else {
            FitVerdict::Weak
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            FitVerdict::Strong => "The resume is a strong fit for this role.",
            FitVerdict::Partial => "The resume matches many requirements, but some gaps remain.",
            FitVerdict::Weak => "The resume needs more alignment with this job description.",
        }
    }
}
