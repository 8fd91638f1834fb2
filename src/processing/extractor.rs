//! Categorized skill extraction using exact, synonym and approximate matching

use crate::error::{Result, SkillMatcherError};
use crate::processing::catalog::SkillCatalog;
use crate::processing::normalizer::{normalize, word_tokens};
use aho_corasick::AhoCorasick;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use similar::TextDiff;

pub const DEFAULT_FUZZY_CUTOFF: f64 = 0.88;

static NO_SKILLS: BTreeSet<String> = BTreeSet::new();

/// Skills found in one text, grouped by category.
///
/// A category without matches is simply absent; `skills` treats a missing
/// category as an empty set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtractedSkills {
    categories: BTreeMap<String, BTreeSet<String>>,
}

impl ExtractedSkills {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, category: &str, skill: &str) {
        self.categories
            .entry(category.to_string())
            .or_default()
            .insert(skill.to_string());
    }

    /// Register a category explicitly, even with no skills
    pub fn insert_category(&mut self, category: &str) {
        self.categories.entry(category.to_string()).or_default();
    }

    pub fn skills(&self, category: &str) -> &BTreeSet<String> {
        self.categories.get(category).unwrap_or(&NO_SKILLS)
    }

    pub fn contains(&self, category: &str, skill: &str) -> bool {
        self.skills(category).contains(skill)
    }

    pub fn categories(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.categories.iter().map(|(name, skills)| (name.as_str(), skills))
    }

    /// All skills in category order, then skill order
    pub fn flatten(&self) -> Vec<String> {
        self.categories.values().flatten().cloned().collect()
    }

    pub fn skill_count(&self) -> usize {
        self.categories.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.skill_count() == 0
    }
}

impl<C: AsRef<str>, S: AsRef<str>> FromIterator<(C, S)> for ExtractedSkills {
    fn from_iter<I: IntoIterator<Item = (C, S)>>(iter: I) -> Self {
        let mut skills = Self::new();
        for (category, skill) in iter {
            skills.insert(category.as_ref(), skill.as_ref());
        }
        skills
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchMethod {
    Exact,
    Synonym,
    Fuzzy,
}

impl fmt::Display for MatchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchMethod::Exact => write!(f, "exact"),
            MatchMethod::Synonym => write!(f, "synonym"),
            MatchMethod::Fuzzy => write!(f, "fuzzy"),
        }
    }
}

/// One catalog skill found in a text and how it was found
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillHit {
    pub category: String,
    pub skill: String,
    pub method: MatchMethod,
    /// Surface form or word that triggered the match
    pub matched_text: String,
    /// 1.0 for exact and synonym hits
    pub similarity: f64,
}

/// Normalized text prepared once per extraction call
struct ScannedText<'a> {
    found: HashSet<&'a str>,
    words: BTreeSet<&'a str>,
}

/// Extractor bound to one catalog
pub struct SkillExtractor {
    catalog: Arc<SkillCatalog>,
    surface_matcher: AhoCorasick,
    surface_forms: Vec<String>,
    owners: HashMap<String, usize>,
    fuzzy_cutoff: f64,
}

impl SkillExtractor {
    pub fn new(catalog: Arc<SkillCatalog>) -> Result<Self> {
        Self::with_fuzzy_cutoff(catalog, DEFAULT_FUZZY_CUTOFF)
    }

    pub fn with_fuzzy_cutoff(catalog: Arc<SkillCatalog>, fuzzy_cutoff: f64) -> Result<Self> {
        // surface form -> index of the first category that registered it
        let mut owners: HashMap<String, usize> = HashMap::new();
        for (idx, category) in catalog.categories().enumerate() {
            for skill in &category.skills {
                owners.entry(skill.clone()).or_insert(idx);
                for alias in catalog.synonyms(skill) {
                    owners.entry(alias.clone()).or_insert(idx);
                }
            }
        }

        let mut surface_forms: Vec<String> = owners.keys().cloned().collect();
        surface_forms.sort();

        let surface_matcher = AhoCorasick::new(&surface_forms)
            .map_err(|e| SkillMatcherError::Catalog(format!("Failed to build skill matcher: {}", e)))?;

        Ok(Self {
            catalog,
            surface_matcher,
            surface_forms,
            owners,
            fuzzy_cutoff: fuzzy_cutoff.clamp(0.0, 1.0),
        })
    }

    pub fn catalog(&self) -> &SkillCatalog {
        &self.catalog
    }

    pub fn fuzzy_cutoff(&self) -> f64 {
        self.fuzzy_cutoff
    }

    /// Extract categorized skills from raw text
    pub fn extract(&self, text: &str) -> ExtractedSkills {
        self.extract_detailed(text)
            .into_iter()
            .map(|hit| (hit.category, hit.skill))
            .collect()
    }

    /// Extract skills, reporting the method that matched each one
    pub fn extract_detailed(&self, text: &str) -> Vec<SkillHit> {
        let normalized = normalize(text);
        if normalized.is_empty() {
            return Vec::new();
        }

        let scan = self.scan(&normalized);
        let mut hits = Vec::new();

        for (idx, category) in self.catalog.categories().enumerate() {
            for skill in &category.skills {
                let hit = self
                    .exact_match(idx, skill, &scan)
                    .or_else(|| self.synonym_match(idx, skill, &scan))
                    .or_else(|| self.fuzzy_match(skill, &scan));

                if let Some((method, matched_text, similarity)) = hit {
                    hits.push(SkillHit {
                        category: category.name.clone(),
                        skill: skill.clone(),
                        method,
                        matched_text,
                        similarity,
                    });
                }
            }
        }

        debug!(
            "Extracted {} skills from {} characters of text",
            hits.len(),
            normalized.len()
        );

        hits
    }

    fn scan<'a>(&'a self, normalized: &'a str) -> ScannedText<'a> {
        let bytes = normalized.as_bytes();
        let found = self
            .surface_matcher
            .find_overlapping_iter(normalized)
            .filter(|mat| is_token_bounded(bytes, mat.start(), mat.end()))
            .map(|mat| self.surface_forms[mat.pattern().as_usize()].as_str())
            .collect();

        ScannedText {
            found,
            words: word_tokens(normalized).collect(),
        }
    }

    fn owned_by(&self, form: &str, category_idx: usize) -> bool {
        self.owners.get(form) == Some(&category_idx)
    }

    fn exact_match(
        &self,
        category_idx: usize,
        skill: &str,
        scan: &ScannedText<'_>,
    ) -> Option<(MatchMethod, String, f64)> {
        (scan.found.contains(skill) && self.owned_by(skill, category_idx))
            .then(|| (MatchMethod::Exact, skill.to_string(), 1.0))
    }

    fn synonym_match(
        &self,
        category_idx: usize,
        skill: &str,
        scan: &ScannedText<'_>,
    ) -> Option<(MatchMethod, String, f64)> {
        self.catalog
            .synonyms(skill)
            .iter()
            .find(|alias| scan.found.contains(alias.as_str()) && self.owned_by(alias, category_idx))
            .map(|alias| (MatchMethod::Synonym, alias.clone(), 1.0))
    }

    /// Closest single word within the cutoff, scored as 2 * matched chars /
    /// total chars. Ties go to the lexicographically last word. Multi-word
    /// skills only match through the exact and synonym paths.
    fn fuzzy_match(&self, skill: &str, scan: &ScannedText<'_>) -> Option<(MatchMethod, String, f64)> {
        if skill.contains(char::is_whitespace) {
            return None;
        }

        let (word, similarity) = scan
            .words
            .iter()
            .map(|word| (*word, char_ratio(skill, word)))
            .max_by(|a, b| a.1.total_cmp(&b.1))?;

        (similarity >= self.fuzzy_cutoff).then(|| (MatchMethod::Fuzzy, word.to_string(), similarity))
    }
}

fn char_ratio(a: &str, b: &str) -> f64 {
    f64::from(TextDiff::from_chars(a, b).ratio())
}

/// A match counts only when it is not glued to letters or digits on either side
fn is_token_bounded(text: &[u8], start: usize, end: usize) -> bool {
    let before = start == 0 || !text[start - 1].is_ascii_alphanumeric();
    let after = end == text.len() || !text[end].is_ascii_alphanumeric();
    before && after
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> SkillExtractor {
        SkillExtractor::new(Arc::new(SkillCatalog::builtin())).unwrap()
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_java_does_not_match_javascript() {
        let skills = extractor().extract("javascript developer");
        assert!(skills.contains("programming", "javascript"));
        assert!(!skills.contains("programming", "java"));
    }

    #[test]
    fn test_javascript_does_not_match_java() {
        let skills = extractor().extract("java developer");
        assert!(skills.contains("programming", "java"));
        assert!(!skills.contains("programming", "javascript"));
    }

    #[test]
    fn test_synonyms_resolve_to_canonical() {
        let skills = extractor().extract("experienced in ML and JS");
        assert!(skills.contains("ai_ml", "machine learning"));
        assert!(skills.contains("programming", "javascript"));
    }

    #[test]
    fn test_job_posting_with_synonyms() {
        let skills = extractor().extract("Looking for ML engineer with JS and CSS3 experience.");

        let expected: ExtractedSkills = [
            ("ai_ml", "machine learning"),
            ("programming", "javascript"),
            ("web", "css"),
        ]
        .into_iter()
        .collect();
        assert_eq!(skills, expected);
    }

    #[test]
    fn test_symbols_match_literally() {
        let skills = extractor().extract("Systems work in C++ and some C.");
        assert_eq!(skills.skills("programming"), &set(&["c", "c++"]));

        // "." must not act as a wildcard
        let catalog = SkillCatalog::new().with_category("web", Some(0.5), &["node.js"]);
        let extractor = SkillExtractor::new(Arc::new(catalog)).unwrap();
        assert!(extractor.extract("nodexjs").is_empty());
        assert!(extractor.extract("Backend in Node.js").contains("web", "node.js"));
    }

    #[test]
    fn test_multi_word_skills_match_exactly() {
        let skills = extractor().extract("Background in deep learning and computer vision");
        assert_eq!(skills.skills("ai_ml"), &set(&["computer vision", "deep learning"]));
    }

    #[test]
    fn test_fuzzy_recovers_long_misspellings() {
        let hits = extractor().extract_detailed("Hands-on with tensorflw and typescrpt");

        let tensorflow = hits.iter().find(|h| h.skill == "tensorflow").unwrap();
        assert_eq!(tensorflow.method, MatchMethod::Fuzzy);
        assert_eq!(tensorflow.matched_text, "tensorflw");
        assert!(tensorflow.similarity >= DEFAULT_FUZZY_CUTOFF);

        assert!(hits.iter().any(|h| h.skill == "typescript" && h.method == MatchMethod::Fuzzy));
    }

    #[test]
    fn test_fuzzy_recovers_dropped_letters() {
        let skills = extractor().extract("pyhon, dockr and pytorh");
        assert!(skills.contains("programming", "python"));
        assert!(skills.contains("tools", "docker"));
        assert!(skills.contains("ai_ml", "pytorch"));

        let skills = extractor().extract("pands and dockers");
        assert!(skills.contains("data", "pandas"));
        assert!(skills.contains("tools", "docker"));
    }

    #[test]
    fn test_fuzzy_rejects_transpositions_in_short_words() {
        let skills = extractor().extract("pyhton, got and gits");
        assert!(!skills.contains("programming", "python"));
        assert!(!skills.contains("tools", "git"));
    }

    #[test]
    fn test_char_ratio() {
        assert_eq!(char_ratio("python", "python"), 1.0);
        assert!((char_ratio("python", "pyhon") - 10.0 / 11.0).abs() < 1e-6);
        assert!((char_ratio("python", "pyhton") - 10.0 / 12.0).abs() < 1e-6);
        assert!(char_ratio("git", "gits") < DEFAULT_FUZZY_CUTOFF);
    }

    #[test]
    fn test_fuzzy_skips_multi_word_skills() {
        let skills = extractor().extract("machine learnin");
        assert!(!skills.contains("ai_ml", "machine learning"));
    }

    #[test]
    fn test_method_priority() {
        let hits = extractor().extract_detailed("python, js");
        let python = hits.iter().find(|h| h.skill == "python").unwrap();
        assert_eq!(python.method, MatchMethod::Exact);
        let js = hits.iter().find(|h| h.skill == "javascript").unwrap();
        assert_eq!(js.method, MatchMethod::Synonym);
        assert_eq!(js.matched_text, "js");
    }

    #[test]
    fn test_empty_text() {
        assert!(extractor().extract("").is_empty());
        assert!(extractor().extract("   \n\t").is_empty());
        assert!(extractor().extract_detailed("").is_empty());
    }

    #[test]
    fn test_empty_categories_are_omitted() {
        let skills = extractor().extract("python only");
        let categories: Vec<&str> = skills.categories().map(|(name, _)| name).collect();
        assert_eq!(categories, vec!["programming"]);
        assert!(skills.skills("web").is_empty());
    }

    #[test]
    fn test_first_registered_category_owns_colliding_synonym() {
        let catalog = SkillCatalog::new()
            .with_category("runtime", Some(0.3), &["node"])
            .with_category("languages", Some(0.3), &["javascript"])
            .with_synonyms("javascript", &["node"]);
        let extractor = SkillExtractor::new(Arc::new(catalog)).unwrap();

        let skills = extractor.extract("node services");
        assert!(skills.contains("runtime", "node"));
        assert!(!skills.contains("languages", "javascript"));
    }

    #[test]
    fn test_empty_catalog() {
        let extractor = SkillExtractor::new(Arc::new(SkillCatalog::new())).unwrap();
        assert!(extractor.extract("python docker").is_empty());
    }

    #[test]
    fn test_flatten_and_counts() {
        let skills = extractor().extract("Python, Docker, Pandas");
        assert_eq!(skills.skill_count(), 3);
        assert_eq!(skills.flatten(), vec!["pandas", "python", "docker"]);
    }
}
