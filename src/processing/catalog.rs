//! Skill catalog: categories, canonical skills, synonyms and category weights

use crate::error::{Result, SkillMatcherError};
use crate::processing::normalizer::normalize;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

pub const DEFAULT_CATEGORY_WEIGHT: f64 = 0.05;

fn default_category_weight() -> f64 {
    DEFAULT_CATEGORY_WEIGHT
}

/// A named group of canonical skills with an optional importance weight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    #[serde(default)]
    pub weight: Option<f64>,
    pub skills: Vec<String>,
}

/// Immutable reference data shared by extraction and scoring.
///
/// Categories keep registration order; when a surface form is claimed by
/// more than one category the first registered one owns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillCatalog {
    #[serde(default = "default_category_weight")]
    default_weight: f64,
    #[serde(default)]
    categories: Vec<Category>,
    #[serde(default)]
    synonyms: BTreeMap<String, Vec<String>>,
}

impl Default for SkillCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl SkillCatalog {
    /// An empty catalog using the standard fallback weight
    pub fn new() -> Self {
        Self {
            default_weight: DEFAULT_CATEGORY_WEIGHT,
            categories: Vec::new(),
            synonyms: BTreeMap::new(),
        }
    }

    /// The built-in technical skill catalog
    pub fn builtin() -> Self {
        Self::new()
            .with_category(
                "programming",
                Some(0.35),
                &["python", "java", "c++", "c", "javascript", "typescript"],
            )
            .with_category(
                "ai_ml",
                Some(0.30),
                &[
                    "machine learning",
                    "deep learning",
                    "tensorflow",
                    "pytorch",
                    "nlp",
                    "computer vision",
                    "scikit-learn",
                    "large language model",
                    "llm",
                ],
            )
            .with_category(
                "data",
                Some(0.20),
                &["pandas", "numpy", "matplotlib", "seaborn", "data analysis", "data science"],
            )
            .with_category("tools", Some(0.10), &["git", "github", "docker", "linux", "vscode"])
            .with_category("web", Some(0.05), &["html", "css", "react", "node", "express"])
            .with_category("emerging", None, &["blockchain", "web3"])
            .with_synonyms("machine learning", &["ml"])
            .with_synonyms("large language model", &["llm", "large language models"])
            .with_synonyms("javascript", &["js"])
            .with_synonyms("css", &["css3"])
            .with_synonyms("html", &["html5"])
    }

    pub fn with_category(mut self, name: &str, weight: Option<f64>, skills: &[&str]) -> Self {
        self.categories.push(Category {
            name: name.to_string(),
            weight,
            skills: skills.iter().map(|s| s.to_string()).collect(),
        });
        self
    }

    pub fn with_synonyms(mut self, skill: &str, synonyms: &[&str]) -> Self {
        self.synonyms
            .entry(skill.to_string())
            .or_default()
            .extend(synonyms.iter().map(|s| s.to_string()));
        self
    }

    pub fn with_default_weight(mut self, weight: f64) -> Self {
        self.default_weight = weight;
        self
    }

    /// Parse a catalog from TOML, canonicalize its entries and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let catalog: SkillCatalog = toml::from_str(content)
            .map_err(|e| SkillMatcherError::Catalog(format!("Failed to parse catalog: {}", e)))?;
        let catalog = catalog.canonicalized();
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SkillMatcherError::FileNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        let catalog = Self::from_toml_str(&content)?;
        log::info!(
            "Loaded skill catalog from {} ({} categories, {} skills)",
            path.display(),
            catalog.categories.len(),
            catalog.skill_count()
        );
        Ok(catalog)
    }

    /// Lowercase and trim every entry, dropping duplicate canonical skills
    /// (the first category to register a skill keeps it).
    pub fn canonicalized(mut self) -> Self {
        let mut seen = HashSet::new();

        for category in &mut self.categories {
            category.name = category.name.trim().to_lowercase();
            let mut skills = Vec::with_capacity(category.skills.len());
            for skill in category.skills.drain(..) {
                let skill = skill.trim().to_lowercase();
                if seen.insert(skill.clone()) {
                    skills.push(skill);
                } else {
                    warn!(
                        "Skill '{}' already registered in an earlier category, ignoring it in '{}'",
                        skill, category.name
                    );
                }
            }
            category.skills = skills;
        }

        self.synonyms = std::mem::take(&mut self.synonyms)
            .into_iter()
            .map(|(skill, aliases)| {
                let mut aliases: Vec<String> = aliases
                    .into_iter()
                    .map(|alias| alias.trim().to_lowercase())
                    .collect();
                aliases.sort();
                aliases.dedup();
                (skill.trim().to_lowercase(), aliases)
            })
            .collect();

        self
    }

    /// Hard errors for unusable entries, warnings for ambiguity
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.default_weight) {
            return Err(SkillMatcherError::Catalog(format!(
                "default weight must be within [0, 1], got {}",
                self.default_weight
            )));
        }

        let mut names = HashSet::new();
        for category in &self.categories {
            if category.name.is_empty() {
                return Err(SkillMatcherError::Catalog("category with empty name".to_string()));
            }
            if !names.insert(category.name.as_str()) {
                return Err(SkillMatcherError::Catalog(format!(
                    "category '{}' registered twice",
                    category.name
                )));
            }
            if let Some(weight) = category.weight {
                if !(0.0..=1.0).contains(&weight) {
                    return Err(SkillMatcherError::Catalog(format!(
                        "weight for '{}' must be within [0, 1], got {}",
                        category.name, weight
                    )));
                }
            }
            for skill in &category.skills {
                if skill.is_empty() {
                    return Err(SkillMatcherError::Catalog(format!(
                        "empty skill in category '{}'",
                        category.name
                    )));
                }
                if normalize(skill) != *skill {
                    warn!(
                        "Skill '{}' in '{}' changes under normalization and will never match exactly",
                        skill, category.name
                    );
                }
            }
        }

        let owners: HashMap<&str, &str> = self
            .categories
            .iter()
            .flat_map(|c| c.skills.iter().map(move |s| (s.as_str(), c.name.as_str())))
            .collect();

        for (skill, aliases) in &self.synonyms {
            let Some(home) = owners.get(skill.as_str()) else {
                warn!("Synonyms registered for unknown skill '{}'", skill);
                continue;
            };
            for alias in aliases {
                if alias.is_empty() {
                    return Err(SkillMatcherError::Catalog(format!(
                        "empty synonym for skill '{}'",
                        skill
                    )));
                }
                if let Some(other) = owners.get(alias.as_str()) {
                    if other != home {
                        warn!(
                            "Synonym '{}' of '{}' ({}) collides with a canonical skill in '{}'",
                            alias, skill, home, other
                        );
                    }
                }
            }
        }

        Ok(())
    }

    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter()
    }

    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Configured weight of a category, if it has one
    pub fn weight(&self, category: &str) -> Option<f64> {
        self.category(category).and_then(|c| c.weight)
    }

    /// Weight used for scoring; unweighted or unknown categories fall back
    /// to the default weight instead of failing.
    pub fn weight_or_default(&self, category: &str) -> f64 {
        self.weight(category).unwrap_or(self.default_weight)
    }

    pub fn default_weight(&self) -> f64 {
        self.default_weight
    }

    pub fn synonyms(&self, skill: &str) -> &[String] {
        self.synonyms.get(skill).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn category_of(&self, skill: &str) -> Option<&str> {
        self.categories
            .iter()
            .find(|c| c.skills.iter().any(|s| s == skill))
            .map(|c| c.name.as_str())
    }

    pub fn skill_count(&self) -> usize {
        self.categories.iter().map(|c| c.skills.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.skill_count() == 0
    }
}
