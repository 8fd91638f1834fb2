//! Skill matcher: resume and job description skill matching tool

use clap::Parser;
use log::{error, info, warn};
use skill_matcher::cli::{self, Cli, Commands, ConfigAction};
use skill_matcher::input::InputManager;
use skill_matcher::output::formatter::{save_report_to_file, ReportGenerator};
use skill_matcher::processing::analyzer::MatchEngine;
use skill_matcher::processing::catalog::SkillCatalog;
use skill_matcher::processing::embeddings::StaticEmbedder;
use skill_matcher::{Config, Result, SkillMatcherError};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

const DOCUMENT_EXTENSIONS: &[&str] = &["pdf", "docx", "txt", "text", "md", "markdown"];

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli.command, config).await {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

async fn run_command(command: Commands, mut config: Config) -> Result<()> {
    match command {
        Commands::Match {
            resume,
            job,
            job_text,
            no_semantic,
            embedding,
            catalog,
            detailed,
            output,
            save,
        } => {
            cli::validate_file_extension(&resume, DOCUMENT_EXTENSIONS)
                .map_err(|e| SkillMatcherError::InvalidInput(format!("Resume file: {}", e)))?;
            if let Some(job) = &job {
                cli::validate_file_extension(job, DOCUMENT_EXTENSIONS)
                    .map_err(|e| SkillMatcherError::InvalidInput(format!("Job description file: {}", e)))?;
            }
            let output_format = match output {
                Some(format) => cli::parse_output_format(&format).map_err(SkillMatcherError::InvalidInput)?,
                None => config.output.format,
            };

            if let Some(model) = embedding {
                config.models.embedding_model = model;
            }
            if no_semantic {
                config.matching.semantic_enabled = false;
            }

            let mut input_manager = InputManager::new();
            let resume_text = input_manager.extract_text(&resume).await?;
            let job_text = match (job, job_text) {
                (Some(path), _) => input_manager.extract_text(&path).await?,
                (None, Some(text)) => text,
                (None, None) => {
                    return Err(SkillMatcherError::InvalidInput(
                        "Provide a job description with --job or --job-text".to_string(),
                    ))
                }
            };

            let engine = build_engine(&config, catalog.as_deref()).await?;
            let resume_skills = engine.extract(&resume_text);
            let job_skills = engine.extract(&job_text);
            info!(
                "Extracted {} resume skills and {} job skills",
                resume_skills.skill_count(),
                job_skills.skill_count()
            );

            let report = match engine.analyze_skills(resume_skills.clone(), job_skills.clone()) {
                Ok(report) => report,
                Err(e) if e.is_embedding_failure() => {
                    warn!("Semantic matching failed, using structured score only: {}", e);
                    engine.analyze_structured(resume_skills, job_skills)
                }
                Err(e) => return Err(e),
            };

            let generator = ReportGenerator::with_options(
                config.output.color_output && save.is_none(),
                detailed || config.output.detailed,
                true,
                true,
            );
            let rendered = generator.generate_report(&report, output_format)?;

            match save {
                Some(path) => {
                    save_report_to_file(&rendered, &path)?;
                    println!("💾 Report saved to {}", path.display());
                }
                None => println!("{}", rendered),
            }
        }

        Commands::Extract { file, text, catalog } => {
            let text = match (file, text) {
                (Some(path), _) => {
                    let mut input_manager = InputManager::new().with_cache(false);
                    input_manager.extract_text(&path).await?
                }
                (None, Some(text)) => text,
                (None, None) => {
                    return Err(SkillMatcherError::InvalidInput(
                        "Provide a file or --text to scan".to_string(),
                    ))
                }
            };

            config.matching.semantic_enabled = false;
            let engine = build_engine(&config, catalog.as_deref()).await?;
            let hits = engine.extractor().extract_detailed(&text);

            if hits.is_empty() {
                println!("No catalog skills found");
                return Ok(());
            }

            println!("🔍 Found {} skills\n", hits.len());
            for hit in &hits {
                if hit.skill == hit.matched_text {
                    println!("  • {:<12} {:<24} ({})", hit.category, hit.skill, hit.method);
                } else {
                    println!(
                        "  • {:<12} {:<24} ({} via '{}', {:.2})",
                        hit.category, hit.skill, hit.method, hit.matched_text, hit.similarity
                    );
                }
            }
        }

        Commands::Catalog { category, file } => {
            let catalog = load_catalog(&config, file.as_deref())?;

            if let Some(name) = &category {
                if catalog.category(&name.to_lowercase()).is_none() {
                    return Err(SkillMatcherError::InvalidInput(format!("Unknown category: {}", name)));
                }
            }

            println!("📚 Skill Catalog ({} skills)\n", catalog.skill_count());
            for entry in catalog.categories() {
                if category.as_ref().is_some_and(|name| name.to_lowercase() != entry.name) {
                    continue;
                }

                let weight = match entry.weight {
                    Some(weight) => format!("{:.2}", weight),
                    None => format!("{:.2} (default)", catalog.default_weight()),
                };
                println!("{} [weight {}]", entry.name, weight);
                for skill in &entry.skills {
                    let synonyms = catalog.synonyms(skill);
                    if synonyms.is_empty() {
                        println!("  • {}", skill);
                    } else {
                        println!("  • {} (also: {})", skill, synonyms.join(", "));
                    }
                }
                println!();
            }
        }

        Commands::Config { action } => match action {
            Some(ConfigAction::Show) | None => {
                println!("⚙️  Current Configuration\n");
                println!("Embedding Model: {}", config.models.embedding_model);
                println!("Semantic Matching: {}", if config.matching.semantic_enabled { "on" } else { "off" });
                println!(
                    "Catalog: {}",
                    config
                        .matching
                        .catalog_path
                        .as_ref()
                        .map_or_else(|| "built-in".to_string(), |p| p.display().to_string())
                );
                println!("\nMatching:");
                println!("  Fuzzy cutoff: {:.2}", config.matching.fuzzy_cutoff);
                println!("  Semantic threshold: {:.2}", config.matching.semantic_threshold);
                println!(
                    "  Default category weight: {}",
                    config
                        .matching
                        .default_category_weight
                        .map_or_else(|| "from catalog".to_string(), |w| format!("{:.2}", w))
                );
                println!("\nScoring Weights:");
                println!("  Structured: {:.1}%", config.scoring.structured_weight * 100.0);
                println!("  Semantic: {:.1}%", config.scoring.semantic_weight * 100.0);
                println!("\nGap Severity Thresholds:");
                println!("  Critical: ≥ {:.2}", config.scoring.critical_threshold);
                println!("  Medium: ≥ {:.2}", config.scoring.medium_threshold);
            }

            Some(ConfigAction::Reset) => {
                println!("🔄 Resetting configuration to defaults...");
                Config::default().save()?;
                println!("✅ Configuration reset successfully!");
            }

            Some(ConfigAction::Path) => {
                println!("{}", Config::config_path().display());
            }
        },
    }

    Ok(())
}

/// Catalog from the command line, then the configuration, then the built-in one
fn load_catalog(config: &Config, override_path: Option<&Path>) -> Result<SkillCatalog> {
    let path: Option<PathBuf> = override_path
        .map(Path::to_path_buf)
        .or_else(|| config.matching.catalog_path.clone());

    match path {
        Some(path) => SkillCatalog::from_file(&path),
        None => Ok(SkillCatalog::builtin()),
    }
}

async fn build_engine(config: &Config, catalog_path: Option<&Path>) -> Result<MatchEngine> {
    let catalog = load_catalog(config, catalog_path)?;
    let engine = MatchEngine::from_config(catalog, config)?;

    if !config.matching.semantic_enabled {
        info!("Semantic matching disabled");
        return Ok(engine);
    }

    match StaticEmbedder::from_config(config).await {
        Ok(embedder) => Ok(engine.with_embedding_model(Arc::new(embedder))),
        Err(e) => {
            warn!("Could not load embedding model, continuing with structured matching only: {}", e);
            Ok(engine)
        }
    }
}
