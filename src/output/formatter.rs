//! Output formatters for match reports

use crate::config::OutputFormat;
use crate::error::Result;
use crate::processing::analyzer::MatchReport;
use crate::processing::scorer::{FitVerdict, Severity};
use crate::processing::semantic::SimilarityMatrix;
use colored::{Color, Colorize};
use std::path::Path;

const SEVERITIES: [Severity; 3] = [Severity::Critical, Severity::Medium, Severity::Low];

/// Trait for rendering a match report
pub trait OutputFormatter {
    fn format_report(&self, report: &MatchReport) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

/// Console formatter with colors
pub struct ConsoleFormatter {
    use_colors: bool,
    detailed: bool,
}

/// JSON formatter for piping into other tools
pub struct JsonFormatter {
    pretty: bool,
}

pub struct MarkdownFormatter {
    include_metadata: bool,
}

/// Report generator that coordinates different formatters
pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
    markdown_formatter: MarkdownFormatter,
}

fn join_or_none(skills: impl IntoIterator<Item = impl AsRef<str>>) -> String {
    let joined = skills
        .into_iter()
        .map(|s| s.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(", ");
    if joined.is_empty() {
        "none".to_string()
    } else {
        joined
    }
}

fn verdict_label(verdict: FitVerdict) -> &'static str {
    match verdict {
        FitVerdict::Strong => "STRONG FIT",
        FitVerdict::Partial => "PARTIAL FIT",
        FitVerdict::Weak => "WEAK FIT",
    }
}

fn semantic_display(report: &MatchReport) -> String {
    match report.semantic_score {
        Some(score) => format!("{:.2}%", score),
        None => "not computed".to_string(),
    }
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool, detailed: bool) -> Self {
        Self { use_colors, detailed }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str, level: u8) -> String {
        let prefix = match level {
            1 => "█",
            2 => "▓",
            _ => "▒",
        };

        let color = match level {
            1 => Color::Blue,
            2 => Color::Green,
            _ => Color::Yellow,
        };

        if self.use_colors {
            format!("\n{} {}\n", prefix.color(color).bold(), title.color(color).bold())
        } else {
            format!("\n{} {}\n", prefix, title)
        }
    }

    fn format_score_badge(&self, verdict: FitVerdict) -> String {
        let color = match verdict {
            FitVerdict::Strong => Color::Green,
            FitVerdict::Partial => Color::Yellow,
            FitVerdict::Weak => Color::Red,
        };

        if self.use_colors {
            format!("[{}]", verdict_label(verdict).color(color).bold())
        } else {
            format!("[{}]", verdict_label(verdict))
        }
    }

    fn severity_color(severity: Severity) -> Color {
        match severity {
            Severity::Critical => Color::Red,
            Severity::Medium => Color::Yellow,
            Severity::Low => Color::Blue,
        }
    }

    fn format_matrix(&self, matrix: &SimilarityMatrix) -> String {
        let label_width = matrix.rows.iter().map(String::len).max().unwrap_or(0).max(11);
        let mut output = format!("{:<width$}", "requirement", width = label_width);
        for column in &matrix.columns {
            output.push_str(&format!("  {:>w$}", column, w = column.len().max(5)));
        }
        output.push('\n');

        for (row, skill) in matrix.rows.iter().enumerate() {
            output.push_str(&format!("{:<width$}", skill, width = label_width));
            for (column, name) in matrix.columns.iter().enumerate() {
                let cell = matrix
                    .get(row, column)
                    .map_or_else(|| "-".to_string(), |v| format!("{:.2}", v));
                output.push_str(&format!("  {:>w$}", cell, w = name.len().max(5)));
            }
            output.push('\n');
        }
        output
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_report(&self, report: &MatchReport) -> Result<String> {
        let mut output = String::new();

        output.push_str(&self.format_header("📊 SKILL MATCH ANALYSIS", 1));
        output.push_str(&format!(
            "Generated: {} | Processing time: {}ms\n",
            report.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
            report.processing_time_ms
        ));

        output.push_str(&self.format_header("Summary", 2));
        output.push_str(&format!(
            "Final Score: {:.2}% {}\n",
            report.final_score,
            self.format_score_badge(report.verdict)
        ));
        output.push_str(&format!(
            "Verdict: {}\n",
            self.colorize(report.verdict.description(), Color::Cyan)
        ));
        output.push_str(&format!("🔍 Structured Score: {:.2}%\n", report.structured_score));
        output.push_str(&format!("🎯 Semantic Score: {}\n", semantic_display(report)));
        if let Some(model) = &report.embedding_model {
            output.push_str(&format!("   Embedding model: {}\n", model));
        }

        output.push_str(&self.format_header("Matched Skills", 2));
        output.push_str(&format!(
            "{}\n",
            self.colorize(&join_or_none(&report.matched_skills), Color::Green)
        ));

        output.push_str(&self.format_header("Skill Gaps", 2));
        if report.gaps.is_empty() {
            output.push_str(&format!("{}\n", self.colorize("No missing skills", Color::Green)));
        } else {
            for severity in SEVERITIES {
                let tier = report.gaps.tier(severity);
                if tier.is_empty() {
                    continue;
                }
                let label = format!("{:<8}", severity.to_string().to_uppercase());
                output.push_str(&format!(
                    "{} {}\n",
                    self.colorize(&label, Self::severity_color(severity)),
                    join_or_none(tier)
                ));
            }
        }

        if !report.category_coverage.is_empty() {
            output.push_str(&self.format_header("Category Coverage", 3));
            for (category, coverage) in &report.category_coverage {
                output.push_str(&format!("  • {:<14} {:>6.2}%\n", category, coverage));
            }
        }

        if self.detailed {
            output.push_str(&self.format_header("Extracted Skills", 3));
            output.push_str(&format!("Resume: {}\n", join_or_none(report.resume_skills.flatten())));
            output.push_str(&format!("Job:    {}\n", join_or_none(report.requirement_skills.flatten())));
            output.push_str(&format!(
                "Structured matches: {}\n",
                join_or_none(&report.structured_matches)
            ));
            output.push_str(&format!("Semantic matches:   {}\n", join_or_none(&report.semantic_matches)));

            if let Some(matrix) = report.similarity.as_ref().filter(|m| !m.is_empty()) {
                output.push_str(&self.format_header("Similarity Matrix", 3));
                output.push_str(&self.format_matrix(matrix));
            }
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &MatchReport) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(report)?)
        } else {
            Ok(serde_json::to_string(report)?)
        }
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

impl MarkdownFormatter {
    pub fn new(include_metadata: bool) -> Self {
        Self { include_metadata }
    }

    fn markdown_badge(verdict: FitVerdict) -> &'static str {
        match verdict {
            FitVerdict::Strong => "🟢 Strong fit",
            FitVerdict::Partial => "🟡 Partial fit",
            FitVerdict::Weak => "🔴 Weak fit",
        }
    }

    fn markdown_matrix(matrix: &SimilarityMatrix) -> String {
        let mut output = format!("| requirement | {} |\n", matrix.columns.join(" | "));
        output.push_str(&format!("|---{}|\n", "|---".repeat(matrix.columns.len())));
        for (row, skill) in matrix.rows.iter().enumerate() {
            let cells: Vec<String> = (0..matrix.columns.len())
                .map(|column| {
                    matrix
                        .get(row, column)
                        .map_or_else(|| "-".to_string(), |v| format!("{:.2}", v))
                })
                .collect();
            output.push_str(&format!("| {} | {} |\n", skill, cells.join(" | ")));
        }
        output
    }
}

impl OutputFormatter for MarkdownFormatter {
    fn format_report(&self, report: &MatchReport) -> Result<String> {
        let mut output = String::new();

        output.push_str("# 📊 Skill Match Report\n\n");

        if self.include_metadata {
            output.push_str(&format!(
                "**Generated:** {} | **Processing Time:** {}ms\n\n",
                report.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
                report.processing_time_ms
            ));
            if let Some(model) = &report.embedding_model {
                output.push_str(&format!("**Embedding model:** `{}`\n\n", model));
            }
        }

        output.push_str("## Summary\n\n");
        output.push_str(&format!(
            "**Final Score:** {:.2}% {}\n\n",
            report.final_score,
            Self::markdown_badge(report.verdict)
        ));
        output.push_str(&format!("**Verdict:** {}\n\n", report.verdict.description()));

        output.push_str("| Component | Score |\n");
        output.push_str("|-----------|-------|\n");
        output.push_str(&format!("| Structured | {:.2}% |\n", report.structured_score));
        output.push_str(&format!("| Semantic | {} |\n\n", semantic_display(report)));

        output.push_str("## Matched Skills\n\n");
        if report.matched_skills.is_empty() {
            output.push_str("_None_\n\n");
        } else {
            for skill in &report.matched_skills {
                output.push_str(&format!("- {}\n", skill));
            }
            output.push('\n');
        }

        output.push_str("## Skill Gaps\n\n");
        if report.gaps.is_empty() {
            output.push_str("_No missing skills_\n\n");
        } else {
            for severity in SEVERITIES {
                output.push_str(&format!(
                    "- **{}:** {}\n",
                    severity,
                    join_or_none(report.gaps.tier(severity))
                ));
            }
            output.push('\n');
        }

        if !report.category_coverage.is_empty() {
            output.push_str("## Category Coverage\n\n");
            output.push_str("| Category | Coverage |\n");
            output.push_str("|----------|----------|\n");
            for (category, coverage) in &report.category_coverage {
                output.push_str(&format!("| {} | {:.2}% |\n", category, coverage));
            }
            output.push('\n');
        }

        if let Some(matrix) = report.similarity.as_ref().filter(|m| !m.is_empty()) {
            output.push_str("## Similarity Matrix\n\n");
            output.push_str(&Self::markdown_matrix(matrix));
            output.push('\n');
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(true, false),
            json_formatter: JsonFormatter::new(true),
            markdown_formatter: MarkdownFormatter::new(true),
        }
    }

    pub fn with_options(use_colors: bool, detailed: bool, pretty_json: bool, include_metadata: bool) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors, detailed),
            json_formatter: JsonFormatter::new(pretty_json),
            markdown_formatter: MarkdownFormatter::new(include_metadata),
        }
    }

    pub fn generate_report(&self, report: &MatchReport, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Console => self.console_formatter.format_report(report),
            OutputFormat::Json => self.json_formatter.format_report(report),
            OutputFormat::Markdown => self.markdown_formatter.format_report(report),
        }
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

pub fn save_report_to_file(content: &str, file_path: &Path) -> Result<()> {
    use std::fs;
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(file_path, content)?;
    Ok(())
}

pub fn suggest_filename(format: OutputFormat, resume_name: &str, timestamp: bool) -> String {
    let base_name = Path::new(resume_name)
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy();

    let timestamp_suffix = if timestamp {
        format!("_{}", chrono::Utc::now().format("%Y%m%d_%H%M%S"))
    } else {
        String::new()
    };

    let extension = match format {
        OutputFormat::Console => "txt",
        OutputFormat::Json => "json",
        OutputFormat::Markdown => "md",
    };

    format!("{}_match{}.{}", base_name, timestamp_suffix, extension)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::analyzer::MatchEngine;
    use crate::processing::catalog::SkillCatalog;

    fn sample_report() -> MatchReport {
        let engine = MatchEngine::new(SkillCatalog::builtin()).unwrap();
        engine
            .analyze(
                "Python developer with Docker and Pandas",
                "Python, Java, Docker, SQL and React required",
            )
            .unwrap()
    }

    fn matrix_report() -> MatchReport {
        let mut report = sample_report();
        report.similarity = Some(SimilarityMatrix {
            rows: vec!["java".to_string()],
            columns: vec!["python".to_string(), "docker".to_string()],
            values: vec![vec![0.71, 0.12]],
        });
        report
    }

    #[test]
    fn test_console_without_colors() {
        let output = ConsoleFormatter::new(false, false)
            .format_report(&sample_report())
            .unwrap();

        assert!(output.contains("SKILL MATCH ANALYSIS"));
        assert!(output.contains("Semantic Score: not computed"));
        assert!(output.contains("CRITICAL java"));
        assert!(output.contains("docker, python"));
        assert!(!output.contains("\u{1b}["));
        assert!(!output.contains("Similarity Matrix"));
    }

    #[test]
    fn test_console_detailed_renders_matrix() {
        let output = ConsoleFormatter::new(false, true)
            .format_report(&matrix_report())
            .unwrap();

        assert!(output.contains("Similarity Matrix"));
        assert!(output.contains("0.71"));
        assert!(output.contains("Resume: pandas, python, docker"));
    }

    #[test]
    fn test_json_round_trips() {
        let report = sample_report();
        let json = JsonFormatter::new(false).format_report(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["final_score"], serde_json::json!(report.final_score));
        assert_eq!(value["verdict"], "weak");
        assert!(value["semantic_score"].is_null());
        assert_eq!(value["gaps"]["critical"][0], "java");
    }

    #[test]
    fn test_markdown_sections() {
        let output = MarkdownFormatter::new(false)
            .format_report(&matrix_report())
            .unwrap();

        assert!(output.starts_with("# 📊 Skill Match Report"));
        assert!(!output.contains("**Generated:**"));
        assert!(output.contains("- **critical:** java"));
        assert!(output.contains("| requirement | python | docker |"));
        assert!(output.contains("| java | 0.71 | 0.12 |"));
    }

    #[test]
    fn test_generator_dispatch() {
        let generator = ReportGenerator::with_options(false, false, true, true);
        let report = sample_report();

        let json = generator.generate_report(&report, OutputFormat::Json).unwrap();
        assert!(json.starts_with('{'));
        let markdown = generator.generate_report(&report, OutputFormat::Markdown).unwrap();
        assert!(markdown.contains("**Generated:**"));
    }

    #[test]
    fn test_suggest_filename() {
        assert_eq!(
            suggest_filename(OutputFormat::Json, "cv/jane_resume.pdf", false),
            "jane_resume_match.json"
        );
        let stamped = suggest_filename(OutputFormat::Markdown, "resume.txt", true);
        assert!(stamped.starts_with("resume_match_"));
        assert!(stamped.ends_with(".md"));
    }

    #[test]
    fn test_save_report_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports").join("out.md");
        save_report_to_file("# report", &path).unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "# report");
    }
}
