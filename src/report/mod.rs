// SPDX-License-Identifier: PMPL-1.0-or-later
//! Report generation for lint results.
//!
//! Supports multiple output formats:
//! - Text: human-readable verdict per selector
//! - JSON: structured results for programmatic consumption
//! - SARIF: Static Analysis Results Interchange Format for IDE/CI integration

use crate::contrast::WcagLevel;
use crate::lint::{Contrast, ContrastResult, LintStatus};
use crate::scanner::{FileOutcome, FileReport};
use serde::Serialize;

/// SARIF rule id for a colour pair below the threshold at `level`
pub fn contrast_rule_id(level: WcagLevel) -> String {
    format!("WCAG-{}-contrast", level.criterion())
}

/// SARIF rule id for a stylesheet that could not be parsed
pub const PARSE_ERROR_RULE_ID: &str = "css-parse-error";

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// Structured JSON
    Json,
    /// SARIF for IDE/CI integration
    Sarif,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Sarif => write!(f, "sarif"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "sarif" => Ok(OutputFormat::Sarif),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}

/// Generate a report for a set of linted files
pub fn generate_report(files: &[FileReport], format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => generate_text_report(files),
        OutputFormat::Json => generate_json_report(files),
        OutputFormat::Sarif => generate_sarif_report(files),
    }
}

fn describe_result(result: &ContrastResult) -> String {
    match &result.contrast {
        Contrast::Computed(ratio) => {
            let pair = match (result.foreground, result.background) {
                (Some(fg), Some(bg)) => format!(" ({} on {})", fg, bg),
                _ => String::new(),
            };
            format!("{:.2}:1{}", ratio, pair)
        }
        Contrast::NotComputable(reason) => reason.to_string(),
    }
}

/// Generate human-readable text report
fn generate_text_report(files: &[FileReport]) -> String {
    let mut output = String::new();

    output.push_str("=== Contrastbot WCAG Contrast Report ===\n\n");

    if files.is_empty() {
        output.push_str("No stylesheets found.\n");
        return output;
    }

    let mut accessible = 0;
    let mut inaccessible = 0;
    let mut no_color = 0;
    let mut parse_errors = 0;

    for file in files {
        let report = match &file.outcome {
            FileOutcome::Failed(err) => {
                parse_errors += 1;
                output.push_str(&format!("{}: PARSE ERROR: {}\n\n", file.path.display(), err));
                continue;
            }
            FileOutcome::Linted(report) => report,
        };

        match report.status() {
            LintStatus::NoColorFound => no_color += 1,
            LintStatus::Accessible => accessible += 1,
            LintStatus::Inaccessible => inaccessible += 1,
        }

        output.push_str(&format!(
            "{}: {} (threshold {}:1)\n",
            file.path.display(),
            report.status(),
            report.threshold
        ));

        for result in &report.results {
            let tag = if !result.is_evaluated() {
                "SKIP"
            } else if result.passes {
                "PASS"
            } else {
                "FAIL"
            };
            let selector = if result.selector.is_empty() { "<empty selector>" } else { result.selector.as_str() };
            output.push_str(&format!(
                "  [{}] {} (line {}): {}\n",
                tag,
                selector,
                result.line,
                describe_result(result)
            ));
        }

        output.push('\n');
    }

    output.push_str(&format!(
        "Checked {} file(s): {} accessible, {} inaccessible, {} without colors, {} parse error(s)\n",
        files.len(),
        accessible,
        inaccessible,
        no_color,
        parse_errors
    ));

    if inaccessible > 0 || parse_errors > 0 {
        output.push_str("RESULT: FAIL\n");
    } else {
        output.push_str("RESULT: PASS\n");
    }

    output
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    files: &'a [FileReport],
}

/// Generate JSON report
fn generate_json_report(files: &[FileReport]) -> String {
    serde_json::to_string_pretty(&JsonReport { files }).unwrap_or_else(|e| {
        format!("{{\"error\": \"Failed to serialize report: {}\"}}", e)
    })
}

/// SARIF report structure (simplified)
#[derive(Debug, Serialize)]
struct SarifReport {
    #[serde(rename = "$schema")]
    schema: String,
    version: String,
    runs: Vec<SarifRun>,
}

#[derive(Debug, Serialize)]
struct SarifRun {
    tool: SarifTool,
    results: Vec<SarifResult>,
}

#[derive(Debug, Serialize)]
struct SarifTool {
    driver: SarifDriver,
}

#[derive(Debug, Serialize)]
struct SarifDriver {
    name: String,
    version: String,
    #[serde(rename = "informationUri")]
    information_uri: String,
}

#[derive(Debug, Serialize)]
struct SarifResult {
    #[serde(rename = "ruleId")]
    rule_id: String,
    level: String,
    message: SarifMessage,
    locations: Vec<SarifLocation>,
}

#[derive(Debug, Serialize)]
struct SarifMessage {
    text: String,
}

#[derive(Debug, Serialize)]
struct SarifLocation {
    #[serde(rename = "physicalLocation")]
    physical_location: SarifPhysicalLocation,
}

#[derive(Debug, Serialize)]
struct SarifPhysicalLocation {
    #[serde(rename = "artifactLocation")]
    artifact_location: SarifArtifactLocation,
    region: Option<SarifRegion>,
}

#[derive(Debug, Serialize)]
struct SarifArtifactLocation {
    uri: String,
}

#[derive(Debug, Serialize)]
struct SarifRegion {
    #[serde(rename = "startLine")]
    start_line: usize,
    #[serde(rename = "startColumn", skip_serializing_if = "Option::is_none")]
    start_column: Option<usize>,
}

fn sarif_location(file: &FileReport, region: Option<SarifRegion>) -> SarifLocation {
    SarifLocation {
        physical_location: SarifPhysicalLocation {
            artifact_location: SarifArtifactLocation {
                uri: file.path.display().to_string(),
            },
            region,
        },
    }
}

/// Generate SARIF report
fn generate_sarif_report(files: &[FileReport]) -> String {
    let mut results = Vec::new();
    let mut level = WcagLevel::default();

    for file in files {
        match &file.outcome {
            FileOutcome::Failed(err) => {
                let region = err.position().map(|p| SarifRegion {
                    start_line: p.line,
                    start_column: Some(p.column),
                });
                results.push(SarifResult {
                    rule_id: PARSE_ERROR_RULE_ID.to_string(),
                    level: "error".to_string(),
                    message: SarifMessage { text: err.to_string() },
                    locations: vec![sarif_location(file, region)],
                });
            }
            FileOutcome::Linted(report) => {
                level = level.max(report.level);
                for result in report.failures() {
                    results.push(SarifResult {
                        rule_id: contrast_rule_id(report.level),
                        level: "error".to_string(),
                        message: SarifMessage {
                            text: format!(
                                "Color contrast ratio {} is below the minimum {}:1 for selector \"{}\"",
                                describe_result(result),
                                report.threshold,
                                result.selector
                            ),
                        },
                        locations: vec![sarif_location(
                            file,
                            Some(SarifRegion { start_line: result.line, start_column: None }),
                        )],
                    });
                }
            }
        }
    }

    let report = SarifReport {
        schema: "https://json.schemastore.org/sarif-2.1.0.json".to_string(),
        version: "2.1.0".to_string(),
        runs: vec![SarifRun {
            tool: SarifTool {
                driver: SarifDriver {
                    name: "contrastbot".to_string(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                    information_uri: level.understanding_uri().to_string(),
                },
            },
            results,
        }],
    };

    serde_json::to_string_pretty(&report).unwrap_or_else(|e| {
        format!("{{\"error\": \"Failed to serialize SARIF report: {}\"}}", e)
    })
}
