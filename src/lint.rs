// SPDX-License-Identifier: PMPL-1.0-or-later
//! Lint orchestration: parse, filter, resolve, measure, aggregate.
//!
//! Everything here is a pure function of the input text and the
//! [`LintConfig`]; hosts decide how to present the resulting [`LintReport`].

use crate::ast::{Declaration, Rule};
use crate::color::{resolve_color, Rgb};
use crate::config::LintConfig;
use crate::contrast::{contrast_ratio, meets, WcagLevel};
use crate::error::ParseError;
use crate::filter::{has_color, prune_color_declarations};
use crate::parser::parse;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

/// Why a rule was left out of the pass/fail decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    MissingForeground,
    MissingBackground,
    /// The effective value of a colour slot is not a supported colour
    Unresolvable { property: String, value: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingForeground => write!(f, "no color declaration"),
            SkipReason::MissingBackground => write!(f, "no background declaration"),
            SkipReason::Unresolvable { property, value } => {
                write!(f, "unsupported {} value {:?}", property, value)
            }
        }
    }
}

/// Outcome of the contrast computation for one rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Contrast {
    Computed(f64),
    NotComputable(SkipReason),
}

/// Contrast verdict for a single selector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContrastResult {
    pub selector: String,
    /// Line of the rule in the source (1-indexed)
    pub line: usize,
    pub foreground: Option<Rgb>,
    pub background: Option<Rgb>,
    pub contrast: Contrast,
    /// True only for a computed ratio at or above the threshold
    pub passes: bool,
}

impl ContrastResult {
    pub fn ratio(&self) -> Option<f64> {
        match self.contrast {
            Contrast::Computed(ratio) => Some(ratio),
            Contrast::NotComputable(_) => None,
        }
    }

    /// Whether this result takes part in the pass/fail decision
    pub fn is_evaluated(&self) -> bool {
        matches!(self.contrast, Contrast::Computed(_))
    }

    pub fn fails(&self) -> bool {
        self.is_evaluated() && !self.passes
    }
}

/// Summary state of a lint run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LintStatus {
    /// No `color` or `background` declaration anywhere
    NoColorFound,
    Accessible,
    Inaccessible,
}

impl fmt::Display for LintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LintStatus::NoColorFound => write!(f, "NO COLOR FOUND"),
            LintStatus::Accessible => write!(f, "ACCESSIBLE"),
            LintStatus::Inaccessible => write!(f, "INACCESSIBLE"),
        }
    }
}

/// Results of linting one stylesheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LintReport {
    /// One entry per colour-bearing rule, in source order
    pub results: Vec<ContrastResult>,
    pub has_any_color: bool,
    /// No evaluated rule fell below the threshold
    pub all_accessible: bool,
    /// Minimum ratio that was applied
    pub threshold: f64,
    /// Conformance level the threshold was taken from
    pub level: WcagLevel,
}

impl LintReport {
    fn no_color(config: &LintConfig) -> Self {
        Self {
            results: Vec::new(),
            has_any_color: false,
            all_accessible: true,
            threshold: config.threshold(),
            level: config.level,
        }
    }

    pub fn status(&self) -> LintStatus {
        if !self.has_any_color {
            LintStatus::NoColorFound
        } else if self.all_accessible {
            LintStatus::Accessible
        } else {
            LintStatus::Inaccessible
        }
    }

    pub fn failures(&self) -> impl Iterator<Item = &ContrastResult> {
        self.results.iter().filter(|r| r.fails())
    }

    pub fn evaluated(&self) -> impl Iterator<Item = &ContrastResult> {
        self.results.iter().filter(|r| r.is_evaluated())
    }

    pub fn skipped(&self) -> impl Iterator<Item = &ContrastResult> {
        self.results.iter().filter(|r| !r.is_evaluated())
    }
}

/// Lints stylesheets against a configured threshold
#[derive(Debug, Clone, Copy, Default)]
pub struct Linter {
    config: LintConfig,
}

impl Linter {
    pub fn new(config: LintConfig) -> Self {
        Self { config }
    }

    /// Lint stylesheet text.
    ///
    /// Empty or whitespace-only text is rejected with [`ParseError::EmptyInput`].
    pub fn lint(&self, css: &str) -> Result<LintReport, ParseError> {
        if css.trim().is_empty() {
            return Err(ParseError::EmptyInput);
        }

        let doc = parse(css)?;
        let threshold = self.config.threshold();

        if !has_color(&doc) {
            debug!("No color declarations found");
            return Ok(LintReport::no_color(&self.config));
        }

        let pruned = prune_color_declarations(&doc);
        let results: Vec<ContrastResult> = pruned
            .rules()
            .map(|rule| evaluate_rule(rule, threshold))
            .collect();
        let all_accessible = !results.iter().any(ContrastResult::fails);

        debug!(
            "Linted {} color rule(s), {} evaluated, accessible: {}",
            results.len(),
            results.iter().filter(|r| r.is_evaluated()).count(),
            all_accessible
        );

        Ok(LintReport {
            results,
            has_any_color: true,
            all_accessible,
            threshold,
            level: self.config.level,
        })
    }
}

/// Lint stylesheet text against the WCAG AA threshold (4.5:1)
pub fn lint(css: &str) -> Result<LintReport, ParseError> {
    Linter::default().lint(css)
}

fn resolve_slot(decl: Option<&Declaration>) -> Result<Option<Rgb>, SkipReason> {
    match decl {
        None => Ok(None),
        Some(decl) => resolve_color(&decl.value).map(Some).map_err(|err| {
            SkipReason::Unresolvable {
                property: decl.property.clone(),
                value: err.value,
            }
        }),
    }
}

/// Compute the contrast verdict for one rule
pub fn evaluate_rule(rule: &Rule, threshold: f64) -> ContrastResult {
    let slots = rule.color_slots();
    let fg = resolve_slot(slots.foreground);
    let bg = resolve_slot(slots.background);

    let foreground = fg.clone().ok().flatten();
    let background = bg.clone().ok().flatten();

    let contrast = match (fg, bg) {
        (Ok(Some(fg)), Ok(Some(bg))) => Contrast::Computed(contrast_ratio(fg, bg)),
        (Err(reason), _) | (_, Err(reason)) => {
            warn!("Skipping invalid color in {}: {}", rule.selector, reason);
            Contrast::NotComputable(reason)
        }
        (Ok(None), _) => {
            debug!("Skipping {}: no color declaration", rule.selector);
            Contrast::NotComputable(SkipReason::MissingForeground)
        }
        (_, Ok(None)) => {
            debug!("Skipping {}: no background declaration", rule.selector);
            Contrast::NotComputable(SkipReason::MissingBackground)
        }
    };

    let passes = match contrast {
        Contrast::Computed(ratio) => meets(ratio, threshold),
        Contrast::NotComputable(_) => false,
    };

    if let Contrast::Computed(ratio) = contrast {
        debug!("{}: {:.2}:1 (passes: {})", rule.selector, ratio, passes);
    }

    ContrastResult {
        selector: rule.selector.clone(),
        line: rule.position.line,
        foreground,
        background,
        contrast,
        passes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn captured_logs(f: impl FnOnce()) -> String {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = logs.0.lock().unwrap();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    fn single(report: &LintReport) -> &ContrastResult {
        assert_eq!(report.results.len(), 1, "{:?}", report.results);
        &report.results[0]
    }

    #[test]
    fn test_black_on_white_is_accessible() {
        let report = lint("{ color: #000; background: #fff; }").unwrap();
        let result = single(&report);
        let ratio = result.ratio().unwrap();
        assert!((ratio - 21.0).abs() < 1e-6);
        assert!(result.passes);
        assert!(report.all_accessible);
        assert_eq!(report.status(), LintStatus::Accessible);
        assert_eq!(result.foreground, Some(Rgb::BLACK));
        assert_eq!(result.background, Some(Rgb::WHITE));
    }

    #[test]
    fn test_same_grey_fails() {
        let report = lint("{ color: #777; background: #777; }").unwrap();
        let result = single(&report);
        assert_eq!(result.ratio(), Some(1.0));
        assert!(!result.passes);
        assert!(result.fails());
        assert!(!report.all_accessible);
        assert_eq!(report.status(), LintStatus::Inaccessible);
    }

    #[test]
    fn test_no_color_found() {
        let report = lint("p { font-size: 16px; margin: 0 }").unwrap();
        assert!(!report.has_any_color);
        assert!(report.results.is_empty());
        assert_eq!(report.status(), LintStatus::NoColorFound);
    }

    #[test]
    fn test_background_color_only_reports_no_color() {
        let report = lint(".x { background-color: #000; }").unwrap();
        assert_eq!(report.status(), LintStatus::NoColorFound);
    }

    #[test]
    fn test_color_only_rule_is_not_computable() {
        let report = lint("h1 { color: #f00; }").unwrap();
        let result = single(&report);
        assert_eq!(result.contrast, Contrast::NotComputable(SkipReason::MissingBackground));
        assert!(!result.is_evaluated());
        assert!(!result.fails());
        assert!(report.all_accessible);
    }

    #[test]
    fn test_background_only_rule_is_not_computable() {
        let report = lint("h1 { color: #000 } .panel { background: #fff; }").unwrap();
        let panel = &report.results[1];
        assert_eq!(panel.contrast, Contrast::NotComputable(SkipReason::MissingForeground));
    }

    #[test]
    fn test_unresolvable_colors_are_skipped() {
        let report = lint(".a { color: red; background: #fff; } .b { color: #000; background: #fff; }").unwrap();
        assert_eq!(report.results.len(), 2);
        assert_eq!(
            report.results[0].contrast,
            Contrast::NotComputable(SkipReason::Unresolvable {
                property: "color".to_string(),
                value: "red".to_string(),
            })
        );
        assert_eq!(report.results[0].background, Some(Rgb::WHITE));
        assert!(report.all_accessible);
        assert_eq!(report.evaluated().count(), 1);
        assert_eq!(report.skipped().count(), 1);
    }

    #[test]
    fn test_later_resolvable_background_wins() {
        let report = lint("a { color: #000; background: red; background-color: #fff; }").unwrap();
        let result = single(&report);
        assert_eq!(result.background, Some(Rgb::WHITE));
        assert!(result.passes);
    }

    #[test]
    fn test_later_unresolvable_background_wins() {
        let report = lint("a { color: #000; background-color: #fff; background: red; }").unwrap();
        let result = single(&report);
        assert_eq!(result.background, None);
        assert_eq!(
            result.contrast,
            Contrast::NotComputable(SkipReason::Unresolvable {
                property: "background".to_string(),
                value: "red".to_string(),
            })
        );
    }

    #[test]
    fn test_any_failure_makes_report_inaccessible() {
        let css = ".ok { color: #000; background: #fff }\n.bad { color: #aaa; background: #ccc }";
        let report = lint(css).unwrap();
        assert!(!report.all_accessible);
        let failures: Vec<_> = report.failures().map(|r| r.selector.as_str()).collect();
        assert_eq!(failures, vec![".bad"]);
        assert_eq!(report.results[1].line, 2);
    }

    #[test]
    fn test_threshold_boundary_passes() {
        // #767676 on white is ~4.54:1, #777 ~4.48:1
        let report = lint("a { color: #767676; background: #fff } b { color: #777; background: #fff }").unwrap();
        assert!(report.results[0].passes);
        assert!(!report.results[1].passes);
    }

    #[test]
    fn test_aaa_threshold() {
        let css = ".medium { color: #767676; background-color: #ffffff; }";
        assert!(lint(css).unwrap().all_accessible);

        let strict = Linter::new(LintConfig::with_level(WcagLevel::AAA));
        let report = strict.lint(css).unwrap();
        assert_eq!(report.threshold, 7.0);
        assert_eq!(report.level, WcagLevel::AAA);
        assert!(!report.all_accessible);
    }

    #[test]
    fn test_skipped_rules_are_logged() {
        let logs = captured_logs(|| {
            lint("h1 { color: #000 } .panel { background: #fff } .x { color: red; background: #fff }").unwrap();
        });
        assert!(logs.contains("Skipping h1: no background declaration"), "{}", logs);
        assert!(logs.contains("Skipping .panel: no color declaration"), "{}", logs);
        assert!(logs.contains("Skipping invalid color in .x"), "{}", logs);
    }

    #[test]
    fn test_empty_input_is_parse_error() {
        assert_eq!(lint(""), Err(ParseError::EmptyInput));
        assert_eq!(lint("  \n\t "), Err(ParseError::EmptyInput));
    }

    #[test]
    fn test_parse_error_propagates() {
        assert!(matches!(lint("a { color: #000;"), Err(ParseError::UnclosedBlock { .. })));
    }

    #[test]
    fn test_root_level_color_only() {
        let report = lint("color: red;").unwrap();
        assert!(report.has_any_color);
        assert!(report.results.is_empty());
        assert_eq!(report.status(), LintStatus::Accessible);
    }
}
