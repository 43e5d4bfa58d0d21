//! Case runner implementation
//!
//! Executes every case of a case file through a [`Harness`] and reports
//! per-case results. A failing case never stops the suite.

use std::path::Path;

use colored::Colorize;
use serde_json::Value;

use crate::common::{Error, Result};
use crate::harness::Harness;

use super::config::{CaseFile, CaseSpec};

/// Result of one case
#[derive(Debug)]
pub struct CaseResult {
    pub label: String,
    pub passed: bool,
    /// Value the operation returned, when it returned at all
    pub actual: Option<Value>,
    pub error: Option<String>,
}

/// Result of a whole case file
#[derive(Debug)]
pub struct SuiteReport {
    pub name: String,
    pub results: Vec<CaseResult>,
}

impl SuiteReport {
    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.passed).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.passed()
    }

    pub fn all_passed(&self) -> bool {
        self.results.iter().all(|r| r.passed)
    }
}

/// Load a case file from YAML
pub fn load_cases(path: &Path) -> Result<CaseFile> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::CaseFile(format!(
            "Failed to read case file '{}': {}",
            path.display(),
            e
        ))
    })?;

    serde_yaml::from_str(&content)
        .map_err(|e| Error::CaseFile(format!("Failed to parse '{}': {}", path.display(), e)))
}

/// Run all cases of a YAML case file
pub fn run_cases<S: 'static>(path: &Path, harness: &Harness<S>, verbose: bool) -> Result<SuiteReport> {
    let file = load_cases(path)?;
    Ok(run_suite(&file, harness, verbose))
}

/// Run all cases of an already-loaded case file
pub fn run_suite<S: 'static>(file: &CaseFile, harness: &Harness<S>, verbose: bool) -> SuiteReport {
    println!("\n{} {}", "Running Cases:".blue().bold(), file.name.white().bold());

    if let Some(desc) = &file.description {
        println!("  {}", desc.dimmed());
    }

    let mut results = Vec::with_capacity(file.cases.len());
    for (i, case) in file.cases.iter().enumerate() {
        let result = run_case(harness, case);
        let case_num = i + 1;

        match (&result.error, &result.actual) {
            (None, actual) => {
                println!("  {} Case {}: {}", "✓".green(), case_num, result.label.dimmed());
                if let (true, Some(actual)) = (verbose, actual) {
                    println!("      = {}", actual.to_string().dimmed());
                }
            }
            (Some(error), _) => {
                println!("  {} Case {}: {}: {}", "✗".red(), case_num, result.label, error);
            }
        }

        tracing::info!(case = %result.label, passed = result.passed, "Case finished");
        results.push(result);
    }

    let report = SuiteReport {
        name: file.name.clone(),
        results,
    };

    if report.all_passed() {
        println!("\n{} {}\n", "✓".green().bold(), "All Cases Passed".green().bold());
    } else {
        println!(
            "\n{} {}\n",
            "✗".red().bold(),
            format!("{} of {} Cases Failed", report.failed(), report.results.len())
                .red()
                .bold()
        );
    }

    report
}

/// Invoke one case and check its expectation
fn run_case<S: 'static>(harness: &Harness<S>, case: &CaseSpec) -> CaseResult {
    let label = case.label().to_string();

    let outcome = match harness.invoke(&case.method, case.args.clone()) {
        Ok(outcome) => outcome,
        Err(e) => {
            return CaseResult {
                label,
                passed: false,
                actual: None,
                error: Some(e.to_string()),
            }
        }
    };

    let mut outcome = if case.unordered {
        outcome.unordered()
    } else {
        outcome
    };
    if let Some(tolerance) = case.tolerance {
        outcome = outcome.with_tolerance(tolerance);
    }

    let error = match &case.expect {
        None => None,
        Some(expected) => match outcome.matches(expected.clone()) {
            Ok(true) => None,
            Ok(false) => Some(format!("expected {}, got {}", expected, outcome)),
            Err(e) => Some(e.to_string()),
        },
    };

    CaseResult {
        label,
        passed: error.is_none(),
        actual: Some(outcome.into_value()),
        error,
    }
}
