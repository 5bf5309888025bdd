use std::fs;

use listwise_core::catalog::{CatalogLoader, SourceOutcome};
use listwise_core::config::{AppConfig, LoadOptions};
use serde::Serialize;

use crate::commands::{CommandResult, EXIT_CONFIG, EXIT_RUNTIME};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    details: String,
}

impl DoctorCheck {
    fn new(name: impl Into<String>, status: CheckStatus, details: impl Into<String>) -> Self {
        Self { name: name.into(), status, details: details.into() }
    }
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> CommandResult {
    let report = build_report();
    let exit_code = match report.overall_status {
        CheckStatus::Pass => 0,
        _ if report.checks.first().is_some_and(|check| check.status == CheckStatus::Fail) => {
            EXIT_CONFIG
        }
        _ => EXIT_RUNTIME,
    };

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code, output }
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck::new(
                "config_validation",
                CheckStatus::Pass,
                "configuration loaded and validated",
            ));
            checks.extend(check_reference_data(&config));
            checks.push(check_inventory_writable(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck::new(
                "config_validation",
                CheckStatus::Fail,
                error.to_string(),
            ));
            checks.push(DoctorCheck::new(
                "reference_data",
                CheckStatus::Skipped,
                "skipped because configuration did not load",
            ));
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_reference_data(config: &AppConfig) -> Vec<DoctorCheck> {
    let loaded = CatalogLoader::from_config(config).load();
    let mut checks: Vec<DoctorCheck> = loaded
        .sources
        .iter()
        .map(|source| {
            let name = format!("data_{}", source.source);
            let path = source.path.display();
            match &source.outcome {
                SourceOutcome::Loaded { records, skipped } => DoctorCheck::new(
                    name,
                    CheckStatus::Pass,
                    format!("{records} records loaded from `{path}` ({skipped} skipped)"),
                ),
                SourceOutcome::Missing => {
                    DoctorCheck::new(name, CheckStatus::Fail, format!("`{path}` not found"))
                }
                SourceOutcome::Malformed { reason } => DoctorCheck::new(
                    name,
                    CheckStatus::Fail,
                    format!("`{path}` could not be parsed: {reason}"),
                ),
            }
        })
        .collect();

    let graph = loaded.catalog.graph();
    let checkout = &config.store.checkout_node;
    checks.push(match graph.hop_count(graph.entry_point(), checkout) {
        Some(hops) => DoctorCheck::new(
            "checkout_reachable",
            CheckStatus::Pass,
            format!("`{checkout}` is {hops} hops from `{}`", graph.entry_point()),
        ),
        None => DoctorCheck::new(
            "checkout_reachable",
            CheckStatus::Fail,
            format!("`{checkout}` cannot be reached from `{}`", graph.entry_point()),
        ),
    });

    checks
}

fn check_inventory_writable(config: &AppConfig) -> DoctorCheck {
    let path = config.data.inventory_path();
    match fs::metadata(&path) {
        Ok(metadata) if metadata.permissions().readonly() => DoctorCheck::new(
            "inventory_writable",
            CheckStatus::Fail,
            format!("`{}` is read-only", path.display()),
        ),
        Ok(_) => DoctorCheck::new(
            "inventory_writable",
            CheckStatus::Pass,
            format!("`{}` accepts write-through updates", path.display()),
        ),
        Err(error) => DoctorCheck::new(
            "inventory_writable",
            CheckStatus::Fail,
            format!("`{}` is not accessible: {error}", path.display()),
        ),
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = vec![report.summary.clone()];

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}
