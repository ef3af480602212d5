//! Terminal and JSON rendering of a [`CheckedCorpus`].
//!
//! Text output groups violations by operation; JSON output is meant for CI.

use std::collections::BTreeMap;

use colored::Colorize;
use serde::Serialize;

use crate::pipeline::CheckedCorpus;
use crate::validation::Violation;

/// Machine-readable summary of a check run.
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub units: usize,
    pub operations: usize,
    pub certified: Vec<&'a str>,
    pub violations: &'a [Violation],
}

impl<'a> JsonReport<'a> {
    pub fn new(checked: &'a CheckedCorpus) -> Self {
        Self {
            units: checked.units,
            operations: checked.registry.operations().count(),
            certified: checked.certified.iter().map(String::as_str).collect(),
            violations: &checked.violations,
        }
    }
}

/// Pretty-printed JSON for `apispec check --format json`.
pub fn format_json(checked: &CheckedCorpus) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&JsonReport::new(checked))
}

/// Violations grouped by owner, followed by a one-line summary.
pub fn format_text(checked: &CheckedCorpus) -> String {
    let mut grouped: BTreeMap<&str, Vec<&Violation>> = BTreeMap::new();
    for v in &checked.violations {
        grouped.entry(v.operation.as_str()).or_default().push(v);
    }

    let mut output = String::new();
    for (owner, violations) in &grouped {
        output.push_str(&format!(
            "{} ({})\n",
            owner.bold().red(),
            plural(violations.len(), "violation")
        ));
        for v in violations {
            let kind = format!("[{}]", v.kind).yellow();
            if v.path.is_empty() {
                output.push_str(&format!("  {} {}\n", kind, v.message));
            } else {
                output.push_str(&format!("  {} {}: {}\n", kind, v.path.italic(), v.message));
            }
        }
        output.push('\n');
    }

    let operations = checked.registry.operations().count();
    let summary = format!(
        "{} of {} certified, {}",
        checked.certified.len(),
        plural(operations, "operation"),
        plural(checked.violations.len(), "violation")
    );
    if checked.has_violations() {
        output.push_str(&format!("{}\n", summary.red().bold()));
    } else {
        output.push_str(&format!("{}\n", summary.green().bold()));
    }
    output
}

/// Operations with their URL templates and status, then type-only units.
pub fn format_list(checked: &CheckedCorpus) -> String {
    let mut output = String::new();

    for op in checked.registry.operations() {
        let status = if checked.is_certified(&op.name) {
            "certified".green()
        } else {
            plural(checked.violations_for(&op.name).count(), "violation").red()
        };
        output.push_str(&format!("{} {}\n", op.name.bold(), status));
        for url in &op.urls {
            let methods = url
                .methods
                .iter()
                .map(|m| m.to_string())
                .collect::<Vec<_>>()
                .join(",");
            output.push_str(&format!("    {} {}\n", methods.cyan(), url.path));
        }
    }

    if !checked.type_units.is_empty() {
        output.push('\n');
        for (namespace, names) in &checked.type_units {
            let status = match checked.violations_for(namespace).count() {
                0 => plural(names.len(), "type").dimmed(),
                n => plural(n, "violation").red(),
            };
            output.push_str(&format!("{} {}\n", namespace.bold(), status));
        }
    }

    output
}

fn plural(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{n} {noun}")
    } else {
        format!("{n} {noun}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{SchemaUnit, bundled_units, check_corpus};

    fn with_bad_operation() -> CheckedCorpus {
        let mut units = bundled_units();
        units.push(SchemaUnit::new(
            "bad.ts",
            r#"
            /** @rest_spec_name demo.bad */
            export interface Request extends RequestBase {
              urls: [{ path: '/_bad/{id}' methods: ['GET'] }]
            }
            "#,
        ));
        check_corpus(&units, false)
    }

    #[test]
    fn text_groups_by_operation() {
        let text = format_text(&with_bad_operation());
        assert!(text.contains("demo.bad"));
        assert!(text.contains("[MalformedSchema]"));
        assert!(text.contains("urls[0]"));
        assert!(text.contains("3 of 4 operations certified"));
        assert!(!text.contains("connector.update_pipeline"));
    }

    #[test]
    fn clean_corpus_summary() {
        let text = format_text(&check_corpus(&bundled_units(), false));
        assert!(text.contains("3 of 3 operations certified, 0 violations"));
    }

    #[test]
    fn json_lists_violations() {
        let json = format_json(&with_bad_operation()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["operations"], 4);
        assert_eq!(value["certified"].as_array().unwrap().len(), 3);
        let first = &value["violations"][0];
        assert_eq!(first["operation"], "demo.bad");
        assert_eq!(first["kind"], "MalformedSchema");
    }

    #[test]
    fn list_shows_urls_and_status() {
        let text = format_list(&with_bad_operation());
        assert!(text.contains("connector.update_pipeline"));
        assert!(text.contains("/_connector/{connector_id}/_pipeline"));
        assert!(text.contains("PUT"));
        assert!(text.contains("certified"));
        assert!(text.contains("Cluster.NodesStats"));
        assert!(text.contains("1 type"));
    }
}
