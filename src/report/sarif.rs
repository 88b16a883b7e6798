// SPDX-License-Identifier: PMPL-1.0-or-later
//! SARIF 2.1.0 output. Each violation becomes one result; affected elements
//! are reported as logical locations since static HTML carries no reliable
//! line numbers after parsing.

use crate::error::Result;
use crate::result::{AuditResult, Impact};
use serde::Serialize;
use std::collections::BTreeMap;

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
#[serde(rename_all = "camelCase")]
struct SarifDriver {
    name: String,
    version: String,
    rules: Vec<SarifRule>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifRule {
    id: String,
    short_description: SarifMessage,
    help: SarifMessage,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifResult {
    rule_id: String,
    level: &'static str,
    message: SarifMessage,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    locations: Vec<SarifLocation>,
}

#[derive(Debug, Serialize)]
struct SarifMessage {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifLocation {
    #[serde(skip_serializing_if = "Option::is_none")]
    physical_location: Option<SarifPhysicalLocation>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    logical_locations: Vec<SarifLogicalLocation>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifPhysicalLocation {
    artifact_location: SarifArtifactLocation,
}

#[derive(Debug, Serialize)]
struct SarifArtifactLocation {
    uri: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifLogicalLocation {
    name: String,
    fully_qualified_name: String,
    kind: &'static str,
}

/// SARIF level for an impact tier
fn level_for(impact: Impact) -> &'static str {
    match impact {
        Impact::Critical | Impact::Serious => "error",
        Impact::Moderate => "warning",
        Impact::Minor => "note",
    }
}

/// Render a result as a SARIF log
pub fn render_sarif(result: &AuditResult) -> Result<String> {
    let mut rules = BTreeMap::new();
    let results: Vec<SarifResult> = result
        .violations
        .iter()
        .map(|v| {
            rules.entry(v.id.clone()).or_insert_with(|| SarifRule {
                id: v.id.clone(),
                short_description: SarifMessage {
                    text: v.description.clone(),
                },
                help: SarifMessage {
                    text: v.suggestion.clone(),
                },
            });

            let location = SarifLocation {
                physical_location: result.source.as_ref().map(|s| SarifPhysicalLocation {
                    artifact_location: SarifArtifactLocation { uri: s.clone() },
                }),
                logical_locations: v
                    .affected_nodes
                    .iter()
                    .map(|n| SarifLogicalLocation {
                        name: n.tag.clone(),
                        fully_qualified_name: n.html.clone(),
                        kind: "element",
                    })
                    .collect(),
            };
            let has_location =
                location.physical_location.is_some() || !location.logical_locations.is_empty();

            SarifResult {
                rule_id: v.id.clone(),
                level: level_for(v.impact),
                message: SarifMessage {
                    text: v.description.clone(),
                },
                locations: if has_location { vec![location] } else { Vec::new() },
            }
        })
        .collect();

    let report = SarifReport {
        schema: "https://json.schemastore.org/sarif-2.1.0.json".to_string(),
        version: "2.1.0".to_string(),
        runs: vec![SarifRun {
            tool: SarifTool {
                driver: SarifDriver {
                    name: "auditbot".to_string(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                    rules: rules.into_values().collect(),
                },
            },
            results,
        }],
    };

    Ok(serde_json::to_string_pretty(&report)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::{Accumulator, AffectedNode, Violation};

    #[test]
    fn test_sarif_report() {
        let mut acc = Accumulator::new();
        acc.add_violation(
            Violation::new("image-alt-missing", "1 image missing alt text", Impact::Critical, "Add alt")
                .with_nodes(vec![AffectedNode {
                    tag: "img".into(),
                    html: "<img src=\"a.png\">".into(),
                }]),
        );
        acc.add_violation(Violation::new("tabindex-positive", "1 element", Impact::Minor, "Use 0"));
        let report = render_sarif(&acc.finalize(Some("index.html".into()))).unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&report).expect("valid JSON");
        assert_eq!(parsed["version"], "2.1.0");
        let results = parsed["runs"][0]["results"].as_array().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["level"], "error");
        assert_eq!(results[1]["level"], "note");
        assert_eq!(
            results[0]["locations"][0]["physicalLocation"]["artifactLocation"]["uri"],
            "index.html"
        );
        assert_eq!(results[0]["locations"][0]["logicalLocations"][0]["name"], "img");
        assert_eq!(parsed["runs"][0]["tool"]["driver"]["rules"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_inline_result_without_nodes_has_no_locations() {
        let mut acc = Accumulator::new();
        acc.add_violation(Violation::new("title-missing", "No title", Impact::Critical, "Add one"));
        let report = render_sarif(&acc.finalize(None)).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&report).unwrap();
        assert!(parsed["runs"][0]["results"][0].get("locations").is_none());
    }
}
