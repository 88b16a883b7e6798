// SPDX-License-Identifier: PMPL-1.0-or-later
//! Audit result types.
//!
//! A run collects [`Violation`], [`Pass`] and [`Incomplete`] records in an
//! [`Accumulator`]. Finalizing the accumulator produces an [`AuditResult`]
//! whose score and compliance tier are computed once and never change.

use crate::score;
use chrono::{DateTime, Utc};
use scraper::ElementRef;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Impact tier of a violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    /// Blocks access for some users
    Critical,
    /// Major barrier
    Serious,
    /// Should be addressed
    Moderate,
    /// Minor annoyance
    Minor,
}

impl Impact {
    /// All tiers, most severe first
    pub const ALL: [Impact; 4] = [Impact::Critical, Impact::Serious, Impact::Moderate, Impact::Minor];

    /// Points deducted from the score for one violation of this impact
    pub fn weight(&self) -> f64 {
        match self {
            Impact::Critical => 10.0,
            Impact::Serious => 7.0,
            Impact::Moderate => 5.0,
            Impact::Minor => 2.0,
        }
    }
}

impl std::fmt::Display for Impact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Impact::Critical => write!(f, "critical"),
            Impact::Serious => write!(f, "serious"),
            Impact::Moderate => write!(f, "moderate"),
            Impact::Minor => write!(f, "minor"),
        }
    }
}

/// Compliance tier derived from the score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComplianceTier {
    #[serde(rename = "AAA")]
    AAA,
    #[serde(rename = "AA")]
    AA,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "Non-Compliant")]
    NonCompliant,
}

impl std::fmt::Display for ComplianceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComplianceTier::AAA => write!(f, "AAA"),
            ComplianceTier::AA => write!(f, "AA"),
            ComplianceTier::A => write!(f, "A"),
            ComplianceTier::NonCompliant => write!(f, "Non-Compliant"),
        }
    }
}

/// Reference to a document element involved in a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffectedNode {
    /// Lowercase tag name
    pub tag: String,
    /// Reconstructed opening tag, e.g. `<img src="a.png">`
    pub html: String,
}

impl AffectedNode {
    /// Describe an element by its tag and attributes
    pub fn from_element(element: &ElementRef<'_>) -> Self {
        let value = element.value();
        let attrs = value
            .attrs()
            .map(|(k, v)| format!(" {}=\"{}\"", k, v.replace('"', "&quot;")))
            .collect::<String>();
        Self {
            tag: value.name().to_string(),
            html: format!("<{}{}>", value.name(), attrs),
        }
    }
}

/// A failed check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub id: String,
    pub description: String,
    pub impact: Impact,
    pub suggestion: String,
    #[serde(default)]
    pub affected_nodes: Vec<AffectedNode>,
}

impl Violation {
    /// Create a violation with no affected nodes
    pub fn new(id: &str, description: &str, impact: Impact, suggestion: &str) -> Self {
        Self {
            id: id.to_string(),
            description: description.to_string(),
            impact,
            suggestion: suggestion.to_string(),
            affected_nodes: Vec::new(),
        }
    }

    /// Attach the elements that caused the violation
    pub fn with_nodes(mut self, nodes: Vec<AffectedNode>) -> Self {
        self.affected_nodes = nodes;
        self
    }
}

/// A successful check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pass {
    pub id: String,
    pub description: String,
}

impl Pass {
    pub fn new(id: &str, description: impl Into<String>) -> Self {
        Self {
            id: id.to_string(),
            description: description.into(),
        }
    }
}

/// Something the audit could not decide
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Incomplete {
    pub id: String,
    pub description: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub affected_nodes: Vec<AffectedNode>,
}

impl Incomplete {
    pub fn new(id: &str, description: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            id: id.to_string(),
            description: description.into(),
            reason: reason.into(),
            affected_nodes: Vec::new(),
        }
    }

    pub fn with_nodes(mut self, nodes: Vec<AffectedNode>) -> Self {
        self.affected_nodes = nodes;
        self
    }
}

/// Mutable record lists for a single run
#[derive(Debug, Clone, Default)]
pub struct Accumulator {
    violations: Vec<Violation>,
    passes: Vec<Pass>,
    incomplete: Vec<Incomplete>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a violation
    pub fn add_violation(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    /// Record a pass
    pub fn add_pass(&mut self, pass: Pass) {
        self.passes.push(pass);
    }

    /// Record an undecided item
    pub fn add_incomplete(&mut self, incomplete: Incomplete) {
        self.incomplete.push(incomplete);
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn passes(&self) -> &[Pass] {
        &self.passes
    }

    pub fn incomplete(&self) -> &[Incomplete] {
        &self.incomplete
    }

    /// Number of violations recorded so far
    pub fn violation_count(&self) -> usize {
        self.violations.len()
    }

    /// Score the collected records and freeze them into an [`AuditResult`]
    pub fn finalize(self, source: Option<String>) -> AuditResult {
        let score = score::score(&self.violations, &self.passes);
        AuditResult {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            source,
            score,
            violations: self.violations,
            passes: self.passes,
            incomplete: self.incomplete,
            wcag_level: score::tier_for(score),
        }
    }
}

/// Outcome of one audit run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditResult {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub score: f64,
    pub violations: Vec<Violation>,
    pub passes: Vec<Pass>,
    pub incomplete: Vec<Incomplete>,
    pub wcag_level: ComplianceTier,
}

impl AuditResult {
    /// Violations with the given impact
    pub fn by_impact(&self, impact: Impact) -> Vec<&Violation> {
        self.violations.iter().filter(|v| v.impact == impact).collect()
    }

    /// Whether any critical violation was found
    pub fn has_critical(&self) -> bool {
        self.violations.iter().any(|v| v.impact == Impact::Critical)
    }

    /// Violations with the given id
    pub fn violations_with_id(&self, id: &str) -> Vec<&Violation> {
        self.violations.iter().filter(|v| v.id == id).collect()
    }

    /// Whether a pass with the given id was recorded
    pub fn passed(&self, id: &str) -> bool {
        self.passes.iter().any(|p| p.id == id)
    }

    /// One fix per violation id, most severe first, then in order found
    pub fn recommendations(&self) -> Vec<Recommendation> {
        let mut recs: Vec<Recommendation> = Vec::new();
        for v in &self.violations {
            match recs.iter_mut().find(|r| r.id == v.id) {
                Some(rec) => {
                    rec.occurrences += 1;
                    rec.impact = rec.impact.min(v.impact);
                }
                None => recs.push(Recommendation {
                    id: v.id.clone(),
                    impact: v.impact,
                    suggestion: v.suggestion.clone(),
                    occurrences: 1,
                }),
            }
        }
        recs.sort_by_key(|r| r.impact);
        recs
    }
}

/// A deduplicated fix for one kind of violation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recommendation {
    pub id: String,
    pub impact: Impact,
    pub suggestion: String,
    /// Violations sharing this id
    pub occurrences: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recommendations_are_deduplicated_and_ordered() {
        let mut acc = Accumulator::new();
        acc.add_violation(Violation::new("heading-level-skipped", "h1 to h3", Impact::Moderate, "Add levels"));
        acc.add_violation(Violation::new("title-missing", "No title", Impact::Critical, "Add a title"));
        acc.add_violation(Violation::new("heading-level-skipped", "h2 to h4", Impact::Moderate, "Add levels"));
        acc.add_violation(Violation::new("banner-missing", "No header", Impact::Minor, "Add a header"));
        let result = acc.finalize(None);

        let recs = result.recommendations();
        let ids: Vec<&str> = recs.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["title-missing", "heading-level-skipped", "banner-missing"]);
        assert_eq!(recs[1].occurrences, 2);
        assert_eq!(recs[1].suggestion, "Add levels");
    }

    #[test]
    fn test_impact_serializes_lowercase() {
        let json = serde_json::to_string(&Impact::Critical).unwrap();
        assert_eq!(json, "\"critical\"");
    }

    #[test]
    fn test_tier_serializes_hyphenated() {
        let json = serde_json::to_string(&ComplianceTier::NonCompliant).unwrap();
        assert_eq!(json, "\"Non-Compliant\"");
        let tier: ComplianceTier = serde_json::from_str("\"AA\"").unwrap();
        assert_eq!(tier, ComplianceTier::AA);
    }

    #[test]
    fn test_violation_uses_camel_case_keys() {
        let v = Violation::new("title-missing", "Document title missing", Impact::Critical, "Add a title");
        let value = serde_json::to_value(&v).unwrap();
        assert!(value.get("affectedNodes").is_some());
        assert_eq!(value["impact"], "critical");
    }

    #[test]
    fn test_finalize_empty_is_non_compliant() {
        let result = Accumulator::new().finalize(None);
        assert_eq!(result.score, 0.0);
        assert_eq!(result.wcag_level, ComplianceTier::NonCompliant);
    }

    #[test]
    fn test_finalize_only_passes_is_aaa() {
        let mut acc = Accumulator::new();
        acc.add_pass(Pass::new("document-title", "Document title: \"Home\""));
        let result = acc.finalize(Some("index.html".into()));
        assert_eq!(result.score, 100.0);
        assert_eq!(result.wcag_level, ComplianceTier::AAA);
        assert!(result.passed("document-title"));
    }
}
