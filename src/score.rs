// SPDX-License-Identifier: PMPL-1.0-or-later
//! Scoring: pass rate minus weighted violation deductions, clamped to 0..=100.

use crate::result::{ComplianceTier, Pass, Violation};

/// Minimum score for the AAA tier
pub const AAA_THRESHOLD: f64 = 95.0;
/// Minimum score for the AA tier
pub const AA_THRESHOLD: f64 = 90.0;
/// Minimum score for the A tier
pub const A_THRESHOLD: f64 = 80.0;

/// Compute the score for a set of violations and passes
pub fn score(violations: &[Violation], passes: &[Pass]) -> f64 {
    let total = violations.len() + passes.len();
    let pass_rate = if total > 0 {
        passes.len() as f64 / total as f64 * 100.0
    } else {
        0.0
    };

    let deduction: f64 = violations.iter().map(|v| v.impact.weight()).sum();

    (pass_rate - deduction).clamp(0.0, 100.0)
}

/// Map a score to its compliance tier
pub fn tier_for(score: f64) -> ComplianceTier {
    if score >= AAA_THRESHOLD {
        ComplianceTier::AAA
    } else if score >= AA_THRESHOLD {
        ComplianceTier::AA
    } else if score >= A_THRESHOLD {
        ComplianceTier::A
    } else {
        ComplianceTier::NonCompliant
    }
}
