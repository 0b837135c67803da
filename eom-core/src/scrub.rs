//! Textual normalization of solved equations.
//!
//! External simulators consume plain strings, not expression trees. The
//! scrubber rewrites the CAS rendering of a solved expression into portable
//! notation through an ordered rule table:
//!
//! 1. `Derivative(` → `d`
//! 2. `, t)` → removed (completes the derivative-marker rewrite)
//! 3. `(t)` → removed (strips time-dependence suffixes)
//! 4. per declared coordinate, `d<name>` → the coordinate's velocity alias
//!
//! The table is data, applied strictly in declared order, so the ordering
//! and intent stay auditable. This is a pure text transform tuned to the
//! narrow set of renderings this pipeline produces; anything else passes
//! through unchanged. The only quality signal is the parenthesis-balance
//! flag, which is advisory: emission never blocks on it.

#[cfg(feature = "serde-derive")]
use serde::{Deserialize, Serialize};

use crate::model::GeneralizedCoordinate;

/// One ordered rewrite: every occurrence of `pattern` becomes
/// `replacement`.
#[derive(Debug, Clone)]
pub struct RewriteRule {
    pattern: String,
    replacement: String,
}

impl RewriteRule {
    pub fn new(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            replacement: replacement.into(),
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn replacement(&self) -> &str {
        &self.replacement
    }
}

/// The terminal artifact of the pipeline: normalized text plus a
/// parenthesis-balance flag. `well_formed == false` means "inspect before
/// trusting", not "rejected".
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde-derive", derive(Serialize, Deserialize))]
pub struct ScrubbedEquation {
    pub text: String,
    pub well_formed: bool,
}

/// Rewrites CAS renderings into portable notation.
#[derive(Debug, Clone)]
pub struct EquationScrubber {
    rules: Vec<RewriteRule>,
}

impl EquationScrubber {
    /// Builds the rule table for a declared coordinate set.
    ///
    /// The derivative and time-suffix rules are fixed; one substitution
    /// rule is appended per coordinate, keyed off its exact name.
    pub fn for_coordinates(coordinates: &[GeneralizedCoordinate]) -> Self {
        let mut rules = vec![
            RewriteRule::new("Derivative(", "d"),
            RewriteRule::new(", t)", ""),
            RewriteRule::new("(t)", ""),
        ];
        for coordinate in coordinates {
            rules.push(RewriteRule::new(
                format!("d{}", coordinate.name()),
                coordinate.velocity_alias(),
            ));
        }
        Self { rules }
    }

    pub fn rules(&self) -> &[RewriteRule] {
        &self.rules
    }

    /// Applies the rule table in order and computes the balance flag.
    /// Never fails; the flag is the only quality signal.
    pub fn scrub(&self, rendered: &str) -> ScrubbedEquation {
        let mut text = rendered.to_string();
        for rule in &self.rules {
            text = text.replace(&rule.pattern, &rule.replacement);
        }
        let well_formed = text.matches('(').count() == text.matches(')').count();
        ScrubbedEquation { text, well_formed }
    }
}
