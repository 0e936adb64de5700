//! Catalog matching and obligation aggregation.

use mandate_protocol::{
    BusinessProfile, DerivedFacts, EvaluationReport, MatchedObligation, RuleHit,
};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::catalog::Catalog;
use crate::expr::{truthy, Expr};
use crate::facts::derive_facts;
use crate::ident::public_rule_id;

/// The context conditions evaluate against: the submitted profile under
/// `input.` and the derived facts under `derived.`.
#[derive(Serialize)]
struct EvaluationContext<'a> {
    input: &'a BusinessProfile,
    derived: &'a DerivedFacts,
}

/// Evaluates business profiles against a validated rule catalog.
#[derive(Debug, Clone)]
pub struct RuleEngine {
    catalog: Catalog,
}

impl RuleEngine {
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Runs every catalog rule against the profile. Facts are derived once
    /// and the context is built once; rules are tried in catalog order. A
    /// rule whose condition fails to parse is skipped — one malformed rule
    /// never affects the others — and a false or absent verdict is simply
    /// not a match.
    pub fn evaluate(&self, profile: &BusinessProfile) -> EvaluationReport {
        let derived = derive_facts(profile);
        let context = serde_json::to_value(EvaluationContext {
            input: profile,
            derived: &derived,
        })
        .unwrap_or(Value::Null);

        let primary_state = profile.locations.primary.state.as_str();
        let mut matched: Vec<(usize, String)> = Vec::new();
        for entry in self.catalog.entries() {
            let rule = &entry.rule;
            let expr = match Expr::from_value(&rule.condition) {
                Ok(expr) => expr,
                Err(error) => {
                    debug!(rule = %rule.title, %error, "skipping rule with malformed condition");
                    continue;
                }
            };
            let verdict = expr.evaluate(&context);
            if !truthy(verdict.as_ref()) {
                continue;
            }
            let rule_id = public_rule_id(
                &rule.jurisdiction,
                &rule.title,
                rule.category.as_deref(),
                Some(primary_state),
            );
            matched.push((entry.key, rule_id));
        }

        // Aggregation joins obligations to hits through the internal key
        // assigned at load time; a key that no longer resolves contributes
        // zero obligations rather than failing the evaluation.
        let mut hits = Vec::with_capacity(matched.len());
        let mut obligations = Vec::new();
        for (key, rule_id) in matched {
            let Some(rule) = self.catalog.rule(key) else {
                continue;
            };
            hits.push(RuleHit {
                rule_id: rule_id.clone(),
                title: rule.title.clone(),
                why: rule.condition.clone(),
            });
            for obligation in &rule.obligations {
                obligations.push(MatchedObligation {
                    action: obligation.action.clone(),
                    description: obligation.description.clone(),
                    rule_id: rule_id.clone(),
                    rule_title: rule.title.clone(),
                });
            }
        }

        EvaluationReport {
            obligations,
            hits,
            derived,
        }
    }
}
