use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::facts::DerivedFacts;

/// Request header that opts an evaluation into idempotent replay.
pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";

/// Response header set to `true` when a stored result was replayed.
pub const REPLAY_HEADER: &str = "Idempotent-Replay";

/// A rule whose condition held for the evaluated profile. `why` carries the
/// original condition tree verbatim so callers can display or audit the
/// trigger without access to the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleHit {
    pub rule_id: String,
    pub title: String,
    pub why: Value,
}

/// An obligation owed because a rule matched, enriched with the owning
/// rule's identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedObligation {
    pub action: String,
    pub description: String,
    pub rule_id: String,
    pub rule_title: String,
}

/// Complete outcome of evaluating one profile against the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub obligations: Vec<MatchedObligation>,
    pub hits: Vec<RuleHit>,
    pub derived: DerivedFacts,
}

impl EvaluationReport {
    /// Deterministic SHA-256 fingerprint of the canonical JSON serialization.
    /// Struct fields and `BTreeMap` keys serialize in a fixed order, so equal
    /// reports always produce equal fingerprints.
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};

        let json = serde_json::to_string(self).unwrap_or_else(|_| json!({}).to_string());
        let mut hasher = Sha256::new();
        hasher.update(json.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}
