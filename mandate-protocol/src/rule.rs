use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single obligation imposed by a matched rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obligation {
    pub action: String,
    pub description: String,
}

/// Legal citation backing a rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// A catalog rule: a jurisdictional trigger condition plus the obligations
/// it imposes. The condition stays a raw JSON tree here; the interpreter
/// parses it per evaluation so one malformed condition can be tolerated at
/// load time and skipped at match time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub title: String,
    pub jurisdiction: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub condition: Value,
    #[serde(default)]
    pub obligations: Vec<Obligation>,
    #[serde(default)]
    pub citations: Vec<Citation>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_rule_defaults_optional_fields() {
        let rule: Rule = serde_json::from_str(
            r#"{"title": "Test Rule", "jurisdiction": "federal"}"#,
        )
        .expect("parse");
        assert!(rule.category.is_none());
        assert!(rule.condition.is_null());
        assert!(rule.obligations.is_empty());
        assert!(rule.citations.is_empty());
    }

    #[test]
    fn citation_round_trips_optional_fields() {
        let citation = Citation {
            name: "FMLA".into(),
            section: Some("29 U.S.C. §2601 et seq.".into()),
            url: None,
        };
        let json = serde_json::to_value(&citation).expect("serialize");
        assert_eq!(json["section"], "29 U.S.C. §2601 et seq.");
        assert!(json.get("url").is_none());
    }
}
