use std::path::PathBuf;

use mandate_protocol::{BusinessProfile, EvaluationReport};
use mandate_rules::{load_catalog, RuleEngine};
use serde_json::{json, Value};

fn shipped_engine() -> RuleEngine {
    let catalog_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../catalog");
    let catalog = load_catalog(catalog_dir).expect("shipped catalog loads and validates");
    RuleEngine::new(catalog)
}

fn profile(value: Value) -> BusinessProfile {
    serde_json::from_value(value).expect("test profile deserializes")
}

fn hit_ids(report: &EvaluationReport) -> Vec<&str> {
    report.hits.iter().map(|hit| hit.rule_id.as_str()).collect()
}

fn has_hit(report: &EvaluationReport, rule_id: &str) -> bool {
    report.hits.iter().any(|hit| hit.rule_id == rule_id)
}

#[test]
fn illinois_restaurant_with_sixty_employees() {
    let engine = shipped_engine();
    let report = engine.evaluate(&profile(json!({
        "as_of_date": "2025-06-01",
        "entity": { "legal_form": "llc" },
        "locations": {
            "primary": { "country": "US", "state": "IL", "city": "Chicago" }
        },
        "size": {
            "employee_count_total": 60,
            "employee_count_by_state": { "IL": 60 }
        },
        "operations": { "serves_food": true, "brick_and_mortar": true },
        "payments": { "accepts_card_payments": true }
    })));

    assert_eq!(
        hit_ids(&report),
        vec![
            "federal:employment:form_i_9_employment_eligibility_verification",
            "federal:employment:federal_labor_law_posters",
            "federal:ada:ada_title_i_employment_15_employees",
            "federal:cobra:cobra_20_employees",
            "federal:fmla:fmla_50_employees",
            "federal:osha:osha_general_duty_clause_all_us_employers",
            "federal:osha:osha_injury_illness_recordkeeping_10_employees",
            "state:IL:pci_dss_accepting_card_payments",
            "city:Chicago,IL:chicago_food_establishment_license",
            "state:IL:illinois_sales_tax_rot_registration",
            "state:IL:register_as_employer_for_payroll_taxes_il",
            "state:IL:state_labor_law_posters_il",
        ],
    );

    // Sixty employees clears the FMLA floor but not WARN or EEO-1.
    assert!(!has_hit(&report, "federal:warn:warn_act_100_employees"));
    assert!(!has_hit(
        &report,
        "federal:eeoc:eeo_1_reporting_100_employees_or_50_with_federal_contract"
    ));

    let license = report
        .obligations
        .iter()
        .find(|obligation| obligation.rule_id == "city:Chicago,IL:chicago_food_establishment_license")
        .expect("the Chicago license obligation is owed");
    assert_eq!(license.action, "Obtain Food Establishment License");
    assert_eq!(license.rule_title, "Chicago Food Establishment License");
}

#[test]
fn federal_contractor_crosses_the_eeo1_gate_at_fifty() {
    let engine = shipped_engine();
    let report = engine.evaluate(&profile(json!({
        "entity": { "federal_contractor": true },
        "locations": {
            "primary": { "country": "US", "state": "TX" },
            "has_remote_employees_by_state": { "NY": 3 }
        },
        "size": {
            "employee_count_total": 55,
            "employee_count_by_state": { "TX": 52, "NY": 3 }
        }
    })));

    assert!(has_hit(
        &report,
        "federal:eeoc:eeo_1_reporting_100_employees_or_50_with_federal_contract"
    ));
    assert!(has_hit(&report, "federal:fmla:fmla_50_employees"));
    assert!(!has_hit(&report, "federal:warn:warn_act_100_employees"));
    assert!(report.derived.multi_state_employer);

    // Payroll registration follows employees, not the primary address.
    for id in [
        "state:TX:register_as_employer_for_payroll_taxes_tx",
        "state:TX:state_labor_law_posters_tx",
        "state:NY:register_as_employer_for_payroll_taxes_ny",
        "state:NY:state_labor_law_posters_ny",
    ] {
        assert!(has_hit(&report, id), "expected {id}");
    }
    assert!(!has_hit(&report, "state:CA:register_as_employer_for_payroll_taxes_ca"));
}

#[test]
fn warn_act_requires_one_hundred_employees() {
    let engine = shipped_engine();
    let base = json!({
        "locations": { "primary": { "country": "US", "state": "TX" } },
        "size": { "employee_count_total": 99 }
    });

    let report = engine.evaluate(&profile(base.clone()));
    assert!(!has_hit(&report, "federal:warn:warn_act_100_employees"));

    let mut crossing = base;
    crossing["size"]["employee_count_total"] = json!(100);
    let report = engine.evaluate(&profile(crossing));
    assert!(has_hit(&report, "federal:warn:warn_act_100_employees"));
    assert!(has_hit(
        &report,
        "federal:eeoc:eeo_1_reporting_100_employees_or_50_with_federal_contract"
    ));
}

#[test]
fn california_revenue_opens_ccpa_and_economic_nexus() {
    let engine = shipped_engine();
    let report = engine.evaluate(&profile(json!({
        "locations": {
            "primary": { "country": "US", "state": "CA" },
            "online_sales_states": ["CA", "NY", "TX"]
        },
        "size": {
            "employee_count_total": 8,
            "employee_count_by_state": { "CA": 8 },
            "annual_revenue_usd": 30_000_000.0
        },
        "operations": { "ecommerce": true },
        "data_practices": { "collects_personal_data": true }
    })));

    assert!(has_hit(&report, "state:CA:california_ccpa_cpra"));
    assert!(has_hit(&report, "state:CA:sales_tax_economic_nexus_generic_check"));
    assert!(report.derived.ccpa_applicable);

    // No consumers recorded in the other privacy states.
    assert!(!has_hit(&report, "state:VA:virginia_vcdpa"));
    assert!(!has_hit(&report, "state:NY:new_york_shield_act_data_security"));

    // Eight employees sit below the ten-employee recordkeeping floor.
    assert!(!has_hit(
        &report,
        "federal:osha:osha_injury_illness_recordkeeping_10_employees"
    ));
    assert!(has_hit(
        &report,
        "federal:osha:osha_general_duty_clause_all_us_employers"
    ));
}

#[test]
fn ny_shield_reaches_companies_without_ny_presence() {
    let engine = shipped_engine();
    let report = engine.evaluate(&profile(json!({
        "locations": { "primary": { "country": "US", "state": "IL" } },
        "size": { "employee_count_total": 5 },
        "data_practices": {
            "collects_personal_data": true,
            "consumers_by_state": { "NY": 250 }
        }
    })));

    assert!(has_hit(&report, "state:NY:new_york_shield_act_data_security"));
    assert!(report.derived.ny_shield_applicable);
    assert_eq!(report.derived.state_presence.get("NY"), None);

    let shield = report
        .obligations
        .iter()
        .find(|obligation| obligation.rule_id == "state:NY:new_york_shield_act_data_security")
        .expect("SHIELD safeguards are owed");
    assert_eq!(shield.action, "Implement NY SHIELD safeguards");
}

#[test]
fn biometric_collection_in_illinois_triggers_bipa() {
    let engine = shipped_engine();
    let base = json!({
        "locations": { "primary": { "country": "US", "state": "IL" } },
        "size": { "employee_count_total": 4 },
        "data_practices": { "collects_biometric_data": true }
    });

    let report = engine.evaluate(&profile(base.clone()));
    assert!(has_hit(&report, "state:IL:illinois_bipa_biometric_information"));

    // The same practices outside Illinois owe nothing under BIPA.
    let mut moved = base;
    moved["locations"]["primary"]["state"] = json!("WI");
    let report = engine.evaluate(&profile(moved));
    assert!(!has_hit(&report, "state:IL:illinois_bipa_biometric_information"));
}

#[test]
fn card_payments_without_a_primary_state_fall_back_to_us() {
    let engine = shipped_engine();
    let report = engine.evaluate(&profile(json!({
        "locations": { "primary": { "country": "US" } },
        "size": { "employee_count_total": 2 },
        "payments": { "accepts_card_payments": true }
    })));

    assert!(has_hit(&report, "state:US:pci_dss_accepting_card_payments"));
}

#[test]
fn empty_profile_owes_nothing() {
    let engine = shipped_engine();
    let report = engine.evaluate(&profile(json!({})));

    assert!(report.hits.is_empty());
    assert!(report.obligations.is_empty());
    assert!(!report.derived.us_presence);
}

#[test]
fn every_obligation_traces_back_to_a_hit() {
    let engine = shipped_engine();
    let report = engine.evaluate(&profile(json!({
        "entity": { "federal_contractor": true },
        "locations": {
            "primary": { "country": "US", "state": "CA", "city": "Chicago" },
            "operating_states": ["VA", "CO", "CT", "UT", "IL"],
            "online_sales_states": ["CA"]
        },
        "size": {
            "employee_count_total": 150,
            "employee_count_by_state": { "CA": 100, "NY": 20, "TX": 20, "IL": 10 },
            "annual_revenue_usd": 40_000_000.0
        },
        "operations": { "serves_food": true, "ecommerce": true },
        "payments": { "accepts_card_payments": true },
        "data_practices": {
            "collects_personal_data": true,
            "processes_phi": true,
            "targets_children_u13": true,
            "collects_biometric_data": true,
            "consumers_by_state": {
                "CA": 200_000, "VA": 150_000, "CO": 150_000,
                "CT": 150_000, "UT": 150_000, "NY": 10
            }
        }
    })));

    // This profile trips every rule in the shipped catalog.
    assert_eq!(report.hits.len(), engine.catalog().len());

    let ids = hit_ids(&report);
    let mut deduped = ids.clone();
    deduped.sort();
    deduped.dedup();
    assert_eq!(deduped.len(), ids.len(), "rule ids collide: {ids:?}");

    for obligation in &report.obligations {
        assert!(
            ids.contains(&obligation.rule_id.as_str()),
            "obligation {} is orphaned",
            obligation.action
        );
    }
}

#[test]
fn evaluation_is_deterministic() {
    let engine = shipped_engine();
    let subject = profile(json!({
        "locations": {
            "primary": { "country": "US", "state": "IL", "city": "Chicago" }
        },
        "size": { "employee_count_total": 60, "employee_count_by_state": { "IL": 60 } },
        "operations": { "serves_food": true },
        "payments": { "accepts_card_payments": true }
    }));

    let first = engine.evaluate(&subject);
    let second = engine.evaluate(&subject);
    assert_eq!(first, second);
    assert_eq!(first.fingerprint(), second.fingerprint());
}
