use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Employee-count threshold flags referenced by catalog conditions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeThresholds {
    pub gte_1: bool,
    pub gte_10: bool,
    pub gte_15: bool,
    pub gte_20: bool,
    pub gte_50: bool,
    pub gte_100: bool,
}

/// Normalized facts derived from a business profile. These are the values
/// catalog conditions address under the `derived.` prefix; every map is a
/// `BTreeMap` so serialization order is stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedFacts {
    pub us_presence: bool,
    pub employee_count_total: u32,
    pub thresholds: EmployeeThresholds,
    pub state_presence: BTreeMap<String, bool>,
    pub has_employees_by_state: BTreeMap<String, bool>,
    pub multi_state_employer: bool,
    pub consumers_by_state: BTreeMap<String, u64>,
    pub ccpa_applicable: bool,
    pub vcdpa_applicable: bool,
    pub co_cpa_applicable: bool,
    pub ct_ctdpa_applicable: bool,
    pub ut_ucpa_applicable: bool,
    pub ny_shield_applicable: bool,
    pub pci_applicable: bool,
    pub hipaa_applicable: bool,
    pub coppa_applicable: bool,
    pub city_is: BTreeMap<String, bool>,
    pub sells_goods: bool,
}
