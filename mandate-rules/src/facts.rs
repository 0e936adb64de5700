//! Profile normalization: turns a raw business profile into the derived
//! facts catalog conditions address under the `derived.` prefix.

use std::collections::BTreeMap;

use mandate_protocol::{BusinessProfile, DerivedFacts, EmployeeThresholds};

/// Applicability floors used by the state privacy gates. The defaults are
/// statute-inspired heuristics, not legal thresholds; they are grouped here
/// so deployments can tune them without touching the derivation logic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrivacyThresholds {
    /// Consumers-in-state floor shared by the CA/VA/CO/CT/UT gates.
    pub consumer_floor: u64,
    /// Annual revenue floor used by the CA alternative gate and the UT
    /// conjunctive gate.
    pub revenue_floor: f64,
}

impl Default for PrivacyThresholds {
    fn default() -> Self {
        Self {
            consumer_floor: 100_000,
            revenue_floor: 25_000_000.0,
        }
    }
}

/// Derives the normalized fact set with the default thresholds.
pub fn derive_facts(profile: &BusinessProfile) -> DerivedFacts {
    derive_facts_with(profile, PrivacyThresholds::default())
}

/// Derives the normalized fact set. Pure: absent inputs read as
/// empty/false/zero and never fail derivation.
pub fn derive_facts_with(
    profile: &BusinessProfile,
    privacy: PrivacyThresholds,
) -> DerivedFacts {
    let total = profile.size.employee_count_total;
    let thresholds = EmployeeThresholds {
        gte_1: total >= 1,
        gte_10: total >= 10,
        gte_15: total >= 15,
        gte_20: total >= 20,
        gte_50: total >= 50,
        gte_100: total >= 100,
    };

    let mut state_presence: BTreeMap<String, bool> = BTreeMap::new();
    let primary_state = profile.locations.primary.state.as_str();
    if !primary_state.is_empty() {
        state_presence.insert(primary_state.to_string(), true);
    }
    for state in &profile.locations.operating_states {
        state_presence.insert(state.clone(), true);
    }
    for state in profile.locations.has_remote_employees_by_state.keys() {
        state_presence.insert(state.clone(), true);
    }

    let mut has_employees_by_state: BTreeMap<String, bool> = BTreeMap::new();
    for (state, count) in &profile.size.employee_count_by_state {
        if *count > 0 {
            has_employees_by_state.insert(state.clone(), true);
        }
    }

    let collects = profile.data_practices.collects_personal_data;
    let revenue = profile.size.annual_revenue_usd.unwrap_or(0.0);
    let consumers = |state: &str| -> u64 {
        profile
            .data_practices
            .consumers_by_state
            .get(state)
            .copied()
            .unwrap_or(0)
    };
    let present = |state: &str| -> bool { state_presence.get(state).copied().unwrap_or(false) };

    let ccpa_applicable = present("CA")
        && collects
        && (consumers("CA") >= privacy.consumer_floor || revenue >= privacy.revenue_floor);
    let vcdpa_applicable = present("VA") && collects && consumers("VA") >= privacy.consumer_floor;
    let co_cpa_applicable = present("CO") && collects && consumers("CO") >= privacy.consumer_floor;
    let ct_ctdpa_applicable =
        present("CT") && collects && consumers("CT") >= privacy.consumer_floor;
    let ut_ucpa_applicable = present("UT")
        && collects
        && consumers("UT") >= privacy.consumer_floor
        && revenue >= privacy.revenue_floor;
    let ny_shield_applicable = consumers("NY") > 0 && collects;

    let mut city_is: BTreeMap<String, bool> = BTreeMap::new();
    if let Some(city) = profile.locations.primary.city.as_deref() {
        if !city.is_empty() {
            city_is.insert(city.to_string(), true);
        }
    }

    DerivedFacts {
        us_presence: profile.locations.primary.country == "US",
        employee_count_total: total,
        thresholds,
        multi_state_employer: state_presence.len() > 1,
        state_presence,
        has_employees_by_state,
        consumers_by_state: profile.data_practices.consumers_by_state.clone(),
        ccpa_applicable,
        vcdpa_applicable,
        co_cpa_applicable,
        ct_ctdpa_applicable,
        ut_ucpa_applicable,
        ny_shield_applicable,
        pci_applicable: profile.payments.accepts_card_payments,
        hipaa_applicable: profile.data_practices.processes_phi,
        coppa_applicable: profile.data_practices.targets_children_u13,
        city_is,
        sells_goods: profile.operations.serves_food || profile.operations.ecommerce,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mandate_protocol::{CompanySize, Locations, PrimaryLocation};

    fn us_profile(state: &str) -> BusinessProfile {
        BusinessProfile {
            locations: Locations {
                primary: PrimaryLocation {
                    country: "US".into(),
                    state: state.into(),
                    ..Default::default()
                },
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn with_employees(state: &str, total: u32) -> BusinessProfile {
        let mut profile = us_profile(state);
        profile.size = CompanySize {
            employee_count_total: total,
            employee_count_by_state: [(state.to_string(), total)].into_iter().collect(),
            annual_revenue_usd: None,
        };
        profile
    }

    #[test]
    fn thresholds_are_monotonic_in_employee_count() {
        let mut previous = [false; 6];
        for total in [0u32, 1, 9, 10, 14, 15, 19, 20, 49, 50, 99, 100, 500] {
            let facts = derive_facts(&with_employees("IL", total));
            let current = [
                facts.thresholds.gte_1,
                facts.thresholds.gte_10,
                facts.thresholds.gte_15,
                facts.thresholds.gte_20,
                facts.thresholds.gte_50,
                facts.thresholds.gte_100,
            ];
            for (was, now) in previous.iter().zip(current.iter()) {
                assert!(!was || *now, "a threshold flag regressed at {total}");
            }
            previous = current;
        }
    }

    #[test]
    fn sixty_employees_sets_fifty_but_not_hundred() {
        let facts = derive_facts(&with_employees("IL", 60));
        assert!(facts.thresholds.gte_50);
        assert!(!facts.thresholds.gte_100);
        assert_eq!(facts.employee_count_total, 60);
    }

    #[test]
    fn state_presence_is_the_union_of_all_sources() {
        let mut profile = us_profile("IL");
        profile.locations.operating_states = vec!["WI".into(), "IN".into()];
        profile
            .locations
            .has_remote_employees_by_state
            .insert("CA".into(), 2);
        let facts = derive_facts(&profile);
        for state in ["IL", "WI", "IN", "CA"] {
            assert_eq!(facts.state_presence.get(state), Some(&true), "{state}");
        }
        assert!(facts.multi_state_employer);
    }

    #[test]
    fn single_state_is_not_multi_state() {
        let facts = derive_facts(&us_profile("IL"));
        assert!(!facts.multi_state_employer);
        assert_eq!(facts.state_presence.len(), 1);
    }

    #[test]
    fn empty_primary_state_contributes_no_presence() {
        let facts = derive_facts(&us_profile(""));
        assert!(facts.state_presence.is_empty());
    }

    #[test]
    fn zero_count_states_have_no_employees() {
        let mut profile = us_profile("IL");
        profile.size.employee_count_by_state =
            [("IL".to_string(), 12u32), ("WI".to_string(), 0u32)]
                .into_iter()
                .collect();
        let facts = derive_facts(&profile);
        assert_eq!(facts.has_employees_by_state.get("IL"), Some(&true));
        assert!(facts.has_employees_by_state.get("WI").is_none());
    }

    #[test]
    fn ccpa_opens_on_either_consumer_or_revenue_gate() {
        let mut profile = us_profile("CA");
        profile.data_practices.collects_personal_data = true;

        profile.size.annual_revenue_usd = Some(30_000_000.0);
        assert!(derive_facts(&profile).ccpa_applicable);

        profile.size.annual_revenue_usd = Some(1_000_000.0);
        assert!(!derive_facts(&profile).ccpa_applicable);

        profile
            .data_practices
            .consumers_by_state
            .insert("CA".into(), 100_000);
        assert!(derive_facts(&profile).ccpa_applicable);
    }

    #[test]
    fn ccpa_requires_presence_and_collection() {
        let mut profile = us_profile("NV");
        profile.data_practices.collects_personal_data = true;
        profile.size.annual_revenue_usd = Some(30_000_000.0);
        assert!(!derive_facts(&profile).ccpa_applicable);

        let mut profile = us_profile("CA");
        profile.size.annual_revenue_usd = Some(30_000_000.0);
        assert!(!derive_facts(&profile).ccpa_applicable);
    }

    #[test]
    fn utah_gate_requires_both_consumers_and_revenue() {
        let mut profile = us_profile("UT");
        profile.data_practices.collects_personal_data = true;
        profile
            .data_practices
            .consumers_by_state
            .insert("UT".into(), 200_000);
        assert!(!derive_facts(&profile).ut_ucpa_applicable);

        profile.size.annual_revenue_usd = Some(25_000_000.0);
        assert!(derive_facts(&profile).ut_ucpa_applicable);
    }

    #[test]
    fn ny_shield_needs_any_ny_consumers_without_presence() {
        let mut profile = us_profile("IL");
        profile.data_practices.collects_personal_data = true;
        profile
            .data_practices
            .consumers_by_state
            .insert("NY".into(), 1);
        assert!(derive_facts(&profile).ny_shield_applicable);

        profile.data_practices.collects_personal_data = false;
        assert!(!derive_facts(&profile).ny_shield_applicable);
    }

    #[test]
    fn sector_flags_pass_through() {
        let mut profile = us_profile("IL");
        profile.payments.accepts_card_payments = true;
        profile.data_practices.processes_phi = true;
        profile.data_practices.targets_children_u13 = true;
        let facts = derive_facts(&profile);
        assert!(facts.pci_applicable);
        assert!(facts.hipaa_applicable);
        assert!(facts.coppa_applicable);
    }

    #[test]
    fn city_flag_and_sells_goods() {
        let mut profile = us_profile("IL");
        profile.locations.primary.city = Some("Chicago".into());
        profile.operations.serves_food = true;
        let facts = derive_facts(&profile);
        assert_eq!(facts.city_is.get("Chicago"), Some(&true));
        assert!(facts.sells_goods);
        assert!(facts.us_presence);
    }

    #[test]
    fn non_us_profile_has_no_us_presence() {
        let mut profile = us_profile("IL");
        profile.locations.primary.country = "CA".into();
        assert!(!derive_facts(&profile).us_presence);
    }

    #[test]
    fn custom_thresholds_shift_the_gates() {
        let mut profile = us_profile("VA");
        profile.data_practices.collects_personal_data = true;
        profile
            .data_practices
            .consumers_by_state
            .insert("VA".into(), 500);
        assert!(!derive_facts(&profile).vcdpa_applicable);

        let relaxed = PrivacyThresholds {
            consumer_floor: 100,
            ..Default::default()
        };
        assert!(derive_facts_with(&profile, relaxed).vcdpa_applicable);
    }
}
