//! Wire types shared across the Mandate services: the business profile
//! submitted by callers, catalog rules, derived facts, and the evaluation
//! report returned to clients.

pub mod facts;
pub mod profile;
pub mod report;
pub mod rule;

pub mod prelude {
    pub use crate::facts::{DerivedFacts, EmployeeThresholds};
    pub use crate::profile::{
        BusinessProfile, CompanySize, DataPractices, EntityInfo, IndustryInfo, LegalForm,
        Locations, Operations, Payments, PrimaryLocation, ProfileError, ProfileViolation,
    };
    pub use crate::report::{
        EvaluationReport, MatchedObligation, RuleHit, IDEMPOTENCY_KEY_HEADER, REPLAY_HEADER,
    };
    pub use crate::rule::{Citation, Obligation, Rule};
}

pub use prelude::*;
