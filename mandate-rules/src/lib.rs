//! Evaluation kernel for the Mandate platform.
//!
//! The kernel is pure: it takes a validated catalog and a business profile
//! and produces an evaluation report. Network, storage, and process
//! concerns live in the service crates.

pub mod catalog;
pub mod engine;
pub mod error;
pub mod expr;
pub mod facts;
pub mod ident;

pub use catalog::{load_catalog, load_rules, Catalog, CatalogEntry};
pub use engine::RuleEngine;
pub use error::CatalogError;
pub use expr::{Expr, ExprError};
pub use facts::{derive_facts, derive_facts_with, PrivacyThresholds};
pub use ident::{public_rule_id, slug};
