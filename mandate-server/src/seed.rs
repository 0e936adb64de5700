use std::path::Path;

use mandate_core::errors::{MandateError, Result};
use mandate_rules::{load_rules, Catalog};
use tracing::info;

use crate::repository::EvaluationRepository;

/// Outcome of a catalog seeding run.
#[derive(Debug, Default, Clone, Copy)]
pub struct SeedSummary {
    pub inserted: usize,
    pub replaced: usize,
    pub skipped: usize,
}

/// Loads rule packs from `path` and writes them into the catalog table.
///
/// The packs are validated as one catalog before any write, so a pack with a
/// duplicate or empty title leaves the database untouched. Existing titles
/// are skipped unless `replace` is set, in which case they are overwritten.
pub async fn seed_catalog(
    repository: &EvaluationRepository,
    path: &Path,
    replace: bool,
) -> Result<SeedSummary> {
    let rules = load_rules(path).map_err(|err| MandateError::CatalogError(err.to_string()))?;
    let catalog =
        Catalog::from_rules(rules).map_err(|err| MandateError::CatalogError(err.to_string()))?;

    let mut summary = SeedSummary::default();
    for rule in catalog.into_rules() {
        if replace {
            repository.upsert_rule(&rule).await?;
            summary.replaced += 1;
        } else if repository.insert_rule_if_absent(&rule).await? {
            summary.inserted += 1;
        } else {
            summary.skipped += 1;
        }
    }

    info!(
        inserted = summary.inserted,
        replaced = summary.replaced,
        skipped = summary.skipped,
        "seeded rule catalog"
    );
    Ok(summary)
}
