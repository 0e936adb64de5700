use chrono::{DateTime, Utc};
use mandate_core::config::CoreConfig;
use mandate_core::db::DatabasePool;
use mandate_core::errors::{MandateError, Result};
use mandate_protocol::{BusinessProfile, Rule};
use serde::Serialize;
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// Database-backed store for the rule catalog, idempotency sessions and
/// evaluation history.
#[derive(Clone)]
pub struct EvaluationRepository {
    pool: DatabasePool,
}

impl EvaluationRepository {
    /// Connects using the supplied configuration and ensures migrations ran.
    pub async fn from_config(config: &CoreConfig) -> Result<Self> {
        let pool = DatabasePool::connect(config).await?;
        Self::from_pool(pool).await
    }

    /// Builds the repository from an existing pool, running migrations first.
    pub async fn from_pool(pool: DatabasePool) -> Result<Self> {
        sqlx::migrate!()
            .run(pool.inner())
            .await
            .map_err(|err| MandateError::DatabaseError(err.to_string()))?;
        Ok(Self { pool })
    }

    /// Wraps a pool without touching the database. Callers own migration.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    pub async fn rule_count(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM rules")
            .fetch_one(self.pool.inner())
            .await?;
        Ok(count)
    }

    /// Lists stored rules newest-first for the public listing endpoint.
    pub async fn list_rules(&self, limit: i64) -> Result<Vec<StoredRule>> {
        let rows = sqlx::query_as::<_, RuleRow>(
            r#"
            SELECT id, title, jurisdiction, category, condition, obligations,
                   citations, version, created_at
            FROM rules
            ORDER BY created_at DESC, seq DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(self.pool.inner())
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Loads the full catalog in seed order for evaluation.
    pub async fn load_rules(&self) -> Result<Vec<Rule>> {
        let rows = sqlx::query_as::<_, RuleRow>(
            r#"
            SELECT id, title, jurisdiction, category, condition, obligations,
                   citations, version, created_at
            FROM rules
            ORDER BY seq ASC
            "#,
        )
        .fetch_all(self.pool.inner())
        .await?;

        rows.into_iter().map(RuleRow::into_domain).collect()
    }

    /// Inserts a rule unless one with the same title exists. Returns whether
    /// a row was written.
    pub async fn insert_rule_if_absent(&self, rule: &Rule) -> Result<bool> {
        let (obligations, citations) = encode_rule_payloads(rule)?;
        let result = sqlx::query(
            r#"
            INSERT INTO rules (title, jurisdiction, category, condition, obligations, citations)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (title) DO NOTHING
            "#,
        )
        .bind(&rule.title)
        .bind(&rule.jurisdiction)
        .bind(&rule.category)
        .bind(&rule.condition)
        .bind(obligations)
        .bind(citations)
        .execute(self.pool.inner())
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Inserts a rule, overwriting any existing row with the same title and
    /// bumping its version.
    pub async fn upsert_rule(&self, rule: &Rule) -> Result<()> {
        let (obligations, citations) = encode_rule_payloads(rule)?;
        sqlx::query(
            r#"
            INSERT INTO rules (title, jurisdiction, category, condition, obligations, citations)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (title) DO UPDATE SET
                jurisdiction = EXCLUDED.jurisdiction,
                category = EXCLUDED.category,
                condition = EXCLUDED.condition,
                obligations = EXCLUDED.obligations,
                citations = EXCLUDED.citations,
                version = rules.version + 1
            "#,
        )
        .bind(&rule.title)
        .bind(&rule.jurisdiction)
        .bind(&rule.category)
        .bind(&rule.condition)
        .bind(obligations)
        .bind(citations)
        .execute(self.pool.inner())
        .await?;

        Ok(())
    }

    /// Creates or refreshes the session for an idempotency key, storing the
    /// latest submitted profile.
    pub async fn upsert_session(&self, key: &str, profile: &BusinessProfile) -> Result<Uuid> {
        let profile = encode_json(profile)?;
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO sessions (idempotency_key, profile)
            VALUES ($1, $2)
            ON CONFLICT (idempotency_key) DO UPDATE SET
                profile = EXCLUDED.profile,
                updated_at = now()
            RETURNING id
            "#,
        )
        .bind(key)
        .bind(profile)
        .fetch_one(self.pool.inner())
        .await?;

        Ok(id)
    }

    /// Appends an evaluation to a session's history.
    pub async fn append_evaluation(
        &self,
        session_id: Uuid,
        profile: &BusinessProfile,
        results: &Value,
        fingerprint: &str,
    ) -> Result<Uuid> {
        let profile = encode_json(profile)?;
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO evaluations (session_id, profile, results, fingerprint)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(session_id)
        .bind(profile)
        .bind(results)
        .bind(fingerprint)
        .fetch_one(self.pool.inner())
        .await?;

        Ok(id)
    }

    /// Returns the most recent stored result for an idempotency key, if the
    /// key has a session with at least one evaluation.
    pub async fn stored_result_for_key(&self, key: &str) -> Result<Option<Value>> {
        let results = sqlx::query_scalar::<_, Value>(
            r#"
            SELECT e.results
            FROM evaluations e
            JOIN sessions s ON s.id = e.session_id
            WHERE s.idempotency_key = $1
            ORDER BY e.created_at DESC
            LIMIT 1
            "#,
        )
        .bind(key)
        .fetch_optional(self.pool.inner())
        .await?;

        Ok(results)
    }
}

fn encode_json<T: Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(|err| MandateError::SerializationError(err.to_string()))
}

fn encode_rule_payloads(rule: &Rule) -> Result<(Value, Value)> {
    Ok((encode_json(&rule.obligations)?, encode_json(&rule.citations)?))
}

/// Stored rule as returned by the listing endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRule {
    pub id: Uuid,
    pub title: String,
    pub jurisdiction: String,
    pub category: Option<String>,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub condition: Value,
    pub obligations: Value,
    pub citations: Value,
}

#[derive(FromRow)]
struct RuleRow {
    id: Uuid,
    title: String,
    jurisdiction: String,
    category: Option<String>,
    condition: Value,
    obligations: Value,
    citations: Value,
    version: i32,
    created_at: DateTime<Utc>,
}

impl RuleRow {
    fn into_domain(self) -> Result<Rule> {
        Ok(Rule {
            title: self.title,
            jurisdiction: self.jurisdiction,
            category: self.category,
            condition: self.condition,
            obligations: serde_json::from_value(self.obligations)?,
            citations: serde_json::from_value(self.citations)?,
        })
    }
}

impl From<RuleRow> for StoredRule {
    fn from(row: RuleRow) -> Self {
        StoredRule {
            id: row.id,
            title: row.title,
            jurisdiction: row.jurisdiction,
            category: row.category,
            version: row.version,
            created_at: row.created_at,
            condition: row.condition,
            obligations: row.obligations,
            citations: row.citations,
        }
    }
}
