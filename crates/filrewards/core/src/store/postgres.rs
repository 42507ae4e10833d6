//! PostgreSQL ledger store.
//!
//! Source-of-truth backend. Aggregations run in SQL; pagination uses the
//! `created_at` index with a strict keyset bound.

use super::{ClaimFilter, ClaimStore, LedgerStore, RewardFilter, RewardStore};
use crate::error::{StorageError, StorageResult};
use crate::pagination::{KeysetBound, KeysetQuery, SortOrder};
use crate::types::{Claim, Reward, RewardType};
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{Postgres, QueryBuilder, Row};
use tracing::info;

const REWARD_COLUMNS: &str =
    "SELECT reward_id, org_key, dev_key, reward_type, factor, base_amount, created_at FROM filrewards WHERE TRUE";
const CLAIM_COLUMNS: &str =
    "SELECT claim_id, org_key, claimed_by, amount, created_at FROM filclaims WHERE TRUE";

#[derive(Debug, Clone)]
pub struct PostgresLedgerStore {
    pool: PgPool,
}

impl PostgresLedgerStore {
    /// Connect and make sure tables and indexes exist.
    pub async fn connect(database_url: &str, max_connections: u32) -> StorageResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect(database_url)
            .await
            .map_err(|e| StorageError::Backend(format!("postgres connect failed: {e}")))?;
        Self::from_pool(pool).await
    }

    pub async fn from_pool(pool: PgPool) -> StorageResult<Self> {
        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn ensure_schema(&self) -> StorageResult<()> {
        let ddl = [
            r#"
            CREATE TABLE IF NOT EXISTS filrewards (
                reward_id TEXT PRIMARY KEY,
                org_key TEXT NOT NULL,
                dev_key TEXT NOT NULL,
                reward_type TEXT NOT NULL,
                factor BIGINT NOT NULL,
                base_amount BIGINT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS filclaims (
                claim_id TEXT PRIMARY KEY,
                org_key TEXT NOT NULL,
                claimed_by TEXT NOT NULL,
                amount BIGINT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL
            )
            "#,
            // One grant per subject and type; empty keys are not subjects.
            "CREATE UNIQUE INDEX IF NOT EXISTS uq_filrewards_org_type ON filrewards (org_key, reward_type) WHERE org_key <> ''",
            "CREATE UNIQUE INDEX IF NOT EXISTS uq_filrewards_dev_type ON filrewards (dev_key, reward_type) WHERE dev_key <> ''",
            "CREATE INDEX IF NOT EXISTS idx_filrewards_org_key ON filrewards (org_key)",
            "CREATE INDEX IF NOT EXISTS idx_filrewards_dev_key ON filrewards (dev_key)",
            "CREATE INDEX IF NOT EXISTS idx_filrewards_reward_type ON filrewards (reward_type)",
            "CREATE INDEX IF NOT EXISTS idx_filrewards_created_at ON filrewards (created_at ASC)",
            "CREATE INDEX IF NOT EXISTS idx_filclaims_org_key ON filclaims (org_key)",
            "CREATE INDEX IF NOT EXISTS idx_filclaims_claimed_by ON filclaims (claimed_by)",
            "CREATE INDEX IF NOT EXISTS idx_filclaims_created_at ON filclaims (created_at ASC)",
        ];

        for stmt in ddl {
            sqlx::query(stmt)
                .execute(&self.pool)
                .await
                .map_err(|e| StorageError::Backend(format!("schema init failed: {e}")))?;
        }
        info!("filrewards postgres schema ready");
        Ok(())
    }
}

#[async_trait]
impl RewardStore for PostgresLedgerStore {
    async fn insert_reward(&self, reward: &Reward) -> StorageResult<()> {
        sqlx::query(
            r#"
            INSERT INTO filrewards
                (reward_id, org_key, dev_key, reward_type, factor, base_amount, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&reward.reward_id)
        .bind(&reward.org_key)
        .bind(&reward.dev_key)
        .bind(reward.reward_type.as_str())
        .bind(reward.factor)
        .bind(reward.base_amount)
        .bind(reward.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_conflict)?;
        Ok(())
    }

    async fn all_rewards(&self) -> StorageResult<Vec<Reward>> {
        let rows = sqlx::query(REWARD_COLUMNS)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::Backend(format!("reward scan failed: {e}")))?;
        rows.iter().map(decode_reward).collect()
    }

    async fn find_rewards(
        &self,
        filter: &RewardFilter,
        query: &KeysetQuery,
    ) -> StorageResult<Vec<Reward>> {
        let mut builder = reward_select(REWARD_COLUMNS, filter);
        push_keyset(&mut builder, query)?;
        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::Backend(format!("reward query failed: {e}")))?;
        rows.iter().map(decode_reward).collect()
    }

    async fn reward_exists(
        &self,
        filter: &RewardFilter,
        bound: KeysetBound,
    ) -> StorageResult<bool> {
        let mut builder = reward_select("SELECT EXISTS (SELECT 1 FROM filrewards WHERE TRUE", filter);
        push_bound(&mut builder, bound);
        builder.push(")");
        let row = builder
            .build()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StorageError::Backend(format!("reward probe failed: {e}")))?;
        row.try_get::<bool, _>(0)
            .map_err(|e| StorageError::Serialization(format!("decode exists failed: {e}")))
    }

    async fn total_rewarded(&self, org_key: &str) -> StorageResult<i64> {
        let row = sqlx::query(
            "SELECT COALESCE(SUM(factor * base_amount), 0)::BIGINT AS total FROM filrewards WHERE org_key = $1",
        )
        .bind(org_key)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StorageError::Backend(format!("total rewarded failed: {e}")))?;
        row.try_get("total")
            .map_err(|e| StorageError::Serialization(format!("decode total failed: {e}")))
    }
}

#[async_trait]
impl ClaimStore for PostgresLedgerStore {
    async fn insert_claim(&self, claim: &Claim) -> StorageResult<()> {
        sqlx::query(
            r#"
            INSERT INTO filclaims (claim_id, org_key, claimed_by, amount, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&claim.claim_id)
        .bind(&claim.org_key)
        .bind(&claim.claimed_by)
        .bind(claim.amount)
        .bind(claim.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_conflict)?;
        Ok(())
    }

    async fn find_claims(
        &self,
        filter: &ClaimFilter,
        query: &KeysetQuery,
    ) -> StorageResult<Vec<Claim>> {
        let mut builder = claim_select(CLAIM_COLUMNS, filter);
        push_keyset(&mut builder, query)?;
        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::Backend(format!("claim query failed: {e}")))?;
        rows.iter().map(decode_claim).collect()
    }

    async fn claim_exists(&self, filter: &ClaimFilter, bound: KeysetBound) -> StorageResult<bool> {
        let mut builder = claim_select("SELECT EXISTS (SELECT 1 FROM filclaims WHERE TRUE", filter);
        push_bound(&mut builder, bound);
        builder.push(")");
        let row = builder
            .build()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StorageError::Backend(format!("claim probe failed: {e}")))?;
        row.try_get::<bool, _>(0)
            .map_err(|e| StorageError::Serialization(format!("decode exists failed: {e}")))
    }

    async fn total_claimed(&self, org_key: &str) -> StorageResult<i64> {
        let row = sqlx::query(
            "SELECT COALESCE(SUM(amount), 0)::BIGINT AS total FROM filclaims WHERE org_key = $1",
        )
        .bind(org_key)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StorageError::Backend(format!("total claimed failed: {e}")))?;
        row.try_get("total")
            .map_err(|e| StorageError::Serialization(format!("decode total failed: {e}")))
    }
}

impl LedgerStore for PostgresLedgerStore {
    fn backend_label(&self) -> &'static str {
        "postgres"
    }
}

fn reward_select(head: &str, filter: &RewardFilter) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(head);
    if let Some(org_key) = &filter.org_key {
        builder.push(" AND org_key = ").push_bind(org_key.clone());
    }
    if let Some(dev_key) = &filter.dev_key {
        builder.push(" AND dev_key = ").push_bind(dev_key.clone());
    }
    if let Some(reward_type) = filter.reward_type {
        builder
            .push(" AND reward_type = ")
            .push_bind(reward_type.as_str());
    }
    builder
}

fn claim_select(head: &str, filter: &ClaimFilter) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(head);
    if let Some(org_key) = &filter.org_key {
        builder.push(" AND org_key = ").push_bind(org_key.clone());
    }
    if let Some(claimed_by) = &filter.claimed_by {
        builder
            .push(" AND claimed_by = ")
            .push_bind(claimed_by.clone());
    }
    builder
}

fn push_bound(builder: &mut QueryBuilder<'static, Postgres>, bound: KeysetBound) {
    let comparison = match bound.order {
        SortOrder::Ascending => " AND created_at > ",
        SortOrder::Descending => " AND created_at < ",
    };
    builder.push(comparison).push_bind(bound.created_at);
}

fn push_keyset(builder: &mut QueryBuilder<'static, Postgres>, query: &KeysetQuery) -> StorageResult<()> {
    if let Some(bound) = query.bound {
        push_bound(builder, bound);
    }
    builder.push(match query.order {
        SortOrder::Ascending => " ORDER BY created_at ASC",
        SortOrder::Descending => " ORDER BY created_at DESC",
    });
    if let Some(limit) = query.limit {
        let limit = i64::try_from(limit)
            .map_err(|_| StorageError::InvalidInput("page limit too large".to_string()))?;
        builder.push(" LIMIT ").push_bind(limit);
    }
    Ok(())
}

fn decode_reward(row: &PgRow) -> StorageResult<Reward> {
    let reward_type: String = row
        .try_get("reward_type")
        .map_err(|e| StorageError::Serialization(format!("decode reward_type failed: {e}")))?;
    let reward_type = reward_type
        .parse::<RewardType>()
        .map_err(|e| StorageError::Serialization(e.to_string()))?;

    Ok(Reward {
        reward_id: row
            .try_get("reward_id")
            .map_err(|e| StorageError::Serialization(format!("decode reward_id failed: {e}")))?,
        org_key: row
            .try_get("org_key")
            .map_err(|e| StorageError::Serialization(format!("decode org_key failed: {e}")))?,
        dev_key: row
            .try_get("dev_key")
            .map_err(|e| StorageError::Serialization(format!("decode dev_key failed: {e}")))?,
        reward_type,
        factor: row
            .try_get("factor")
            .map_err(|e| StorageError::Serialization(format!("decode factor failed: {e}")))?,
        base_amount: row
            .try_get("base_amount")
            .map_err(|e| StorageError::Serialization(format!("decode base_amount failed: {e}")))?,
        created_at: row
            .try_get("created_at")
            .map_err(|e| StorageError::Serialization(format!("decode created_at failed: {e}")))?,
    })
}

fn decode_claim(row: &PgRow) -> StorageResult<Claim> {
    Ok(Claim {
        claim_id: row
            .try_get("claim_id")
            .map_err(|e| StorageError::Serialization(format!("decode claim_id failed: {e}")))?,
        org_key: row
            .try_get("org_key")
            .map_err(|e| StorageError::Serialization(format!("decode org_key failed: {e}")))?,
        claimed_by: row
            .try_get("claimed_by")
            .map_err(|e| StorageError::Serialization(format!("decode claimed_by failed: {e}")))?,
        amount: row
            .try_get("amount")
            .map_err(|e| StorageError::Serialization(format!("decode amount failed: {e}")))?,
        created_at: row
            .try_get("created_at")
            .map_err(|e| StorageError::Serialization(format!("decode created_at failed: {e}")))?,
    })
}

fn map_sqlx_conflict(err: sqlx::Error) -> StorageError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some("23505") {
            return StorageError::Conflict(db_err.message().to_string());
        }
    }
    StorageError::Backend(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn reward_query_binds_filters_and_strict_bound() {
        let filter = RewardFilter {
            org_key: Some("org1".to_string()),
            dev_key: None,
            reward_type: Some(RewardType::FirstBucketCreated),
        };
        let query = KeysetQuery {
            order: SortOrder::Descending,
            bound: Some(KeysetBound::new(Utc::now(), SortOrder::Descending)),
            limit: Some(2),
        };
        let mut builder = reward_select(REWARD_COLUMNS, &filter);
        push_keyset(&mut builder, &query).unwrap();

        let sql = builder.sql();
        assert!(sql.ends_with(
            " AND org_key = $1 AND reward_type = $2 AND created_at < $3 ORDER BY created_at DESC LIMIT $4"
        ));
    }

    #[test]
    fn claim_probe_wraps_exists() {
        let filter = ClaimFilter {
            org_key: None,
            claimed_by: Some("alice".to_string()),
        };
        let mut builder =
            claim_select("SELECT EXISTS (SELECT 1 FROM filclaims WHERE TRUE", &filter);
        push_bound(
            &mut builder,
            KeysetBound::new(Utc::now(), SortOrder::Ascending),
        );
        builder.push(")");

        assert_eq!(
            builder.sql(),
            "SELECT EXISTS (SELECT 1 FROM filclaims WHERE TRUE AND claimed_by = $1 AND created_at > $2)"
        );
    }
}
