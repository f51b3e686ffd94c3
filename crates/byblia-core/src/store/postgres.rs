//! PostgreSQL-backed interaction store.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;

use byblia_types::models::config::DatabaseConfig;
use byblia_types::{FeedbackOutcome, InteractionRecord, NewInteraction};

use super::{resolve_feedback, InteractionStore, StoreError, StoreResult};

pub struct PostgresInteractionStore {
    pool: PgPool,
}

fn map_sqlx_err(err: sqlx::Error) -> StoreError {
    StoreError::Database(err.to_string())
}

fn row_to_record(row: &PgRow) -> InteractionRecord {
    InteractionRecord {
        id: row.get("id"),
        user_prompt: row.get("user_prompt"),
        model: row.get("model"),
        timestamp: row.get("timestamp"),
        temperature: row.get("temperature"),
        message: row.get("message"),
        token_usage: row.get("token_usage"),
        interaction_number: row.get("interaction_number"),
        user_feedback: row.get("user_feedback"),
    }
}

impl PostgresInteractionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect using `config.url`.
    pub async fn connect(config: &DatabaseConfig) -> StoreResult<Self> {
        let url = config
            .url
            .as_deref()
            .ok_or_else(|| StoreError::Unavailable("DATABASE_URL is not set".to_string()))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(1)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(300))
            .connect(url)
            .await
            .map_err(map_sqlx_err)?;
        Ok(Self::new(pool))
    }

    pub async fn run_migrations(&self) -> StoreResult<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|err| StoreError::Migration(err.to_string()))
    }
}

#[async_trait]
impl InteractionStore for PostgresInteractionStore {
    async fn count(&self) -> StoreResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM interactions")
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_err)
    }

    async fn insert(
        &self,
        interaction: &NewInteraction,
        interaction_number: i32,
    ) -> StoreResult<i64> {
        sqlx::query_scalar(
            r#"
            INSERT INTO interactions
                (user_prompt, model, timestamp, temperature, message, token_usage, interaction_number)
            VALUES ($1, $2, NOW(), $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(&interaction.user_prompt)
        .bind(&interaction.model)
        .bind(interaction.temperature)
        .bind(&interaction.message)
        .bind(i32::try_from(interaction.token_usage).unwrap_or(i32::MAX))
        .bind(interaction_number)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_err)
    }

    async fn set_feedback(&self, id: i64, feedback: bool) -> StoreResult<FeedbackOutcome> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_err)?;

        let current: Option<Option<bool>> =
            sqlx::query_scalar("SELECT user_feedback FROM interactions WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(map_sqlx_err)?;

        let Some(current) = current else {
            return Ok(FeedbackOutcome::NotFound);
        };

        let outcome = resolve_feedback(current, feedback);
        if outcome == FeedbackOutcome::Recorded {
            sqlx::query("UPDATE interactions SET user_feedback = $1 WHERE id = $2")
                .bind(feedback)
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx_err)?;
        }

        tx.commit().await.map_err(map_sqlx_err)?;
        Ok(outcome)
    }

    async fn recent(&self, limit: i64) -> StoreResult<Vec<InteractionRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_prompt, model, timestamp, temperature, message,
                   token_usage, interaction_number, user_feedback
            FROM interactions
            ORDER BY timestamp DESC, id DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(rows.iter().map(row_to_record).collect())
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
