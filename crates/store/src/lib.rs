//! The Task Store: durable persistence of Clients, Jobs,
//! Tasks, the message-sent ledger and client quotas, plus the atomic
//! claim/lease/complete primitives the Router, Dispatcher and HTTP Surface
//! build on.
//!
//! Grounded on the `FOR UPDATE SKIP LOCKED` claim idiom from
//! `trace-core/src/lite/pgqueue.rs` and the fenced-transaction idiom from
//! `harness/src/dispatcher.rs`.

pub mod models;

use chrono::{DateTime, Utc};
use models::{Client, ClientLimits, Job, JobMeta, JobSummary, Task};
use scrapcore_core::{Error, Result};
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, PgPool, Row};

#[derive(Clone)]
pub struct Store {
    pool: PgPool,
}

fn from_sqlx(e: sqlx::Error) -> Error {
    match e {
        sqlx::Error::RowNotFound => Error::not_found("row not found"),
        other => Error::Other(anyhow::Error::new(other)),
    }
}

impl Store {
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(from_sqlx)?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Other(e.into()))
    }

    // ---- Clients --------------------------------------------------------

    pub async fn get_client(&self, client_id: &str) -> Result<Option<Client>> {
        sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE id = $1")
            .bind(client_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(from_sqlx)
    }

    pub async fn get_client_limits(&self, client_id: &str) -> Result<Option<ClientLimits>> {
        sqlx::query_as::<_, ClientLimits>("SELECT * FROM client_limits WHERE client_id = $1")
            .bind(client_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(from_sqlx)
    }

    // ---- Jobs -------------------------------------------------------------

    /// `create_job`: upsert. Re-creation with the same id
    /// updates mutable fields without clearing `status`.
    pub async fn create_job(
        &self,
        id: &str,
        kind: &str,
        priority: i32,
        batch_size: i32,
        extra: Value,
        total_items: i32,
        client_id: &str,
    ) -> Result<()> {
        if client_id.trim().is_empty() {
            return Err(Error::invalid("client_id is required"));
        }
        sqlx::query(
            r#"
            INSERT INTO jobs (id, kind, priority, batch_size, extra, total_items, client_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE SET
              kind = EXCLUDED.kind,
              priority = EXCLUDED.priority,
              batch_size = EXCLUDED.batch_size,
              extra = EXCLUDED.extra,
              total_items = EXCLUDED.total_items,
              updated_at = now()
            "#,
        )
        .bind(id)
        .bind(kind)
        .bind(priority)
        .bind(batch_size)
        .bind(extra)
        .bind(total_items)
        .bind(client_id)
        .execute(&self.pool)
        .await
        .map_err(from_sqlx)?;
        Ok(())
    }

    pub async fn mark_job_running(&self, job_id: &str) -> Result<()> {
        self.set_job_status(job_id, "running").await
    }

    pub async fn mark_job_done(&self, job_id: &str) -> Result<()> {
        self.set_job_status(job_id, "done").await
    }

    pub async fn mark_job_error(&self, job_id: &str) -> Result<()> {
        self.set_job_status(job_id, "error").await
    }

    async fn set_job_status(&self, job_id: &str, status: &str) -> Result<()> {
        sqlx::query("UPDATE jobs SET status = $2, updated_at = now() WHERE id = $1")
            .bind(job_id)
            .bind(status)
            .execute(&self.pool)
            .await
            .map_err(from_sqlx)?;
        Ok(())
    }

    pub async fn job_exists(&self, job_id: &str) -> Result<bool> {
        let row: Option<(i32,)> = sqlx::query_as("SELECT 1 FROM jobs WHERE id = $1")
            .bind(job_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(from_sqlx)?;
        Ok(row.is_some())
    }

    pub async fn get_job_client_id(&self, job_id: &str) -> Result<Option<String>> {
        sqlx::query_scalar::<_, String>("SELECT client_id FROM jobs WHERE id = $1")
            .bind(job_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(from_sqlx)
    }

    pub async fn get_job_metadata(&self, job_id: &str) -> Result<JobMeta> {
        let row = sqlx::query("SELECT id, kind, priority, batch_size, extra, total_items FROM jobs WHERE id = $1")
            .bind(job_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(from_sqlx)?
            .ok_or_else(|| Error::not_found(format!("job {job_id} not found")))?;
        Ok(JobMeta {
            id: row.try_get("id").map_err(from_sqlx)?,
            kind: row.try_get("kind").map_err(from_sqlx)?,
            priority: row.try_get("priority").map_err(from_sqlx)?,
            batch_size: row.try_get("batch_size").map_err(from_sqlx)?,
            extra: row.try_get("extra").map_err(from_sqlx)?,
            total_items: row.try_get("total_items").map_err(from_sqlx)?,
        })
    }

    pub async fn pending_jobs(&self) -> Result<Vec<String>> {
        sqlx::query_scalar::<_, String>("SELECT id FROM jobs WHERE status = 'pending' ORDER BY created_at")
            .fetch_all(&self.pool)
            .await
            .map_err(from_sqlx)
    }

    pub async fn list_jobs_by_client(
        &self,
        client_id: &str,
        limit: i64,
        kind: Option<&str>,
    ) -> Result<Vec<Job>> {
        sqlx::query_as::<_, Job>(
            r#"
            SELECT * FROM jobs
            WHERE client_id = $1 AND ($2::text IS NULL OR kind = $2)
            ORDER BY created_at DESC
            LIMIT $3
            "#,
        )
        .bind(client_id)
        .bind(kind)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(from_sqlx)
    }

    /// `job_summary(job_id, client_id?)`. `client_id` is an
    /// optional ownership filter; callers (the HTTP handler) already checked
    /// ownership so they pass `None` here and rely on that earlier check.
    pub async fn job_summary(&self, job_id: &str) -> Result<JobSummary> {
        let row = sqlx::query(
            r#"
            SELECT
              count(*) FILTER (WHERE status = 'queued') AS queued,
              count(*) FILTER (WHERE status = 'sent')   AS sent,
              count(*) FILTER (WHERE status = 'ok')     AS ok,
              count(*) FILTER (WHERE status = 'error')  AS error
            FROM tasks
            WHERE job_id = $1
            "#,
        )
        .bind(job_id)
        .fetch_one(&self.pool)
        .await
        .map_err(from_sqlx)?;

        Ok(JobSummary {
            queued: row.try_get("queued").map_err(from_sqlx)?,
            sent: row.try_get("sent").map_err(from_sqlx)?,
            ok: row.try_get("ok").map_err(from_sqlx)?,
            error: row.try_get("error").map_err(from_sqlx)?,
        })
    }

    pub async fn list_queued_usernames(&self, job_id: &str) -> Result<Vec<String>> {
        sqlx::query_scalar::<_, String>(
            "SELECT username FROM tasks WHERE job_id = $1 AND status = 'queued' AND username IS NOT NULL",
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await
        .map_err(from_sqlx)
    }

    // ---- Tasks --------------------------------------------------------------

    /// `add_task`: idempotent upsert keyed by `task_id`. The
    /// `COALESCE` in the conflict clause means a later upsert never clobbers
    /// a non-null column with a null value.
    #[allow(clippy::too_many_arguments)]
    pub async fn add_task(
        &self,
        job_id: &str,
        task_id: &str,
        correlation_id: &str,
        account_id: Option<&str>,
        username: Option<&str>,
        payload: Option<Value>,
        client_id: &str,
        lease_ttl_secs: i32,
    ) -> Result<()> {
        if client_id.trim().is_empty() {
            return Err(Error::invalid("client_id is required"));
        }
        sqlx::query(
            r#"
            INSERT INTO tasks (job_id, task_id, correlation_id, account_id, username, payload, client_id, lease_ttl)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (task_id) DO UPDATE SET
              account_id = COALESCE(EXCLUDED.account_id, tasks.account_id),
              username   = COALESCE(EXCLUDED.username, tasks.username),
              payload    = COALESCE(EXCLUDED.payload, tasks.payload),
              updated_at = now()
            "#,
        )
        .bind(job_id)
        .bind(task_id)
        .bind(correlation_id)
        .bind(account_id)
        .bind(username)
        .bind(payload)
        .bind(client_id)
        .bind(lease_ttl_secs)
        .execute(&self.pool)
        .await
        .map_err(from_sqlx)?;
        Ok(())
    }

    /// `claim_task(job_id, task_id, account_id) -> bool`.
    pub async fn claim_task(&self, job_id: &str, task_id: &str, account_id: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET status = 'sent',
                account_id = $3,
                sent_at = now(),
                leased_at = now(),
                lease_expires_at = now() + (lease_ttl || ' seconds')::interval,
                leased_by = NULL,
                attempts = attempts + 1,
                updated_at = now()
            WHERE job_id = $1 AND task_id = $2 AND status = 'queued'
            "#,
        )
        .bind(job_id)
        .bind(task_id)
        .bind(account_id)
        .execute(&self.pool)
        .await
        .map_err(from_sqlx)?;
        Ok(result.rows_affected() == 1)
    }

    /// `lease_tasks(account_id, limit, client_id?) -> [Task]`.
    /// Grounded on the claim-CTE idiom in `trace-core/src/lite/pgqueue.rs`.
    pub async fn lease_tasks(
        &self,
        account_id: &str,
        limit: i64,
        client_id: Option<&str>,
    ) -> Result<Vec<Task>> {
        sqlx::query_as::<_, Task>(
            r#"
            WITH picked AS (
                SELECT row_id
                FROM tasks
                WHERE status = 'queued'
                  AND account_id = $1
                  AND ($3::text IS NULL OR client_id = $3)
                ORDER BY created_at
                LIMIT $2
                FOR UPDATE SKIP LOCKED
            )
            UPDATE tasks
            SET status = 'sent',
                sent_at = now(),
                leased_at = now(),
                lease_expires_at = now() + (lease_ttl || ' seconds')::interval,
                leased_by = NULL,
                attempts = attempts + 1,
                updated_at = now()
            FROM picked
            WHERE tasks.row_id = picked.row_id
            RETURNING tasks.*
            "#,
        )
        .bind(account_id)
        .bind(limit)
        .bind(client_id)
        .fetch_all(&self.pool)
        .await
        .map_err(from_sqlx)
    }

    /// `begin_task(job_id, task_id, account_id, leased_by) -> bool`.
    pub async fn begin_task(
        &self,
        job_id: &str,
        task_id: &str,
        account_id: &str,
        leased_by: &str,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET leased_by = $4, updated_at = now()
            WHERE job_id = $1
              AND task_id = $2
              AND status = 'sent'
              AND account_id = $3
              AND leased_by IS NULL
              AND lease_expires_at > now()
            "#,
        )
        .bind(job_id)
        .bind(task_id)
        .bind(account_id)
        .bind(leased_by)
        .execute(&self.pool)
        .await
        .map_err(from_sqlx)?;
        Ok(result.rows_affected() == 1)
    }

    pub async fn mark_task_ok(&self, job_id: &str, task_id: &str, _result: Option<Value>) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE tasks
            SET status = 'ok',
                leased_at = NULL,
                lease_expires_at = NULL,
                leased_by = NULL,
                finished_at = now(),
                updated_at = now()
            WHERE job_id = $1 AND task_id = $2
            "#,
        )
        .bind(job_id)
        .bind(task_id)
        .execute(&self.pool)
        .await
        .map_err(from_sqlx)?;
        Ok(())
    }

    pub async fn mark_task_error(&self, job_id: &str, task_id: &str, error: &str) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE tasks
            SET status = 'error',
                error_msg = $3,
                leased_at = NULL,
                lease_expires_at = NULL,
                leased_by = NULL,
                finished_at = now(),
                updated_at = now()
            WHERE job_id = $1 AND task_id = $2
            "#,
        )
        .bind(job_id)
        .bind(task_id)
        .bind(error)
        .execute(&self.pool)
        .await
        .map_err(from_sqlx)?;
        Ok(())
    }

    /// `release_task(job_id, task_id, error?)`.
    pub async fn release_task(&self, job_id: &str, task_id: &str, error: Option<&str>) -> Result<()> {
        match error {
            Some(msg) if !msg.is_empty() => self.mark_task_error(job_id, task_id, msg).await,
            _ => {
                sqlx::query(
                    r#"
                    UPDATE tasks
                    SET status = 'queued',
                        leased_at = NULL,
                        lease_expires_at = NULL,
                        leased_by = NULL,
                        updated_at = now()
                    WHERE job_id = $1 AND task_id = $2
                    "#,
                )
                .bind(job_id)
                .bind(task_id)
                .execute(&self.pool)
                .await
                .map_err(from_sqlx)?;
                Ok(())
            }
        }
    }

    /// `requeue_task_with_attempts_cap(job_id, task_id, max_attempts,
    /// final_error_msg) -> bool`. The attempts counter is
    /// incremented by `claim_task`/`lease_tasks`, never here.
    pub async fn requeue_task_with_attempts_cap(
        &self,
        job_id: &str,
        task_id: &str,
        max_attempts: i32,
        final_error_msg: &str,
    ) -> Result<bool> {
        let mut tx = self.pool.begin().await.map_err(from_sqlx)?;

        let row = sqlx::query("SELECT attempts FROM tasks WHERE job_id = $1 AND task_id = $2 AND status = 'sent' FOR UPDATE")
            .bind(job_id)
            .bind(task_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(from_sqlx)?;

        let Some(row) = row else {
            tx.commit().await.map_err(from_sqlx)?;
            return Ok(false);
        };
        let attempts: i32 = row.try_get("attempts").map_err(from_sqlx)?;

        if attempts < max_attempts {
            sqlx::query(
                r#"
                UPDATE tasks
                SET status = 'queued',
                    leased_at = NULL,
                    lease_expires_at = NULL,
                    leased_by = NULL,
                    updated_at = now()
                WHERE job_id = $1 AND task_id = $2
                "#,
            )
            .bind(job_id)
            .bind(task_id)
            .execute(&mut *tx)
            .await
            .map_err(from_sqlx)?;
            tx.commit().await.map_err(from_sqlx)?;
            Ok(true)
        } else {
            sqlx::query(
                r#"
                UPDATE tasks
                SET status = 'error',
                    error_msg = $3,
                    leased_at = NULL,
                    lease_expires_at = NULL,
                    leased_by = NULL,
                    finished_at = now(),
                    updated_at = now()
                WHERE job_id = $1 AND task_id = $2
                "#,
            )
            .bind(job_id)
            .bind(task_id)
            .bind(final_error_msg)
            .execute(&mut *tx)
            .await
            .map_err(from_sqlx)?;
            tx.commit().await.map_err(from_sqlx)?;
            Ok(false)
        }
    }

    /// `reclaim_expired_leases(max) -> int`. Does not touch
    /// `attempts`; the attempt was already counted at claim time.
    pub async fn reclaim_expired_leases(&self, max: i64) -> Result<i64> {
        let rows = sqlx::query(
            r#"
            WITH expired AS (
                SELECT row_id
                FROM tasks
                WHERE status = 'sent'
                  AND (
                    lease_expires_at < now()
                    OR (lease_expires_at IS NULL AND leased_at + (lease_ttl || ' seconds')::interval < now())
                  )
                LIMIT $1
                FOR UPDATE SKIP LOCKED
            )
            UPDATE tasks
            SET status = 'queued',
                leased_at = NULL,
                lease_expires_at = NULL,
                leased_by = NULL,
                updated_at = now()
            FROM expired
            WHERE tasks.row_id = expired.row_id
            "#,
        )
        .bind(max)
        .execute(&self.pool)
        .await
        .map_err(from_sqlx)?;
        Ok(rows.rows_affected() as i64)
    }

    pub async fn all_tasks_finished(&self, job_id: &str) -> Result<bool> {
        let row: Option<(i32,)> = sqlx::query_as(
            "SELECT 1 FROM tasks WHERE job_id = $1 AND status IN ('queued', 'sent') LIMIT 1",
        )
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(from_sqlx)?;
        Ok(row.is_none())
    }

    // ---- Advisory locks -----------------------------------------------------

    /// `try_advisory_lock(name, timeout_s) -> bool`. Only
    /// `timeout_s = 0` (non-blocking) is required by the Dispatcher and is
    /// all that's implemented; a blocking variant would need its own
    /// dedicated connection to avoid stalling the shared pool.
    pub async fn try_advisory_lock(&self, name: &str) -> Result<bool> {
        sqlx::query_scalar::<_, bool>("SELECT pg_try_advisory_lock(hashtext($1)::bigint)")
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .map_err(from_sqlx)
    }

    pub async fn release_advisory_lock(&self, name: &str) -> Result<()> {
        sqlx::query("SELECT pg_advisory_unlock(hashtext($1)::bigint)")
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(from_sqlx)?;
        Ok(())
    }

    // ---- Ledger ---------------------------------------------------------------

    pub async fn was_message_sent(&self, client_username: &str, dest_username: &str) -> Result<bool> {
        let row: Option<(i32,)> = sqlx::query_as(
            "SELECT 1 FROM message_sent_ledger WHERE client_username = $1 AND dest_username = $2",
        )
        .bind(client_username)
        .bind(dest_username)
        .fetch_optional(&self.pool)
        .await
        .map_err(from_sqlx)?;
        Ok(row.is_some())
    }

    /// Cross-account dedup lookup by destination username alone. Not
    /// consulted anywhere in the `/api/send/*` flow — see DESIGN.md.
    pub async fn was_message_sent_any(&self, dest_username: &str) -> Result<bool> {
        let row: Option<(i32,)> =
            sqlx::query_as("SELECT 1 FROM message_sent_ledger WHERE dest_username = $1 LIMIT 1")
                .bind(dest_username)
                .fetch_optional(&self.pool)
                .await
                .map_err(from_sqlx)?;
        Ok(row.is_some())
    }

    /// Supplemented from `job_store.py`'s `has_active_send_task`; not wired
    /// into any handler by default (see SPEC_FULL.md).
    pub async fn has_active_send_task(
        &self,
        client_username: &str,
        dest_username: &str,
        client_id: Option<&str>,
    ) -> Result<bool> {
        let row: Option<(i32,)> = sqlx::query_as(
            r#"
            SELECT 1 FROM tasks
            WHERE account_id = $1
              AND username = $2
              AND status IN ('queued', 'sent')
              AND ($3::text IS NULL OR client_id = $3)
            LIMIT 1
            "#,
        )
        .bind(client_username)
        .bind(dest_username)
        .bind(client_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(from_sqlx)?;
        Ok(row.is_some())
    }

    pub async fn register_message_sent(
        &self,
        client_username: &str,
        dest_username: &str,
        job_id: Option<&str>,
        task_id: Option<&str>,
        client_id: &str,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO message_sent_ledger (client_username, dest_username, job_id, task_id, client_id, last_sent_at)
            VALUES ($1, $2, $3, $4, $5, now())
            ON CONFLICT (client_username, dest_username) DO UPDATE SET
              job_id = EXCLUDED.job_id,
              task_id = EXCLUDED.task_id,
              client_id = EXCLUDED.client_id,
              last_sent_at = now()
            "#,
        )
        .bind(client_username)
        .bind(dest_username)
        .bind(job_id)
        .bind(task_id)
        .bind(client_id)
        .execute(&self.pool)
        .await
        .map_err(from_sqlx)?;
        Ok(())
    }

    pub async fn count_messages_sent_today(&self, client_id: &str) -> Result<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT count(*) FROM message_sent_ledger WHERE client_id = $1 AND last_sent_at >= date_trunc('day', now())",
        )
        .bind(client_id)
        .fetch_one(&self.pool)
        .await
        .map_err(from_sqlx)
    }

    pub async fn count_tasks_sent_today(&self, client_id: &str) -> Result<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT count(*) FROM tasks WHERE client_id = $1 AND status = 'sent' AND sent_at >= date_trunc('day', now())",
        )
        .bind(client_id)
        .fetch_one(&self.pool)
        .await
        .map_err(from_sqlx)
    }

    // ---- Followings -------------------------------------------------------------

    pub async fn upsert_followings(&self, origin: &str, targets: &[String]) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(from_sqlx)?;
        for target in targets {
            sqlx::query(
                r#"
                INSERT INTO followings (origin_username, target_username)
                VALUES ($1, $2)
                ON CONFLICT (origin_username, target_username) DO UPDATE SET created_at = followings.created_at
                "#,
            )
            .bind(origin)
            .bind(target)
            .execute(&mut *tx)
            .await
            .map_err(from_sqlx)?;
        }
        tx.commit().await.map_err(from_sqlx)?;
        Ok(())
    }

    pub async fn get_followings_for_owner(&self, owner: &str, limit: i64) -> Result<Vec<String>> {
        sqlx::query_scalar::<_, String>(
            "SELECT target_username FROM followings WHERE origin_username = $1 ORDER BY created_at DESC LIMIT $2",
        )
        .bind(owner)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(from_sqlx)
    }

    // ---- Maintenance -------------------------------------------------------------

    pub async fn cleanup_stale_tasks(&self, older_than_days: i32, batch: i64) -> Result<i64> {
        let result = sqlx::query(
            r#"
            WITH victims AS (
                SELECT row_id FROM tasks
                WHERE status = 'queued' AND created_at < now() - (($1 || ' days')::interval)
                LIMIT $2
            )
            DELETE FROM tasks WHERE row_id IN (SELECT row_id FROM victims)
            "#,
        )
        .bind(older_than_days)
        .bind(batch)
        .execute(&self.pool)
        .await
        .map_err(from_sqlx)?;
        Ok(result.rows_affected() as i64)
    }

    pub async fn cleanup_finished_tasks(&self, older_than_days: i32, batch: i64) -> Result<i64> {
        let result = sqlx::query(
            r#"
            WITH victims AS (
                SELECT row_id FROM tasks
                WHERE status IN ('ok', 'error')
                  AND finished_at < now() - (($1 || ' days')::interval)
                LIMIT $2
            )
            DELETE FROM tasks WHERE row_id IN (SELECT row_id FROM victims)
            "#,
        )
        .bind(older_than_days)
        .bind(batch)
        .execute(&self.pool)
        .await
        .map_err(from_sqlx)?;
        Ok(result.rows_affected() as i64)
    }

    pub async fn cleanup_orphaned_jobs(&self, older_than_days: i32) -> Result<i64> {
        let result = sqlx::query(
            r#"
            DELETE FROM jobs
            WHERE created_at < now() - (($1 || ' days')::interval)
              AND NOT EXISTS (SELECT 1 FROM tasks WHERE tasks.job_id = jobs.id)
            "#,
        )
        .bind(older_than_days)
        .execute(&self.pool)
        .await
        .map_err(from_sqlx)?;
        Ok(result.rows_affected() as i64)
    }
}

pub fn now() -> DateTime<Utc> {
    Utc::now()
}
