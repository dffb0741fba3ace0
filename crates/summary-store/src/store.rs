//! Durable Summary Store (C5): one row per video plus an append-only
//! version log, with tolerant basename-suffix lookup to survive mount-root
//! relocation.

use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use summary_models::{Summary, SummaryStatus, SummaryVersion};
use std::str::FromStr;
use tracing::info;

use crate::error::{StoreError, StoreResult};
use crate::schema::{SummaryRow, SummaryVersionRow};

/// Outcome of an admission attempt against `Start`.
pub enum AdmissionOutcome {
    Created { summary_id: i64 },
    Rejected { reason: &'static str, existing: Summary },
}

#[derive(Debug, Default)]
pub struct CompletionUpdate {
    pub summary: String,
    pub transcript: String,
    pub model_used: String,
    pub audio_duration_seconds: Option<f64>,
    pub processing_time_seconds: f64,
}

#[derive(Debug, Clone)]
pub struct VersionDescriptor {
    pub version: i64,
    pub generated_at: chrono::DateTime<Utc>,
    pub model_used: Option<String>,
    pub processing_time_seconds: Option<f64>,
}

#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct StoreStats {
    pub total: i64,
    pub completed: i64,
    pub failed: i64,
    pub no_audio: i64,
    pub pending: i64,
    pub processing: i64,
    pub total_processing_time_seconds: f64,
    pub average_processing_time_seconds: f64,
}

#[derive(Clone)]
pub struct SummaryStore {
    pool: SqlitePool,
}

impl SummaryStore {
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        // SQLite allows one writer at a time; a single pooled connection
        // also keeps in-memory databases (tests, `sqlite::memory:`) from
        // fragmenting across connections.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("summary store connected to {database_url}");
        Ok(Self { pool })
    }

    pub async fn from_env() -> StoreResult<Self> {
        let url = std::env::var("SUMMARY_DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://summary.db".to_string());
        Self::connect(&url).await
    }

    /// Evaluate and apply the admission rules for `Start` inside one
    /// transaction on the Summary row for `video_path`.
    pub async fn admit(&self, video_path: &str, force: bool) -> StoreResult<AdmissionOutcome> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        let existing = fetch_tolerant(&mut tx, video_path).await?;

        let outcome = match existing {
            None => {
                let id = sqlx::query(
                    "INSERT INTO summaries (video_path, status, generated_at) VALUES (?1, 'pending', ?2)",
                )
                .bind(video_path)
                .bind(now)
                .execute(&mut *tx)
                .await?
                .last_insert_rowid();
                AdmissionOutcome::Created { summary_id: id }
            }
            Some(row) => {
                let summary: Summary = row.into();
                if summary.status == SummaryStatus::Completed && !force {
                    AdmissionOutcome::Rejected {
                        reason: "already exists",
                        existing: summary,
                    }
                } else if matches!(summary.status, SummaryStatus::Pending | SummaryStatus::Processing)
                    && !force
                {
                    AdmissionOutcome::Rejected {
                        reason: "already in progress",
                        existing: summary,
                    }
                } else {
                    sqlx::query(
                        "UPDATE summaries SET status = 'pending', error_message = NULL, generated_at = ?1 WHERE id = ?2",
                    )
                    .bind(now)
                    .bind(summary.id)
                    .execute(&mut *tx)
                    .await?;
                    AdmissionOutcome::Created {
                        summary_id: summary.id,
                    }
                }
            }
        };

        tx.commit().await?;
        Ok(outcome)
    }

    /// Tolerant lookup of the latest Summary plus its version descriptors.
    pub async fn get_latest(
        &self,
        video_path: &str,
    ) -> StoreResult<Option<(Summary, Vec<VersionDescriptor>)>> {
        let mut conn = self.pool.acquire().await?;
        let row = match fetch_tolerant(&mut conn, video_path).await? {
            Some(r) => r,
            None => return Ok(None),
        };
        let canonical_path = row.video_path.clone();
        let summary: Summary = row.into();

        let versions = sqlx::query_as::<_, SummaryVersionRow>(
            "SELECT video_path, version, summary, transcript, model_used, processing_time_seconds, generated_at \
             FROM summary_versions WHERE video_path = ?1 ORDER BY version ASC",
        )
        .bind(&canonical_path)
        .fetch_all(&mut *conn)
        .await?
        .into_iter()
        .map(|r| VersionDescriptor {
            version: r.version,
            generated_at: r.generated_at,
            model_used: r.model_used,
            processing_time_seconds: r.processing_time_seconds,
        })
        .collect();

        Ok(Some((summary, versions)))
    }

    /// Tolerant lookup of one specific version's full body.
    pub async fn get_version(
        &self,
        video_path: &str,
        version: i64,
    ) -> StoreResult<Option<SummaryVersion>> {
        let mut conn = self.pool.acquire().await?;
        let row = match fetch_tolerant(&mut conn, video_path).await? {
            Some(r) => r,
            None => return Ok(None),
        };

        let version_row = sqlx::query_as::<_, SummaryVersionRow>(
            "SELECT video_path, version, summary, transcript, model_used, processing_time_seconds, generated_at \
             FROM summary_versions WHERE video_path = ?1 AND version = ?2",
        )
        .bind(&row.video_path)
        .bind(version)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(version_row.map(Into::into))
    }

    pub async fn list_versions(&self, video_path: &str) -> StoreResult<Vec<VersionDescriptor>> {
        Ok(self
            .get_latest(video_path)
            .await?
            .map(|(_, versions)| versions)
            .unwrap_or_default())
    }

    /// Remove the Summary and all its versions. Returns `true` if a row
    /// existed.
    pub async fn delete(&self, video_path: &str) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;
        let row = match fetch_tolerant(&mut tx, video_path).await? {
            Some(r) => r,
            None => return Ok(false),
        };
        sqlx::query("DELETE FROM summary_versions WHERE video_path = ?1")
            .bind(&row.video_path)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM summaries WHERE id = ?1")
            .bind(row.id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(true)
    }

    /// Persist a successful pipeline run: update the Summary row and append
    /// exactly one new SummaryVersion with `version = max(version) + 1`.
    pub async fn persist_completion(
        &self,
        summary_id: i64,
        update: CompletionUpdate,
    ) -> StoreResult<i64> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        let row = sqlx::query("SELECT video_path FROM summaries WHERE id = ?1")
            .bind(summary_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(StoreError::NotFound)?;
        let video_path: String = row.try_get("video_path")?;

        sqlx::query(
            "UPDATE summaries SET status = 'completed', summary = ?1, transcript = ?2, \
             model_used = ?3, audio_duration_seconds = ?4, processing_time_seconds = ?5, \
             error_message = NULL, generated_at = ?6 WHERE id = ?7",
        )
        .bind(&update.summary)
        .bind(&update.transcript)
        .bind(&update.model_used)
        .bind(update.audio_duration_seconds)
        .bind(update.processing_time_seconds)
        .bind(now)
        .bind(summary_id)
        .execute(&mut *tx)
        .await?;

        let current_max: Option<i64> =
            sqlx::query_scalar("SELECT MAX(version) FROM summary_versions WHERE video_path = ?1")
                .bind(&video_path)
                .fetch_one(&mut *tx)
                .await?;
        let next_version = current_max.unwrap_or(0) + 1;

        sqlx::query(
            "INSERT INTO summary_versions (video_path, version, summary, transcript, model_used, processing_time_seconds, generated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(&video_path)
        .bind(next_version)
        .bind(&update.summary)
        .bind(&update.transcript)
        .bind(&update.model_used)
        .bind(update.processing_time_seconds)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(next_version)
    }

    /// Transition a Summary to `processing` at the start of a pipeline run.
    pub async fn mark_processing(&self, summary_id: i64) -> StoreResult<()> {
        sqlx::query(
            "UPDATE summaries SET status = 'processing', generated_at = ?1 WHERE id = ?2",
        )
        .bind(Utc::now())
        .bind(summary_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Mark a Summary `failed`, with no new version appended.
    pub async fn mark_failed(&self, summary_id: i64, error_message: &str) -> StoreResult<()> {
        self.mark_terminal(summary_id, "failed", error_message).await
    }

    /// Mark a Summary `no_audio`, with no new version appended.
    pub async fn mark_no_audio(&self, summary_id: i64, error_message: &str) -> StoreResult<()> {
        self.mark_terminal(summary_id, "no_audio", error_message).await
    }

    async fn mark_terminal(&self, summary_id: i64, status: &str, error_message: &str) -> StoreResult<()> {
        sqlx::query(
            "UPDATE summaries SET status = ?1, error_message = ?2, generated_at = ?3 WHERE id = ?4",
        )
        .bind(status)
        .bind(error_message)
        .bind(Utc::now())
        .bind(summary_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn stats(&self) -> StoreResult<StoreStats> {
        let rows = sqlx::query("SELECT status, processing_time_seconds FROM summaries")
            .fetch_all(&self.pool)
            .await?;

        let mut stats = StoreStats::default();
        let mut total_time = 0.0;
        let mut completed_with_time = 0i64;

        for row in rows {
            stats.total += 1;
            let status: String = row.try_get("status")?;
            match status.as_str() {
                "completed" => {
                    stats.completed += 1;
                    if let Ok(Some(t)) = row.try_get::<Option<f64>, _>("processing_time_seconds") {
                        total_time += t;
                        completed_with_time += 1;
                    }
                }
                "failed" => stats.failed += 1,
                "no_audio" => stats.no_audio += 1,
                "processing" => stats.processing += 1,
                _ => stats.pending += 1,
            }
        }

        stats.total_processing_time_seconds = total_time;
        stats.average_processing_time_seconds = if completed_with_time > 0 {
            total_time / completed_with_time as f64
        } else {
            0.0
        };

        Ok(stats)
    }
}

/// Resolve `video_path` against the Summary table: exact match first, then
/// a suffix match against the final path component (`…/<basename>` or
/// `…\<basename>`), to survive a relocated mount root.
async fn fetch_tolerant<'c, E>(executor: E, video_path: &str) -> StoreResult<Option<SummaryRow>>
where
    E: sqlx::Executor<'c, Database = sqlx::Sqlite>,
{
    let basename = video_path
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(video_path);
    let slash_pattern = format!("%/{basename}");
    let backslash_pattern = format!("%\\{basename}");

    let row = sqlx::query_as::<_, SummaryRow>(
        "SELECT id, video_path, status, summary, transcript, model_used, audio_duration_seconds, \
         processing_time_seconds, error_message, generated_at FROM summaries \
         WHERE video_path = ?1 OR video_path LIKE ?2 OR video_path LIKE ?3 \
         ORDER BY (video_path = ?1) DESC LIMIT 1",
    )
    .bind(video_path)
    .bind(&slash_pattern)
    .bind(&backslash_pattern)
    .fetch_optional(executor)
    .await?;

    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_store() -> SummaryStore {
        SummaryStore::connect("sqlite::memory:").await.unwrap()
    }

    #[tokio::test]
    async fn admit_creates_a_fresh_pending_summary() {
        let store = memory_store().await;
        match store.admit("/lib/a.mp4", false).await.unwrap() {
            AdmissionOutcome::Created { summary_id } => assert!(summary_id > 0),
            AdmissionOutcome::Rejected { .. } => panic!("expected creation"),
        }
    }

    #[tokio::test]
    async fn duplicate_completed_admission_is_rejected_without_force() {
        let store = memory_store().await;
        let summary_id = match store.admit("/lib/a.mp4", false).await.unwrap() {
            AdmissionOutcome::Created { summary_id } => summary_id,
            _ => unreachable!(),
        };
        store
            .persist_completion(
                summary_id,
                CompletionUpdate {
                    summary: "• done".to_string(),
                    transcript: "hello".to_string(),
                    model_used: "whisper-base+llama3:13b".to_string(),
                    audio_duration_seconds: Some(10.0),
                    processing_time_seconds: 1.5,
                },
            )
            .await
            .unwrap();

        match store.admit("/lib/a.mp4", false).await.unwrap() {
            AdmissionOutcome::Rejected { reason, .. } => assert_eq!(reason, "already exists"),
            AdmissionOutcome::Created { .. } => panic!("expected rejection"),
        }
    }

    #[tokio::test]
    async fn forced_admission_after_completion_bumps_version_on_next_completion() {
        let store = memory_store().await;
        let summary_id = match store.admit("/lib/a.mp4", false).await.unwrap() {
            AdmissionOutcome::Created { summary_id } => summary_id,
            _ => unreachable!(),
        };
        let completion = || CompletionUpdate {
            summary: "• done".to_string(),
            transcript: "hello".to_string(),
            model_used: "whisper-base+llama3:13b".to_string(),
            audio_duration_seconds: Some(10.0),
            processing_time_seconds: 1.5,
        };
        store.persist_completion(summary_id, completion()).await.unwrap();

        match store.admit("/lib/a.mp4", true).await.unwrap() {
            AdmissionOutcome::Created { summary_id: id2 } => {
                let version = store.persist_completion(id2, completion()).await.unwrap();
                assert_eq!(version, 2);
            }
            AdmissionOutcome::Rejected { .. } => panic!("force should bypass rejection"),
        }

        let versions = store.list_versions("/lib/a.mp4").await.unwrap();
        assert_eq!(versions.iter().map(|v| v.version).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[tokio::test]
    async fn tolerant_lookup_matches_on_relocated_mount_root() {
        let store = memory_store().await;
        store.admit("/old-mount/videos/clip.mp4", false).await.unwrap();

        let found = store
            .get_latest("/new-mount/library/videos/clip.mp4")
            .await
            .unwrap();
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn mark_processing_transitions_a_pending_summary() {
        let store = memory_store().await;
        let summary_id = match store.admit("/lib/a.mp4", false).await.unwrap() {
            AdmissionOutcome::Created { summary_id } => summary_id,
            _ => unreachable!(),
        };

        store.mark_processing(summary_id).await.unwrap();

        let (summary, _) = store.get_latest("/lib/a.mp4").await.unwrap().unwrap();
        assert_eq!(summary.status, SummaryStatus::Processing);
    }

    #[tokio::test]
    async fn no_audio_outcome_creates_no_version() {
        let store = memory_store().await;
        let summary_id = match store.admit("/lib/mute.mp4", false).await.unwrap() {
            AdmissionOutcome::Created { summary_id } => summary_id,
            _ => unreachable!(),
        };
        store
            .mark_no_audio(summary_id, "video has no audio track")
            .await
            .unwrap();

        let (summary, versions) = store.get_latest("/lib/mute.mp4").await.unwrap().unwrap();
        assert_eq!(summary.status, SummaryStatus::NoAudio);
        assert!(versions.is_empty());
    }
}
