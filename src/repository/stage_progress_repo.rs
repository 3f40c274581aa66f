// ==========================================
// SkillFlow Ledger - stage progress repository
// ==========================================
// Table: stage_progress (one row per batch and stage, upserted)
// ==========================================

use crate::domain::batch::StageProgress;
use crate::domain::types::PipelineStage;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row_codec::{format_ts, now_ts, parse_enum, parse_ts};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

pub struct StageProgressRepository {
    conn: Arc<Mutex<Connection>>,
}

impl StageProgressRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Set the completed count of one stage for one batch
    pub fn upsert(
        &self,
        batch_id: &str,
        stage: PipelineStage,
        completed: i64,
    ) -> RepositoryResult<StageProgress> {
        let conn = self.get_conn()?;
        let now = now_ts();
        conn.execute(
            r#"
            INSERT INTO stage_progress (batch_id, stage, completed, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(batch_id, stage) DO UPDATE SET
                completed = excluded.completed,
                updated_at = excluded.updated_at
            "#,
            params![batch_id, stage.to_db_str(), completed, format_ts(&now)],
        )?;

        Ok(StageProgress {
            batch_id: batch_id.to_string(),
            stage,
            completed,
            updated_at: now,
        })
    }

    /// Progress rows for every live batch of a contract
    pub fn list_by_contract(&self, contract_id: &str) -> RepositoryResult<Vec<StageProgress>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT sp.batch_id, sp.stage, sp.completed, sp.updated_at
            FROM stage_progress sp
            JOIN batch b ON b.batch_id = sp.batch_id
            WHERE b.contract_id = ?1 AND b.is_deleted = 0
            ORDER BY sp.batch_id, sp.stage
            "#,
        )?;
        let rows = stmt
            .query_map(params![contract_id], |row| {
                let stage: String = row.get(1)?;
                let updated_at: String = row.get(3)?;
                Ok(StageProgress {
                    batch_id: row.get(0)?,
                    stage: parse_enum(1, &stage, PipelineStage::from_db_str)?,
                    completed: row.get(2)?,
                    updated_at: parse_ts(3, &updated_at)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}
