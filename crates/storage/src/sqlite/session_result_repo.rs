use train_core::model::{ExerciseKind, ResultId, SessionResult};

use super::SqliteRepository;
use super::mapping::{map_result_row, map_result_row_with_id};
use crate::repository::{SessionResultRepository, SessionResultRow, StorageError};

fn conn(e: sqlx::Error) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait::async_trait]
impl SessionResultRepository for SqliteRepository {
    async fn append_result(&self, result: &SessionResult) -> Result<ResultId, StorageError> {
        let res = sqlx::query(
            r"
                INSERT INTO session_results (exercise, level, score, stars, completed_at)
                VALUES (?1, ?2, ?3, ?4, ?5)
            ",
        )
        .bind(result.exercise().code())
        .bind(i64::from(result.level()))
        .bind(i64::from(result.score().value()))
        .bind(i64::from(result.stars().value()))
        .bind(result.completed_at())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(ResultId::new(res.last_insert_rowid()))
    }

    async fn get_result(&self, id: ResultId) -> Result<SessionResult, StorageError> {
        let row = sqlx::query(
            r"
                SELECT exercise, level, score, stars, completed_at
                FROM session_results
                WHERE id = ?1
            ",
        )
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?
        .ok_or(StorageError::NotFound)?;

        map_result_row(&row)
    }

    async fn list_result_rows(
        &self,
        exercise: Option<ExerciseKind>,
        limit: u32,
    ) -> Result<Vec<SessionResultRow>, StorageError> {
        let mut sql = String::from(
            r"
                SELECT id, exercise, level, score, stars, completed_at
                FROM session_results
            ",
        );
        if exercise.is_some() {
            sql.push_str(" WHERE exercise = ?1");
            sql.push_str(" ORDER BY completed_at DESC, id DESC LIMIT ?2");
        } else {
            sql.push_str(" ORDER BY completed_at DESC, id DESC LIMIT ?1");
        }

        let mut query = sqlx::query(&sql);
        if let Some(kind) = exercise {
            query = query.bind(kind.code());
        }
        query = query.bind(i64::from(limit));

        let rows = query.fetch_all(&self.pool).await.map_err(conn)?;
        rows.iter().map(map_result_row_with_id).collect()
    }

    async fn load_history(&self) -> Result<Vec<SessionResult>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT exercise, level, score, stars, completed_at
                FROM session_results
                ORDER BY id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_result_row).collect()
    }
}
