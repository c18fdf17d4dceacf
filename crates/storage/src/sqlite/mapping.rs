use sqlx::Row;
use train_core::model::{ExerciseKind, ResultId, Score, SessionResult, Stars};

use crate::repository::{SessionResultRow, StorageError};

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn u8_from_i64(field: &'static str, v: i64) -> Result<u8, StorageError> {
    u8::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn map_result_row(row: &sqlx::sqlite::SqliteRow) -> Result<SessionResult, StorageError> {
    let code: String = row.try_get("exercise").map_err(ser)?;
    let exercise: ExerciseKind = code.parse().map_err(ser)?;
    let level = u8_from_i64("level", row.try_get::<i64, _>("level").map_err(ser)?)?;
    let score = Score::new(u8_from_i64("score", row.try_get::<i64, _>("score").map_err(ser)?)?)
        .map_err(ser)?;
    let stars = Stars::new(u8_from_i64("stars", row.try_get::<i64, _>("stars").map_err(ser)?)?)
        .map_err(ser)?;
    let completed_at = row.try_get("completed_at").map_err(ser)?;

    SessionResult::new(exercise, level, score, stars, completed_at).map_err(ser)
}

pub(crate) fn map_result_row_with_id(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<SessionResultRow, StorageError> {
    let id: i64 = row.try_get("id").map_err(ser)?;
    let result = map_result_row(row)?;
    Ok(SessionResultRow::new(ResultId::new(id), result))
}
