use rusqlite::{Connection, Statement};

use crate::error::{AppError, AppResult};

pub fn prepare_readonly<'c>(conn: &'c Connection, sql: &str) -> AppResult<Statement<'c>> {
    let stmt = conn.prepare(sql)?;
    if !stmt.readonly() {
        return Err(AppError::QueryExecution(format!(
            "statement is not read-only: {sql}"
        )));
    }
    Ok(stmt)
}
