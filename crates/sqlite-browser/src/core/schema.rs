use rusqlite::{Connection, Row};

use crate::core::types::{ColumnDescriptor, TableDescriptor};
use crate::error::{AppError, AppResult};

pub fn list_tables(conn: &Connection) -> AppResult<Vec<TableDescriptor>> {
    let mut stmt = conn
        .prepare(
            r"SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite\_%' ESCAPE '\' ORDER BY name",
        )
        .map_err(AppError::schema)?;
    let names = stmt
        .query_map([], |r| r.get::<_, String>(0))
        .and_then(|rows| rows.collect::<Result<Vec<_>, _>>())
        .map_err(AppError::schema)?;

    names
        .into_iter()
        .map(|name| {
            let columns = columns_of(conn, &name)?;
            Ok(TableDescriptor { name, columns })
        })
        .collect()
}

pub fn columns_of(conn: &Connection, table: &str) -> AppResult<Vec<ColumnDescriptor>> {
    let mut stmt = conn
        .prepare(r#"SELECT name, type, "notnull", pk FROM pragma_table_info(?1) ORDER BY cid"#)
        .map_err(AppError::schema)?;
    let cols = stmt
        .query_map([table], |row: &Row<'_>| {
            let not_null: i64 = row.get(2)?;
            let pk: i64 = row.get(3)?;
            Ok(ColumnDescriptor {
                name: row.get(0)?,
                decl_type: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                nullable: not_null == 0,
                primary_key: pk > 0,
            })
        })
        .and_then(|rows| rows.collect::<Result<Vec<_>, _>>())
        .map_err(AppError::schema)?;

    if cols.is_empty() {
        return Err(AppError::SchemaRead(format!("no such table: {table}")));
    }
    Ok(cols)
}

pub fn schema_sql(conn: &Connection) -> AppResult<String> {
    let mut stmt = conn
        .prepare("SELECT sql FROM sqlite_master WHERE sql IS NOT NULL ORDER BY type, name")
        .map_err(AppError::schema)?;
    let statements = stmt
        .query_map([], |r| r.get::<_, String>(0))
        .and_then(|rows| rows.collect::<Result<Vec<_>, _>>())
        .map_err(AppError::schema)?;

    let mut out = String::from("-- Database Schema\n\n");
    for sql in statements {
        out.push_str(&sql);
        out.push_str(";\n\n");
    }
    Ok(out)
}

pub(crate) fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_support::fixture_db;

    #[test]
    fn tables_are_sorted_and_skip_internal_ones() {
        let (_dir, conn) = fixture_db();
        let tables = list_tables(&conn).unwrap();
        let names: Vec<_> = tables.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["measurements", "users"]);
    }

    #[test]
    fn tables_resembling_internal_names_are_listed() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE sqlitebrowser_cache (k TEXT);
             CREATE TABLE sqlite1 (x INTEGER);
             CREATE TABLE a (id INTEGER PRIMARY KEY AUTOINCREMENT);
             INSERT INTO a DEFAULT VALUES;",
        )
        .unwrap();
        let names: Vec<_> = list_tables(&conn).unwrap().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["a", "sqlite1", "sqlitebrowser_cache"]);
    }

    #[test]
    fn columns_keep_declared_order_and_flags() {
        let (_dir, conn) = fixture_db();
        let cols = columns_of(&conn, "users").unwrap();
        let names: Vec<_> = cols.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "name", "email", "age"]);

        assert!(cols[0].primary_key);
        assert_eq!(cols[0].decl_type, "INTEGER");
        assert!(!cols[1].nullable);
        assert!(cols[2].nullable);
        assert!(!cols[2].primary_key);
    }

    #[test]
    fn missing_table_is_a_schema_error() {
        let (_dir, conn) = fixture_db();
        let err = columns_of(&conn, "nope").unwrap_err();
        assert_eq!(err.code(), "SCHEMA_READ_ERROR");
    }

    #[test]
    fn garbage_file_is_a_schema_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("not-a-db.sqlite");
        std::fs::write(&path, "not a database\n".repeat(128)).unwrap();
        let conn = Connection::open(&path).unwrap();
        let err = list_tables(&conn).unwrap_err();
        assert_eq!(err.code(), "SCHEMA_READ_ERROR");
    }

    #[test]
    fn schema_sql_lists_create_statements() {
        let (_dir, conn) = fixture_db();
        let text = schema_sql(&conn).unwrap();
        assert!(text.starts_with("-- Database Schema\n\n"));
        assert!(text.contains("CREATE TABLE users"));
        assert!(text.contains("CREATE TABLE measurements"));
        assert!(text.ends_with(";\n\n"));
    }

    #[test]
    fn identifiers_are_quoted() {
        assert_eq!(quote_identifier("users"), "\"users\"");
        assert_eq!(quote_identifier("odd \"name\""), "\"odd \"\"name\"\"\"");
    }
}
