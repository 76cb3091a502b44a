use rusqlite::{params_from_iter, Connection};

use crate::core::{
    builder::{build_count_query, build_data_query, BuiltQuery},
    pagination::PageRequest,
    readonly::prepare_readonly,
    schema,
    types::{ColumnDescriptor, FilterSpec, QueryResult, Value},
};
use crate::error::AppResult;

pub fn fetch_page(conn: &Connection, query: &BuiltQuery) -> AppResult<QueryResult> {
    let mut stmt = prepare_readonly(conn, &query.sql)?;
    let columns: Vec<String> = stmt.column_names().iter().map(|s| s.to_string()).collect();
    let width = columns.len();

    let mut rows = Vec::new();
    let mut r = stmt.query(params_from_iter(query.params.iter()))?;
    while let Some(row) = r.next()? {
        let mut cells = Vec::with_capacity(width);
        for i in 0..width {
            cells.push(Value::from(row.get_ref(i)?));
        }
        rows.push(cells);
    }

    Ok(QueryResult { columns, rows })
}

pub fn fetch_count(conn: &Connection, query: &BuiltQuery) -> AppResult<u64> {
    let mut stmt = prepare_readonly(conn, &query.sql)?;
    let n: i64 = stmt.query_row(params_from_iter(query.params.iter()), |r| r.get(0))?;
    Ok(n.max(0) as u64)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageJob {
    pub table: String,
    pub filter: FilterSpec,
    pub page: PageRequest,
}

impl PageJob {
    fn columns(&self, conn: &Connection) -> AppResult<Vec<ColumnDescriptor>> {
        if self.filter.needs_columns() {
            schema::columns_of(conn, &self.table)
        } else {
            Ok(Vec::new())
        }
    }

    pub fn load_rows(&self, conn: &Connection) -> AppResult<QueryResult> {
        let columns = self.columns(conn)?;
        let q = build_data_query(&self.table, &columns, &self.filter, self.page);
        tracing::debug!(sql = %q.sql, params = q.params.len(), "fetching page");
        fetch_page(conn, &q)
    }

    pub fn load_count(&self, conn: &Connection) -> AppResult<u64> {
        let columns = self.columns(conn)?;
        let q = build_count_query(&self.table, &columns, &self.filter);
        tracing::debug!(sql = %q.sql, params = q.params.len(), "counting rows");
        fetch_count(conn, &q)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        pagination::PageRequest,
        test_support::{fixture_db, numbered_db},
        types::FilterTarget,
    };

    fn job(table: &str, filter: FilterSpec, offset: u64, limit: u64) -> PageJob {
        PageJob {
            table: table.into(),
            filter,
            page: PageRequest::new(offset, limit),
        }
    }

    #[test]
    fn page_carries_column_names_and_typed_cells() {
        let (_dir, conn) = fixture_db();
        let res = job("users", FilterSpec::default(), 0, 10).load_rows(&conn).unwrap();
        assert_eq!(res.columns, vec!["id", "name", "email", "age"]);
        assert_eq!(res.rows.len(), 5);
        assert_eq!(
            res.rows[2],
            vec![
                Value::Integer(3),
                Value::Text("carol".into()),
                Value::Null,
                Value::Integer(41)
            ]
        );
        assert!(res.rows.iter().all(|r| r.len() == res.columns.len()));
    }

    #[test]
    fn users_in_pages_of_two() {
        let (_dir, conn) = fixture_db();
        let f = FilterSpec::default();
        let mut page = PageRequest::new(0, 2);
        let mut seen = Vec::new();
        loop {
            let j = PageJob {
                table: "users".into(),
                filter: f.clone(),
                page,
            };
            let rows = j.load_rows(&conn).unwrap();
            let info = page.derive(j.load_count(&conn).unwrap());
            seen.push(
                rows.rows
                    .iter()
                    .map(|r| r[0].clone())
                    .collect::<Vec<_>>(),
            );
            if !info.has_next {
                assert_eq!(info.current_page, 3);
                break;
            }
            page = page.advance();
        }
        assert_eq!(
            seen,
            vec![
                vec![Value::Integer(1), Value::Integer(2)],
                vec![Value::Integer(3), Value::Integer(4)],
                vec![Value::Integer(5)],
            ]
        );
    }

    #[test]
    fn paging_visits_every_row_once() {
        let (_dir, conn) = numbered_db(47);
        let limit = 10;
        let mut page = PageRequest::new(0, limit);
        let total = job("numbers", FilterSpec::default(), 0, limit)
            .load_count(&conn)
            .unwrap();
        assert_eq!(total, 47);

        let mut seen = Vec::new();
        for _ in 0..total.div_ceil(limit) {
            let rows = job("numbers", FilterSpec::default(), page.offset, limit)
                .load_rows(&conn)
                .unwrap();
            seen.extend(rows.rows.into_iter().map(|r| r[0].clone()));
            page = page.advance();
        }
        let expected: Vec<Value> = (1..=47).map(Value::Integer).collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn count_matches_filtered_rows() {
        let (_dir, conn) = fixture_db();
        let filters = [
            FilterSpec::new("example", FilterTarget::AllColumns),
            FilterSpec::new("a", FilterTarget::Column("name".into())),
            FilterSpec::new("3", FilterTarget::Column("age".into())),
        ];
        for f in filters {
            let j = job("users", f, 0, 100);
            let rows = j.load_rows(&conn).unwrap();
            assert_eq!(j.load_count(&conn).unwrap(), rows.rows.len() as u64);
        }
    }

    #[test]
    fn all_columns_search_matches_any_text_column() {
        let (_dir, conn) = fixture_db();
        let j = job("users", FilterSpec::new("sample", FilterTarget::AllColumns), 0, 100);
        let rows = j.load_rows(&conn).unwrap();
        assert_eq!(rows.rows.len(), 1);
        assert_eq!(rows.rows[0][1], Value::Text("dave".into()));
    }

    #[test]
    fn all_columns_search_on_numeric_table_returns_everything() {
        let (_dir, conn) = fixture_db();
        let j = job("measurements", FilterSpec::new("zzz", FilterTarget::AllColumns), 0, 100);
        assert_eq!(j.load_rows(&conn).unwrap().rows.len(), 3);
        assert_eq!(j.load_count(&conn).unwrap(), 3);
    }

    #[test]
    fn unknown_column_is_a_query_error() {
        let (_dir, conn) = fixture_db();
        let j = job("users", FilterSpec::new("x", FilterTarget::Column("gone".into())), 0, 10);
        assert_eq!(j.load_rows(&conn).unwrap_err().code(), "QUERY_EXECUTION_ERROR");
        assert_eq!(j.load_count(&conn).unwrap_err().code(), "QUERY_EXECUTION_ERROR");
    }

    #[test]
    fn page_past_the_end_is_empty() {
        let (_dir, conn) = fixture_db();
        let rows = job("users", FilterSpec::default(), 100, 10).load_rows(&conn).unwrap();
        assert!(rows.rows.is_empty());
        assert_eq!(rows.columns.len(), 4);
    }
}
