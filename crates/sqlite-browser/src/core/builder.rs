use crate::core::{
    pagination::PageRequest,
    schema::quote_identifier,
    types::{ColumnDescriptor, FilterSpec, FilterTarget},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltQuery {
    pub sql: String,
    pub params: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Predicate {
    pub clause: Option<String>,
    pub params: Vec<String>,
}

pub fn build_predicate(columns: &[ColumnDescriptor], filter: &FilterSpec) -> Predicate {
    if !filter.is_active() {
        return Predicate::default();
    }

    let pattern = filter.like_pattern();
    match filter.target() {
        FilterTarget::Column(name) => Predicate {
            clause: Some(format!("{} LIKE ?", quote_identifier(name))),
            params: vec![pattern],
        },
        FilterTarget::AllColumns => {
            let text_columns: Vec<&ColumnDescriptor> =
                columns.iter().filter(|c| c.is_text_like()).collect();
            if text_columns.is_empty() {
                return Predicate::default();
            }
            let clause = text_columns
                .iter()
                .map(|c| format!("{} LIKE ?", quote_identifier(&c.name)))
                .collect::<Vec<_>>()
                .join(" OR ");
            Predicate {
                clause: Some(clause),
                params: vec![pattern; text_columns.len()],
            }
        }
    }
}

pub fn build_data_query(
    table: &str,
    columns: &[ColumnDescriptor],
    filter: &FilterSpec,
    page: PageRequest,
) -> BuiltQuery {
    let mut q = with_predicate(
        format!("SELECT * FROM {}", quote_identifier(table)),
        build_predicate(columns, filter),
    );
    q.sql
        .push_str(&format!(" LIMIT {} OFFSET {}", page.limit, page.offset));
    q
}

pub fn build_count_query(table: &str, columns: &[ColumnDescriptor], filter: &FilterSpec) -> BuiltQuery {
    with_predicate(
        format!("SELECT COUNT(*) FROM {}", quote_identifier(table)),
        build_predicate(columns, filter),
    )
}

fn with_predicate(mut sql: String, predicate: Predicate) -> BuiltQuery {
    if let Some(clause) = predicate.clause {
        sql.push_str(" WHERE ");
        sql.push_str(&clause);
    }
    BuiltQuery {
        sql,
        params: predicate.params,
    }
}
