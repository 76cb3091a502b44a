//! Interaction state for one browser window. Deliveries are applied only
//! when their seq matches the latest dispatched request.

use std::path::Path;

use tokio::sync::mpsc;

use crate::{
    core::{
        connection::{Delivery, Dispatcher},
        limits::effective_page_size,
        pagination::PageRequest,
        query::PageJob,
        types::{FilterSpec, FilterTarget, PaginationInfo, QueryResult, TableDescriptor},
    },
    error::{AppError, AppResult},
};

/// Programmatic filter updates never trigger a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateKind {
    Programmatic,
    User,
}

#[derive(Debug, Clone)]
pub struct SchemaSnapshot {
    pub database: String,
    pub tables: Vec<TableDescriptor>,
    pub schema_sql: String,
}

impl SchemaSnapshot {
    pub fn heading(&self) -> String {
        format!("Tables ({})", self.tables.len())
    }
}

#[derive(Debug)]
pub enum Update {
    Rows {
        seq: u64,
        table: String,
        result: QueryResult,
    },
    Pagination {
        seq: u64,
        info: PaginationInfo,
    },
    Failed {
        seq: u64,
        error: AppError,
    },
}

impl Update {
    pub fn status_message(&self) -> Option<String> {
        match self {
            Update::Rows { table, result, .. } => Some(format!(
                "Loaded {} rows from table '{}'",
                result.rows.len(),
                table
            )),
            _ => None,
        }
    }
}

struct OpenDatabase {
    dispatcher: Dispatcher,
    tables: Vec<TableDescriptor>,
    schema_sql: String,
    current: Option<String>,
}

pub struct Session {
    deliveries: mpsc::UnboundedSender<Delivery>,
    busy_timeout_ms: u64,
    db: Option<OpenDatabase>,
    filter: FilterSpec,
    page: PageRequest,
    seq: u64,
    // (seq, total) of the last count delivered.
    total: Option<(u64, u64)>,
}

impl Session {
    pub fn new(deliveries: mpsc::UnboundedSender<Delivery>, busy_timeout_ms: u64, page_size: u64) -> Self {
        Self {
            deliveries,
            busy_timeout_ms,
            db: None,
            filter: FilterSpec::default(),
            page: PageRequest::new(0, effective_page_size(Some(page_size))),
            seq: 0,
            total: None,
        }
    }

    /// On failure the previous database stays open.
    pub async fn open(&mut self, path: &Path) -> AppResult<SchemaSnapshot> {
        let dispatcher = Dispatcher::new(path, self.busy_timeout_ms, self.deliveries.clone())?;
        let (tables, schema_sql) = dispatcher.inspect().await?;
        tracing::info!(path = %dispatcher.db_path().display(), tables = tables.len(), "opened database");

        let snapshot = SchemaSnapshot {
            database: file_name(dispatcher.db_path()),
            tables: tables.clone(),
            schema_sql: schema_sql.clone(),
        };
        // Anything still in flight belongs to the previous database.
        self.seq += 1;
        self.db = Some(OpenDatabase {
            dispatcher,
            tables,
            schema_sql,
            current: None,
        });
        self.filter = FilterSpec::default();
        self.page = self.page.first();
        self.total = None;
        Ok(snapshot)
    }

    pub async fn refresh(&mut self) -> AppResult<SchemaSnapshot> {
        let db = self.db.as_mut().ok_or(AppError::NoDatabase)?;
        let (tables, schema_sql) = db.dispatcher.inspect().await?;
        let dropped = db
            .current
            .as_ref()
            .is_some_and(|current| !tables.iter().any(|t| &t.name == current));
        if dropped {
            tracing::info!(table = ?db.current, "selected table disappeared on refresh");
            db.current = None;
        }
        db.tables = tables.clone();
        db.schema_sql = schema_sql.clone();
        let snapshot = SchemaSnapshot {
            database: file_name(db.dispatcher.db_path()),
            tables,
            schema_sql,
        };
        if dropped {
            self.seq += 1;
        }
        Ok(snapshot)
    }

    pub fn schema_sql(&self) -> AppResult<&str> {
        Ok(&self.db.as_ref().ok_or(AppError::NoDatabase)?.schema_sql)
    }

    pub fn tables(&self) -> AppResult<&[TableDescriptor]> {
        Ok(&self.db.as_ref().ok_or(AppError::NoDatabase)?.tables)
    }

    pub fn table(&self, name: &str) -> AppResult<&TableDescriptor> {
        self.tables()?
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| AppError::InvalidRequest(format!("unknown table: {name}")))
    }

    pub fn current_table(&self) -> Option<&TableDescriptor> {
        let db = self.db.as_ref()?;
        let name = db.current.as_ref()?;
        db.tables.iter().find(|t| &t.name == name)
    }

    pub fn filter(&self) -> &FilterSpec {
        &self.filter
    }

    pub fn page(&self) -> PageRequest {
        self.page
    }

    pub fn latest_seq(&self) -> u64 {
        self.seq
    }

    /// `None` until the count for the latest request has arrived.
    pub fn pagination(&self) -> Option<PaginationInfo> {
        self.total
            .filter(|(seq, _)| *seq == self.seq)
            .map(|(_, total)| self.page.derive(total))
    }

    pub fn select_table(&mut self, name: &str) -> AppResult<u64> {
        let name = self.table(name)?.name.clone();
        if let Some(db) = self.db.as_mut() {
            db.current = Some(name);
        }
        self.set_filter(FilterSpec::default(), UpdateKind::Programmatic)?;
        self.page = self.page.first();
        self.dispatch()
    }

    /// Returns the dispatched seq for user updates, `None` for programmatic ones.
    pub fn set_filter(&mut self, filter: FilterSpec, kind: UpdateKind) -> AppResult<Option<u64>> {
        if let FilterTarget::Column(column) = filter.target() {
            let table = self.selected_table()?;
            if table.column(column).is_none() {
                return Err(AppError::InvalidRequest(format!(
                    "unknown column {column} in table {}",
                    table.name
                )));
            }
        } else if kind == UpdateKind::User {
            self.selected_table()?;
        }

        self.filter = filter;
        match kind {
            UpdateKind::Programmatic => Ok(None),
            UpdateKind::User => {
                self.page = self.page.first();
                self.dispatch().map(Some)
            }
        }
    }

    pub fn clear_filter(&mut self) -> AppResult<u64> {
        self.filter = FilterSpec::default();
        self.page = self.page.first();
        self.dispatch()
    }

    pub fn next_page(&mut self) -> AppResult<u64> {
        self.page = self.page.advance();
        self.dispatch()
    }

    /// `None` when already on the first page.
    pub fn previous_page(&mut self) -> AppResult<Option<u64>> {
        if self.page.offset == 0 {
            return Ok(None);
        }
        self.page = self.page.retreat();
        self.dispatch().map(Some)
    }

    pub fn set_page_size(&mut self, size: u64) -> AppResult<u64> {
        self.page = self.page.with_limit(effective_page_size(Some(size)));
        self.dispatch()
    }

    pub fn deliver(&mut self, delivery: Delivery) -> Option<Update> {
        if delivery.seq() != self.seq {
            tracing::debug!(seq = delivery.seq(), latest = self.seq, "dropping stale delivery");
            return None;
        }

        match delivery {
            Delivery::Rows {
                seq,
                table,
                result: Ok(result),
            } => Some(Update::Rows { seq, table, result }),
            Delivery::Count { seq, result: Ok(total) } => {
                self.total = Some((seq, total));
                Some(Update::Pagination {
                    seq,
                    info: self.page.derive(total),
                })
            }
            Delivery::Rows { seq, result: Err(error), .. } | Delivery::Count { seq, result: Err(error) } => {
                tracing::warn!(seq, error = %error, "query failed");
                Some(Update::Failed { seq, error })
            }
        }
    }

    fn selected_table(&self) -> AppResult<&TableDescriptor> {
        if self.db.is_none() {
            return Err(AppError::NoDatabase);
        }
        self.current_table()
            .ok_or_else(|| AppError::InvalidRequest("no table selected".into()))
    }

    fn dispatch(&mut self) -> AppResult<u64> {
        let db = self.db.as_ref().ok_or(AppError::NoDatabase)?;
        let table = db
            .current
            .clone()
            .ok_or_else(|| AppError::InvalidRequest("no table selected".into()))?;

        let seq = self.seq + 1;
        let job = PageJob {
            table,
            filter: self.filter.clone(),
            page: self.page,
        };
        tracing::debug!(seq, table = %job.table, offset = job.page.offset, limit = job.page.limit, "dispatching page request");
        db.dispatcher.dispatch(seq, job);
        self.seq = seq;
        Ok(seq)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
