use std::path::{Path, PathBuf};

use rusqlite::{Connection, OpenFlags};
use tokio::sync::mpsc;

use crate::{
    core::{
        query::PageJob,
        schema,
        types::{QueryResult, TableDescriptor},
    },
    error::{AppError, AppResult},
};

#[derive(Debug)]
pub enum Delivery {
    Rows {
        seq: u64,
        table: String,
        result: AppResult<QueryResult>,
    },
    Count {
        seq: u64,
        result: AppResult<u64>,
    },
}

impl Delivery {
    pub fn seq(&self) -> u64 {
        match self {
            Delivery::Rows { seq, .. } | Delivery::Count { seq, .. } => *seq,
        }
    }
}

/// One blocking task and one fresh connection per query.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    db_path: PathBuf,
    busy_timeout_ms: u64,
    tx: mpsc::UnboundedSender<Delivery>,
}

impl Dispatcher {
    pub fn new(db_path: &Path, busy_timeout_ms: u64, tx: mpsc::UnboundedSender<Delivery>) -> AppResult<Self> {
        Ok(Self {
            db_path: absolute(db_path)?,
            busy_timeout_ms,
            tx,
        })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub async fn run<T, F>(&self, f: F) -> AppResult<T>
    where
        F: FnOnce(&Connection) -> AppResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let path = self.db_path.clone();
        let busy = self.busy_timeout_ms;
        tokio::task::spawn_blocking(move || {
            let conn = open_conn(&path, busy)?;
            f(&conn)
        })
        .await
        .map_err(|e| AppError::Internal(format!("db task failed: {e}")))?
    }

    pub async fn inspect(&self) -> AppResult<(Vec<TableDescriptor>, String)> {
        self.run(|conn| Ok((schema::list_tables(conn)?, schema::schema_sql(conn)?)))
            .await
    }

    /// Results arrive on the delivery channel in any order.
    pub fn dispatch(&self, seq: u64, job: PageJob) {
        let count_job = job.clone();
        self.spawn(move |conn| Delivery::Rows {
            seq,
            table: job.table.clone(),
            result: conn.and_then(|c| job.load_rows(&c)),
        });
        self.spawn(move |conn| Delivery::Count {
            seq,
            result: conn.and_then(|c| count_job.load_count(&c)),
        });
    }

    fn spawn<F>(&self, f: F)
    where
        F: FnOnce(AppResult<Connection>) -> Delivery + Send + 'static,
    {
        let path = self.db_path.clone();
        let busy = self.busy_timeout_ms;
        let tx = self.tx.clone();
        tokio::task::spawn_blocking(move || {
            let delivery = f(open_conn(&path, busy));
            if tx.send(delivery).is_err() {
                tracing::debug!("delivery channel closed; dropping result");
            }
        });
    }
}

pub fn open_conn(path: &Path, busy_timeout_ms: u64) -> AppResult<Connection> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_URI
        | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    let conn = Connection::open_with_flags(path, flags).map_err(|source| AppError::DbOpenFailed {
        path: path.to_path_buf(),
        source,
    })?;
    let _ = conn.busy_timeout(std::time::Duration::from_millis(busy_timeout_ms));
    Ok(conn)
}

fn absolute(path: &Path) -> AppResult<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        let cwd = std::env::current_dir()?;
        Ok(cwd.join(path))
    }
}
