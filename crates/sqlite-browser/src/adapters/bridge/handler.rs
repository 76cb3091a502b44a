use std::path::{Path, PathBuf};

use serde_json::{json, Value};
use tokio::sync::mpsc;

use crate::{
    cli::Args,
    core::{
        connection::Delivery,
        session::{SchemaSnapshot, Session, Update, UpdateKind},
        types::{ColumnDescriptor, FilterSpec, FilterTarget, ALL_COLUMNS},
    },
    error::{AppError, AppResult},
};

use super::protocol::*;

pub struct BridgeHandler {
    session: Session,
}

impl BridgeHandler {
    pub fn new(args: &Args, deliveries: mpsc::UnboundedSender<Delivery>) -> Self {
        Self {
            session: Session::new(deliveries, args.busy_timeout_ms, args.page_size),
        }
    }

    pub async fn handle(&mut self, req: BridgeRequest) -> BridgeResponse<Value> {
        if req.v != PROTOCOL_VERSION {
            return BridgeResponse::err(
                req.v,
                req.id,
                "INVALID_REQUEST",
                format!("unsupported protocol version: {}", req.v),
            );
        }

        let res = match req.cmd.as_str() {
            "open" => self.handle_open(&req.payload).await,
            "refresh" => self.session.refresh().await.map(|s| snapshot_json(&s)),
            "tables" => self.handle_tables(),
            "columns" => self.handle_columns(&req.payload),
            "schema_sql" => self.session.schema_sql().map(|s| Value::String(s.to_string())),
            "select_table" => self.handle_select_table(&req.payload),
            "filter" => self.handle_filter(&req.payload),
            "clear_filter" => self.session.clear_filter().map(seq_json),
            "next_page" => self.session.next_page().map(seq_json),
            "prev_page" => self.session.previous_page().map(|seq| json!({ "seq": seq })),
            "page_size" => self.handle_page_size(&req.payload),
            "state" => Ok(self.state_json()),
            other => Err(AppError::InvalidRequest(format!("unknown cmd: {other}"))),
        };

        match res {
            Ok(data) => BridgeResponse::ok(req.v, req.id, data),
            Err(e) => {
                tracing::warn!(cmd = %req.cmd, error = %e, "request failed");
                BridgeResponse::err(req.v, req.id, e.code(), e.to_string())
            }
        }
    }

    pub async fn open_on_start(&mut self, path: &Path) -> BridgeEvent {
        match self.session.open(path).await {
            Ok(snapshot) => BridgeEvent::data("opened", None, snapshot_json(&snapshot)),
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "failed to open database");
                BridgeEvent::error(None, e.code(), e.to_string())
            }
        }
    }

    pub fn deliver(&mut self, delivery: Delivery) -> Option<BridgeEvent> {
        let update = self.session.deliver(delivery)?;
        let status = update.status_message();
        Some(match update {
            Update::Rows { seq, table, result } => {
                let mut data = json!(result);
                data["table"] = json!(table);
                data["status"] = json!(status);
                BridgeEvent::data("rows", Some(seq), data)
            }
            Update::Pagination { seq, info } => {
                let mut data = json!(info);
                data["page_label"] = json!(info.page_label());
                data["total_label"] = json!(info.total_label());
                BridgeEvent::data("pagination", Some(seq), data)
            }
            Update::Failed { seq, error } => BridgeEvent::error(Some(seq), error.code(), error.to_string()),
        })
    }

    async fn handle_open(&mut self, payload: &Value) -> AppResult<Value> {
        let p: OpenPayload = parse(payload)?;
        let snapshot = self.session.open(&PathBuf::from(p.path)).await?;
        Ok(snapshot_json(&snapshot))
    }

    fn handle_tables(&self) -> AppResult<Value> {
        let names: Vec<&str> = self.session.tables()?.iter().map(|t| t.name.as_str()).collect();
        Ok(json!(names))
    }

    fn handle_columns(&self, payload: &Value) -> AppResult<Value> {
        let p: TablePayload = parse(payload)?;
        Ok(serde_json::to_value(&self.session.table(&p.table)?.columns)?)
    }

    fn handle_select_table(&mut self, payload: &Value) -> AppResult<Value> {
        let p: TablePayload = parse(payload)?;
        let seq = self.session.select_table(&p.table)?;
        let choices = self.session.table(&p.table)?.filter_choices();
        Ok(json!({ "seq": seq, "filter_columns": choices }))
    }

    fn handle_filter(&mut self, payload: &Value) -> AppResult<Value> {
        let p: FilterPayload = parse(payload)?;
        let filter = FilterSpec::new(&p.text, FilterTarget::from_choice(p.column.as_deref()));
        let seq = self.session.set_filter(filter, UpdateKind::User)?;
        Ok(json!({ "seq": seq }))
    }

    fn state_json(&self) -> Value {
        let filter = self.session.filter();
        let column = match filter.target() {
            FilterTarget::AllColumns => ALL_COLUMNS,
            FilterTarget::Column(name) => name.as_str(),
        };
        let page = self.session.page();
        json!({
            "seq": self.session.latest_seq(),
            "table": self.session.current_table().map(|t| t.name.as_str()),
            "filter": { "text": filter.text(), "column": column },
            "offset": page.offset,
            "page_size": page.limit,
            "pagination": self.session.pagination(),
        })
    }

    fn handle_page_size(&mut self, payload: &Value) -> AppResult<Value> {
        let p: PageSizePayload = parse(payload)?;
        let seq = self.session.set_page_size(p.size)?;
        Ok(json!({ "seq": seq, "page_size": self.session.page().limit }))
    }
}

fn parse<T: serde::de::DeserializeOwned>(payload: &Value) -> AppResult<T> {
    T::deserialize(payload).map_err(|e| AppError::InvalidRequest(e.to_string()))
}

fn seq_json(seq: u64) -> Value {
    json!({ "seq": seq })
}

fn snapshot_json(s: &SchemaSnapshot) -> Value {
    let tables: Vec<Value> = s
        .tables
        .iter()
        .map(|t| {
            json!({
                "name": t.name,
                "columns": t.columns,
                "labels": t.columns.iter().map(ColumnDescriptor::label).collect::<Vec<_>>(),
            })
        })
        .collect();
    json!({
        "database": s.database,
        "heading": s.heading(),
        "tables": tables,
        "schema_sql": s.schema_sql,
    })
}
