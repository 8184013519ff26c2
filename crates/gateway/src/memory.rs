//! In-process implementation of the gateway

use crate::error::{GatewayError, Result};
use crate::filter::Query;
use crate::{DataGateway, VERSION_COLUMN};
use async_trait::async_trait;
use chrono::{Local, Utc};
use log::debug;
use reqwest::StatusCode;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;
use uuid::Uuid;

/// Gateway operation, used to target injected failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Query,
    Insert,
    Update,
    Delete,
}

/// Tables kept in memory, with the same id/version/timestamp behaviour as
/// the hosted store. Writes are counted and single failures can be queued
/// per operation.
#[derive(Default)]
pub struct MemoryGateway {
    tables: Mutex<HashMap<String, Vec<Value>>>,
    failures: Mutex<Vec<(Operation, StatusCode, String)>>,
    writes: AtomicUsize,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put rows into `table` as if they had been inserted earlier
    pub async fn seed(&self, table: &str, rows: Vec<Value>) {
        let mut tables = self.tables.lock().await;
        let stored = tables.entry(table.to_string()).or_default();
        for row in rows {
            if let Value::Object(map) = row {
                stored.push(Value::Object(stamp(map)));
            }
        }
    }

    /// Current contents of `table`, in insertion order
    pub async fn rows(&self, table: &str) -> Vec<Value> {
        self.tables
            .lock()
            .await
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    /// Make the next `operation` fail with the given status and message
    pub async fn fail_next(&self, operation: Operation, status: StatusCode, message: &str) {
        self.failures
            .lock()
            .await
            .push((operation, status, message.to_string()));
    }

    /// Number of successful inserts, updates and deletes so far
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    async fn take_failure(&self, operation: Operation) -> Result<()> {
        let mut failures = self.failures.lock().await;
        if let Some(pos) = failures.iter().position(|(op, _, _)| *op == operation) {
            let (_, status, message) = failures.remove(pos);
            return Err(GatewayError::UnparsedApi { message, status });
        }
        Ok(())
    }
}

fn stamp(mut row: Map<String, Value>) -> Map<String, Value> {
    row.entry("id")
        .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
    row.entry("created_at")
        .or_insert_with(|| Value::String(Utc::now().to_rfc3339()));
    row.entry(VERSION_COLUMN).or_insert_with(|| Value::from(1));
    row
}

fn has_id(row: &Value, id: &str) -> bool {
    row.get("id").and_then(Value::as_str) == Some(id)
}

#[async_trait]
impl DataGateway for MemoryGateway {
    async fn query(&self, table: &str, query: &Query) -> Result<Vec<Value>> {
        self.take_failure(Operation::Query).await?;

        // `Today` markers compare against the local date, as `to_params` sends them
        let query = query.resolve(Local::now().date_naive());
        let tables = self.tables.lock().await;
        let mut rows: Vec<Value> = tables
            .get(table)
            .map(|rows| rows.iter().filter(|r| query.matches(r)).cloned().collect())
            .unwrap_or_default();

        if let Some(order) = &query.order {
            rows.sort_by(|a, b| order.compare(a, b));
        }
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }
        debug!("Memory query on {} returned {} rows", table, rows.len());
        Ok(rows)
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Value> {
        self.take_failure(Operation::Insert).await?;

        let map = match row {
            Value::Object(map) => map,
            other => {
                return Err(GatewayError::InvalidParameters(format!(
                    "Insert body must be an object, got {}",
                    other
                )))
            }
        };
        let stored = Value::Object(stamp(map));

        let mut tables = self.tables.lock().await;
        tables
            .entry(table.to_string())
            .or_default()
            .push(stored.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(stored)
    }

    async fn update(
        &self,
        table: &str,
        id: Uuid,
        expected_version: Option<i64>,
        patch: Value,
    ) -> Result<Value> {
        self.take_failure(Operation::Update).await?;

        let patch = match patch {
            Value::Object(map) => map,
            other => {
                return Err(GatewayError::InvalidParameters(format!(
                    "Update body must be an object, got {}",
                    other
                )))
            }
        };

        let id = id.to_string();
        let mut tables = self.tables.lock().await;
        let row = tables
            .get_mut(table)
            .and_then(|rows| rows.iter_mut().find(|r| has_id(r, &id)))
            .ok_or_else(|| GatewayError::NotFound {
                table: table.to_string(),
                id: id.clone(),
            })?;

        let current = row.get(VERSION_COLUMN).and_then(Value::as_i64).unwrap_or(1);
        if let Some(expected) = expected_version {
            if expected != current {
                return Err(GatewayError::Conflict {
                    table: table.to_string(),
                    id,
                });
            }
        }

        if let Value::Object(fields) = &mut *row {
            for (key, value) in patch {
                if key != "id" && key != "created_at" {
                    fields.insert(key, value);
                }
            }
            fields.insert(VERSION_COLUMN.to_string(), Value::from(current + 1));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(row.clone())
    }

    async fn delete(&self, table: &str, id: Uuid) -> Result<()> {
        self.take_failure(Operation::Delete).await?;

        let id = id.to_string();
        let mut tables = self.tables.lock().await;
        let rows = tables.get_mut(table);
        let before = rows.as_ref().map(|r| r.len()).unwrap_or(0);
        if let Some(rows) = rows {
            rows.retain(|r| !has_id(r, &id));
            if rows.len() < before {
                self.writes.fetch_add(1, Ordering::SeqCst);
                return Ok(());
            }
        }
        Err(GatewayError::NotFound {
            table: table.to_string(),
            id,
        })
    }
}
