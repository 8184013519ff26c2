//! PostgREST implementation of the gateway

use crate::error::{GatewayError, Result};
use crate::fetch::{Fetch, FetchBuilder};
use crate::filter::Query;
use crate::{DataGateway, VERSION_COLUMN};
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use serde_json::Value;
use uuid::Uuid;

/// Gateway backed by a Supabase/PostgREST endpoint
///
/// Authorization is the server's job: the configured access token is sent as
/// a bearer token and row-level policies decide what it may touch.
#[derive(Clone)]
pub struct RestGateway {
    base_url: String,
    api_key: String,
    access_token: Option<String>,
    schema: String,
    http_client: Client,
}

impl RestGateway {
    /// Create a gateway for the project at `base_url`
    pub fn new(base_url: &str, api_key: &str, http_client: Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            access_token: None,
            schema: "public".to_string(),
            http_client,
        }
    }

    /// 認証トークンを設定
    pub fn with_access_token(mut self, token: &str) -> Self {
        self.access_token = Some(token.to_string());
        self
    }

    /// スキーマを指定（デフォルトのpublicスキーマではない場合）
    pub fn with_schema(mut self, schema: &str) -> Self {
        self.schema = schema.to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn request<'a>(&'a self, builder: FetchBuilder<'a>, write: bool) -> FetchBuilder<'a> {
        let mut builder = builder
            .header("apikey", &self.api_key)
            .header("X-Client-Info", "clinic-desk/0.2.0");

        if let Some(token) = &self.access_token {
            builder = builder.bearer_auth(token);
        }
        if self.schema != "public" {
            let profile = if write { "Content-Profile" } else { "Accept-Profile" };
            builder = builder.header(profile, &self.schema);
        }
        if write {
            builder = builder.header("Prefer", "return=representation");
        }
        builder
    }

    async fn exists(&self, table: &str, id: Uuid) -> Result<bool> {
        let rows = self.query(table, &Query::new().eq("id", id).limit(1)).await?;
        Ok(!rows.is_empty())
    }
}

// PostgREST answers writes with an array of affected rows.
fn first_row(value: Value) -> Option<Value> {
    match value {
        Value::Array(rows) => rows.into_iter().next(),
        Value::Object(_) => Some(value),
        _ => None,
    }
}

#[async_trait]
impl DataGateway for RestGateway {
    async fn query(&self, table: &str, query: &Query) -> Result<Vec<Value>> {
        let url = self.table_url(table);
        self.request(Fetch::get(&self.http_client, &url), false)
            .query(query.to_params())
            .execute::<Vec<Value>>()
            .await
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Value> {
        let url = self.table_url(table);
        let response = self
            .request(Fetch::post(&self.http_client, &url), true)
            .json(&row)?
            .execute_value()
            .await?;

        first_row(response).ok_or_else(|| {
            GatewayError::Deserialization(format!("No row returned after insert into {}", table))
        })
    }

    async fn update(
        &self,
        table: &str,
        id: Uuid,
        expected_version: Option<i64>,
        patch: Value,
    ) -> Result<Value> {
        let mut body = match patch {
            Value::Object(map) => map,
            other => {
                return Err(GatewayError::InvalidParameters(format!(
                    "Update body must be an object, got {}",
                    other
                )))
            }
        };

        let mut params = vec![("id".to_string(), format!("eq.{}", id))];
        if let Some(version) = expected_version {
            params.push((VERSION_COLUMN.to_string(), format!("eq.{}", version)));
            body.insert(VERSION_COLUMN.to_string(), Value::from(version + 1));
        }

        let url = self.table_url(table);
        let response = self
            .request(Fetch::patch(&self.http_client, &url), true)
            .query(params)
            .json(&Value::Object(body))?
            .execute_value()
            .await?;

        if let Some(row) = first_row(response) {
            return Ok(row);
        }

        // Nothing matched: tell a stale version apart from a vanished row.
        if expected_version.is_some() && self.exists(table, id).await? {
            warn!("Stale update rejected for {} in {}", id, table);
            return Err(GatewayError::Conflict {
                table: table.to_string(),
                id: id.to_string(),
            });
        }
        Err(GatewayError::NotFound {
            table: table.to_string(),
            id: id.to_string(),
        })
    }

    async fn delete(&self, table: &str, id: Uuid) -> Result<()> {
        let url = self.table_url(table);
        let response = self
            .request(Fetch::delete(&self.http_client, &url), true)
            .query(vec![("id".to_string(), format!("eq.{}", id))])
            .execute_value()
            .await?;

        match response {
            Value::Array(rows) if rows.is_empty() => Err(GatewayError::NotFound {
                table: table.to_string(),
                id: id.to_string(),
            }),
            _ => {
                debug!("Deleted {} from {}", id, table);
                Ok(())
            }
        }
    }
}
