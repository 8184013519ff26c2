//! Data gateway for the clinic back-office
//!
//! Every screen of the back-office reads and writes rows through one small
//! contract, [`DataGateway`]:
//!
//! - `query(table, query)`: filtered, ordered read
//! - `insert(table, row)`: returns the stored row
//! - `update(table, id, expected_version, patch)`: compare-and-swap on the row version
//! - `delete(table, id)`
//!
//! [`RestGateway`] talks to a PostgREST endpoint (Supabase), and
//! [`MemoryGateway`] keeps tables in process.

mod error;
mod fetch;
mod filter;
mod memory;
mod rest;

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

pub use error::{ApiErrorDetails, GatewayError, Result};
pub use fetch::{Fetch, FetchBuilder};
pub use filter::{Filter, FilterOperator, FilterValue, Order, Query};
pub use memory::{MemoryGateway, Operation};
pub use rest::RestGateway;

/// Column holding the optimistic-concurrency token of every row
pub const VERSION_COLUMN: &str = "version";

/// Reads and keyed writes against named remote tables
#[async_trait]
pub trait DataGateway: Send + Sync {
    /// Fetch every row of `table` matching `query`, in the query's order
    async fn query(&self, table: &str, query: &Query) -> Result<Vec<Value>>;

    /// Insert one row and return it as stored (id, timestamps, version filled in)
    async fn insert(&self, table: &str, row: Value) -> Result<Value>;

    /// Apply `patch` to the row `id`. With `expected_version`, the write only
    /// happens if the stored version still matches; the stored version is
    /// bumped by one and a mismatch is a [`GatewayError::Conflict`].
    async fn update(
        &self,
        table: &str,
        id: Uuid,
        expected_version: Option<i64>,
        patch: Value,
    ) -> Result<Value>;

    /// Remove the row `id`
    async fn delete(&self, table: &str, id: Uuid) -> Result<()>;
}
