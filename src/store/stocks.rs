use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::{error, info};

use crate::db::stock_queries;
use crate::errors::StoreError;
use crate::models::{ListOrder, NewStock, StockRecord};

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub create_if_missing: bool,
}

/// Persistence for stock records. Cloning shares the underlying pool; every
/// operation checks out its own connection for a single statement.
#[derive(Debug, Clone)]
pub struct StockStore {
    pool: SqlitePool,
}

impl StockStore {
    /// Opens the pool and makes sure the table exists. A missing database file is
    /// an error unless `create_if_missing` is set.
    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(&config.database_url)
            .map_err(|e| StoreError::wrap("connect", e))?
            .create_if_missing(config.create_if_missing);

        // An in-memory database lives only as long as its connection.
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::wrap("connect", e))?;

        let store = Self { pool };
        store.ensure_schema().await?;
        info!("Stock store ready at {}", config.database_url);
        Ok(store)
    }

    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        stock_queries::create_table(&self.pool)
            .await
            .map_err(|e| fail("create table", e))
    }

    pub async fn ping(&self) -> Result<(), StoreError> {
        stock_queries::ping(&self.pool)
            .await
            .map_err(|e| fail("ping", e))
    }

    pub async fn list_all(&self, order: ListOrder) -> Result<Vec<StockRecord>, StoreError> {
        let op = match order {
            ListOrder::ByName => "select by name",
            ListOrder::Inserted => "select by insertion",
        };
        stock_queries::fetch_all(&self.pool, order)
            .await
            .map_err(|e| fail(op, e))
    }

    /// Substring match on code or name. A blank keyword lists everything by name.
    pub async fn search(&self, keyword: Option<&str>) -> Result<Vec<StockRecord>, StoreError> {
        let keyword = keyword.map(str::trim).unwrap_or_default();
        if keyword.is_empty() {
            return self.list_all(ListOrder::ByName).await;
        }
        stock_queries::search(&self.pool, keyword)
            .await
            .map_err(|e| fail("search", e))
    }

    pub async fn find_by_code(&self, code: &str) -> Result<Option<StockRecord>, StoreError> {
        stock_queries::fetch_by_code(&self.pool, code)
            .await
            .map_err(|e| fail("find by code", e))
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<StockRecord>, StoreError> {
        stock_queries::fetch_by_id(&self.pool, id)
            .await
            .map_err(|e| fail("find by id", e))
    }

    /// Returns the id assigned to the new row.
    pub async fn insert(&self, stock: &NewStock) -> Result<i64, StoreError> {
        stock_queries::insert(&self.pool, stock)
            .await
            .map_err(|e| fail("insert", e))
    }

    pub async fn update_by_id(
        &self,
        id: i64,
        code: &str,
        name: Option<&str>,
        pbr: Option<f64>,
        per: Option<f64>,
    ) -> Result<bool, StoreError> {
        let affected = stock_queries::update_by_id(&self.pool, id, code, name, pbr, per)
            .await
            .map_err(|e| fail("update by id", e))?;
        Ok(affected > 0)
    }

    /// Replaces name and ratios of the row holding `code`. Unlike the id-keyed
    /// update there is no fallback: every value is written as given.
    #[allow(dead_code)]
    pub async fn update_by_code(
        &self,
        code: &str,
        name: Option<&str>,
        pbr: Option<f64>,
        per: Option<f64>,
    ) -> Result<bool, StoreError> {
        let affected = stock_queries::update_by_code(&self.pool, code, name, pbr, per)
            .await
            .map_err(|e| fail("update by code", e))?;
        Ok(affected > 0)
    }

    pub async fn delete_by_code(&self, code: &str) -> Result<bool, StoreError> {
        let affected = stock_queries::delete_by_code(&self.pool, code)
            .await
            .map_err(|e| fail("delete", e))?;
        Ok(affected > 0)
    }
}

fn fail(op: &'static str, e: sqlx::Error) -> StoreError {
    let err = StoreError::wrap(op, e);
    error!("{}", err);
    err
}
