use sqlx::{FromRow, SqlitePool};

use crate::models::{normalize_text, ListOrder, NewStock, StockRecord};
use crate::utils::datetime;

const SELECT_COLUMNS: &str = "SELECT id, stock_code, stock_name, pbr, per, create_date FROM Stocks";

// create_date is free-form text in SQLite, so it is parsed after the fetch.
#[derive(Debug, FromRow)]
struct StockRow {
    id: i64,
    stock_code: String,
    stock_name: Option<String>,
    pbr: Option<f64>,
    per: Option<f64>,
    create_date: Option<String>,
}

impl From<StockRow> for StockRecord {
    fn from(row: StockRow) -> Self {
        StockRecord {
            id: row.id,
            stock_code: row.stock_code.trim().to_string(),
            stock_name: normalize_text(row.stock_name.as_deref()),
            pbr: row.pbr,
            per: row.per,
            create_date: datetime::parse_lenient(row.create_date.as_deref()),
        }
    }
}

pub async fn create_table(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS Stocks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            stock_code TEXT UNIQUE NOT NULL,
            stock_name TEXT,
            create_date TEXT DEFAULT (datetime('now','localtime')),
            pbr REAL,
            per REAL
        )",
    )
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn ping(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

pub async fn fetch_all(pool: &SqlitePool, order: ListOrder) -> Result<Vec<StockRecord>, sqlx::Error> {
    let order_by = match order {
        ListOrder::ByName => "ORDER BY stock_name COLLATE NOCASE ASC, id ASC",
        ListOrder::Inserted => "ORDER BY id ASC",
    };
    let rows = sqlx::query_as::<_, StockRow>(&format!("{SELECT_COLUMNS} {order_by}"))
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(StockRecord::from).collect())
}

pub async fn search(pool: &SqlitePool, keyword: &str) -> Result<Vec<StockRecord>, sqlx::Error> {
    let pattern = format!("%{}%", escape_like(keyword));
    let rows = sqlx::query_as::<_, StockRow>(&format!(
        "{SELECT_COLUMNS}
         WHERE stock_code LIKE $1 ESCAPE '\\' OR stock_name LIKE $1 ESCAPE '\\'
         ORDER BY stock_name COLLATE NOCASE ASC, id ASC"
    ))
    .bind(pattern)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(StockRecord::from).collect())
}

pub async fn fetch_by_code(pool: &SqlitePool, code: &str) -> Result<Option<StockRecord>, sqlx::Error> {
    let row = sqlx::query_as::<_, StockRow>(&format!("{SELECT_COLUMNS} WHERE stock_code = $1"))
        .bind(code)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(StockRecord::from))
}

pub async fn fetch_by_id(pool: &SqlitePool, id: i64) -> Result<Option<StockRecord>, sqlx::Error> {
    let row = sqlx::query_as::<_, StockRow>(&format!("{SELECT_COLUMNS} WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(StockRecord::from))
}

pub async fn insert(pool: &SqlitePool, input: &NewStock) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO Stocks (stock_code, stock_name, create_date, pbr, per)
         VALUES ($1, $2, datetime('now','localtime'), $3, $4)",
    )
    .bind(&input.stock_code)
    .bind(&input.stock_name)
    .bind(input.pbr)
    .bind(input.per)
    .execute(pool)
    .await?;
    Ok(result.last_insert_rowid())
}

pub async fn update_by_id(
    pool: &SqlitePool,
    id: i64,
    code: &str,
    name: Option<&str>,
    pbr: Option<f64>,
    per: Option<f64>,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE Stocks SET stock_code = $1, stock_name = $2, pbr = $3, per = $4 WHERE id = $5",
    )
    .bind(code)
    .bind(name)
    .bind(pbr)
    .bind(per)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

pub async fn update_by_code(
    pool: &SqlitePool,
    code: &str,
    name: Option<&str>,
    pbr: Option<f64>,
    per: Option<f64>,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE Stocks SET stock_name = $1, pbr = $2, per = $3 WHERE stock_code = $4",
    )
    .bind(name)
    .bind(pbr)
    .bind(per)
    .bind(code)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

pub async fn delete_by_code(pool: &SqlitePool, code: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM Stocks WHERE stock_code = $1")
        .bind(code)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

fn escape_like(keyword: &str) -> String {
    let mut escaped = String::with_capacity(keyword.len());
    for c in keyword.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
