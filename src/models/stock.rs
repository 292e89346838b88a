use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::NaiveDateTime;
use serde::Deserialize;

const CREATE_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// A single listed stock with its valuation ratios.
#[derive(Debug, Clone)]
pub struct StockRecord {
    pub id: i64,
    pub stock_code: String,
    pub stock_name: Option<String>,
    pub pbr: Option<f64>,
    pub per: Option<f64>,
    pub create_date: Option<NaiveDateTime>,
}

impl StockRecord {
    /// Creation time as `YYYY-MM-DD HH:MM:SS`, or an empty string when unknown.
    pub fn create_date_text(&self) -> String {
        self.create_date
            .map(|dt| dt.format(CREATE_DATE_FORMAT).to_string())
            .unwrap_or_default()
    }
}

// Stock code is the natural key.
impl PartialEq for StockRecord {
    fn eq(&self, other: &Self) -> bool {
        self.stock_code == other.stock_code
    }
}

impl Eq for StockRecord {}

impl Hash for StockRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.stock_code.hash(state);
    }
}

impl fmt::Display for StockRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.stock_name.as_deref().unwrap_or("null");
        let pbr = self.pbr.map(|v| v.to_string()).unwrap_or_else(|| "-".into());
        let per = self.per.map(|v| v.to_string()).unwrap_or_else(|| "-".into());
        let created = match self.create_date {
            Some(_) => self.create_date_text(),
            None => "N/A".into(),
        };
        write!(
            f,
            "[{}] {} (code={}) PBR={}, PER={}, created={}",
            self.id, name, self.stock_code, pbr, per, created
        )
    }
}

/// A validated record ready for insertion. Code and name are always present.
#[derive(Debug, Clone, PartialEq)]
pub struct NewStock {
    pub stock_code: String,
    pub stock_name: String,
    pub pbr: Option<f64>,
    pub per: Option<f64>,
}

impl NewStock {
    /// Returns `None` when code or name is blank after trimming.
    pub fn new(code: Option<&str>, name: Option<&str>, pbr: Option<f64>, per: Option<f64>) -> Option<Self> {
        Some(Self {
            stock_code: normalize_text(code)?,
            stock_name: normalize_text(name)?,
            pbr,
            per,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListOrder {
    #[default]
    ByName,
    Inserted,
}

impl ListOrder {
    pub fn from_mode(mode: Option<&str>) -> Self {
        match mode.map(str::trim) {
            Some(m) if m.eq_ignore_ascii_case("inserted") => ListOrder::Inserted,
            _ => ListOrder::ByName,
        }
    }

    pub fn as_mode(&self) -> &'static str {
        match self {
            ListOrder::ByName => "name",
            ListOrder::Inserted => "inserted",
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub mode: Option<String>,
    pub q: Option<String>,
    pub toast: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EditParams {
    pub code: Option<String>,
}

/// Fields posted by the create and update forms. Everything arrives as raw text.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockForm {
    pub id: Option<String>,
    pub stock_code: Option<String>,
    pub stock_name: Option<String>,
    pub pbr: Option<String>,
    pub per: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteForm {
    pub code: Option<String>,
}

/// Trims the value and maps empty text to `None`.
pub fn normalize_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

/// Lenient ratio parsing: blank, malformed or non-finite input is treated as absent.
pub fn parse_metric(value: Option<&str>) -> Option<f64> {
    normalize_text(value)?
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}
