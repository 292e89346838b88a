mod stock;

pub use stock::{
    normalize_text, parse_metric, DeleteForm, EditParams, ListOrder, ListParams, NewStock,
    StockForm, StockRecord,
};
