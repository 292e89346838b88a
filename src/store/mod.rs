pub mod stocks;

pub use stocks::{StockStore, StoreConfig};
