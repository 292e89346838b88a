pub mod stock_queries;
