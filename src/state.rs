use crate::store::StockStore;

#[derive(Clone)]
pub struct AppState {
    pub store: StockStore,
}
