use tracing::{info, warn};

use crate::models::{normalize_text, parse_metric, DeleteForm, NewStock, StockForm};
use crate::store::StockStore;

/// Outcome of a create, update or delete request, shown to the user after the redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toast {
    MissingCodeOrName,
    Created,
    CreateFailed,
    MissingId,
    InvalidId,
    StockNotFound,
    Updated,
    UpdateFailed,
    DuplicateCode,
    MissingDeleteCode,
    Deleted,
    NoSuchCode,
    DeleteFailed,
}

impl Toast {
    pub fn message(&self) -> &'static str {
        match self {
            Toast::MissingCodeOrName => "Code and name are required",
            Toast::Created => "Stock added",
            Toast::CreateFailed => "Add failed (check for duplicate code)",
            Toast::MissingId => "Update failed (missing id)",
            Toast::InvalidId => "Update failed (invalid id)",
            Toast::StockNotFound => "No such stock",
            Toast::Updated => "Stock updated",
            Toast::UpdateFailed => "Update failed",
            Toast::DuplicateCode => "Update failed (duplicate code)",
            Toast::MissingDeleteCode => "Delete failed (missing code)",
            Toast::Deleted => "Stock deleted",
            Toast::NoSuchCode => "No such code",
            Toast::DeleteFailed => "Delete failed",
        }
    }
}

pub async fn create(store: &StockStore, form: StockForm) -> Toast {
    let pbr = parse_metric(form.pbr.as_deref());
    let per = parse_metric(form.per.as_deref());
    let Some(stock) = NewStock::new(form.stock_code.as_deref(), form.stock_name.as_deref(), pbr, per) else {
        warn!("Rejected create without code or name");
        return Toast::MissingCodeOrName;
    };

    match store.insert(&stock).await {
        Ok(id) => {
            info!("Created stock {} ({}) with id {}", stock.stock_code, stock.stock_name, id);
            Toast::Created
        }
        Err(e) => {
            warn!("Create of {} aborted during {}", stock.stock_code, e.operation());
            Toast::CreateFailed
        }
    }
}

/// Id-keyed update. Blank code or name keeps the stored value; blank ratios clear it.
pub async fn update(store: &StockStore, form: StockForm) -> Toast {
    let code = normalize_text(form.stock_code.as_deref());
    let name = normalize_text(form.stock_name.as_deref());
    let pbr = parse_metric(form.pbr.as_deref());
    let per = parse_metric(form.per.as_deref());

    info!(
        "Update received id={:?}, code={:?}, name={:?}, pbr={:?}, per={:?}",
        form.id, code, name, pbr, per
    );

    let Some(raw_id) = normalize_text(form.id.as_deref()) else {
        return Toast::MissingId;
    };
    let id = match raw_id.parse::<i64>() {
        Ok(id) if id > 0 => id,
        _ => {
            warn!("Rejected update with invalid id {:?}", raw_id);
            return Toast::InvalidId;
        }
    };

    let current = match store.find_by_id(id).await {
        Ok(Some(current)) => current,
        Ok(None) => return Toast::StockNotFound,
        Err(_) => return Toast::UpdateFailed,
    };

    let code = code.unwrap_or(current.stock_code);
    let name = name.or(current.stock_name);

    match store.update_by_id(id, &code, name.as_deref(), pbr, per).await {
        Ok(true) => {
            info!("Updated stock {} -> code={}, name={:?}", id, code, name);
            Toast::Updated
        }
        Ok(false) => Toast::UpdateFailed,
        Err(e) if e.is_constraint_violation() => {
            warn!("Update of {} rejected: code {} already exists", id, code);
            Toast::DuplicateCode
        }
        Err(_) => Toast::UpdateFailed,
    }
}

pub async fn delete(store: &StockStore, form: DeleteForm) -> Toast {
    let Some(code) = normalize_text(form.code.as_deref()) else {
        return Toast::MissingDeleteCode;
    };

    match store.delete_by_code(&code).await {
        Ok(true) => {
            info!("Deleted stock {}", code);
            Toast::Deleted
        }
        Ok(false) => Toast::NoSuchCode,
        Err(_) => Toast::DeleteFailed,
    }
}
