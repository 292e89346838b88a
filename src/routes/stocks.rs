use axum::extract::{Query, State};
use axum::response::{Html, Redirect};
use axum::routing::{get, post, MethodRouter};
use axum::{Form, Router};
use tracing::{error, info};

use crate::errors::AppError;
use crate::models::{DeleteForm, EditParams, ListOrder, ListParams, StockForm};
use crate::services::stock_service::{self, Toast};
use crate::state::AppState;
use crate::views::{self, ListView};

pub const MOUNT_PATH: &str = "/stocks";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", list_route())
        .route("/list", viewing(get(list_stocks)))
        .route("/new", viewing(get(new_form)))
        .route("/edit", viewing(get(edit_form)))
        .route("/create", mutating(post(create_stock)))
        .route("/update", mutating(post(update_stock)))
        .route("/delete", mutating(post(delete_stock)))
}

/// List handler with its method guard, also mounted at the trailing-slash mount root.
pub fn list_route() -> MethodRouter<AppState> {
    viewing(get(list_stocks))
}

fn viewing(route: MethodRouter<AppState>) -> MethodRouter<AppState> {
    route.fallback(|| async { AppError::MethodNotAllowed("GET") })
}

fn mutating(route: MethodRouter<AppState>) -> MethodRouter<AppState> {
    route.fallback(|| async { AppError::MethodNotAllowed("POST") })
}

pub async fn list_stocks(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Html<String>, AppError> {
    info!("GET {}/list - mode={:?}, q={:?}", MOUNT_PATH, params.mode, params.q);

    let order = ListOrder::from_mode(params.mode.as_deref());
    let query = params.q.as_deref().map(str::trim).filter(|q| !q.is_empty());

    let stocks = match query {
        Some(q) => state.store.search(Some(q)).await,
        None => state.store.list_all(order).await,
    }
    .map_err(|e| {
        error!("Failed to list stocks: {}", e);
        e
    })?;

    Ok(Html(views::render_list(&ListView {
        stocks: &stocks,
        order,
        query,
        toast: params.toast.as_deref(),
    })))
}

pub async fn new_form() -> Html<String> {
    info!("GET {}/new - Rendering blank form", MOUNT_PATH);
    Html(views::render_form(None))
}

pub async fn edit_form(
    State(state): State<AppState>,
    Query(params): Query<EditParams>,
) -> Result<Html<String>, AppError> {
    info!("GET {}/edit - code={:?}", MOUNT_PATH, params.code);

    let prefill = match params.code.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        Some(code) => state.store.find_by_code(code).await?,
        None => None,
    };
    Ok(Html(views::render_form(prefill.as_ref())))
}

pub async fn create_stock(State(state): State<AppState>, Form(form): Form<StockForm>) -> Redirect {
    info!("POST {}/create - Creating stock", MOUNT_PATH);
    redirect_with_toast(stock_service::create(&state.store, form).await)
}

pub async fn update_stock(State(state): State<AppState>, Form(form): Form<StockForm>) -> Redirect {
    info!("POST {}/update - Updating stock", MOUNT_PATH);
    redirect_with_toast(stock_service::update(&state.store, form).await)
}

pub async fn delete_stock(State(state): State<AppState>, Form(form): Form<DeleteForm>) -> Redirect {
    info!("POST {}/delete - Deleting stock", MOUNT_PATH);
    redirect_with_toast(stock_service::delete(&state.store, form).await)
}

fn redirect_with_toast(toast: Toast) -> Redirect {
    let encoded: String = url::form_urlencoded::byte_serialize(toast.message().as_bytes()).collect();
    Redirect::to(&format!("{}/list?toast={}", MOUNT_PATH, encoded))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use axum::response::Response;
    use tower::ServiceExt;

    use crate::app::create_app;
    use crate::store::stocks::tests::{close, memory_store};

    async fn app() -> Router {
        create_app(AppState { store: memory_store().await })
    }

    async fn send(app: &Router, method: Method, uri: &str, form: Option<&str>) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match form {
            Some(form) => {
                builder = builder.header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
                Body::from(form.to_string())
            }
            None => Body::empty(),
        };
        app.clone().oneshot(builder.body(body).unwrap()).await.unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn location(response: &Response) -> &str {
        response.headers().get(header::LOCATION).unwrap().to_str().unwrap()
    }

    #[tokio::test]
    async fn test_list_routes_render() {
        let app = app().await;
        for uri in ["/stocks", "/stocks/", "/stocks/list", "/stocks/list?mode=inserted&q=x"] {
            let response = send(&app, Method::GET, uri, None).await;
            assert_eq!(response.status(), StatusCode::OK, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_get_on_mutating_path_is_method_not_allowed() {
        let app = app().await;
        for uri in ["/stocks/create", "/stocks/update", "/stocks/delete"] {
            let response = send(&app, Method::GET, uri, None).await;
            assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
            assert_eq!(response.headers().get(header::ALLOW).unwrap(), "POST");
            assert_eq!(body_text(response).await, "Method Not Allowed. Use POST");
        }
    }

    #[tokio::test]
    async fn test_post_on_view_path_is_method_not_allowed() {
        let app = app().await;
        for uri in ["/stocks", "/stocks/", "/stocks/list", "/stocks/new", "/stocks/edit"] {
            let response = send(&app, Method::POST, uri, Some("")).await;
            assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
            assert_eq!(response.headers().get(header::ALLOW).unwrap(), "GET");
        }
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_found() {
        let app = app().await;
        let response = send(&app, Method::GET, "/stocks/archive", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let response = send(&app, Method::POST, "/nowhere", Some("")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_redirects_with_toast() {
        let app = app().await;
        let response = send(
            &app,
            Method::POST,
            "/stocks/create",
            Some("stockCode=005930&stockName=Samsung&pbr=1.2&per=10.5"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/stocks/list?toast=Stock+added");

        let listed = body_text(send(&app, Method::GET, "/stocks/list", None).await).await;
        assert!(listed.contains("<td>005930</td><td>Samsung</td><td>1.2</td><td>10.5</td>"));

        let duplicate = send(&app, Method::POST, "/stocks/create", Some("stockCode=005930&stockName=Again")).await;
        assert_eq!(
            location(&duplicate),
            "/stocks/list?toast=Add+failed+%28check+for+duplicate+code%29"
        );

        let blank = send(&app, Method::POST, "/stocks/create", Some("stockCode=&stockName=X")).await;
        assert_eq!(location(&blank), "/stocks/list?toast=Code+and+name+are+required");
    }

    #[tokio::test]
    async fn test_edit_form_prefills_when_code_resolves() {
        let app = app().await;
        send(&app, Method::POST, "/stocks/create", Some("stockCode=000660&stockName=SK+Hynix")).await;

        let filled = body_text(send(&app, Method::GET, "/stocks/edit?code=000660", None).await).await;
        assert!(filled.contains(r#"name="id" value="1""#));
        assert!(filled.contains(r#"value="SK Hynix""#));

        let missing = send(&app, Method::GET, "/stocks/edit?code=999999", None).await;
        assert_eq!(missing.status(), StatusCode::OK);
        assert!(body_text(missing).await.contains("/stocks/create"));
    }

    #[tokio::test]
    async fn test_update_and_delete_flow() {
        let app = app().await;
        send(&app, Method::POST, "/stocks/create", Some("stockCode=005930&stockName=Samsung&pbr=1.2")).await;

        let updated = send(&app, Method::POST, "/stocks/update", Some("id=1&stockCode=005930&stockName=&pbr=&per=9.0")).await;
        assert_eq!(location(&updated), "/stocks/list?toast=Stock+updated");

        let missing_id = send(&app, Method::POST, "/stocks/update", Some("stockCode=005930")).await;
        assert_eq!(location(&missing_id), "/stocks/list?toast=Update+failed+%28missing+id%29");

        let listed = body_text(send(&app, Method::GET, "/stocks/list?q=Sams", None).await).await;
        assert!(listed.contains("<td>Samsung</td><td>-</td><td>9</td>"));

        let deleted = send(&app, Method::POST, "/stocks/delete", Some("code=005930")).await;
        assert_eq!(location(&deleted), "/stocks/list?toast=Stock+deleted");

        let again = send(&app, Method::POST, "/stocks/delete", Some("code=005930")).await;
        assert_eq!(location(&again), "/stocks/list?toast=No+such+code");
    }

    #[tokio::test]
    async fn test_storage_failure_still_redirects_with_toast() {
        let store = memory_store().await;
        let app = create_app(AppState { store: store.clone() });
        close(&store).await;

        let created = send(&app, Method::POST, "/stocks/create", Some("stockCode=005930&stockName=Samsung")).await;
        assert_eq!(created.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            location(&created),
            "/stocks/list?toast=Add+failed+%28check+for+duplicate+code%29"
        );

        let updated = send(&app, Method::POST, "/stocks/update", Some("id=1&stockCode=005930")).await;
        assert_eq!(updated.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&updated), "/stocks/list?toast=Update+failed");

        let deleted = send(&app, Method::POST, "/stocks/delete", Some("code=005930")).await;
        assert_eq!(deleted.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&deleted), "/stocks/list?toast=Delete+failed");

        let listed = send(&app, Method::GET, "/stocks/list", None).await;
        assert_eq!(listed.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
