//! In-memory stand-in for the ClubCollect API.
//!
//! Serves imports and invoice tickets with the same paths, pagination and
//! `api_key` query parameter as the real service, so the client can be
//! exercised end to end over HTTP.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const API_KEY: &str = "test-key";
pub const DEFAULT_PAGE_SIZE: usize = 2;

const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Import {
    pub import_id: String,
    pub company_id: String,
    pub title: Option<String>,
    pub expected_invoices_count: Option<i64>,
    pub transmitted: bool,
    pub created_at: String,
}

/// Tickets are served without `invoice_id`; clients know which invoice
/// they asked for.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Ticket {
    pub ticket_id: String,
    pub date: String,
    pub message: String,
    pub sender: String,
}

#[derive(Deserialize)]
pub struct CreateImport {
    pub title: Option<String>,
    pub company_id: String,
    pub expected_invoices_count: Option<i64>,
}

#[derive(Deserialize)]
pub struct UpdateImport {
    pub expected_invoices_count: Option<i64>,
}

#[derive(Deserialize)]
pub struct CreateTicket {
    pub message: String,
}

#[derive(Deserialize)]
pub struct RequestQuery {
    pub api_key: Option<String>,
    pub page: Option<usize>,
}

#[derive(Default)]
struct Store {
    imports: Vec<Import>,
    tickets: HashMap<String, Vec<Ticket>>,
}

#[derive(Clone)]
pub struct AppState {
    api_key: Arc<str>,
    page_size: usize,
    store: Arc<RwLock<Store>>,
}

type Failure = (StatusCode, Json<Value>);

fn failure(status: StatusCode, message: &str) -> Failure {
    (status, Json(json!({ "error": message })))
}

fn now() -> String {
    chrono::Utc::now().format(DATETIME_FORMAT).to_string()
}

impl AppState {
    fn authorize(&self, query: &RequestQuery) -> Result<(), Failure> {
        match query.api_key.as_deref() {
            Some(key) if key == &*self.api_key => Ok(()),
            _ => Err(failure(StatusCode::UNAUTHORIZED, "invalid api_key")),
        }
    }

    /// Items of the 1-based `page`; pages past the end are empty.
    fn page<T: Clone>(&self, items: &[T], page: Option<usize>) -> Result<Vec<T>, Failure> {
        let page = page.unwrap_or(1);
        if page == 0 {
            return Err(failure(StatusCode::BAD_REQUEST, "page starts at 1"));
        }
        Ok(items
            .iter()
            .skip((page - 1).saturating_mul(self.page_size))
            .take(self.page_size)
            .cloned()
            .collect())
    }

    fn page_info(&self, count: usize) -> Json<Value> {
        Json(json!({ "total_pages": count.div_ceil(self.page_size) }))
    }
}

pub fn app() -> Router {
    app_with(API_KEY, DEFAULT_PAGE_SIZE)
}

pub fn app_with(api_key: &str, page_size: usize) -> Router {
    let state = AppState {
        api_key: api_key.into(),
        page_size: page_size.max(1),
        store: Arc::new(RwLock::new(Store::default())),
    };
    Router::new()
        .route("/imports", post(create_import))
        .route(
            "/imports/{id}",
            get(get_import).put(update_import).delete(delete_import),
        )
        .route("/imports/{id}/transmit", put(transmit_import))
        .route("/companies/{company_id}/imports", get(list_imports))
        .route("/companies/{company_id}/imports/page_info", get(imports_page_info))
        .route("/invoices/{invoice_id}/ticket", post(create_ticket))
        .route("/invoices/{invoice_id}/tickets", get(list_tickets))
        .route("/invoices/{invoice_id}/tickets/page_info", get(tickets_page_info))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    serve(listener, app()).await
}

pub async fn serve(listener: TcpListener, app: Router) -> Result<(), std::io::Error> {
    axum::serve(listener, app).await
}

async fn create_import(
    State(state): State<AppState>,
    Query(query): Query<RequestQuery>,
    Json(input): Json<CreateImport>,
) -> Result<(StatusCode, Json<Import>), Failure> {
    state.authorize(&query)?;
    let import = Import {
        import_id: Uuid::new_v4().to_string(),
        company_id: input.company_id,
        title: input.title,
        expected_invoices_count: input.expected_invoices_count,
        transmitted: false,
        created_at: now(),
    };
    tracing::info!(import_id = %import.import_id, "import created");
    state.store.write().await.imports.push(import.clone());
    Ok((StatusCode::CREATED, Json(import)))
}

async fn get_import(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<RequestQuery>,
) -> Result<Json<Import>, Failure> {
    state.authorize(&query)?;
    let store = state.store.read().await;
    store
        .imports
        .iter()
        .find(|import| import.import_id == id)
        .cloned()
        .map(Json)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "import not found"))
}

async fn update_import(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<RequestQuery>,
    Json(input): Json<UpdateImport>,
) -> Result<Json<Import>, Failure> {
    state.authorize(&query)?;
    let mut store = state.store.write().await;
    let import = store
        .imports
        .iter_mut()
        .find(|import| import.import_id == id)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "import not found"))?;
    if input.expected_invoices_count.is_some() {
        import.expected_invoices_count = input.expected_invoices_count;
    }
    Ok(Json(import.clone()))
}

async fn transmit_import(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<RequestQuery>,
) -> Result<Json<Import>, Failure> {
    state.authorize(&query)?;
    let mut store = state.store.write().await;
    let import = store
        .imports
        .iter_mut()
        .find(|import| import.import_id == id)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "import not found"))?;
    if import.transmitted {
        return Err(failure(StatusCode::UNPROCESSABLE_ENTITY, "import already transmitted"));
    }
    import.transmitted = true;
    Ok(Json(import.clone()))
}

async fn delete_import(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<RequestQuery>,
) -> Result<StatusCode, Failure> {
    state.authorize(&query)?;
    let mut store = state.store.write().await;
    let before = store.imports.len();
    store.imports.retain(|import| import.import_id != id);
    if store.imports.len() == before {
        return Err(failure(StatusCode::NOT_FOUND, "import not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn list_imports(
    State(state): State<AppState>,
    Path(company_id): Path<String>,
    Query(query): Query<RequestQuery>,
) -> Result<Json<Vec<Import>>, Failure> {
    state.authorize(&query)?;
    let store = state.store.read().await;
    let imports: Vec<Import> = store
        .imports
        .iter()
        .filter(|import| import.company_id == company_id)
        .cloned()
        .collect();
    state.page(&imports, query.page).map(Json)
}

async fn imports_page_info(
    State(state): State<AppState>,
    Path(company_id): Path<String>,
    Query(query): Query<RequestQuery>,
) -> Result<Json<Value>, Failure> {
    state.authorize(&query)?;
    let store = state.store.read().await;
    let count = store
        .imports
        .iter()
        .filter(|import| import.company_id == company_id)
        .count();
    Ok(state.page_info(count))
}

async fn create_ticket(
    State(state): State<AppState>,
    Path(invoice_id): Path<String>,
    Query(query): Query<RequestQuery>,
    Json(input): Json<CreateTicket>,
) -> Result<(StatusCode, Json<Ticket>), Failure> {
    state.authorize(&query)?;
    let ticket = Ticket {
        ticket_id: Uuid::new_v4().to_string(),
        date: now(),
        message: input.message,
        sender: "club".to_string(),
    };
    state
        .store
        .write()
        .await
        .tickets
        .entry(invoice_id)
        .or_default()
        .push(ticket.clone());
    Ok((StatusCode::CREATED, Json(ticket)))
}

async fn list_tickets(
    State(state): State<AppState>,
    Path(invoice_id): Path<String>,
    Query(query): Query<RequestQuery>,
) -> Result<Json<Vec<Ticket>>, Failure> {
    state.authorize(&query)?;
    let store = state.store.read().await;
    let tickets = store.tickets.get(&invoice_id).map(Vec::as_slice).unwrap_or_default();
    state.page(tickets, query.page).map(Json)
}

async fn tickets_page_info(
    State(state): State<AppState>,
    Path(invoice_id): Path<String>,
    Query(query): Query<RequestQuery>,
) -> Result<Json<Value>, Failure> {
    state.authorize(&query)?;
    let store = state.store.read().await;
    let count = store.tickets.get(&invoice_id).map_or(0, Vec::len);
    Ok(state.page_info(count))
}
