use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use crate::{
    AppState,
    config::PersonSheet,
    error::AppError,
    models::{CategoryFilter, Dataset, FilterSelection, Scope, COMBINED_SCOPE},
    services::{
        export::{self, EXPORT_FILE_NAME},
        query::{self, DashboardView, FilterOptions},
    },
};
use tower_http::cors::{CorsLayer, Any};

pub fn routes() -> Router<Arc<AppState>> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(3600));

    Router::new()
        .route("/api/people", get(list_people))
        .route("/api/options", get(options))
        .route("/api/view", get(view))
        .route("/api/reload", post(reload))
        .route("/api/export", get(export_rows))
        .layer(cors)
}

/// Query string shared by the options, view and export endpoints. Empty
/// values count as absent.
#[derive(Debug, Default, Deserialize)]
pub struct SelectionQuery {
    person: Option<String>,
    month: Option<String>,
    category: Option<String>,
    expense: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl SelectionQuery {
    /// Falls back to the first loaded person, like the dashboard's initial view.
    fn scope(&self, dataset: &Dataset) -> Result<Scope, AppError> {
        match non_empty(&self.person) {
            Some(person) => Ok(Scope::from(person)),
            None => dataset
                .people()
                .next()
                .map(Scope::person)
                .ok_or(AppError::NoData),
        }
    }

    fn selection(&self, dataset: &Dataset) -> Result<FilterSelection, AppError> {
        Ok(FilterSelection {
            scope: self.scope(dataset)?,
            month: non_empty(&self.month).map(str::to_string),
            category: non_empty(&self.category)
                .map(CategoryFilter::from)
                .unwrap_or_default(),
            expense: non_empty(&self.expense).map(str::to_string),
        })
    }
}

fn current_dataset(state: &AppState) -> Result<Arc<Dataset>, AppError> {
    state.store.snapshot().ok_or(AppError::NoData)
}

#[derive(Debug, Serialize)]
pub struct PeopleResponse {
    people: Vec<PersonSheet>,
    combined: &'static str,
}

async fn list_people(State(state): State<Arc<AppState>>) -> Json<PeopleResponse> {
    Json(PeopleResponse {
        people: state.config.people.clone(),
        combined: COMBINED_SCOPE,
    })
}

async fn options(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SelectionQuery>,
) -> Result<Json<FilterOptions>, AppError> {
    let dataset = current_dataset(&state)?;
    let scope = params.scope(&dataset)?;
    Ok(Json(query::available_options(&dataset, &scope)?))
}

async fn view(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SelectionQuery>,
) -> Result<Json<DashboardView>, AppError> {
    let dataset = current_dataset(&state)?;
    let selection = params.selection(&dataset)?;
    Ok(Json(query::filtered_view(&dataset, &selection)?))
}

#[derive(Debug, Serialize)]
pub struct TableSummary {
    person: String,
    sheet: String,
    rows: usize,
    months: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ReloadSummary {
    people: Vec<TableSummary>,
    combined_rows: usize,
    elapsed_ms: u128,
}

/// Reloads from the configured workbook, or from an xlsx sent as the request body.
async fn reload(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ReloadSummary>, AppError> {
    let start = std::time::Instant::now();

    let worker = Arc::clone(&state);
    let dataset = if body.is_empty() {
        tracing::info!("Reload requested for {}", state.config.workbook_path.display());
        tokio::task::spawn_blocking(move || {
            worker.store.reload(&worker.config.workbook_path, &worker.config.people)
        })
        .await??
    } else {
        tracing::info!("Reload requested from uploaded workbook, size: {}KB", body.len() / 1024);
        tokio::task::spawn_blocking(move || {
            worker.store.reload_from_bytes(body, &worker.config.people)
        })
        .await??
    };

    Ok(Json(ReloadSummary {
        people: dataset
            .tables()
            .iter()
            .map(|table| TableSummary {
                person: table.person.clone(),
                sheet: table.sheet.clone(),
                rows: table.records.len(),
                months: table.months(),
            })
            .collect(),
        combined_rows: dataset.combined().len(),
        elapsed_ms: start.elapsed().as_millis(),
    }))
}

async fn export_rows(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SelectionQuery>,
) -> Result<Response, AppError> {
    let dataset = current_dataset(&state)?;
    let selection = params.selection(&dataset)?;
    let rows = query::filtered_rows(&dataset, &selection)?;

    match export::export_csv(&rows)? {
        None => {
            tracing::info!("Export skipped: no rows for {}", selection.scope);
            Ok(StatusCode::NO_CONTENT.into_response())
        }
        Some(bytes) => Ok((
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", EXPORT_FILE_NAME),
                ),
            ],
            bytes,
        )
            .into_response()),
    }
}
