use axum::{
    extract::{Path, Query, State},
    Json,
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use crate::server::AppState;
use crate::query::QueryEngine;
use crate::storage::SqliteStore;
use crate::model::{CommitmentListing, Investor, InvestorSummary};
use std::sync::Arc;

#[derive(Deserialize)]
pub struct CommitmentParams {
    pub asset_class: Option<String>,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Serialize)]
pub struct InvestorListResponse {
    pub message: String,
    pub data: Vec<InvestorSummary>,
}

#[derive(Serialize)]
pub struct InvestorDetailResponse {
    pub message: String,
    pub data: Investor,
}

#[derive(Serialize)]
pub struct AssetClassListResponse {
    pub asset_classes: Vec<String>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(err: crate::Error) -> ApiError {
    match err {
        crate::Error::InvestorNotFound(id) => {
            tracing::debug!("Investor {} not found", id);
            (StatusCode::NOT_FOUND, Json(ErrorResponse { detail: "Investor not found".to_string() }))
        }
        other => {
            tracing::error!("Request failed: {}", other);
            (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse { detail: other.to_string() }))
        }
    }
}

/// Run a query against a store opened for this request only.
///
/// SQLite calls block, so the work runs on the blocking pool; the store is
/// dropped when the closure returns, whatever the outcome.
async fn with_engine<T, F>(state: &AppState, query: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&QueryEngine) -> crate::Result<T> + Send + 'static,
{
    let database_path = state.database_path.clone();
    tokio::task::spawn_blocking(move || {
        let store = SqliteStore::open(&database_path)?;
        let engine = QueryEngine::new(&store);
        query(&engine)
    })
    .await
    .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse { detail: e.to_string() })))?
    .map_err(api_error)
}

pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Investor Management API is running with SQLite DB".to_string(),
    })
}

pub async fn list_investors(State(state): State<Arc<AppState>>) -> Result<Json<InvestorListResponse>, ApiError> {
    let investors = with_engine(&state, |engine| engine.list_investors()).await?;

    Ok(Json(InvestorListResponse {
        message: "Investors fetched successfully".to_string(),
        data: investors,
    }))
}

pub async fn get_investor(
    State(state): State<Arc<AppState>>,
    Path(investor_id): Path<i64>,
) -> Result<Json<InvestorDetailResponse>, ApiError> {
    let investor = with_engine(&state, move |engine| engine.require_investor(investor_id)).await?;

    Ok(Json(InvestorDetailResponse {
        message: "Investor fetched successfully".to_string(),
        data: investor,
    }))
}

pub async fn get_investor_commitments(
    State(state): State<Arc<AppState>>,
    Path(investor_id): Path<i64>,
    Query(params): Query<CommitmentParams>,
) -> Result<Json<CommitmentListing>, ApiError> {
    let listing = with_engine(&state, move |engine| {
        engine.investor_commitments(investor_id, params.asset_class.as_deref())
    })
    .await?;

    Ok(Json(listing))
}

pub async fn list_commitments(State(state): State<Arc<AppState>>) -> Result<Json<CommitmentListing>, ApiError> {
    let listing = with_engine(&state, |engine| engine.list_all_commitments()).await?;
    Ok(Json(listing))
}

pub async fn list_asset_classes(State(state): State<Arc<AppState>>) -> Result<Json<AssetClassListResponse>, ApiError> {
    let asset_classes = with_engine(&state, |engine| engine.list_asset_classes()).await?;
    Ok(Json(AssetClassListResponse { asset_classes }))
}
