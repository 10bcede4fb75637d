//! Produce, consume and offsets endpoints.
//!
//! Handlers hop to the blocking storage engine via `spawn_blocking` so disk
//! I/O never stalls a runtime worker. `OffsetOutOfRange` is the one error a
//! client can legitimately cause and maps to 404; everything else is a server
//! fault and maps to 500.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::{debug, warn};

use loghouse_core::Error;

use crate::models::{
    ConsumeParams, ConsumeResponse, OffsetsResponse, ProduceRequest, ProduceResponse,
};
use crate::AppState;

type HandlerError = (StatusCode, String);

pub async fn produce(
    State(state): State<AppState>,
    Json(req): Json<ProduceRequest>,
) -> Result<Json<ProduceResponse>, HandlerError> {
    let log = state.log.clone();
    let offset = tokio::task::spawn_blocking(move || log.append(&req.record))
        .await
        .map_err(join_error)?
        .map_err(error_response)?;

    debug!(offset, "produced record");
    Ok(Json(ProduceResponse { offset }))
}

pub async fn consume(
    State(state): State<AppState>,
    Query(params): Query<ConsumeParams>,
) -> Result<Json<ConsumeResponse>, HandlerError> {
    let log = state.log.clone();
    let record = tokio::task::spawn_blocking(move || log.read(params.offset))
        .await
        .map_err(join_error)?
        .map_err(error_response)?;

    Ok(Json(ConsumeResponse { record }))
}

pub async fn offsets(State(state): State<AppState>) -> Json<OffsetsResponse> {
    Json(OffsetsResponse {
        lowest: state.log.lowest_offset(),
        highest: state.log.highest_offset(),
    })
}

fn error_response(err: Error) -> HandlerError {
    let status = match err {
        Error::OffsetOutOfRange(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        warn!(%err, "request failed");
    }
    (status, err.to_string())
}

fn join_error(err: tokio::task::JoinError) -> HandlerError {
    warn!(%err, "storage task failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "storage task failed".to_string(),
    )
}
