use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use tracing::info;

use crate::config::Config;
use crate::error::ApiError;
use crate::models::{Paste, PasteBody};
use crate::storage::{AnyStorage, Storage};

type IdQuery = Query<HashMap<String, String>>;

pub async fn list(
    State(config): State<Config>,
    State(storage): State<AnyStorage>,
) -> crate::ApiResult<Json<Vec<Paste>>> {
    let pastes = with_timeout(config.request_timeout(), storage.list_pastes()).await?;
    Ok(Json(pastes))
}

pub async fn create(
    State(config): State<Config>,
    State(storage): State<AnyStorage>,
    body: Result<Json<PasteBody>, JsonRejection>,
) -> crate::ApiResult<impl IntoResponse> {
    let Json(body) = body?;

    let paste = with_timeout(config.request_timeout(), storage.create_paste(&body.content)).await?;
    info!("new paste: id={}, size={}", paste.id, paste.content.len());

    Ok((StatusCode::CREATED, Json(paste)))
}

pub async fn get(
    State(config): State<Config>,
    State(storage): State<AnyStorage>,
    Query(params): IdQuery,
) -> crate::ApiResult<Json<Paste>> {
    let id = parse_id(&params)?;

    with_timeout(config.request_timeout(), storage.get_paste(id))
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

pub async fn update(
    State(config): State<Config>,
    State(storage): State<AnyStorage>,
    Query(params): IdQuery,
    body: Result<Json<PasteBody>, JsonRejection>,
) -> crate::ApiResult<Json<Paste>> {
    let id = parse_id(&params)?;
    let Json(body) = body?;

    let paste = with_timeout(
        config.request_timeout(),
        storage.update_paste(id, &body.content),
    )
    .await?;
    info!("updated paste: id={id}, size={}", paste.content.len());

    Ok(Json(paste))
}

pub async fn delete(
    State(config): State<Config>,
    State(storage): State<AnyStorage>,
    Query(params): IdQuery,
) -> crate::ApiResult<StatusCode> {
    let id = parse_id(&params)?;

    with_timeout(config.request_timeout(), storage.delete_paste(id)).await?;
    info!("deleted paste: id={id}");

    Ok(StatusCode::NO_CONTENT)
}

/// Answer a CORS preflight. The headers themselves come from the router.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

fn parse_id(params: &HashMap<String, String>) -> crate::ApiResult<i64> {
    match params.get("id").map(String::as_str) {
        None | Some("") => Err(ApiError::MissingId),
        Some(id) => Ok(id.parse()?),
    }
}

/// Run a store operation, failing it once `timeout` has elapsed.
async fn with_timeout<T>(
    timeout: Duration,
    operation: impl Future<Output = crate::ApiResult<T>>,
) -> crate::ApiResult<T> {
    tokio::time::timeout(timeout, operation)
        .await
        .map_err(|_| ApiError::Timeout(timeout))?
}
