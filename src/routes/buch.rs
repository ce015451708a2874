use std::collections::HashMap;

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use crate::{
    buch::pageable::Pageable,
    buch::read_service::BuchReadService,
    buch::suchkriterien::Suchkriterien,
    buch::write_service::BuchWriteService,
    error::{AppError, AppResult},
    state::AppState,
    types::{BuchDto, BuchDtoOhneRef},
};

fn read_service(state: &AppState) -> BuchReadService {
    BuchReadService::new(state.db.clone(), state.config.suche.clone())
}

fn write_service(state: &AppState) -> BuchWriteService {
    BuchWriteService::new(state.db.clone(), state.mailer.clone())
}

fn etag(version: i64) -> String {
    format!("\"{}\"", version)
}

#[derive(Debug, Deserialize)]
pub struct GetBuchQuery {
    #[serde(default)]
    pub abbildungen: Option<bool>,
}

/// GET /rest/buecher/{id} - single Buch, with ETag/If-None-Match handling.
pub async fn get_buch_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<GetBuchQuery>,
    headers: HeaderMap,
) -> AppResult<Response> {
    let mit_abbildungen = query.abbildungen.unwrap_or(false);
    let buch = read_service(&state).find_by_id(id, mit_abbildungen).await?;

    let version = etag(buch.version);
    if let Some(if_none_match) = headers.get(header::IF_NONE_MATCH).and_then(|v| v.to_str().ok()) {
        if if_none_match == version {
            return Ok(StatusCode::NOT_MODIFIED.into_response());
        }
    }

    Ok(([(header::ETAG, version)], Json(buch)).into_response())
}

/// GET /rest/buecher - criteria search with `size`/`page` pagination params.
pub async fn get_buecher(
    State(state): State<AppState>,
    Query(mut params): Query<HashMap<String, String>>,
) -> AppResult<Response> {
    let size = take_number(&mut params, "size")?;
    let number = take_number(&mut params, "page")?;
    let pageable = Pageable::new(size, number, &state.config.suche)?;

    let kriterien = if params.is_empty() { None } else { Some(Suchkriterien::from_params(params)) };
    let page = read_service(&state).find(kriterien, pageable).await?;
    Ok(Json(page).into_response())
}

fn take_number(params: &mut HashMap<String, String>, key: &str) -> AppResult<Option<i64>> {
    match params.remove(key) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<i64>()
            .map(Some)
            .map_err(|_| AppError::InvalidInput(format!("invalid {}: {}", key, raw))),
    }
}

/// POST /rest/buecher - create, 201 with Location header.
pub async fn post_buch(
    State(state): State<AppState>,
    Json(dto): Json<BuchDto>,
) -> AppResult<Response> {
    let id = write_service(&state).create(dto).await?;
    let location = format!("/rest/buecher/{}", id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)]).into_response())
}

/// PUT /rest/buecher/{id} - full update guarded by `If-Match`.
///
/// Missing header: 428. Malformed or stale version: 412. Success: 204 with
/// the new version as ETag.
pub async fn put_buch(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(dto): Json<BuchDtoOhneRef>,
) -> AppResult<Response> {
    let version = match headers.get(header::IF_MATCH).and_then(|v| v.to_str().ok()) {
        None => {
            return Err(AppError::PreconditionRequired("Header \"If-Match\" fehlt".to_string()))
        }
        Some(raw) => parse_if_match(raw)?,
    };

    let neue_version = write_service(&state).update(id, dto, version).await?;
    Ok((StatusCode::NO_CONTENT, [(header::ETAG, etag(neue_version))]).into_response())
}

fn parse_if_match(raw: &str) -> AppResult<i64> {
    raw.trim()
        .trim_matches('"')
        .parse::<i64>()
        .map_err(|_| AppError::PreconditionFailed(format!("Ungueltige Versionsnummer {}", raw)))
}

/// DELETE /rest/buecher/{id} - idempotent, always 204.
pub async fn delete_buch(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<Response> {
    write_service(&state).delete(id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

/// POST /rest/buecher/{id}/file - multipart upload of one binary attachment.
pub async fn upload_buch_file(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> AppResult<Response> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("invalid multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload").to_string();
        let mimetype = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("invalid file field: {}", e)))?
            .to_vec();
        if data.is_empty() {
            return Err(AppError::BadRequest("file must not be empty".to_string()));
        }

        write_service(&state).add_file(id, data, filename, mimetype).await?;
        let location = format!("/rest/buecher/{}/file", id);
        return Ok((StatusCode::NO_CONTENT, [(header::LOCATION, location)]).into_response());
    }
    Err(AppError::BadRequest("multipart field \"file\" fehlt".to_string()))
}

/// GET /rest/buecher/{id}/file - binary download with the stored mimetype.
pub async fn download_buch_file(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Response> {
    let file = read_service(&state).find_file_by_buch_id(id).await?;
    let file = match file {
        Some(file) => file,
        None => {
            return Err(AppError::NotFound(format!("Keine Datei zum Buch mit der ID {}.", id)))
        }
    };
    let content_type = file.mimetype.unwrap_or_else(|| "application/octet-stream".to_string());
    Ok(([(header::CONTENT_TYPE, content_type)], file.data).into_response())
}
