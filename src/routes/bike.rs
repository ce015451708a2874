use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use crate::{
    bike::service::{BikeFilter, BikeService},
    error::{AppError, AppResult},
    state::AppState,
    types::{BikeDto, BikePricePatch},
};

fn service(state: &AppState) -> BikeService {
    BikeService::new(state.db.clone())
}

#[derive(Debug, Deserialize)]
pub struct BikeFilterQuery {
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub typ: Option<String>,
}

/// GET /rest/bikes - listing with optional equality filters.
pub async fn list_bikes(
    State(state): State<AppState>,
    Query(query): Query<BikeFilterQuery>,
) -> AppResult<Response> {
    let filter = BikeFilter { brand: query.brand, typ: query.typ };
    let bikes = service(&state).find_all(filter).await?;
    Ok(Json(bikes).into_response())
}

/// GET /rest/bikes/{id}
pub async fn get_bike_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Response> {
    match service(&state).find_by_id(id).await? {
        Some(bike) => Ok(Json(bike).into_response()),
        None => Err(AppError::NotFound(format!("Es gibt kein Bike mit der ID {}.", id))),
    }
}

/// POST /rest/bikes - create, echoes the new entity.
pub async fn post_bike(
    State(state): State<AppState>,
    Json(dto): Json<BikeDto>,
) -> AppResult<Response> {
    if dto.price < 0.0 {
        return Err(AppError::InvalidInput(format!("price must not be negative: {}", dto.price)));
    }
    let bike = service(&state).create(dto).await?;
    let location = format!("/rest/bikes/{}", bike.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(bike)).into_response())
}

/// PUT /rest/bikes/{id} - full update.
pub async fn put_bike(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(dto): Json<BikeDto>,
) -> AppResult<Response> {
    if dto.price < 0.0 {
        return Err(AppError::InvalidInput(format!("price must not be negative: {}", dto.price)));
    }
    let bike = service(&state).update(id, dto).await?;
    Ok(Json(bike).into_response())
}

/// PATCH /rest/bikes/{id}/price - price-only update.
pub async fn patch_bike_price(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<BikePricePatch>,
) -> AppResult<Response> {
    let bike = service(&state).update_price(id, patch.price).await?;
    Ok(Json(bike).into_response())
}

/// POST /rest/bikes/image - multipart upload: bikeId, description,
/// contentType and the binary file field.
pub async fn upload_bike_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Response> {
    let mut bike_id: Option<i64> = None;
    let mut description: Option<String> = None;
    let mut content_type: Option<String> = None;
    let mut data: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("invalid multipart body: {}", e)))?
    {
        match field.name() {
            Some("bikeId") => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("invalid bikeId field: {}", e)))?;
                let id = raw
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| AppError::BadRequest(format!("invalid bikeId: {}", raw)))?;
                bike_id = Some(id);
            }
            Some("description") => {
                description = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(format!("invalid description: {}", e)))?,
                );
            }
            Some("contentType") => {
                content_type = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(format!("invalid contentType: {}", e)))?,
                );
            }
            Some("file") => {
                let field_content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("invalid file field: {}", e)))?;
                if content_type.is_none() {
                    content_type = field_content_type;
                }
                data = Some(bytes.to_vec());
            }
            _ => {}
        }
    }

    let bike_id = bike_id.ok_or_else(|| AppError::BadRequest("bikeId fehlt".to_string()))?;
    let data = data.ok_or_else(|| AppError::BadRequest("multipart field \"file\" fehlt".to_string()))?;

    let image_id = service(&state).insert_image(bike_id, description, content_type, data).await?;
    let location = format!("/rest/bikes/image?bikeId={}", bike_id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(serde_json::json!({ "id": image_id, "bikeId": bike_id })),
    )
        .into_response())
}

#[derive(Debug, Deserialize)]
pub struct BikeImageQuery {
    #[serde(rename = "bikeId")]
    pub bike_id: i64,
}

/// GET /rest/bikes/image?bikeId={id} - binary image download.
pub async fn get_bike_image(
    State(state): State<AppState>,
    Query(query): Query<BikeImageQuery>,
) -> AppResult<Response> {
    let image = service(&state).image_by_bike_id(query.bike_id).await?;
    let image = match image {
        Some(image) => image,
        None => {
            return Err(AppError::NotFound(format!(
                "Kein Bild zum Bike mit der ID {}.",
                query.bike_id
            )))
        }
    };
    let data = match image.data {
        Some(data) => data,
        None => {
            return Err(AppError::NotFound(format!(
                "Kein Bild zum Bike mit der ID {}.",
                query.bike_id
            )))
        }
    };
    let content_type = image.content_type.unwrap_or_else(|| "application/octet-stream".to_string());
    Ok(([(header::CONTENT_TYPE, content_type)], data).into_response())
}
