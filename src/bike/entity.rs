use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bike {
    pub id: i64,
    pub brand: String,
    pub typ: String,
    pub frame_size: Option<String>,
    pub price: f64,
    pub available: bool,
}

impl Bike {
    pub fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Bike {
            id: row.try_get("id")?,
            brand: row.try_get("brand")?,
            typ: row.try_get("typ")?,
            frame_size: row.try_get("frame_size")?,
            price: row.try_get("price")?,
            available: row.try_get("available")?,
        })
    }
}

/// Stored bike image; `data` stays out of JSON, it is served as binary.
#[derive(Debug, Clone)]
pub struct BikeImage {
    pub id: i64,
    pub bike_id: i64,
    pub description: Option<String>,
    pub content_type: Option<String>,
    pub data: Option<Vec<u8>>,
}

impl BikeImage {
    pub fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(BikeImage {
            id: row.try_get("id")?,
            bike_id: row.try_get("bike_id")?,
            description: row.try_get("description")?,
            content_type: row.try_get("content_type")?,
            data: row.try_get("data")?,
        })
    }
}
