use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::bike::entity::{Bike, BikeImage};
use crate::error::{AppError, AppResult};
use crate::types::BikeDto;

/// Optional equality filters for the bike listing.
#[derive(Debug, Clone, Default)]
pub struct BikeFilter {
    pub brand: Option<String>,
    pub typ: Option<String>,
}

/// Read and write access for Bikes. The listing supports plain equality
/// filters only; the Buch criteria compiler stays Buch-specific.
#[derive(Clone)]
pub struct BikeService {
    db: SqlitePool,
}

impl BikeService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn find_all(&self, filter: BikeFilter) -> AppResult<Vec<Bike>> {
        tracing::debug!("find_all: filter={:?}", filter);
        let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new(
            "SELECT id, brand, typ, frame_size, price, available FROM bike",
        );
        let mut first = true;
        if let Some(brand) = &filter.brand {
            qb.push(" WHERE brand = ");
            qb.push_bind(brand.clone());
            first = false;
        }
        if let Some(typ) = &filter.typ {
            qb.push(if first { " WHERE typ = " } else { " AND typ = " });
            qb.push_bind(typ.clone());
        }
        qb.push(" ORDER BY id");

        let rows = qb.build().fetch_all(&self.db).await?;
        rows.iter().map(Bike::from_row).collect::<Result<Vec<_>, _>>().map_err(AppError::from)
    }

    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<Bike>> {
        let row = sqlx::query(
            "SELECT id, brand, typ, frame_size, price, available FROM bike WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        match row {
            Some(row) => Ok(Some(Bike::from_row(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn create(&self, dto: BikeDto) -> AppResult<Bike> {
        tracing::debug!("create: brand={}, typ={}", dto.brand, dto.typ);
        let id = sqlx::query(
            "INSERT INTO bike (brand, typ, frame_size, price, available) VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&dto.brand)
        .bind(&dto.typ)
        .bind(&dto.frame_size)
        .bind(dto.price)
        .bind(dto.available)
        .execute(&self.db)
        .await?
        .last_insert_rowid();

        Ok(Bike {
            id,
            brand: dto.brand,
            typ: dto.typ,
            frame_size: dto.frame_size,
            price: dto.price,
            available: dto.available,
        })
    }

    pub async fn update(&self, id: i64, dto: BikeDto) -> AppResult<Bike> {
        tracing::debug!("update: id={}", id);
        let result = sqlx::query(
            "UPDATE bike SET brand = ?1, typ = ?2, frame_size = ?3, price = ?4, available = ?5 WHERE id = ?6",
        )
        .bind(&dto.brand)
        .bind(&dto.typ)
        .bind(&dto.frame_size)
        .bind(dto.price)
        .bind(dto.available)
        .bind(id)
        .execute(&self.db)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Es gibt kein Bike mit der ID {}.", id)));
        }
        Ok(Bike {
            id,
            brand: dto.brand,
            typ: dto.typ,
            frame_size: dto.frame_size,
            price: dto.price,
            available: dto.available,
        })
    }

    pub async fn update_price(&self, id: i64, price: f64) -> AppResult<Bike> {
        tracing::debug!("update_price: id={}, price={}", id, price);
        if price < 0.0 {
            return Err(AppError::InvalidInput(format!("price must not be negative: {}", price)));
        }
        let result =
            sqlx::query("UPDATE bike SET price = ?1 WHERE id = ?2").bind(price).bind(id).execute(&self.db).await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Es gibt kein Bike mit der ID {}.", id)));
        }
        match self.find_by_id(id).await? {
            Some(bike) => Ok(bike),
            None => Err(AppError::NotFound(format!("Es gibt kein Bike mit der ID {}.", id))),
        }
    }

    pub async fn insert_image(
        &self,
        bike_id: i64,
        description: Option<String>,
        content_type: Option<String>,
        data: Vec<u8>,
    ) -> AppResult<i64> {
        tracing::debug!("insert_image: bike_id={}, bytes={}", bike_id, data.len());

        let vorhanden: Option<i64> = sqlx::query_scalar("SELECT id FROM bike WHERE id = ?1")
            .bind(bike_id)
            .fetch_optional(&self.db)
            .await?;
        if vorhanden.is_none() {
            return Err(AppError::NotFound(format!("Es gibt kein Bike mit der ID {}.", bike_id)));
        }

        let id = sqlx::query(
            "INSERT INTO bike_image (description, content_type, bike_id, data) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&description)
        .bind(&content_type)
        .bind(bike_id)
        .bind(&data)
        .execute(&self.db)
        .await?
        .last_insert_rowid();
        Ok(id)
    }

    pub async fn image_by_bike_id(&self, bike_id: i64) -> AppResult<Option<BikeImage>> {
        let row = sqlx::query(
            "SELECT id, bike_id, description, content_type, data FROM bike_image WHERE bike_id = ?1 ORDER BY id DESC LIMIT 1",
        )
        .bind(bike_id)
        .fetch_optional(&self.db)
        .await?;
        match row {
            Some(row) => Ok(Some(BikeImage::from_row(&row)?)),
            None => Ok(None),
        }
    }
}
