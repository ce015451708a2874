use sqlx::SqlitePool;

use crate::error::{AppError, AppResult};
use crate::mail::Mailer;
use crate::types::{BuchDto, BuchDtoOhneRef};

/// Write access for Buecher: create, update with optimistic locking, delete
/// and the binary attachment upsert.
#[derive(Clone)]
pub struct BuchWriteService {
    db: SqlitePool,
    mailer: Mailer,
}

impl BuchWriteService {
    pub fn new(db: SqlitePool, mailer: Mailer) -> Self {
        Self { db, mailer }
    }

    /// Creates a Buch with its Titel and Abbildungen in one transaction and
    /// fires a best-effort creation mail. Returns the new id.
    pub async fn create(&self, dto: BuchDto) -> AppResult<i64> {
        tracing::debug!("create: isbn={}, titel={}", dto.isbn, dto.titel.titel);
        validate_stammdaten(dto.rating, dto.preis, dto.rabatt)?;

        let vorhanden: Option<i64> = sqlx::query_scalar("SELECT id FROM buch WHERE isbn = ?1")
            .bind(&dto.isbn)
            .fetch_optional(&self.db)
            .await?;
        if vorhanden.is_some() {
            return Err(AppError::Conflict(format!("Die ISBN {} existiert bereits", dto.isbn)));
        }

        let schlagwoerter = match &dto.schlagwoerter {
            Some(woerter) => Some(serde_json::to_string(woerter).map_err(anyhow::Error::from)?),
            None => None,
        };
        let jetzt = chrono::Utc::now().to_rfc3339();

        let mut tx = self.db.begin().await?;

        let buch_id = sqlx::query(
            r#"INSERT INTO buch
               (version, isbn, rating, art, preis, rabatt, lieferbar, datum, homepage, schlagwoerter, erzeugt, aktualisiert)
               VALUES (0, ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)"#,
        )
        .bind(&dto.isbn)
        .bind(dto.rating)
        .bind(dto.art.map(|a| a.as_str()))
        .bind(dto.preis)
        .bind(dto.rabatt)
        .bind(dto.lieferbar)
        .bind(&dto.datum)
        .bind(&dto.homepage)
        .bind(&schlagwoerter)
        .bind(&jetzt)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        sqlx::query("INSERT INTO titel (titel, untertitel, buch_id) VALUES (?1, ?2, ?3)")
            .bind(&dto.titel.titel)
            .bind(&dto.titel.untertitel)
            .bind(buch_id)
            .execute(&mut *tx)
            .await?;

        if let Some(abbildungen) = &dto.abbildungen {
            for abbildung in abbildungen {
                sqlx::query(
                    "INSERT INTO abbildung (beschriftung, content_type, buch_id) VALUES (?1, ?2, ?3)",
                )
                .bind(&abbildung.beschriftung)
                .bind(&abbildung.content_type)
                .bind(buch_id)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        tracing::debug!("create: buch_id={}", buch_id);

        let subject = format!("Neues Buch {}", buch_id);
        let body = format!("Das Buch mit dem Titel <strong>{}</strong> ist angelegt", dto.titel.titel);
        self.mailer.send(&subject, &body).await;

        Ok(buch_id)
    }

    /// Full update of the scalar fields with optimistic locking.
    ///
    /// `version` must equal the stored version; on success the version is
    /// incremented and returned. A stale version yields the 412 signal.
    pub async fn update(&self, id: i64, dto: BuchDtoOhneRef, version: i64) -> AppResult<i64> {
        tracing::debug!("update: id={}, version={}", id, version);
        validate_stammdaten(dto.rating, dto.preis, dto.rabatt)?;

        let schlagwoerter = match &dto.schlagwoerter {
            Some(woerter) => Some(serde_json::to_string(woerter).map_err(anyhow::Error::from)?),
            None => None,
        };
        let jetzt = chrono::Utc::now().to_rfc3339();

        let result = sqlx::query(
            r#"UPDATE buch
               SET version = version + 1, isbn = ?1, rating = ?2, art = ?3, preis = ?4,
                   rabatt = ?5, lieferbar = ?6, datum = ?7, homepage = ?8,
                   schlagwoerter = ?9, aktualisiert = ?10
               WHERE id = ?11 AND version = ?12"#,
        )
        .bind(&dto.isbn)
        .bind(dto.rating)
        .bind(dto.art.map(|a| a.as_str()))
        .bind(dto.preis)
        .bind(dto.rabatt)
        .bind(dto.lieferbar)
        .bind(&dto.datum)
        .bind(&dto.homepage)
        .bind(&schlagwoerter)
        .bind(&jetzt)
        .bind(id)
        .bind(version)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            let aktuelle: Option<i64> =
                sqlx::query_scalar("SELECT version FROM buch WHERE id = ?1")
                    .bind(id)
                    .fetch_optional(&self.db)
                    .await?;
            return match aktuelle {
                None => Err(AppError::NotFound(format!("Es gibt kein Buch mit der ID {}.", id))),
                Some(aktuelle) => Err(AppError::PreconditionFailed(format!(
                    "Die Versionsnummer {} ist veraltet, aktuell ist {}",
                    version, aktuelle
                ))),
            };
        }

        Ok(version + 1)
    }

    /// Deletes a Buch; related rows cascade. Idempotent.
    pub async fn delete(&self, id: i64) -> AppResult<bool> {
        tracing::debug!("delete: id={}", id);
        let result = sqlx::query("DELETE FROM buch WHERE id = ?1").bind(id).execute(&self.db).await?;
        Ok(result.rows_affected() > 0)
    }

    /// Stores the binary attachment of a Buch, replacing any existing one.
    pub async fn add_file(
        &self,
        buch_id: i64,
        data: Vec<u8>,
        filename: String,
        mimetype: Option<String>,
    ) -> AppResult<()> {
        tracing::debug!("add_file: buch_id={}, filename={}, bytes={}", buch_id, filename, data.len());

        let vorhanden: Option<i64> = sqlx::query_scalar("SELECT id FROM buch WHERE id = ?1")
            .bind(buch_id)
            .fetch_optional(&self.db)
            .await?;
        if vorhanden.is_none() {
            return Err(AppError::NotFound(format!("Es gibt kein Buch mit der ID {}.", buch_id)));
        }

        sqlx::query(
            r#"INSERT INTO buch_file (buch_id, filename, mimetype, data)
               VALUES (?1, ?2, ?3, ?4)
               ON CONFLICT(buch_id) DO UPDATE SET
                   filename = excluded.filename,
                   mimetype = excluded.mimetype,
                   data = excluded.data"#,
        )
        .bind(buch_id)
        .bind(&filename)
        .bind(&mimetype)
        .bind(&data)
        .execute(&self.db)
        .await?;
        Ok(())
    }
}

fn validate_stammdaten(rating: Option<i64>, preis: f64, rabatt: Option<f64>) -> AppResult<()> {
    if let Some(rating) = rating {
        if !(0..=5).contains(&rating) {
            return Err(AppError::InvalidInput(format!("rating must be in 0..=5: {}", rating)));
        }
    }
    if preis < 0.0 {
        return Err(AppError::InvalidInput(format!("preis must not be negative: {}", preis)));
    }
    if let Some(rabatt) = rabatt {
        if !(0.0..=1.0).contains(&rabatt) {
            return Err(AppError::InvalidInput(format!("rabatt must be in 0..=1: {}", rabatt)));
        }
    }
    Ok(())
}
