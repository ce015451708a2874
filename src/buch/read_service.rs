use sqlx::{Row, SqlitePool};

use crate::buch::entity::{Abbildung, Buch, BuchFile};
use crate::buch::pageable::Pageable;
use crate::buch::query_builder;
use crate::buch::suchkriterien::Suchkriterien;
use crate::config::SucheConfig;
use crate::error::{AppError, AppResult};
use crate::types::Page;

/// Read access for Buecher: criteria search with paging plus id lookup.
///
/// Pure translation layer over the store - it never creates or mutates
/// entities. Validation failures and empty result sets surface as the same
/// not-found signal; store failures propagate unchanged.
#[derive(Clone)]
pub struct BuchReadService {
    db: SqlitePool,
    suche: SucheConfig,
}

impl BuchReadService {
    pub fn new(db: SqlitePool, suche: SucheConfig) -> Self {
        Self { db, suche }
    }

    /// Criteria search returning one page plus the independent total count.
    pub async fn find(
        &self,
        kriterien: Option<Suchkriterien>,
        pageable: Pageable,
    ) -> AppResult<Page<Buch>> {
        tracing::debug!("find: kriterien={:?}, pageable={:?}", kriterien, pageable);

        let kriterien = match kriterien {
            None => return self.find_all(pageable).await,
            Some(k) if k.is_empty() => return self.find_all(pageable).await,
            Some(k) => k,
        };

        // Falsche Namen oder ungueltige Enum-Werte?
        let invalid = kriterien.invalid_keys();
        if !invalid.is_empty() {
            tracing::debug!("find: ungueltige Suchkriterien {:?}", invalid);
            return Err(AppError::NotFound("Ungueltige Suchkriterien".to_string()));
        }
        if !kriterien.art_ok() {
            tracing::debug!("find: ungueltige art");
            return Err(AppError::NotFound("Ungueltige Suchkriterien".to_string()));
        }

        let mut query = query_builder::select_query(&kriterien, pageable, &self.suche);
        let rows = query.build().fetch_all(&self.db).await?;
        let buecher =
            rows.iter().map(Buch::from_row).collect::<Result<Vec<_>, sqlx::Error>>()?;
        if buecher.is_empty() {
            return Err(AppError::NotFound(format!(
                "Keine Buecher gefunden: {:?}, Seite {}",
                kriterien, pageable.number
            )));
        }

        let mut count = query_builder::count_query(&kriterien, &self.suche);
        let total_elements: i64 = count.build_query_scalar().fetch_one(&self.db).await?;
        Ok(Page { content: buecher, total_elements })
    }

    async fn find_all(&self, pageable: Pageable) -> AppResult<Page<Buch>> {
        let leer = Suchkriterien::default();
        let mut query = query_builder::select_query(&leer, pageable, &self.suche);
        let rows = query.build().fetch_all(&self.db).await?;
        let buecher =
            rows.iter().map(Buch::from_row).collect::<Result<Vec<_>, sqlx::Error>>()?;
        if buecher.is_empty() {
            return Err(AppError::NotFound(format!("Ungueltige Seite \"{}\"", pageable.number)));
        }
        let mut count = query_builder::count_query(&leer, &self.suche);
        let total_elements: i64 = count.build_query_scalar().fetch_one(&self.db).await?;
        Ok(Page { content: buecher, total_elements })
    }

    /// Lookup by id, optionally with the related Abbildungen.
    pub async fn find_by_id(&self, id: i64, mit_abbildungen: bool) -> AppResult<Buch> {
        tracing::debug!("find_by_id: id={}, mit_abbildungen={}", id, mit_abbildungen);

        let mut query = query_builder::select_by_id_query(id);
        let row = query.build().fetch_optional(&self.db).await?;
        let row = match row {
            Some(row) => row,
            None => {
                return Err(AppError::NotFound(format!("Es gibt kein Buch mit der ID {}.", id)))
            }
        };
        let mut buch = Buch::from_row(&row)?;

        if mit_abbildungen {
            let rows = sqlx::query(
                "SELECT id, beschriftung, content_type FROM abbildung WHERE buch_id = ?1 ORDER BY id",
            )
            .bind(id)
            .fetch_all(&self.db)
            .await?;
            let abbildungen = rows
                .iter()
                .map(|r| {
                    Ok(Abbildung {
                        id: r.try_get("id")?,
                        beschriftung: r.try_get("beschriftung")?,
                        content_type: r.try_get("content_type")?,
                    })
                })
                .collect::<Result<Vec<_>, sqlx::Error>>()?;
            buch.abbildungen = Some(abbildungen);
        }

        Ok(buch)
    }

    /// Binary attachment of a Buch, if one was uploaded.
    pub async fn find_file_by_buch_id(&self, buch_id: i64) -> AppResult<Option<BuchFile>> {
        tracing::debug!("find_file_by_buch_id: buch_id={}", buch_id);
        let row = sqlx::query(
            "SELECT id, buch_id, filename, mimetype, data FROM buch_file WHERE buch_id = ?1",
        )
        .bind(buch_id)
        .fetch_optional(&self.db)
        .await?;
        match row {
            Some(row) => Ok(Some(BuchFile::from_row(&row)?)),
            None => {
                tracing::debug!("find_file_by_buch_id: keine Datei gefunden");
                Ok(None)
            }
        }
    }
}
