#[cfg(test)]
mod tests {
    use sqlx::migrate::MigrateDatabase;
    use sqlx::sqlite::SqlitePoolOptions;
    use tempfile::NamedTempFile;

    use crate::db;

    async fn setup_test_db() -> (sqlx::SqlitePool, NamedTempFile) {
        let temp_db = NamedTempFile::new().unwrap();
        let db_url = format!("sqlite:{}", temp_db.path().display());

        sqlx::Sqlite::create_database(&db_url).await.unwrap();

        let pool = SqlitePoolOptions::new().max_connections(1).connect(&db_url).await.unwrap();

        db::init_db(&pool).await.unwrap();
        (pool, temp_db)
    }

    #[tokio::test]
    async fn test_init_db_creates_tables() {
        let (pool, _guard) = setup_test_db().await;

        let tables: Vec<String> =
            sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
                .fetch_all(&pool)
                .await
                .unwrap();

        assert!(tables.contains(&"buch".to_string()));
        assert!(tables.contains(&"titel".to_string()));
        assert!(tables.contains(&"abbildung".to_string()));
        assert!(tables.contains(&"buch_file".to_string()));
        assert!(tables.contains(&"bike".to_string()));
        assert!(tables.contains(&"bike_title".to_string()));
        assert!(tables.contains(&"bike_image".to_string()));
    }

    #[tokio::test]
    async fn test_init_db_is_idempotent() {
        let (pool, _guard) = setup_test_db().await;
        // Nochmaliges Initialisieren darf nicht fehlschlagen
        db::init_db(&pool).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_buch_cascades() {
        let (pool, _guard) = setup_test_db().await;

        let buch_id = sqlx::query(
            "INSERT INTO buch (version, isbn, preis, lieferbar) VALUES (0, 'isbn-1', 10.0, 1)",
        )
        .execute(&pool)
        .await
        .unwrap()
        .last_insert_rowid();
        sqlx::query("INSERT INTO titel (titel, buch_id) VALUES ('Alpha', ?1)")
            .bind(buch_id)
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query(
            "INSERT INTO buch_file (buch_id, filename, data) VALUES (?1, 'cover.png', X'00FF')",
        )
        .bind(buch_id)
        .execute(&pool)
        .await
        .unwrap();

        sqlx::query("DELETE FROM buch WHERE id = ?1").bind(buch_id).execute(&pool).await.unwrap();

        let titel_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM titel").fetch_one(&pool).await.unwrap();
        let file_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM buch_file").fetch_one(&pool).await.unwrap();
        assert_eq!(titel_count, 0);
        assert_eq!(file_count, 0);
    }
}
