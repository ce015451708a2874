use sqlx::SqlitePool;

pub async fn init_db(pool: &SqlitePool) -> anyhow::Result<()> {
    // Pragmas for better durability/performance
    if let Err(e) = sqlx::query("PRAGMA journal_mode=WAL;").execute(pool).await {
        tracing::warn!("Failed to set WAL journal mode: {}", e);
    }
    if let Err(e) = sqlx::query("PRAGMA synchronous=NORMAL;").execute(pool).await {
        tracing::warn!("Failed to set synchronous mode: {}", e);
    }
    // Foreign keys are critical - fail if this doesn't work
    sqlx::query("PRAGMA foreign_keys=ON;").execute(pool).await?;

    if let Err(e) = sqlx::query("PRAGMA busy_timeout=10000;").execute(pool).await {
        tracing::warn!("Failed to set busy_timeout: {}", e);
    }

    // buch table
    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS buch (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            version INTEGER NOT NULL DEFAULT 0,
            isbn TEXT NOT NULL,
            rating INTEGER NULL,
            art TEXT NULL,
            preis REAL NOT NULL,
            rabatt REAL NULL,
            lieferbar INTEGER NOT NULL DEFAULT 0,
            datum TEXT NULL,
            homepage TEXT NULL,
            schlagwoerter TEXT NULL,
            erzeugt TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ','now')),
            aktualisiert TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ','now'))
        )"#,
    )
    .execute(pool)
    .await?;

    // titel table (mandatory 1:1 to buch)
    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS titel (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            titel TEXT NOT NULL,
            untertitel TEXT NULL,
            buch_id INTEGER NOT NULL UNIQUE,
            FOREIGN KEY(buch_id) REFERENCES buch(id) ON DELETE CASCADE
        )"#,
    )
    .execute(pool)
    .await?;

    // abbildung table (0..n per buch)
    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS abbildung (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            beschriftung TEXT NOT NULL,
            content_type TEXT NOT NULL,
            buch_id INTEGER NOT NULL,
            FOREIGN KEY(buch_id) REFERENCES buch(id) ON DELETE CASCADE
        )"#,
    )
    .execute(pool)
    .await?;

    // buch_file table (one binary attachment per buch)
    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS buch_file (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            buch_id INTEGER NOT NULL UNIQUE,
            filename TEXT NOT NULL,
            mimetype TEXT NULL,
            data BLOB NOT NULL,
            FOREIGN KEY(buch_id) REFERENCES buch(id) ON DELETE CASCADE
        )"#,
    )
    .execute(pool)
    .await?;

    // bike table
    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS bike (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            brand TEXT NOT NULL,
            typ TEXT NOT NULL,
            frame_size TEXT NULL,
            price REAL NOT NULL,
            available INTEGER NOT NULL DEFAULT 1
        )"#,
    )
    .execute(pool)
    .await?;

    // bike_title table
    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS bike_title (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            subtitle TEXT NULL,
            bike_id INTEGER NOT NULL UNIQUE,
            FOREIGN KEY(bike_id) REFERENCES bike(id) ON DELETE CASCADE
        )"#,
    )
    .execute(pool)
    .await?;

    // bike_image table (binary image data)
    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS bike_image (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            description TEXT NULL,
            content_type TEXT NULL,
            bike_id INTEGER NOT NULL,
            data BLOB NULL,
            FOREIGN KEY(bike_id) REFERENCES bike(id) ON DELETE CASCADE
        )"#,
    )
    .execute(pool)
    .await?;

    let indexes = [
        ("idx_titel_buch", "CREATE INDEX IF NOT EXISTS idx_titel_buch ON titel(buch_id)"),
        ("idx_titel_titel", "CREATE INDEX IF NOT EXISTS idx_titel_titel ON titel(titel)"),
        ("idx_abbildung_buch", "CREATE INDEX IF NOT EXISTS idx_abbildung_buch ON abbildung(buch_id)"),
        ("idx_buch_isbn", "CREATE INDEX IF NOT EXISTS idx_buch_isbn ON buch(isbn)"),
        ("idx_buch_rating", "CREATE INDEX IF NOT EXISTS idx_buch_rating ON buch(rating)"),
        ("idx_bike_brand", "CREATE INDEX IF NOT EXISTS idx_bike_brand ON bike(brand)"),
        ("idx_bike_image_bike", "CREATE INDEX IF NOT EXISTS idx_bike_image_bike ON bike_image(bike_id)"),
    ];

    for (name, query) in indexes {
        if let Err(e) = sqlx::query(query).execute(pool).await {
            match &e {
                sqlx::Error::Database(db_err) => {
                    let msg = db_err.message().to_lowercase();
                    if msg.contains("already exists") || msg.contains("duplicate") {
                        tracing::debug!("Index {} already exists, skipping", name);
                    } else {
                        tracing::warn!("Failed to create index {}: {}", name, e);
                    }
                }
                _ => {
                    tracing::warn!("Failed to create index {}: {}", name, e);
                }
            }
        }
    }

    Ok(())
}
