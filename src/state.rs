use std::sync::Arc;

use crate::config::AppConfig;
use crate::mail::Mailer;

/// The shared application state.
///
/// Holds the resources every request handler needs: the SQLite pool, the
/// loaded configuration and the best-effort mailer. Cloneable for use with
/// Axum's state extraction.
#[derive(Clone)]
pub struct AppState {
    /// The database connection pool.
    pub db: sqlx::SqlitePool,
    /// The application configuration.
    pub config: Arc<AppConfig>,
    /// Best-effort mail notifications (creation mails etc.).
    pub mailer: Mailer,
}

impl AppState {
    pub fn new(db: sqlx::SqlitePool, config: AppConfig) -> Self {
        let mailer = Mailer::new(config.mail.clone());
        Self { db, config: Arc::new(config), mailer }
    }
}
