use std::sync::Arc;

use migration::{Migrator, MigratorTrait};
use sea_orm::DatabaseConnection;
use tracing::info;

use crate::config::Config;
use crate::db::db_connect;
use crate::mail::{BrevoMailer, Mailer};

pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Config,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    pub async fn new() -> Arc<Self> {
        let config = Config::load();

        let db = db_connect(&config.database_url)
            .await
            .expect("Failed to connect to database");

        Migrator::up(&db, None)
            .await
            .expect("Failed to apply migrations");
        info!("Database ready");

        let mailer = Arc::new(BrevoMailer::new(
            config.mail_api_key.clone(),
            config.mail_sender_email.clone(),
            config.mail_sender_name.clone(),
        ));

        Arc::new(Self { db, config, mailer })
    }

    /// Assemble a state around an existing connection and mailer; used by the
    /// integration tests with in-memory sqlite and a capturing mock.
    pub fn with_parts(db: DatabaseConnection, config: Config, mailer: Arc<dyn Mailer>) -> Arc<Self> {
        Arc::new(Self { db, config, mailer })
    }
}
