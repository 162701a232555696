use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use crate::config::AppConfig;
use crate::infrastructure::persistence::error::DbError;
use crate::utils::logging;

/// Owns the SeaORM connection pool shared by the ledger and the repositories
pub struct DbPool {
    connection: DatabaseConnection,
}

impl DbPool {
    pub async fn new(config: &AppConfig) -> Result<Self, DbError> {
        logging::log_database_connection_details(&config.database.url);

        let options = ConnectOptions::new(config.database.url.clone())
            .max_connections(config.database.max_connections)
            .min_connections(config.database.min_connections)
            .connect_timeout(Duration::from_secs(10))
            .sqlx_logging(false)
            .to_owned();

        let connection = Database::connect(options).await.map_err(|e| {
            logging::log_error(&format!("Failed to connect to database: {}", e));
            DbError::ConnectionError(e.to_string())
        })?;

        logging::log_info(&format!(
            "Database pool ready ({} max connections)",
            config.database.max_connections
        ));
        Ok(DbPool { connection })
    }

    pub fn get_connection(&self) -> &DatabaseConnection {
        &self.connection
    }
}
