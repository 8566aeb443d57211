//! MySQL reading store backed by a sqlx connection pool.
//!
//! Every operation borrows a pooled connection for the duration of one call.
//! Writes run inside a transaction that is committed on success and rolled
//! back when dropped on any error path.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use reading_api::StoreConfig;
use reading_spi::{ReadingStore, Result, SensorReading, StoreError};
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use sqlx::FromRow;

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS dht11 (
    id BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY,
    temperature DOUBLE NOT NULL,
    humidity DOUBLE NOT NULL,
    timestamp DATETIME(6) NOT NULL DEFAULT CURRENT_TIMESTAMP(6),
    INDEX idx_dht11_timestamp (timestamp)
)
"#;

#[derive(Debug, FromRow)]
struct ReadingRow {
    temperature: f64,
    humidity: f64,
    timestamp: NaiveDateTime,
}

impl From<ReadingRow> for SensorReading {
    fn from(row: ReadingRow) -> Self {
        SensorReading::new(row.temperature, row.humidity, row.timestamp.and_utc())
    }
}

/// Reading store on a MySQL `dht11` table.
#[derive(Debug, Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    /// Open a pool from configuration and verify it with one connection.
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        let pool = pool_options(config)
            .connect_with(connect_options(config))
            .await
            .map_err(map_sqlx_error)?;
        tracing::info!(
            host = %config.host,
            database = %config.database,
            max_connections = config.max_connections,
            "connected to reading store"
        );
        Ok(Self { pool })
    }

    /// Build a pool that only connects when first used.
    pub fn connect_lazy(config: &StoreConfig) -> Self {
        let pool = pool_options(config).connect_lazy_with(connect_options(config));
        Self { pool }
    }

    /// Create the readings table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(CREATE_TABLE)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }
}

fn connect_options(config: &StoreConfig) -> MySqlConnectOptions {
    MySqlConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.user)
        .password(&config.password)
        .database(&config.database)
}

fn pool_options(config: &StoreConfig) -> MySqlPoolOptions {
    MySqlPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
}

/// Translate a driver error into the store taxonomy.
pub(crate) fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err)
            if db_err.is_unique_violation()
                || db_err.is_check_violation()
                || db_err.is_foreign_key_violation() =>
        {
            StoreError::Rejected(db_err.to_string())
        }
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Configuration(_) => StoreError::Connection(err.to_string()),
        other => StoreError::Query(other.to_string()),
    }
}

#[async_trait]
impl ReadingStore for MySqlStore {
    fn name(&self) -> &str {
        "mysql"
    }

    async fn append(&self, reading: &SensorReading) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        sqlx::query("INSERT INTO dht11 (temperature, humidity, timestamp) VALUES (?, ?, ?)")
            .bind(reading.temperature)
            .bind(reading.humidity)
            .bind(reading.timestamp.naive_utc())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "insert into dht11 failed");
                map_sqlx_error(e)
            })?;

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn latest(&self) -> Result<Option<SensorReading>> {
        let row = sqlx::query_as::<_, ReadingRow>(
            "SELECT temperature, humidity, timestamp FROM dht11 ORDER BY timestamp DESC, id DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(SensorReading::from))
    }

    async fn all(&self) -> Result<Vec<SensorReading>> {
        let rows = sqlx::query_as::<_, ReadingRow>(
            "SELECT temperature, humidity, timestamp FROM dht11 ORDER BY timestamp DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(SensorReading::from).collect())
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reading_api::StoreConfigBuilder;
    use std::time::Duration;

    fn unreachable_config() -> StoreConfig {
        StoreConfigBuilder::new()
            .host("127.0.0.1")
            .port(1)
            .database("ecosense_test")
            .max_connections(1)
            .acquire_timeout(Duration::from_millis(300))
            .build()
            .unwrap()
    }

    #[test]
    fn test_pool_errors_map_to_connection() {
        assert!(matches!(
            map_sqlx_error(sqlx::Error::PoolTimedOut),
            StoreError::Connection(_)
        ));
        assert!(matches!(
            map_sqlx_error(sqlx::Error::PoolClosed),
            StoreError::Connection(_)
        ));
    }

    #[test]
    fn test_row_errors_map_to_query() {
        assert!(matches!(
            map_sqlx_error(sqlx::Error::RowNotFound),
            StoreError::Query(_)
        ));
        assert!(matches!(
            map_sqlx_error(sqlx::Error::ColumnNotFound("humidity".to_string())),
            StoreError::Query(_)
        ));
    }

    #[test]
    fn test_row_conversion_is_utc() {
        let naive = chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_micro_opt(12, 30, 0, 250)
            .unwrap();
        let reading = SensorReading::from(ReadingRow {
            temperature: 25.0,
            humidity: 60.0,
            timestamp: naive,
        });
        assert_eq!(reading.timestamp.naive_utc(), naive);
        assert_eq!(reading.temperature, 25.0);
    }

    #[tokio::test]
    async fn test_unreachable_database_is_connection_error() {
        let store = MySqlStore::connect_lazy(&unreachable_config());
        let reading = SensorReading::new(25.0, 60.0, chrono::Utc::now());

        assert!(matches!(
            store.append(&reading).await,
            Err(StoreError::Connection(_))
        ));
        assert!(matches!(store.ping().await, Err(StoreError::Connection(_))));
    }
}
