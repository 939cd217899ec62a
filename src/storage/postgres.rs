use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgRow, PgSslMode};
use sqlx::Row;

use super::{NewProduct, Price, Product, ProductStore};
use crate::config::PostgresConfig;
use crate::error::Result;

const RETURNED_COLUMNS: &str =
    "id::bigint AS id, name, price::text AS price, description, image_url";

/// Store backed by an existing `products` table on a Postgres server.
pub struct PostgresProductStore {
    pool: PgPool,
}

impl PostgresProductStore {
    pub async fn connect(config: &PostgresConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(connect_options(config))
            .await?;

        tracing::info!(
            host = config.host.as_deref().unwrap_or("localhost"),
            database = config.database.as_deref().unwrap_or_default(),
            tls = config.tls,
            "postgres product store ready"
        );
        Ok(Self { pool })
    }
}

/// TLS, when on, encrypts without verifying the server certificate.
pub(crate) fn connect_options(config: &PostgresConfig) -> PgConnectOptions {
    let mut options = PgConnectOptions::new().port(config.port).ssl_mode(if config.tls {
        PgSslMode::Require
    } else {
        PgSslMode::Disable
    });

    if let Some(host) = &config.host {
        options = options.host(host);
    }
    if let Some(user) = &config.user {
        options = options.username(user);
    }
    if let Some(password) = &config.password {
        options = options.password(password);
    }
    if let Some(database) = &config.database {
        options = options.database(database);
    }
    options
}

fn product_from_row(row: &PgRow) -> std::result::Result<Product, sqlx::Error> {
    Ok(Product {
        id: Some(row.try_get("id")?),
        name: row.try_get::<Option<String>, _>("name")?.unwrap_or_default(),
        price: Price::new(row.try_get::<Option<String>, _>("price")?.unwrap_or_default()),
        description: row
            .try_get::<Option<String>, _>("description")?
            .unwrap_or_default(),
        image_url: row
            .try_get::<Option<String>, _>("image_url")?
            .unwrap_or_default(),
    })
}

#[async_trait]
impl ProductStore for PostgresProductStore {
    async fn insert(&self, product: NewProduct) -> Result<Product> {
        let sql = format!(
            "INSERT INTO products (name, price, description, image_url)
             VALUES ($1, $2::numeric, $3, $4)
             RETURNING {}",
            RETURNED_COLUMNS
        );

        let row = sqlx::query(&sql)
            .bind(product.name.as_str())
            .bind(product.price.as_str())
            .bind(product.description.as_str())
            .bind(product.image_url.as_str())
            .fetch_one(&self.pool)
            .await?;

        Ok(product_from_row(&row)?)
    }

    async fn list_all(&self) -> Result<Vec<Product>> {
        let sql = format!("SELECT {} FROM products ORDER BY id DESC", RETURNED_COLUMNS);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        let mut products = Vec::with_capacity(rows.len());
        for row in &rows {
            products.push(product_from_row(row)?);
        }
        Ok(products)
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PostgresConfig {
        PostgresConfig {
            host: Some("db.internal".to_string()),
            user: Some("catalog".to_string()),
            password: Some("secret".to_string()),
            database: Some("shop".to_string()),
            port: 6543,
            tls: true,
            max_connections: 5,
        }
    }

    #[test]
    fn test_connect_options_from_config() {
        let options = connect_options(&config());

        assert_eq!(options.get_host(), "db.internal");
        assert_eq!(options.get_port(), 6543);
        assert_eq!(options.get_username(), "catalog");
        assert_eq!(options.get_database(), Some("shop"));
        assert!(matches!(options.get_ssl_mode(), PgSslMode::Require));
    }

    #[test]
    fn test_tls_can_be_disabled() {
        let options = connect_options(&PostgresConfig {
            tls: false,
            ..config()
        });
        assert!(matches!(options.get_ssl_mode(), PgSslMode::Disable));
    }
}
