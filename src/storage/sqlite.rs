use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use tokio::task;

use super::{NewProduct, Price, Product, ProductStore};
use crate::error::{CatalogError, Result};

/// File-backed store for local runs without a Postgres server.
pub struct SqliteProductStore {
    db_path: PathBuf,
}

impl SqliteProductStore {
    pub async fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| CatalogError::Internal(e.to_string()))?;
        }

        let db_path = db_path.to_path_buf();
        let db_path_clone = db_path.clone();
        task::spawn_blocking(move || -> Result<()> {
            let conn = Connection::open(&db_path_clone)?;
            conn.execute(
                "CREATE TABLE IF NOT EXISTS products (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    price TEXT NOT NULL,
                    description TEXT NOT NULL DEFAULT '',
                    image_url TEXT NOT NULL DEFAULT ''
                )",
                [],
            )?;
            Ok(())
        })
        .await??;

        tracing::info!(path = %db_path.display(), "sqlite product store ready");
        Ok(Self { db_path })
    }
}

fn product_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Product> {
    Ok(Product {
        id: Some(row.get(0)?),
        name: row.get(1)?,
        price: Price::new(row.get::<_, String>(2)?),
        description: row.get(3)?,
        image_url: row.get(4)?,
    })
}

#[async_trait]
impl ProductStore for SqliteProductStore {
    async fn insert(&self, product: NewProduct) -> Result<Product> {
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let conn = Connection::open(&db_path)?;
            let stored = conn.query_row(
                "INSERT INTO products (name, price, description, image_url)
                 VALUES (?1, ?2, ?3, ?4)
                 RETURNING id, name, price, description, image_url",
                params![
                    product.name,
                    product.price.as_str(),
                    product.description,
                    product.image_url
                ],
                product_from_row,
            )?;
            Ok::<Product, CatalogError>(stored)
        })
        .await?
    }

    async fn list_all(&self) -> Result<Vec<Product>> {
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let conn = Connection::open(&db_path)?;
            let mut stmt = conn.prepare(
                "SELECT id, name, price, description, image_url
                 FROM products ORDER BY id DESC",
            )?;

            let rows = stmt.query_map([], product_from_row)?;

            let mut products = Vec::new();
            for row in rows {
                products.push(row?);
            }
            Ok::<Vec<Product>, CatalogError>(products)
        })
        .await?
    }
}
