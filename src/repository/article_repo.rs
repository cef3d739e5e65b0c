// ==========================================
// StitchAdmin - Artikel-Repository
// ==========================================
// Verwaltung der articles-Tabelle inkl.
// Lagerbuchungen (stock-Anpassung).
// ==========================================

use crate::domain::article::Article;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{fmt_datetime, opt_datetime, parse_datetime};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

const ARTICLE_COLUMNS: &str = "id, code, name, category, brand, stock, min_stock, \
     purchase_price_single, purchase_price_carton, purchase_price_ten_carton, \
     recommended_price, sell_price, active, created_at, updated_at";

/// Artikel-Repository
pub struct ArticleRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ArticleRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> SqliteResult<Article> {
        Ok(Article {
            id: row.get(0)?,
            code: row.get(1)?,
            name: row.get(2)?,
            category: row.get(3)?,
            brand: row.get(4)?,
            stock: row.get(5)?,
            min_stock: row.get(6)?,
            purchase_price_single: row.get(7)?,
            purchase_price_carton: row.get(8)?,
            purchase_price_ten_carton: row.get(9)?,
            recommended_price: row.get(10)?,
            sell_price: row.get(11)?,
            active: row.get::<_, i64>(12)? != 0,
            created_at: parse_datetime(&row.get::<_, String>(13)?),
            updated_at: opt_datetime(row.get(14)?),
        })
    }

    /// Legt einen Artikel an
    pub fn insert(&self, article: &Article) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO articles (
                id, code, name, category, brand, stock, min_stock,
                purchase_price_single, purchase_price_carton, purchase_price_ten_carton,
                recommended_price, sell_price, active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            "#,
            params![
                article.id,
                article.code,
                article.name,
                article.category,
                article.brand,
                article.stock,
                article.min_stock,
                article.purchase_price_single,
                article.purchase_price_carton,
                article.purchase_price_ten_carton,
                article.recommended_price,
                article.sell_price,
                article.active as i64,
                fmt_datetime(&article.created_at),
                article.updated_at.as_ref().map(fmt_datetime),
            ],
        )?;
        Ok(())
    }

    pub fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Article>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM articles WHERE id = ?1",
            ARTICLE_COLUMNS
        ))?;
        let article = stmt.query_row(params![id], Self::map_row).optional()?;
        Ok(article)
    }

    pub fn get(&self, id: &str) -> RepositoryResult<Article> {
        self.find_by_id(id)?.ok_or_else(|| RepositoryError::NotFound {
            entity: "Artikel".to_string(),
            id: id.to_string(),
        })
    }

    /// Alle aktiven Artikel
    pub fn list_active(&self) -> RepositoryResult<Vec<Article>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM articles WHERE active = 1 ORDER BY name",
            ARTICLE_COLUMNS
        ))?;
        let articles = stmt
            .query_map([], Self::map_row)?
            .collect::<SqliteResult<Vec<Article>>>()?;
        Ok(articles)
    }

    /// Artikel mit Bestand unter Mindestbestand
    pub fn list_low_stock(&self) -> RepositoryResult<Vec<Article>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM articles WHERE active = 1 AND stock <= min_stock ORDER BY name",
            ARTICLE_COLUMNS
        ))?;
        let articles = stmt
            .query_map([], Self::map_row)?
            .collect::<SqliteResult<Vec<Article>>>()?;
        Ok(articles)
    }

    /// Lagerbuchung: delta kann negativ sein, Bestand saturiert bei 0
    pub fn adjust_stock(&self, article_id: &str, delta: i64) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE articles SET stock = MAX(0, stock + ?2) WHERE id = ?1",
            params![article_id, delta],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Artikel".to_string(),
                id: article_id.to_string(),
            });
        }
        let stock: i64 = conn.query_row(
            "SELECT stock FROM articles WHERE id = ?1",
            params![article_id],
            |row| row.get(0),
        )?;
        Ok(stock)
    }
}
