// ==========================================
// StitchAdmin - Kunden-Repository
// ==========================================
// Verwaltung der customers-Tabelle.
// Löschen nur ohne zugehörige Aufträge.
// ==========================================

use crate::domain::customer::Customer;
use crate::domain::types::CustomerType;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{fmt_datetime, opt_datetime, parse_datetime};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

const CUSTOMER_COLUMNS: &str = "id, customer_type, company_name, first_name, last_name, \
     street, postal_code, city, country, email, phone, created_at, updated_at";

/// Kunden-Repository
pub struct CustomerRepository {
    conn: Arc<Mutex<Connection>>,
}

impl CustomerRepository {
    /// Erzeugt ein Repository auf einer bestehenden Verbindung
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> SqliteResult<Customer> {
        Ok(Customer {
            id: row.get(0)?,
            customer_type: CustomerType::parse(&row.get::<_, String>(1)?)
                .unwrap_or(CustomerType::Private),
            company_name: row.get(2)?,
            first_name: row.get(3)?,
            last_name: row.get(4)?,
            street: row.get(5)?,
            postal_code: row.get(6)?,
            city: row.get(7)?,
            country: row.get(8)?,
            email: row.get(9)?,
            phone: row.get(10)?,
            created_at: parse_datetime(&row.get::<_, String>(11)?),
            updated_at: opt_datetime(row.get(12)?),
        })
    }

    /// Legt einen Kunden an
    pub fn insert(&self, customer: &Customer) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO customers (
                id, customer_type, company_name, first_name, last_name,
                street, postal_code, city, country, email, phone,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
            params![
                customer.id,
                customer.customer_type.as_str(),
                customer.company_name,
                customer.first_name,
                customer.last_name,
                customer.street,
                customer.postal_code,
                customer.city,
                customer.country,
                customer.email,
                customer.phone,
                fmt_datetime(&customer.created_at),
                customer.updated_at.as_ref().map(fmt_datetime),
            ],
        )?;
        Ok(())
    }

    /// Sucht einen Kunden per ID
    pub fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Customer>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM customers WHERE id = ?1",
            CUSTOMER_COLUMNS
        ))?;
        let customer = stmt.query_row(params![id], Self::map_row).optional()?;
        Ok(customer)
    }

    /// Kunde oder NotFound-Fehler
    pub fn get(&self, id: &str) -> RepositoryResult<Customer> {
        self.find_by_id(id)?.ok_or_else(|| RepositoryError::NotFound {
            entity: "Kunde".to_string(),
            id: id.to_string(),
        })
    }

    /// Alle Kunden, sortiert nach Firma/Nachname
    pub fn list_all(&self) -> RepositoryResult<Vec<Customer>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM customers ORDER BY company_name, last_name",
            CUSTOMER_COLUMNS
        ))?;
        let customers = stmt
            .query_map([], Self::map_row)?
            .collect::<SqliteResult<Vec<Customer>>>()?;
        Ok(customers)
    }

    /// Aktualisiert Stammdaten eines Kunden
    pub fn update(&self, customer: &Customer) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE customers SET
                customer_type = ?2, company_name = ?3, first_name = ?4, last_name = ?5,
                street = ?6, postal_code = ?7, city = ?8, country = ?9,
                email = ?10, phone = ?11, updated_at = ?12
            WHERE id = ?1
            "#,
            params![
                customer.id,
                customer.customer_type.as_str(),
                customer.company_name,
                customer.first_name,
                customer.last_name,
                customer.street,
                customer.postal_code,
                customer.city,
                customer.country,
                customer.email,
                customer.phone,
                customer.updated_at.as_ref().map(fmt_datetime),
            ],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Kunde".to_string(),
                id: customer.id.clone(),
            });
        }
        Ok(())
    }

    /// Anzahl Aufträge eines Kunden
    pub fn count_orders(&self, customer_id: &str) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM orders WHERE customer_id = ?1",
            params![customer_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Löscht einen Kunden; nur zulässig ohne Aufträge
    pub fn delete(&self, customer_id: &str) -> RepositoryResult<()> {
        if self.count_orders(customer_id)? > 0 {
            return Err(RepositoryError::ValidationError(format!(
                "Kunde {} hat Aufträge und kann nicht gelöscht werden",
                customer_id
            )));
        }
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM customers WHERE id = ?1", params![customer_id])?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Kunde".to_string(),
                id: customer_id.to_string(),
            });
        }
        Ok(())
    }
}
