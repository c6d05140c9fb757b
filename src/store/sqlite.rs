use std::path::Path;
use std::str::FromStr;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};
use serde::de::DeserializeOwned;

use super::Store;
use super::schema::SCHEMA;
use crate::error::{Error, Result};
use crate::types::*;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Opens an in-memory database. Used by tests.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // Handle SQLite's default datetime format: "YYYY-MM-DD HH:MM:SS"
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            tracing::error!("Invalid datetime in database: '{}' - {}", s, e);
            Utc::now()
        })
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn json_column<T: DeserializeOwned>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn kind_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<ExtensionKind> {
    let raw: String = row.get(idx)?;
    ExtensionKind::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into()))
}

/// Remaps a unique-index violation on insert to `Conflict`. The unique
/// indexes are the sole concurrency control for registry invariants, so the
/// insert itself is the compare-and-insert boundary.
fn map_constraint(e: rusqlite::Error, what: &str) -> Error {
    match &e {
        rusqlite::Error::SqliteFailure(f, _)
            if f.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Error::Conflict(what.to_string())
        }
        _ => Error::Database(e),
    }
}

fn extension_from_row(row: &Row<'_>) -> rusqlite::Result<Extension> {
    Ok(Extension {
        id: row.get(0)?,
        name: row.get(1)?,
        domain: row.get(2)?,
        kind: kind_column(row, 3)?,
        owner_id: row.get(4)?,
        description: row.get(5)?,
        logo: row.get(6)?,
        api_doc_url: row.get(7)?,
        support_email: row.get(8)?,
        developer_contact_emails: json_column(row, 9)?,
        authorized_domains: json_column(row, 10)?,
        needed_data: json_column(row, 11)?,
        permissions: json_column(row, 12)?,
        is_active: row.get(13)?,
        is_published: row.get(14)?,
        created_at: parse_datetime(&row.get::<_, String>(15)?),
        updated_at: parse_datetime(&row.get::<_, String>(16)?),
    })
}

const EXTENSION_COLUMNS: &str = "id, name, domain, kind, owner_id, description, logo, api_doc_url, \
     support_email, developer_contact_emails, authorized_domains, needed_data, permissions, \
     is_active, is_published, created_at, updated_at";

fn installation_from_row(row: &Row<'_>) -> rusqlite::Result<Installation> {
    Ok(Installation {
        id: row.get(0)?,
        business_id: row.get(1)?,
        user_id: row.get(2)?,
        extension_id: row.get(3)?,
        name: row.get(4)?,
        domain: row.get(5)?,
        kind: kind_column(row, 6)?,
        is_active: row.get(7)?,
        permissions: json_column(row, 8)?,
        created_at: parse_datetime(&row.get::<_, String>(9)?),
        updated_at: parse_datetime(&row.get::<_, String>(10)?),
    })
}

const INSTALLATION_COLUMNS: &str = "id, business_id, user_id, extension_id, name, domain, kind, \
     is_active, permissions, created_at, updated_at";

impl Store for SqliteStore {
    fn initialize(&self) -> Result<()> {
        self.conn().execute_batch(SCHEMA)?;
        Ok(())
    }

    // Permission catalog operations

    fn create_permission(&self, permission: &Permission) -> Result<()> {
        self.conn()
            .execute(
                "INSERT INTO permissions (id, scope, description, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    permission.id,
                    permission.scope,
                    permission.description,
                    format_datetime(&permission.created_at),
                ],
            )
            .map_err(|e| map_constraint(e, "permission scope already exists"))?;
        Ok(())
    }

    fn get_permission_by_scope(&self, scope: &str) -> Result<Option<Permission>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, scope, description, created_at FROM permissions WHERE scope = ?1",
            params![scope],
            |row| {
                Ok(Permission {
                    id: row.get(0)?,
                    scope: row.get(1)?,
                    description: row.get(2)?,
                    created_at: parse_datetime(&row.get::<_, String>(3)?),
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_permissions(&self) -> Result<Vec<Permission>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare("SELECT id, scope, description, created_at FROM permissions ORDER BY scope")?;

        let rows = stmt.query_map([], |row| {
            Ok(Permission {
                id: row.get(0)?,
                scope: row.get(1)?,
                description: row.get(2)?,
                created_at: parse_datetime(&row.get::<_, String>(3)?),
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn delete_permission(&self, scope: &str) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM permissions WHERE scope = ?1", params![scope])?;
        Ok(rows > 0)
    }

    // Extension catalog operations

    fn create_extension(&self, extension: &Extension) -> Result<()> {
        self.conn()
            .execute(
                "INSERT INTO extensions (id, name, domain, kind, owner_id, description, logo,
                     api_doc_url, support_email, developer_contact_emails, authorized_domains,
                     needed_data, permissions, is_active, is_published, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
                params![
                    extension.id,
                    extension.name,
                    extension.domain,
                    extension.kind.as_str(),
                    extension.owner_id,
                    extension.description,
                    extension.logo,
                    extension.api_doc_url,
                    extension.support_email,
                    serde_json::to_string(&extension.developer_contact_emails)?,
                    serde_json::to_string(&extension.authorized_domains)?,
                    serde_json::to_string(&extension.needed_data)?,
                    serde_json::to_string(&extension.permissions)?,
                    extension.is_active,
                    extension.is_published,
                    format_datetime(&extension.created_at),
                    format_datetime(&extension.updated_at),
                ],
            )
            .map_err(|e| map_constraint(e, "extension name or domain already exists"))?;
        Ok(())
    }

    fn get_extension_by_name(&self, name: &str) -> Result<Option<Extension>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {EXTENSION_COLUMNS} FROM extensions WHERE name = ?1"),
            params![name],
            extension_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_extensions(&self, offset: i64, limit: i64) -> Result<(Vec<Extension>, i64)> {
        let conn = self.conn();

        let total: i64 = conn.query_row("SELECT COUNT(*) FROM extensions", [], |row| row.get(0))?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {EXTENSION_COLUMNS} FROM extensions
             ORDER BY created_at, id LIMIT ?1 OFFSET ?2"
        ))?;
        let rows = stmt.query_map(params![limit, offset], extension_from_row)?;
        let items = rows.collect::<std::result::Result<Vec<_>, _>>()?;

        Ok((items, total))
    }

    fn set_extension_published(&self, name: &str, published: bool) -> Result<bool> {
        let rows = self.conn().execute(
            "UPDATE extensions SET is_published = ?1, updated_at = ?2 WHERE name = ?3",
            params![published, format_datetime(&Utc::now()), name],
        )?;
        Ok(rows > 0)
    }

    fn set_extension_active(&self, name: &str, active: bool) -> Result<bool> {
        let rows = self.conn().execute(
            "UPDATE extensions SET is_active = ?1, updated_at = ?2 WHERE name = ?3",
            params![active, format_datetime(&Utc::now()), name],
        )?;
        Ok(rows > 0)
    }

    // Installation operations

    fn create_installation(&self, installation: &Installation) -> Result<()> {
        self.conn()
            .execute(
                "INSERT INTO installations (id, business_id, user_id, extension_id, name, domain,
                     kind, is_active, permissions, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    installation.id,
                    installation.business_id,
                    installation.user_id,
                    installation.extension_id,
                    installation.name,
                    installation.domain,
                    installation.kind.as_str(),
                    installation.is_active,
                    serde_json::to_string(&installation.permissions)?,
                    format_datetime(&installation.created_at),
                    format_datetime(&installation.updated_at),
                ],
            )
            .map_err(|e| map_constraint(e, "installation name or domain already in use"))?;
        Ok(())
    }

    fn get_installation(&self, business_id: &str, name: &str) -> Result<Option<Installation>> {
        let conn = self.conn();
        conn.query_row(
            &format!(
                "SELECT {INSTALLATION_COLUMNS} FROM installations
                 WHERE business_id = ?1 AND name = ?2"
            ),
            params![business_id, name],
            installation_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_installations(
        &self,
        business_id: &str,
        kind: Option<ExtensionKind>,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<Installation>, i64)> {
        let conn = self.conn();

        // Count and window share the predicate and the ordering key so the
        // total always matches the set being paged.
        let (total, items) = match kind {
            Some(kind) => {
                let total: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM installations WHERE business_id = ?1 AND kind = ?2",
                    params![business_id, kind.as_str()],
                    |row| row.get(0),
                )?;
                let mut stmt = conn.prepare(&format!(
                    "SELECT {INSTALLATION_COLUMNS} FROM installations
                     WHERE business_id = ?1 AND kind = ?2
                     ORDER BY created_at, id LIMIT ?3 OFFSET ?4"
                ))?;
                let rows = stmt.query_map(
                    params![business_id, kind.as_str(), limit, offset],
                    installation_from_row,
                )?;
                (total, rows.collect::<std::result::Result<Vec<_>, _>>()?)
            }
            None => {
                let total: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM installations WHERE business_id = ?1",
                    params![business_id],
                    |row| row.get(0),
                )?;
                let mut stmt = conn.prepare(&format!(
                    "SELECT {INSTALLATION_COLUMNS} FROM installations
                     WHERE business_id = ?1
                     ORDER BY created_at, id LIMIT ?2 OFFSET ?3"
                ))?;
                let rows =
                    stmt.query_map(params![business_id, limit, offset], installation_from_row)?;
                (total, rows.collect::<std::result::Result<Vec<_>, _>>()?)
            }
        };

        Ok((items, total))
    }

    fn set_installation_active(&self, business_id: &str, name: &str, active: bool) -> Result<bool> {
        let rows = self.conn().execute(
            "UPDATE installations SET is_active = ?1, updated_at = ?2
             WHERE business_id = ?3 AND name = ?4",
            params![active, format_datetime(&Utc::now()), business_id, name],
        )?;
        Ok(rows > 0)
    }

    fn delete_installation(&self, business_id: &str, name: &str) -> Result<bool> {
        let rows = self.conn().execute(
            "DELETE FROM installations WHERE business_id = ?1 AND name = ?2",
            params![business_id, name],
        )?;
        Ok(rows > 0)
    }

    fn close(&self) -> Result<()> {
        Ok(())
    }
}
