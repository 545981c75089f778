//! Storage layer for residentes.
//!
//! This module provides `SQLite`-based persistence for resident records. Every
//! operation opens its own connection, runs a single parameterized statement
//! and drops the connection before returning, whether or not it succeeded.

pub mod schema;
mod store;

use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::resident::{MaritalStatus, NewResident, Resident};

use schema::{CREATE_RESIDENTS_TABLE, RESIDENTS_TABLE, SELECT_COLUMNS};

pub use store::ResidentStore;

/// How long a connection waits on a locked database before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Data access for the `residentes` table.
///
/// Holds only the database path; connections are never shared between calls.
#[derive(Debug, Clone)]
pub struct Repository {
    /// Path to the database file.
    path: PathBuf,
}

impl Repository {
    /// Open or create a database at the given path.
    ///
    /// Creates the parent directories and the `residentes` table if they
    /// don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or the table cannot
    /// be created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let repo = Self { path };
        let conn = repo.connect()?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        conn.execute(CREATE_RESIDENTS_TABLE, [])?;

        info!("Database ready at {}", repo.path.display());
        Ok(repo)
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open a fresh connection for a single operation.
    fn connect(&self) -> Result<Connection> {
        let conn = Connection::open(&self.path).map_err(|source| Error::DatabaseOpen {
            path: self.path.clone(),
            source,
        })?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(conn)
    }

    /// List every resident, in storage order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list(&self) -> Result<Vec<Resident>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(&format!("SELECT {SELECT_COLUMNS} FROM residentes"))?;
        let residents = stmt
            .query_map([], Self::row_to_resident)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        debug!("Listed {} residents", residents.len());
        Ok(residents)
    }

    /// Get a resident by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get(&self, id: i64) -> Result<Option<Resident>> {
        let conn = self.connect()?;
        let resident = conn
            .query_row(
                &format!("SELECT {SELECT_COLUMNS} FROM residentes WHERE id = ?1"),
                [id],
                Self::row_to_resident,
            )
            .optional()?;
        Ok(resident)
    }

    /// Insert a validated resident and return the id storage assigned to it.
    ///
    /// Absent optional fields are written as `NULL`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn insert(&self, resident: &NewResident) -> Result<i64> {
        let conn = self.connect()?;
        conn.execute(
            r"
            INSERT INTO residentes (nombre, apellido, fecha_nacimiento, pasaporte,
                                    email, telefono, direccion, ocupacion, estado_civil)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ",
            params![
                resident.first_name,
                resident.last_name,
                resident.birth_date,
                resident.passport,
                resident.email,
                resident.phone,
                resident.address,
                resident.occupation,
                resident.marital_status.as_ref().map(MaritalStatus::as_str),
            ],
        )?;

        let id = conn.last_insert_rowid();
        debug!("Inserted resident with id {}", id);
        Ok(id)
    }

    /// Replace every field of the resident with the given id.
    ///
    /// Returns `true` if a row was updated, `false` if no row has that id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn update(&self, id: i64, resident: &NewResident) -> Result<bool> {
        let conn = self.connect()?;
        let affected = conn.execute(
            r"
            UPDATE residentes
            SET nombre = ?1, apellido = ?2, fecha_nacimiento = ?3, pasaporte = ?4,
                email = ?5, telefono = ?6, direccion = ?7, ocupacion = ?8, estado_civil = ?9
            WHERE id = ?10
            ",
            params![
                resident.first_name,
                resident.last_name,
                resident.birth_date,
                resident.passport,
                resident.email,
                resident.phone,
                resident.address,
                resident.occupation,
                resident.marital_status.as_ref().map(MaritalStatus::as_str),
                id,
            ],
        )?;
        Ok(affected > 0)
    }

    /// Delete a resident by id.
    ///
    /// Returns `true` if a resident was deleted, `false` if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete(&self, id: i64) -> Result<bool> {
        let conn = self.connect()?;
        let affected = conn.execute("DELETE FROM residentes WHERE id = ?1", [id])?;
        Ok(affected > 0)
    }

    /// Check that the database answers and holds the residents table.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be reached or the table is
    /// missing.
    pub fn ping(&self) -> Result<StorageStatus> {
        self.status(&self.connect()?)
    }

    /// Inspect an existing database without creating or altering anything.
    ///
    /// Unlike [`Repository::open`], a missing file or a missing table is
    /// reported instead of being created.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DatabaseOpen`] if the file does not exist or cannot be
    /// read, and [`Error::DatabaseSchema`] if the table is missing.
    pub fn inspect(path: impl AsRef<Path>) -> Result<StorageStatus> {
        let repo = Self {
            path: path.as_ref().to_path_buf(),
        };
        let conn = Connection::open_with_flags(&repo.path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(|source| Error::DatabaseOpen {
                path: repo.path.clone(),
                source,
            })?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        repo.status(&conn)
    }

    fn status(&self, conn: &Connection) -> Result<StorageStatus> {
        let one: i64 = conn.query_row("SELECT 1", [], |row| row.get(0))?;
        if one != 1 {
            return Err(Error::internal(format!("SELECT 1 returned {one}")));
        }

        let tables: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [RESIDENTS_TABLE],
            |row| row.get(0),
        )?;
        if tables == 0 {
            return Err(Error::DatabaseSchema {
                message: format!("table {RESIDENTS_TABLE} does not exist"),
            });
        }

        let residents: i64 =
            conn.query_row("SELECT COUNT(*) FROM residentes", [], |row| row.get(0))?;

        Ok(StorageStatus {
            path: self.path.clone(),
            residents,
        })
    }

    /// Convert a database row to a Resident.
    fn row_to_resident(row: &rusqlite::Row) -> rusqlite::Result<Resident> {
        Ok(Resident {
            id: row.get(0)?,
            first_name: row.get(1)?,
            last_name: row.get(2)?,
            birth_date: row.get(3)?,
            passport: row.get(4)?,
            email: row.get(5)?,
            phone: row.get(6)?,
            address: row.get(7)?,
            occupation: row.get(8)?,
            marital_status: row.get(9)?,
        })
    }
}

/// Result of a successful [`Repository::ping`].
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct StorageStatus {
    /// Path to the database file.
    pub path: PathBuf,
    /// Number of stored residents.
    pub residents: i64,
}
