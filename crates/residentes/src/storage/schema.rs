//! `SQLite` schema definitions for residentes.

/// Name of the single table holding residents.
pub const RESIDENTS_TABLE: &str = "residentes";

/// SQL statement to create the residents table.
///
/// Column names are the ones the office's existing database uses.
pub const CREATE_RESIDENTS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS residentes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    nombre TEXT NOT NULL,
    apellido TEXT NOT NULL,
    fecha_nacimiento DATE NOT NULL,
    pasaporte TEXT NOT NULL,
    email TEXT NOT NULL,
    telefono TEXT,
    direccion TEXT,
    ocupacion TEXT,
    estado_civil TEXT
)
";

/// Column list shared by every read query, in `Resident` field order.
pub const SELECT_COLUMNS: &str = "id, nombre, apellido, fecha_nacimiento, pasaporte, \
     email, telefono, direccion, ocupacion, estado_civil";
