//! `residentes` - registry of residents for an embassy
//!
//! This library provides the resident record types, the field validator, a
//! SQLite-backed repository and an HTTP server exposing both a JSON API and
//! server-rendered HTML forms over the same data.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod http;
pub mod logging;
pub mod resident;
pub mod storage;
pub mod validation;

pub use config::Config;
pub use error::{Error, ErrorKind, Result};
pub use http::{build_router, AppState};
pub use logging::init_logging;
pub use resident::{MaritalStatus, NewResident, Resident, ResidentInput};
pub use storage::{Repository, ResidentStore, StorageStatus};
pub use validation::{validate_resident, ValidationErrors};
