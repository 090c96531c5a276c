//! # Replidb Database Crate
//!
//! This crate manages the lifecycle of a local SQLite database that is kept
//! durable by a replication engine, and restored from its replica when no
//! local copy exists.
//!
//! ## Architectural Principles
//!
//! - **Restore Before Open:** When a replica is configured, the session decides
//!   whether to restore, opens the replication engine, and only then opens the
//!   database. Callers never see a handle to a database mid-restore.
//! - **Never Overwrite:** An existing local database file always wins over the
//!   replica.
//! - **Best-Effort Teardown:** Closing a session releases the database and
//!   softly stops the engine, attempting both even if one fails.
//!
//! ## Public API
//!
//! - `Session`: opens and closes one database, with or without replication.
//! - `restore_if_needed`: the restore decision, usable on its own.
//! - `open_database` / `ping`: direct access to the SQLite driver.
//! - `SessionError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod restore;
pub mod session;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{SQLITE_ENGINE_IDENTITIES, check_engine_identity, open_database, ping};
pub use error::SessionError;
pub use restore::{RestoreOutcome, restore_if_needed};
pub use session::Session;
pub use sqlx::SqlitePool;
