//! SQLite storage for the chain index.
//!
//! ## Architecture
//!
//! The `Database` struct holds the connection and implements the read traits:
//! - `ChainReadOperations` - blocks, transactions, outputs, inputs, scripts
//! - `IndexOperations` - secondary index tables (address outputs, script hashes)
//!
//! Block ingestion uses the write helpers in `chain_ops` inside
//! [`Database::execute_transaction`] so that each block commits atomically.

pub mod chain_ops;
pub mod helpers;
pub mod schema;
pub mod traits;

pub use schema::setup_schema;
pub use traits::*;

use crate::errors::AppResult;
use rusqlite::Connection;
use std::path::Path;
use tracing::info;

/// File name of the chain database inside the data directory
pub const DATABASE_FILE: &str = "chain.db";

/// The main database interface that implements all operation traits.
pub struct Database {
    connection: Connection,
}

impl Database {
    /// Open (or create) a database and initialise the schema
    ///
    /// `":memory:"` gives a private in-memory database.
    pub fn new(database_path: &str) -> AppResult<Self> {
        let connection = Connection::open(database_path)?;
        setup_schema(&connection)?;

        info!("Database initialised at: {}", database_path);
        Ok(Self { connection })
    }

    /// Open the database file inside a data directory, creating the directory
    pub fn open_in_dir(data_dir: &Path) -> AppResult<Self> {
        std::fs::create_dir_all(data_dir)?;
        let path = data_dir.join(DATABASE_FILE);
        Self::new(&path.to_string_lossy())
    }

    /// Get a reference to the underlying connection
    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Execute a function within a database transaction
    ///
    /// The transaction is rolled back if `f` returns an error.
    pub fn execute_transaction<F, R>(&mut self, f: F) -> AppResult<R>
    where
        F: FnOnce(&rusqlite::Transaction) -> AppResult<R>,
    {
        let tx = self.connection.transaction()?;
        let result = f(&tx)?;
        tx.commit()?;
        Ok(result)
    }
}
