//! Bitcoin chain indexer
//!
//! Blocks are parsed into a SQLite database where every output script is
//! classified and numbered within its family of equivalent address types.
//! [`chain::Blockchain`] exposes the indexed chain as lazily resolved
//! block, transaction, output and input views.

pub mod chain;
pub mod cli;
pub mod config;
pub mod database;
pub mod errors;
pub mod parser;
pub mod regression;
pub mod rpc;
pub mod types;
