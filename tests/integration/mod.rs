//! Integration Tests Module
//!
//! End-to-end tests that parse the fixture chain and exercise the read API,
//! the incremental indexes, and the output regression dump.

pub mod parser_pipeline;
pub mod read_api;
