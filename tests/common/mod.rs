//! Common Test Utilities
//!
//! Every test builds its own copy of a small deterministic regtest chain in a
//! temporary directory, so tests never share state and may run in parallel.

#![allow(dead_code)]


pub use fixtures::{fixture_blocks, ScriptKind};
pub use regtest::RegressionCapture;

use blockindex::chain::Blockchain;
use blockindex::parser::{update_indexes, ChainParser};
use bitcoin::Network;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A parsed and fully indexed fixture chain
pub struct TestChain {
    pub chain: Blockchain,
    pub json_data: serde_json::Value,
    data_dir: PathBuf,
    _dir: TempDir,
}

impl TestChain {
    /// Parse every fixture block and update both indexes
    pub fn new() -> anyhow::Result<Self> {
        Self::with_blocks(fixture_blocks().len())
    }

    /// Parse the first `count` fixture blocks and update both indexes
    pub fn with_blocks(count: usize) -> anyhow::Result<Self> {
        let dir = tempfile::tempdir()?;
        let data_dir = dir.path().join("data");

        let mut parser = ChainParser::open(&data_dir, Network::Regtest)?;
        for block in fixture_blocks().iter().take(count) {
            parser.ingest_block(block)?;
        }

        let chain = Blockchain::from_database(parser.into_database());
        update_indexes(&chain, &data_dir.join("parser"))?;

        Ok(Self {
            chain,
            json_data: fixtures::json_data(),
            data_dir,
            _dir: dir,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn parser_dir(&self) -> PathBuf {
        self.data_dir.join("parser")
    }

    /// Txid registered under a fixture name
    pub fn txid(&self, key: &str) -> String {
        self.json_data[key]
            .as_str()
            .unwrap_or_else(|| panic!("unknown fixture key {}", key))
            .to_string()
    }
}

/// An empty data directory for tests that drive the parser themselves
pub fn empty_data_dir() -> anyhow::Result<(TempDir, PathBuf)> {
    let dir = tempfile::tempdir()?;
    let data_dir = dir.path().join("data");
    Ok((dir, data_dir))
}
