use crate::errors::{AppError, AppResult};
use bitcoin::consensus::encode::deserialize_hex;
use bitcoin::Block;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

/// Reads consensus-serialised blocks from a text file, one hex block per line
///
/// Blank lines and lines starting with `#` are skipped.
pub struct FileBlockSource {
    lines: Lines<BufReader<File>>,
    line_number: usize,
}

impl FileBlockSource {
    pub fn open(path: &Path) -> AppResult<Self> {
        let file = File::open(path).map_err(|e| {
            AppError::InvalidData(format!("Cannot open block file {}: {}", path.display(), e))
        })?;
        Ok(Self {
            lines: BufReader::new(file).lines(),
            line_number: 0,
        })
    }
}

impl Iterator for FileBlockSource {
    type Item = AppResult<Block>;

    fn next(&mut self) -> Option<Self::Item> {
        for line in self.lines.by_ref() {
            self.line_number += 1;
            let line = match line {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            return Some(parse_block_hex(trimmed).map_err(|e| {
                AppError::InvalidData(format!("Line {}: {}", self.line_number, e))
            }));
        }
        None
    }
}

pub fn parse_block_hex(hex_str: &str) -> AppResult<Block> {
    deserialize_hex::<Block>(hex_str)
        .map_err(|e| AppError::InvalidData(format!("Invalid block hex: {}", e)))
}
