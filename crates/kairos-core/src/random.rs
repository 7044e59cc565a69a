//! Deterministic random oracle backed by a fixed number table
//!
//! Every draw in a run (per-process static priority, CPU bursts, I/O bursts)
//! comes from this single table in a canonical order, which is what makes
//! simulation output reproducible byte-for-byte.

use std::fs;
use std::path::Path;

use crate::error::{Result, SimulatorError};

/// A wrapping cursor over a fixed table of integers.
#[derive(Debug, Clone)]
pub struct RandomOracle {
    table: Vec<i64>,
    ofs: usize,
}

impl RandomOracle {
    pub fn new(table: Vec<i64>) -> Result<Self> {
        if table.is_empty() {
            return Err(SimulatorError::random_file("empty number table"));
        }
        Ok(RandomOracle { table, ofs: 0 })
    }

    /// Parse a table from text: the first token is the count, followed by
    /// that many integers.
    pub fn parse(text: &str) -> Result<Self> {
        let mut tokens = text.split_whitespace();
        let count: usize = tokens
            .next()
            .ok_or_else(|| SimulatorError::random_file("missing count header"))?
            .parse()
            .map_err(|_| SimulatorError::random_file("count header is not an integer"))?;

        let table = tokens
            .take(count)
            .map(|t| {
                t.parse::<i64>()
                    .map_err(|_| SimulatorError::random_file(format!("bad table entry '{t}'")))
            })
            .collect::<Result<Vec<i64>>>()?;

        if table.len() != count {
            return Err(SimulatorError::random_file(format!(
                "table declares {count} entries but holds {}",
                table.len()
            )));
        }
        Self::new(table)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        Self::parse(&fs::read_to_string(path)?)
    }

    /// `1 + table[ofs] % bound`, advancing the cursor and wrapping at the end
    /// of the table. `bound` must be positive.
    pub fn next(&mut self, bound: u64) -> u64 {
        debug_assert!(bound > 0, "draw bound must be positive");
        let value = 1 + self.table[self.ofs] % bound as i64;
        self.ofs += 1;
        if self.ofs == self.table.len() {
            self.ofs = 0;
        }
        value as u64
    }
}
