//! Process input parsing
//!
//! The input file is a whitespace-separated stream of non-negative integers,
//! four per process: arrival time, total CPU demand, CPU-burst bound and
//! I/O-burst bound. Records are admitted in file order; the position in the
//! file becomes the pid.

use std::fs;
use std::path::Path;

use crate::error::Result;

/// Static description of one process, as read from the input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessSpec {
    pub arrival_time: u64,
    pub total_cpu_time: u64,
    pub cpu_burst_max: u64,
    pub io_burst_max: u64,
}

/// Parse the process stream. The first token that is not a non-negative
/// integer ends the stream; a trailing partial record is dropped.
pub fn parse(text: &str) -> Vec<ProcessSpec> {
    let values: Vec<u64> = text
        .split_whitespace()
        .map_while(|token| token.parse().ok())
        .collect();

    values
        .chunks_exact(4)
        .map(|record| ProcessSpec {
            arrival_time: record[0],
            total_cpu_time: record[1],
            cpu_burst_max: record[2],
            io_burst_max: record[3],
        })
        .collect()
}

pub fn load(path: &Path) -> Result<Vec<ProcessSpec>> {
    Ok(parse(&fs::read_to_string(path)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_records_in_order() {
        let specs = parse("0 100 10 5\n500 100 20 10\n");
        assert_eq!(specs.len(), 2);
        assert_eq!(
            specs[0],
            ProcessSpec {
                arrival_time: 0,
                total_cpu_time: 100,
                cpu_burst_max: 10,
                io_burst_max: 5
            }
        );
        assert_eq!(specs[1].arrival_time, 500);
    }

    #[test]
    fn layout_is_free_form() {
        let specs = parse("  0\n100\t10 5   500 100 20 10");
        assert_eq!(specs.len(), 2);
    }

    #[test]
    fn trailing_partial_record_is_dropped() {
        let specs = parse("0 100 10 5 7 7");
        assert_eq!(specs.len(), 1);
    }

    #[test]
    fn malformed_token_ends_the_stream() {
        let specs = parse("0 100 10 5 oops 7 7 7 7");
        assert_eq!(specs.len(), 1);
        assert!(parse("garbage").is_empty());
    }
}
