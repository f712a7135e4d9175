//! Error types for position queries

use std::fmt;
use thiserror::Error;

/// Which of the two diffed lists a position refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListSide {
    Old,
    New,
}

impl fmt::Display for ListSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListSide::Old => f.write_str("old"),
            ListSide::New => f.write_str("new"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiffError {
    #[error("Position {position} is out of bounds for the {side} list of length {len}")]
    PositionOutOfBounds {
        side: ListSide,
        position: usize,
        len: usize,
    },
}
