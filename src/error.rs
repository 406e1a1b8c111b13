//! Error taxonomy for the persona segmentation pipeline

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SegmentationError {
    #[error("Malformed record at row {row}: {reason}")]
    MalformedRecord { row: usize, reason: String },

    #[error("Age {age} is outside the banded range (0, {max_age}]")]
    AgeOutOfRange { age: i64, max_age: i64 },

    #[error("Age band edges must increase: maximum age {max_age} does not exceed 40")]
    AgeEdgesNotIncreasing { max_age: i64 },

    #[error("No transaction records in batch")]
    EmptyBatch,

    #[error(
        "Degenerate price distribution: {distinct} distinct mean prices across {personas} personas cannot form 4 tiers"
    )]
    DegenerateDistribution { distinct: usize, personas: usize },

    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SegmentationResult<T> = Result<T, SegmentationError>;
