//! PersonaForge: rule-based customer persona segmentation
//!
//! Transactions are averaged per demographic tuple, coarsened into age bands,
//! collapsed into persona keys and split into four revenue tiers by quartile.
//! The resulting catalog answers revenue predictions by exact persona lookup.

pub mod aggregate;
pub mod banding;
pub mod catalog;
pub mod cli;
pub mod data;
pub mod error;
pub mod persona;
pub mod segment;
pub mod types;
pub mod viz;

// Re-export public items for easier access
pub use banding::{AgeBand, AgeBands};
pub use catalog::{Persona, PersonaCatalog};
pub use cli::{Args, PersonaQuery};
pub use data::{exploratory_overview, load_transactions, write_catalog};
pub use error::{SegmentationError, SegmentationResult};
pub use persona::PersonaKey;
pub use segment::{QuartileCuts, Segment};
pub use types::{Country, Platform, Sex, TransactionRecord};
pub use viz::create_segment_chart;

/// Common result type used by the application layer
pub type Result<T> = anyhow::Result<T>;
