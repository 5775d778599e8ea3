//! Decision subsystem.
//!
//! # Data Flow
//! ```text
//! country code (from request headers)
//!     → CountryNameIndex lookup → country name
//!     → linear scan of democracy records → score, category
//!     → threshold (8.01) → Verdict
//! ```
//!
//! # Design Decisions
//! - Three-valued verdict: "unknown" is distinct from "not a democracy"
//! - Missing data folds into Unknown; a corrupt score is an error
//! - Pure function over loaded data; no I/O

pub mod engine;

pub use engine::{decide, DecisionResult, ScoreParseError, Verdict, DEMOCRACY_THRESHOLD};
