//! Pure layout logic for floor plan arrangement.
//!
//! This crate places rectangular rooms so that every pair of rooms joined
//! by a required link ends up sharing a wall, while rooms never overlap and
//! stay inside an optional boundary polygon. Functions take plain data and
//! return results; the only I/O is JSON (de)serialization of plain records.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`constants`] | Unit scale, size floors, tolerances, link types (u8 IDs) |
//! | [`error`] | Ingestion/editing and configuration errors |
//! | [`geometry`] | Points, rectangles, adjacency, polygon containment |
//! | [`layout`] | Room/link arena, ingestion, deletion, pinning, floor views |
//! | [`grid`] | Position and size snapping, empty-cell search |
//! | [`satisfaction`] | Per-room adjacency satisfaction and the aggregate score |
//! | [`forces`] | Link attraction and centring, one damped step per tick |
//! | [`constraints`] | Overlap separation, boundary rollback, guarded grid snap, wall alignment |
//! | [`placement`] | Docking candidates, blocked rooms, trial swaps |
//! | [`optimizer`] | Phased controller, cancellation, step-delay driver |
//! | [`validation`] | Post-run layout checks |

pub mod constants;
pub mod constraints;
pub mod error;
pub mod forces;
pub mod geometry;
pub mod grid;
pub mod layout;
pub mod optimizer;
pub mod placement;
pub mod satisfaction;
pub mod validation;

pub use error::{ConfigError, LayoutError};
pub use layout::Layout;
pub use optimizer::{CancelToken, Mode, OptimizationRun, OptimizerConfig, StepOutcome, Termination};
