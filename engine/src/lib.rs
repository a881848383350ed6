//! Hypothesis filtering and fault accumulation for the countdown deducer.
//!
//! # Architecture
//!
//! ```text
//! SessionRegistry ──▶ DeductionEngine ──▶ Candidate ──▶ matcher::check
//!        │                                                  │
//!        ▼                                                  ▼
//!  dyn SessionStore                                 Digit::code (table)
//! ```
//!
//! The engine is synchronous and deterministic. Everything that touches
//! durable storage goes through [`SessionStore`].

mod candidate;
mod deduction;
pub mod matcher;
mod registry;
mod store;

pub use candidate::Candidate;
pub use deduction::{DeductionEngine, DeductionError, EngineSnapshot, SnapshotError, TERMINAL_STEP};
pub use registry::{SessionError, SessionRegistry};
pub use store::{MemoryStore, SessionStore};
