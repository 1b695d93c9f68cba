//! Document model consumed by the validation pipeline.
//!
//! # Responsibility
//! - Define task records produced by the parser.
//! - Define findings and the result type every validator returns.
//!
//! # Invariants
//! - Model values are read-only once built for a validation run.
//! - Rule violations are values inside `ValidationResult`, not errors.

pub mod result;
pub mod task;
