//! Common types and utilities for the tyrel crates.
//!
//! This crate provides foundational types used across all tyrel crates:
//! - String interning (`Atom`, `Interner`)
//! - Centralized recursion and capacity limits
//! - Diagnostics and the message table
//! - Checker options (strictness flags, inference default)

// String interning for property names and literal values
pub mod interner;
pub use interner::{Atom, Interner};

// Centralized limits and thresholds
pub mod limits;

// Diagnostic types and message lookup
pub mod diagnostics;
pub use diagnostics::{Diagnostic, DiagnosticCategory, DiagnosticRelatedInformation};

// Checker configuration
pub mod options;
pub use options::{CheckerOptions, InferenceDefault};
